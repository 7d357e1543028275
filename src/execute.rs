use std::path::{Path, PathBuf};
use anyhow::{Result, bail};
use colored::Colorize;
use malt::builder::BuildParams;
use malt::formula::Formula;
use malt::global::cache::clean_cache;
use malt::installer::{self, Receipt};
use malt::smoke::run_smoke_test;
use malt::util::{default_prefix, git_short_head, iso8601_utc_now, locate_binary};
use malt::fetch;
use crate::cli::{CLI, MaltCommand};

pub fn execute(cli: CLI) -> Result<()> {
    match cli.command {
        MaltCommand::Init { name } => execute_init(name),
        MaltCommand::Info { formula } => execute_info(&formula),
        MaltCommand::Audit { formula } => execute_audit(&formula),
        MaltCommand::Fetch { formula } => execute_fetch(&formula),
        MaltCommand::Install {
            formula,
            prefix,
            commit,
            date,
            keep_staging,
        } => execute_install(&formula, prefix, commit, date, keep_staging),
        MaltCommand::Test { formula, prefix } => execute_test(&formula, prefix),
        MaltCommand::Uninstall { formula, prefix } => execute_uninstall(&formula, prefix),
        MaltCommand::Which { formula, prefix } => execute_which(&formula, prefix),
        MaltCommand::List { prefix, verbose } => execute_list(prefix, verbose),
        MaltCommand::Clean => execute_clean(),
    }
}

fn load_formula(path: &Path) -> Result<Formula> {
    if !path.exists() {
        bail!(
            "formula not found: {}. Run `malt init` to create one.",
            path.display()
        );
    }
    Ok(Formula::load(path)?)
}

fn resolve_prefix(prefix: Option<PathBuf>) -> Result<PathBuf> {
    match prefix {
        Some(prefix) => Ok(prefix),
        None => Ok(default_prefix()?),
    }
}

pub fn execute_init(name: Option<String>) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => {
            let cwd = std::env::current_dir()?;
            cwd.file_name()
                .ok_or(anyhow::anyhow!("Could not get directory name"))?
                .to_str()
                .ok_or(anyhow::anyhow!("Invalid directory name"))?
                .to_string()
        }
    };
    let path = std::env::current_dir()?.join("malt.toml");
    if path.exists() {
        bail!("malt.toml already exists");
    }
    let formula = Formula::scaffold(&name);
    formula.save(&path)?;
    println!("Created {} for '{}'", path.display(), name);
    println!("Fill in source.url and source.sha256 before installing.");
    Ok(())
}

pub fn execute_info(path: &Path) -> Result<()> {
    let formula = load_formula(path)?;
    println!("{} {}", formula.package.name.bold(), formula.package.version);
    if !formula.package.description.is_empty() {
        println!("  {}", formula.package.description);
    }
    if !formula.package.homepage.is_empty() {
        println!("  homepage: {}", formula.package.homepage);
    }
    if !formula.package.license.is_empty() {
        println!("  license: {}", formula.package.license);
    }
    println!("  source: {}", formula.source.url);
    match formula.source.sha256.is_empty() {
        true => println!("  sha256: {}", "(unset)".yellow()),
        false => println!("  sha256: {}", formula.source.sha256),
    }
    for dep in &formula.build.depends {
        println!("  depends: {} ({:?})", dep.name, dep.stage);
    }
    Ok(())
}

pub fn execute_audit(path: &Path) -> Result<()> {
    let formula = load_formula(path)?;
    let problems = formula.audit();
    if problems.is_empty() {
        println!(
            "{} {} is sound",
            "ok".green().bold(),
            formula.package.name
        );
        return Ok(());
    }
    for problem in &problems {
        println!("{} {}", "problem:".red().bold(), problem);
    }
    bail!("{} problem(s) found in {}", problems.len(), path.display());
}

pub fn execute_fetch(path: &Path) -> Result<()> {
    let formula = load_formula(path)?;
    let acquired = fetch::acquire(&formula.source)?;
    println!(
        "{} {} ({})",
        "Fetched".green().bold(),
        acquired.archive.display(),
        acquired.sha256
    );
    Ok(())
}

pub fn execute_install(
    path: &Path,
    prefix: Option<PathBuf>,
    commit: Option<String>,
    date: Option<String>,
    keep_staging: bool,
) -> Result<()> {
    let formula = load_formula(path)?;
    let prefix = resolve_prefix(prefix)?;
    let params = BuildParams {
        version: formula.package.version.clone(),
        commit: commit
            .or_else(git_short_head)
            .unwrap_or_else(|| String::from("none")),
        date: date.unwrap_or_else(iso8601_utc_now),
    };
    let installed = installer::install(&formula, &prefix, &params, keep_staging)?;
    println!(
        "{} {} {} -> {}",
        "Installed".green().bold(),
        formula.package.name,
        params.version,
        installed.display()
    );
    Ok(())
}

pub fn execute_test(path: &Path, prefix: Option<PathBuf>) -> Result<()> {
    let formula = load_formula(path)?;
    let prefix = resolve_prefix(prefix)?;
    let stdout = run_smoke_test(&formula, &prefix)?;
    println!("{} {}", "ok".green().bold(), stdout);
    Ok(())
}

pub fn execute_uninstall(path: &Path, prefix: Option<PathBuf>) -> Result<()> {
    let formula = load_formula(path)?;
    let prefix = resolve_prefix(prefix)?;
    installer::uninstall(&formula, &prefix)?;
    Ok(())
}

pub fn execute_which(path: &Path, prefix: Option<PathBuf>) -> Result<()> {
    let formula = load_formula(path)?;
    let prefix = resolve_prefix(prefix)?;
    match locate_binary(&prefix, formula.binary_name())? {
        Some(binary) => println!("Found executable at: {}", binary.display()),
        None => println!("No installed binary found"),
    }
    Ok(())
}

pub fn execute_list(prefix: Option<PathBuf>, verbose: bool) -> Result<()> {
    let prefix = resolve_prefix(prefix)?;
    let receipts = Receipt::load_all(&prefix)?;
    if receipts.is_empty() {
        println!("No installed formulas");
        return Ok(());
    }
    for receipt in &receipts {
        println!("{}: {}", receipt.name, receipt.version);
        if verbose {
            println!("  commit: {}", receipt.commit);
            println!("  built: {}", receipt.date);
            println!("  source: {}", receipt.source);
            println!("  # sha256: {}", receipt.sha256);
            println!("  binary: {}", receipt.binary.display());
        }
    }
    Ok(())
}

pub fn execute_clean() -> Result<()> {
    clean_cache()?;
    println!("Archive cache cleared");
    Ok(())
}
