use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::builder::{self, BuildParams};
use crate::error::Result;
use crate::fetch;
use crate::formula::Formula;
use crate::util::{binary_file_name, ensure_prefix_dirs, locate_binary, receipt_path};

/// Record of one completed install, written next to the binary.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Receipt {
    pub name: String,
    pub version: String,
    pub commit: String,
    pub date: String,
    pub source: String,
    /// Actual digest of the installed archive.
    pub sha256: String,
    pub binary: PathBuf,
    pub toolchain: String,
}

impl Receipt {
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Receipt> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| e.into())
    }

    /// Loads every receipt under the prefix, sorted by tool name.
    pub fn load_all(prefix: &Path) -> Result<Vec<Receipt>> {
        let dir = prefix.join("receipts");
        if !dir.exists() {
            return Ok(vec![]);
        }
        let mut receipts = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                receipts.push(Receipt::load(&path)?);
            }
        }
        receipts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(receipts)
    }
}

/// Runs the full install sequence for a formula: toolchain check, fetch,
/// verify, build in staging, then persist the binary under the prefix.
///
/// On success exactly one executable exists at the returned path and a
/// receipt records what was built. The build never touches the prefix, so
/// a failure at any stage leaves no partial install behind.
pub fn install(
    formula: &Formula,
    prefix: &Path,
    params: &BuildParams,
    keep_staging: bool,
) -> Result<PathBuf> {
    builder::check_toolchain(formula)?;
    let acquired = fetch::acquire(&formula.source)?;

    let staging = tempfile::tempdir()?;
    let src_root = fetch::extract(&acquired.archive, &staging.path().join("src"))?;
    let built = builder::build(formula, &src_root, &staging.path().join("out"), params)?;

    let prefix = ensure_prefix_dirs(prefix)?;
    let bin_dir = prefix.join("bin");
    let file_name = binary_file_name(formula.binary_name());
    let target = bin_dir.join(&file_name);
    // stage within the same directory so the final rename is atomic
    let partial = bin_dir.join(format!(".{file_name}.partial"));
    std::fs::copy(&built, &partial)?;
    std::fs::rename(&partial, &target)?;

    let receipt = Receipt {
        name: formula.package.name.clone(),
        version: params.version.clone(),
        commit: params.commit.clone(),
        date: params.date.clone(),
        source: formula.source.url.clone(),
        sha256: acquired.sha256,
        binary: target.clone(),
        toolchain: formula.build.program.clone(),
    };
    receipt.save(receipt_path(&prefix, &formula.package.name))?;

    if keep_staging {
        let kept = staging.keep();
        println!("Staging directory kept at {}", kept.display());
    }
    Ok(target)
}

/// Removes the installed binary and its receipt. Missing pieces are
/// skipped, so uninstalling twice is harmless.
pub fn uninstall(formula: &Formula, prefix: &Path) -> Result<()> {
    println!("Uninstalling {}", formula.package.name);
    if let Some(binary) = locate_binary(prefix, formula.binary_name())? {
        std::fs::remove_file(binary)?;
    }
    let receipt = receipt_path(prefix, &formula.package.name);
    if receipt.exists() {
        std::fs::remove_file(receipt)?;
    }
    println!("Done");
    Ok(())
}
