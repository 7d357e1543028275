use std::path::{Path, PathBuf};
use std::process::Command;
use crate::error::{MaltError, Result};
use crate::formula::{Formula, Stage};
use crate::util::{binary_file_name, is_executable};

/// Parameters injected into the build as linker-set program variables.
///
/// The packaged tool is expected to expose `version`, `commit` and `date`
/// string variables in its entry module.
#[derive(Debug, Clone)]
pub struct BuildParams {
    pub version: String,
    pub commit: String,
    pub date: String,
}

/// Substitutes the build parameters into an ldflags template.
pub fn render_ldflags(template: &str, params: &BuildParams) -> String {
    template
        .replace("{version}", &params.version)
        .replace("{commit}", &params.commit)
        .replace("{date}", &params.date)
}

/// Checks that the toolchain the formula declares is actually available.
///
/// Runs before anything is fetched or written, so a missing toolchain
/// fails the install without side effects.
pub fn check_toolchain(formula: &Formula) -> Result<()> {
    let program = &formula.build.program;
    if program.contains(std::path::MAIN_SEPARATOR) {
        if !Path::new(program).is_file() {
            return Err(MaltError::Build(format!(
                "build program '{program}' does not exist"
            )));
        }
    } else if which(program).is_none() {
        return Err(MaltError::Build(format!(
            "build program '{program}' not found on PATH"
        )));
    }
    for dep in formula.depends_at(Stage::Build) {
        if which(&dep.name).is_none() {
            return Err(MaltError::Build(format!(
                "build dependency '{}' not found on PATH",
                dep.name
            )));
        }
    }
    Ok(())
}

fn which(program: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path) {
        let candidate = dir.join(binary_file_name(program));
        if candidate.is_file() && is_executable(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Compiles the extracted source tree into `out_dir` and returns the path
/// of the produced binary.
///
/// The output lands inside the staging area, never at the install prefix,
/// so a failed compile leaves no partial install behind.
pub fn build(
    formula: &Formula,
    src_root: &Path,
    out_dir: &Path,
    params: &BuildParams,
) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)?;
    let out_path = out_dir.join(binary_file_name(formula.binary_name()));
    let ldflags = render_ldflags(&formula.build.ldflags, params);

    let mut cmd = Command::new(&formula.build.program);
    cmd.args(&formula.build.args);
    if !ldflags.is_empty() {
        cmd.arg("-ldflags").arg(&ldflags);
    }
    cmd.arg("-o").arg(&out_path).arg(".").current_dir(src_root);

    let output = cmd.output().map_err(|e| {
        MaltError::Build(format!(
            "failed to spawn '{}': {e}",
            formula.build.program
        ))
    })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MaltError::Build(format!(
            "'{}' failed with {}: {}",
            formula.build.program,
            output.status,
            stderr.trim()
        )));
    }

    if !out_path.is_file() || !is_executable(&out_path) {
        return Err(MaltError::Build(format!(
            "toolchain did not produce an executable at {}",
            out_path.display()
        )));
    }
    Ok(out_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::Formula;

    #[test]
    fn test_render_ldflags_substitutes_all_params() {
        let params = BuildParams {
            version: String::from("0.1.0"),
            commit: String::from("abc1234"),
            date: String::from("2024-01-01T00:00:00Z"),
        };
        let rendered = render_ldflags(
            "-s -w -X main.version={version} -X main.commit={commit} -X main.date={date}",
            &params,
        );
        assert_eq!(
            rendered,
            "-s -w -X main.version=0.1.0 -X main.commit=abc1234 -X main.date=2024-01-01T00:00:00Z"
        );
    }

    #[test]
    fn test_render_ldflags_leaves_plain_flags_alone() {
        let params = BuildParams {
            version: String::from("0.1.0"),
            commit: String::from("abc1234"),
            date: String::from("2024-01-01T00:00:00Z"),
        };
        assert_eq!(render_ldflags("-s -w", &params), "-s -w");
    }

    #[test]
    fn test_check_toolchain_missing_dependency() {
        let mut formula = Formula::scaffold("hsctl");
        formula.build.program = String::from("malt-test-no-such-tool");
        formula.build.depends.clear();

        let err = check_toolchain(&formula).unwrap_err();
        assert!(matches!(err, MaltError::Build(_)));
        assert!(err.to_string().contains("malt-test-no-such-tool"));
    }

    #[test]
    fn test_which_misses_nonexistent_program() {
        assert!(which("malt-test-no-such-tool").is_none());
    }
}
