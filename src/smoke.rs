use std::path::Path;
use std::process::Command;
use crate::error::{MaltError, Result};
use crate::formula::Formula;
use crate::util::locate_binary;

/// Runs the formula's smoke test against the installed binary.
///
/// Executes the binary with the formula's version flag and passes iff the
/// process exits 0. Returns the captured stdout on success.
pub fn run_smoke_test(formula: &Formula, prefix: &Path) -> Result<String> {
    let binary = locate_binary(prefix, formula.binary_name())?.ok_or_else(|| {
        MaltError::TestFailure(format!(
            "'{}' is not installed under {}",
            formula.package.name,
            prefix.display()
        ))
    })?;

    let output = Command::new(&binary)
        .arg(&formula.test.flag)
        .output()
        .map_err(|e| {
            MaltError::TestFailure(format!("failed to run {}: {e}", binary.display()))
        })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MaltError::TestFailure(format!(
            "'{} {}' exited with {}: {}",
            binary.display(),
            formula.test.flag,
            output.status,
            stderr.trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::Formula;
    use crate::util::ensure_prefix_dirs;
    use tempfile::tempdir;

    #[test]
    fn test_smoke_test_missing_binary() {
        let dir = tempdir().unwrap();
        let formula = Formula::scaffold("hsctl");
        let err = run_smoke_test(&formula, dir.path()).unwrap_err();
        assert!(matches!(err, MaltError::TestFailure(_)));
        assert!(err.to_string().contains("not installed"));
    }

    #[cfg(unix)]
    fn place_stub_binary(prefix: &std::path::Path, name: &str, script: &str) {
        use std::os::unix::fs::PermissionsExt;
        let bin = prefix.join("bin").join(name);
        std::fs::write(&bin, script).unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_smoke_test_passes_on_exit_zero() {
        let dir = tempdir().unwrap();
        let prefix = ensure_prefix_dirs(dir.path().join(".malt")).unwrap();
        place_stub_binary(&prefix, "hsctl", "#!/bin/sh\necho \"hsctl v0.1.0\"\nexit 0\n");

        let formula = Formula::scaffold("hsctl");
        let stdout = run_smoke_test(&formula, &prefix).unwrap();
        assert!(stdout.contains("v0.1.0"));
    }

    #[cfg(unix)]
    #[test]
    fn test_smoke_test_fails_on_nonzero_exit() {
        let dir = tempdir().unwrap();
        let prefix = ensure_prefix_dirs(dir.path().join(".malt")).unwrap();
        place_stub_binary(&prefix, "hsctl", "#!/bin/sh\nexit 3\n");

        let formula = Formula::scaffold("hsctl");
        let err = run_smoke_test(&formula, &prefix).unwrap_err();
        assert!(matches!(err, MaltError::TestFailure(_)));
    }
}
