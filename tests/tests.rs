#![cfg(unix)]

use std::path::{Path, PathBuf};
use flate2::Compression;
use flate2::write::GzEncoder;
use malt::builder::BuildParams;
use malt::formula::{Build, Formula, Package, SmokeTest, Source};
use malt::util::sha256_hex;
use std::os::unix::fs::PermissionsExt;
use tempfile::TempDir;

// Stand-in for `go build -ldflags <flags> -o <out> .`: emits a script that
// echoes the ldflags it was built with, so version injection is observable.
const STUB_TOOLCHAIN: &str = r#"#!/bin/sh
out=""
ldflags=""
while [ $# -gt 0 ]; do
    case "$1" in
        -o) out="$2"; shift 2 ;;
        -ldflags) ldflags="$2"; shift 2 ;;
        *) shift ;;
    esac
done
[ -n "$out" ] || exit 1
printf '#!/bin/sh\necho "hsctl %s"\nexit 0\n' "$ldflags" > "$out"
chmod +x "$out"
"#;

fn write_executable(path: &Path, content: &str) {
    std::fs::write(path, content).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

fn write_source_tarball(dir: &Path) -> PathBuf {
    let src = dir.join("tree");
    std::fs::create_dir_all(&src).unwrap();
    std::fs::write(src.join("main.go"), "package main\n").unwrap();

    let archive_path = dir.join("v0.1.0.tar.gz");
    let file = std::fs::File::create(&archive_path).unwrap();
    let enc = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(enc);
    builder.append_dir_all("hsctl-0.1.0", &src).unwrap();
    builder.into_inner().unwrap().finish().unwrap();
    archive_path
}

fn setup_formula(dir: &Path) -> Formula {
    let archive = write_source_tarball(dir);
    let digest = sha256_hex(&std::fs::read(&archive).unwrap());
    let toolchain = dir.join("fakego");
    write_executable(&toolchain, STUB_TOOLCHAIN);

    Formula {
        package: Package {
            name: String::from("hsctl"),
            version: String::from("0.1.0"),
            description: String::from("A CLI tool for managing HubSpot contacts"),
            homepage: String::from("https://github.com/obay/hsctl"),
            license: String::from("MIT"),
        },
        source: Source {
            url: archive.display().to_string(),
            sha256: digest,
        },
        build: Build {
            program: toolchain.display().to_string(),
            args: vec![String::from("build")],
            ldflags: String::from(
                "-s -w -X main.version={version} -X main.commit={commit} -X main.date={date}",
            ),
            binary: None,
            depends: vec![],
        },
        test: SmokeTest::default(),
    }
}

fn pinned_params() -> BuildParams {
    BuildParams {
        version: String::from("0.1.0"),
        commit: String::from("abc1234"),
        date: String::from("2024-01-01T00:00:00Z"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use malt::error::MaltError;
    use malt::installer::{install, uninstall};
    use malt::smoke::run_smoke_test;
    use malt::util::{is_executable, receipt_path};

    #[test]
    fn test_install_pipeline() {
        let dir = TempDir::new().unwrap();
        let formula = setup_formula(dir.path());
        let prefix = dir.path().join(".malt");

        let installed = install(&formula, &prefix, &pinned_params(), false).unwrap();
        assert_eq!(installed, prefix.join("bin").join("hsctl"));
        assert!(installed.exists());
        assert!(is_executable(&installed));
        assert!(receipt_path(&prefix, "hsctl").exists());

        let stdout = run_smoke_test(&formula, &prefix).unwrap();
        assert!(stdout.contains("main.version=0.1.0"));
        assert!(stdout.contains("main.commit=abc1234"));
        assert!(stdout.contains("main.date=2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_install_is_reproducible_with_pinned_params() {
        let dir = TempDir::new().unwrap();
        let formula = setup_formula(dir.path());
        let prefix = dir.path().join(".malt");

        let first = install(&formula, &prefix, &pinned_params(), false).unwrap();
        let first_bytes = std::fs::read(&first).unwrap();
        let second = install(&formula, &prefix, &pinned_params(), false).unwrap();
        let second_bytes = std::fs::read(&second).unwrap();

        assert_eq!(first, second);
        assert_eq!(first_bytes, second_bytes);
    }

    #[test]
    fn test_checksum_mismatch_aborts_before_build() {
        let dir = TempDir::new().unwrap();
        let mut formula = setup_formula(dir.path());
        formula.source.sha256 = String::from(
            "0000000000000000000000000000000000000000000000000000000000000000",
        );
        let prefix = dir.path().join(".malt");

        let err = install(&formula, &prefix, &pinned_params(), false).unwrap_err();
        assert!(matches!(err, MaltError::ChecksumMismatch { .. }));
        assert!(!prefix.exists());
    }

    #[test]
    fn test_missing_toolchain_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut formula = setup_formula(dir.path());
        formula.build.program = String::from("malt-test-no-such-tool");
        let prefix = dir.path().join(".malt");

        let err = install(&formula, &prefix, &pinned_params(), false).unwrap_err();
        assert!(matches!(err, MaltError::Build(_)));
        assert!(!prefix.exists());
    }

    #[test]
    fn test_failing_build_leaves_no_partial_install() {
        let dir = TempDir::new().unwrap();
        let mut formula = setup_formula(dir.path());
        let broken = dir.path().join("brokengo");
        write_executable(&broken, "#!/bin/sh\necho \"compile error\" >&2\nexit 2\n");
        formula.build.program = broken.display().to_string();
        let prefix = dir.path().join(".malt");

        let err = install(&formula, &prefix, &pinned_params(), false).unwrap_err();
        assert!(matches!(err, MaltError::Build(_)));
        assert!(err.to_string().contains("compile error"));
        assert!(!prefix.join("bin").join("hsctl").exists());
    }

    #[test]
    fn test_uninstall_removes_binary_and_receipt() {
        let dir = TempDir::new().unwrap();
        let formula = setup_formula(dir.path());
        let prefix = dir.path().join(".malt");

        let installed = install(&formula, &prefix, &pinned_params(), false).unwrap();
        uninstall(&formula, &prefix).unwrap();
        assert!(!installed.exists());
        assert!(!receipt_path(&prefix, "hsctl").exists());

        // uninstalling again is a no-op
        uninstall(&formula, &prefix).unwrap();
    }

    #[test]
    fn test_smoke_test_requires_install() {
        let dir = TempDir::new().unwrap();
        let formula = setup_formula(dir.path());
        let prefix = dir.path().join(".malt");

        let err = run_smoke_test(&formula, &prefix).unwrap_err();
        assert!(matches!(err, MaltError::TestFailure(_)));
    }
}
