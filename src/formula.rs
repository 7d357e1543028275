use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::error::Result;
use crate::util::is_valid_version;

/// Represents the contents of a formula file (`malt.toml`).
///
/// A formula is the declarative recipe for one third-party command-line
/// tool: metadata, a versioned source archive, the toolchain needed to
/// build it, and a smoke test for the installed binary.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Formula {
    /// Metadata about the packaged tool.
    pub package: Package,
    /// Where the source archive lives and how to verify it.
    pub source: Source,
    /// How to turn the extracted source tree into a binary.
    #[serde(default)]
    pub build: Build,
    /// How to validate the installed binary.
    #[serde(default)]
    pub test: SmokeTest,
}

/// Basic metadata for a packaged tool.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Package {
    /// The name of the produced binary.
    pub name: String,
    /// The release version (semantic versioning, no leading `v`).
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub homepage: String,
    /// SPDX license identifier.
    #[serde(default)]
    pub license: String,
}

/// Location and expected digest of the source archive.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Source {
    /// Archive URL (`.tar.gz`, `.tgz` or `.zip`). Https, or a local path.
    pub url: String,
    /// Expected SHA-256 of the archive. An empty digest means the archive
    /// is installed unverified; `audit` reports it as a problem.
    #[serde(default)]
    pub sha256: String,
}

/// Build configuration: the toolchain invocation template.
///
/// The produced command line is
/// `<program> <args..> -ldflags <rendered> -o <binary> .`, run inside the
/// extracted source root. `{version}`, `{commit}` and `{date}` in the
/// ldflags template are substituted at build time.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Build {
    /// Program invoked to compile the source tree. A bare name is resolved
    /// on `PATH`, a path is used as-is.
    #[serde(default = "default_program")]
    pub program: String,
    /// Leading arguments for the toolchain invocation.
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// Linker flags template, stripped symbols plus version injection.
    #[serde(default = "default_ldflags")]
    pub ldflags: String,
    /// Name of the produced binary. Defaults to the package name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<String>,
    /// Tools this formula depends on, and at which stage.
    #[serde(default = "default_depends")]
    pub depends: Vec<Dependency>,
}

/// A tool required by the formula at a given stage.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Dependency {
    pub name: String,
    #[serde(default)]
    pub stage: Stage,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Required only to produce the binary, not to run it.
    #[default]
    Build,
    Runtime,
}

/// Smoke test for the installed binary: one flag, pass iff exit 0.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SmokeTest {
    #[serde(default = "default_test_flag")]
    pub flag: String,
}

fn default_program() -> String {
    String::from("go")
}

fn default_args() -> Vec<String> {
    vec![String::from("build")]
}

fn default_ldflags() -> String {
    String::from("-s -w -X main.version={version} -X main.commit={commit} -X main.date={date}")
}

fn default_depends() -> Vec<Dependency> {
    vec![Dependency {
        name: String::from("go"),
        stage: Stage::Build,
    }]
}

fn default_test_flag() -> String {
    String::from("--version")
}

impl Default for Build {
    fn default() -> Self {
        Build {
            program: default_program(),
            args: default_args(),
            ldflags: default_ldflags(),
            binary: None,
            depends: default_depends(),
        }
    }
}

impl Default for SmokeTest {
    fn default() -> Self {
        SmokeTest {
            flag: default_test_flag(),
        }
    }
}

impl Formula {
    /// Creates a formula template for the given tool name, with the
    /// checksum left for the author to fill in.
    pub fn scaffold(name: &str) -> Formula {
        Formula {
            package: Package {
                name: String::from(name),
                version: String::from("0.1.0"),
                description: String::new(),
                homepage: String::new(),
                license: String::from("MIT"),
            },
            source: Source {
                url: format!("https://github.com/OWNER/{name}/archive/v0.1.0.tar.gz"),
                sha256: String::new(),
            },
            build: Build::default(),
            test: SmokeTest::default(),
        }
    }

    /// Saves the formula to the given file path in pretty TOML format.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    /// Loads a formula from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Formula> {
        let toml = std::fs::read_to_string(path)?;
        toml::from_str(&toml).map_err(|e| e.into())
    }

    /// The file name of the binary this formula produces.
    pub fn binary_name(&self) -> &str {
        self.build.binary.as_deref().unwrap_or(&self.package.name)
    }

    /// All dependencies declared for the given stage.
    pub fn depends_at(&self, stage: Stage) -> impl Iterator<Item = &Dependency> {
        self.build.depends.iter().filter(move |d| d.stage == stage)
    }

    /// Statically checks the formula and returns every problem found.
    ///
    /// An empty checksum is a problem: the archive would be installed
    /// without verification.
    pub fn audit(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.package.name.trim().is_empty() {
            problems.push(String::from("package name is empty"));
        }
        if !is_valid_version(&self.package.version) {
            problems.push(format!(
                "'{}' is not a valid semver version",
                self.package.version
            ));
        }
        if self.package.license.trim().is_empty() {
            problems.push(String::from("no license declared"));
        }
        if self.source.sha256.trim().is_empty() {
            problems.push(String::from(
                "sha256 is empty, the source archive cannot be verified",
            ));
        }
        if self.source.url.starts_with("http://") {
            problems.push(String::from("source url uses plain http"));
        } else if !self.source.url.starts_with("https://")
            && !Path::new(&self.source.url).exists()
        {
            problems.push(format!(
                "source url '{}' is neither https nor an existing local path",
                self.source.url
            ));
        }
        let program = &self.build.program;
        if !program.contains(std::path::MAIN_SEPARATOR)
            && !self
                .depends_at(Stage::Build)
                .any(|d| d.name == *program)
        {
            problems.push(format!(
                "build program '{program}' is not declared as a build dependency"
            ));
        }
        problems
    }
}
