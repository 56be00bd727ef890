//! Configuration file loading for steamgen.
//!
//! Discovers and loads `steamgen.toml` from the working root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use steamgen_core::{GenerateSettings, RewriteRules, ToolPaths};
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "steamgen.toml";

/// Top-level configuration from steamgen.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SteamgenConfig {
    /// Log every external command before running it.
    pub print_commands: bool,

    pub paths: PathsConfig,
    pub tools: ToolsConfig,

    /// Overrides for the rewrite pass patterns.
    pub rewrite: RewriteRules,
}

/// Paths section of the config. Relative paths are resolved against the root.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub source_base: Utf8PathBuf,
    pub protocol_root: Utf8PathBuf,
    pub steamkit: Utf8PathBuf,
    pub steamlang_generator: Utf8PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let defaults = GenerateSettings::default();
        Self {
            source_base: defaults.source_base,
            protocol_root: defaults.protocol_root,
            steamkit: defaults.steamkit,
            steamlang_generator: defaults.steamlang_generator,
        }
    }
}

/// Tools section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub protoc: String,
    pub dotnet: String,
    pub gofmt: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        let defaults = ToolPaths::default();
        Self {
            protoc: defaults.protoc,
            dotnet: defaults.dotnet,
            gofmt: defaults.gofmt,
        }
    }
}

/// Discover the steamgen.toml config file in `root`.
pub fn discover_config(root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a steamgen.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<SteamgenConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<SteamgenConfig> {
    let config: SteamgenConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load the explicit config file, or discover one in `root`, or use defaults.
///
/// An explicit path that does not exist is an error.
pub fn load_or_default(
    root: &Utf8Path,
    explicit: Option<&Utf8Path>,
) -> anyhow::Result<SteamgenConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    match discover_config(root) {
        Some(path) => load_config(&path),
        None => Ok(SteamgenConfig::default()),
    }
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: SteamgenConfig,
}

impl ConfigMerger {
    pub fn new(config: SteamgenConfig) -> Self {
        Self { config }
    }

    /// Produce pipeline settings.
    ///
    /// `print_commands` is enabled by either source; `groups` comes from the
    /// CLI only.
    pub fn merge(self, root: &Utf8Path, groups: &[String], print_commands: bool) -> GenerateSettings {
        let SteamgenConfig {
            print_commands: config_print,
            paths,
            tools,
            rewrite,
        } = self.config;

        GenerateSettings {
            root: root.to_path_buf(),
            source_base: paths.source_base,
            protocol_root: paths.protocol_root,
            steamkit: paths.steamkit,
            steamlang_generator: paths.steamlang_generator,
            tools: ToolPaths {
                protoc: tools.protoc,
                dotnet: tools.dotnet,
                gofmt: tools.gofmt,
            },
            rewrite,
            groups: groups.to_vec(),
            print_commands: print_commands || config_print,
        }
    }
}
