//! Clap-free settings for the generation pipelines.
//!
//! Relative paths are resolved against `root`; absolute paths are used as is.

use camino::{Utf8Path, Utf8PathBuf};
use steamgen_rewrite::RewriteRules;

/// Program names for the external tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub protoc: String,
    pub dotnet: String,
    pub gofmt: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            protoc: "protoc".to_string(),
            dotnet: "dotnet".to_string(),
            gofmt: "gofmt".to_string(),
        }
    }
}

/// Settings shared by all pipelines.
#[derive(Debug, Clone)]
pub struct GenerateSettings {
    pub root: Utf8PathBuf,

    // Layout
    pub source_base: Utf8PathBuf,
    pub protocol_root: Utf8PathBuf,
    pub steamkit: Utf8PathBuf,
    pub steamlang_generator: Utf8PathBuf,

    pub tools: ToolPaths,
    pub rewrite: RewriteRules,

    /// Schema groups to build; empty means all.
    pub groups: Vec<String>,
    pub print_commands: bool,
}

impl Default for GenerateSettings {
    fn default() -> Self {
        Self {
            root: Utf8PathBuf::from("."),
            source_base: Utf8PathBuf::from("Protobufs"),
            protocol_root: Utf8PathBuf::from("../protocol"),
            steamkit: Utf8PathBuf::from("./SteamKit"),
            steamlang_generator: Utf8PathBuf::from("./GoSteamLanguageGenerator"),
            tools: ToolPaths::default(),
            rewrite: RewriteRules::default(),
            groups: Vec::new(),
            print_commands: false,
        }
    }
}

impl GenerateSettings {
    pub fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn source_base_dir(&self) -> Utf8PathBuf {
        self.resolve(&self.source_base)
    }

    pub fn protocol_dir(&self) -> Utf8PathBuf {
        self.resolve(&self.protocol_root)
    }

    /// Output directory of the Steam language generator.
    pub fn steamlang_dir(&self) -> Utf8PathBuf {
        self.protocol_dir().join("steamlang")
    }

    /// Scratch extension schema removed after a protobuf build.
    pub fn valve_extensions_schema(&self) -> Utf8PathBuf {
        self.source_base_dir()
            .join("google")
            .join("protobuf")
            .join("valve_extensions.proto")
    }
}
