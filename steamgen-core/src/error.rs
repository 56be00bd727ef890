//! Fatal error type for the generation pipelines.

use camino::Utf8PathBuf;
use steamgen_catalog::CatalogError;
use steamgen_rewrite::RewriteError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    /// An external tool ran but exited unsuccessfully.
    #[error("Error building {target}: {tool} {args} exited with {exit}\n{output}", args = .args.join(" "), exit = render_status(.status))]
    ToolInvocation {
        target: Utf8PathBuf,
        tool: String,
        args: Vec<String>,
        status: Option<i32>,
        output: String,
    },

    /// An external tool could not be started.
    #[error("Error building {target}: failed to run {tool}")]
    ToolUnavailable {
        target: Utf8PathBuf,
        tool: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("file system error on {path}")]
    FileSystem {
        path: Utf8PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Error building {target}")]
    Rewrite {
        target: Utf8PathBuf,
        #[source]
        source: RewriteError,
    },

    #[error("duplicate target {target} (groups {first} and {second})")]
    DuplicateTarget {
        target: String,
        first: String,
        second: String,
    },

    #[error("unknown schema group '{name}' (available: {available})")]
    UnknownGroup { name: String, available: String },
}

impl GenerateError {
    /// Every generation failure is fatal.
    pub fn exit_code(&self) -> u8 {
        1
    }

    pub(crate) fn fs(path: impl Into<Utf8PathBuf>, source: anyhow::Error) -> Self {
        GenerateError::FileSystem {
            path: path.into(),
            source,
        }
    }
}

impl From<CatalogError> for GenerateError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::DuplicateTarget {
                target,
                first,
                second,
            } => GenerateError::DuplicateTarget {
                target,
                first,
                second,
            },
            CatalogError::UnknownGroup { name, available } => {
                GenerateError::UnknownGroup { name, available }
            }
        }
    }
}

fn render_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {code}"),
        None => "a signal".to_string(),
    }
}
