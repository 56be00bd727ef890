//! Error types for steamgen-rewrite.
//!
//! Every variant names the file being rewritten. All of them abort the
//! generation run.

use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RewriteError {
    /// The header of the generated file could not be parsed.
    #[error("error parsing {path}: line {line}: {message}")]
    ImportParse {
        path: Utf8PathBuf,
        line: usize,
        message: String,
    },

    /// The target path has no parent directory to name the package after.
    #[error("cannot infer package name for {path}: no parent directory")]
    PackageInference { path: Utf8PathBuf },

    /// The target file name has no base name before its first `.`.
    #[error("invalid target file name {path}")]
    InvalidTarget { path: Utf8PathBuf },

    /// A rewrite pattern built from the rules did not compile.
    #[error("invalid rewrite pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("io error on {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RewriteError {
    /// Returns true if the generated source itself was rejected.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, RewriteError::ImportParse { .. })
    }
}

/// Result type alias using RewriteError.
pub type RewriteResult<T> = Result<T, RewriteError>;
