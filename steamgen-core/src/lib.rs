//! Embeddable core library for steamgen.
//!
//! Provides clap-free entry points for the three generator verbs, with all
//! process and filesystem access behind the port traits in [`ports`]:
//! - [`ToolRunner`](ports::ToolRunner): run `protoc`, `dotnet`, `gofmt`
//! - [`FilePort`](ports::FilePort): create, move and remove files
//!
//! The [`adapters`] module provides the default process- and
//! filesystem-backed implementations.
//!
//! # Entry points
//!
//! - [`generate_all`](pipeline::generate_all): compile and rewrite every schema
//! - [`build_steam_language`](steamlang::build_steam_language): generate the Steam language files
//! - [`clean`](clean::clean): remove generated files

pub mod adapters;
pub mod clean;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod report;
pub mod settings;
pub mod steamlang;

pub use error::GenerateError;
pub use report::{GeneratedFile, GenerationReport};
pub use settings::{GenerateSettings, ToolPaths};

// Re-export the rewrite rules so callers don't need steamgen-rewrite directly.
pub use steamgen_rewrite::RewriteRules;
