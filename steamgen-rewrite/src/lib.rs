//! Rewrite pass for `protoc-gen-go` output.
//!
//! `protoc-gen-go` loads each dependency of a file as a separate package, and
//! derives the package name from the schema namespace. go-steam instead keeps
//! every file of a product area in one package, so each generated file is
//! repaired after the compiler runs:
//!
//! 1. parse the import section (the rest of the file stays opaque),
//! 2. classify imports as local (same-run schema output) or shared (descriptor),
//! 3. drop local imports and their `alias.` qualifiers,
//! 4. repoint the descriptor import to the canonical Go module,
//! 5. drop stale `discarding unused import` comments,
//! 6. rename the package after the target directory,
//! 7. prefix auto-numbered `fileDescriptorN` symbols with the file's base name.

pub mod error;
pub mod imports;

pub use error::{RewriteError, RewriteResult};
pub use imports::{ImportEdge, ImportSection, PackageClause, ParseError, parse_imports};

use camino::Utf8Path;
use fs_err as fs;
use regex::Regex;
use serde::Deserialize;
use std::ops::Range;
use tracing::debug;

/// Literal patterns the rewrite pass keys on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RewriteRules {
    /// Substring marking an import of another schema-derived file.
    pub local_marker: String,
    /// Substring marking the descriptor-metadata dependency.
    pub shared_marker: String,
    /// Import path the shared dependency is repointed to.
    pub shared_canonical: String,
    /// Prefix of the generator's stale-import comments.
    pub unused_import_comment: String,
    /// Prefix of the auto-numbered per-file symbols.
    pub symbol_prefix: String,
}

impl Default for RewriteRules {
    fn default() -> Self {
        Self {
            local_marker: ".proto".to_string(),
            shared_marker: "google/protobuf/descriptor.proto".to_string(),
            shared_canonical: "google.golang.org/protobuf/types/descriptorpb".to_string(),
            unused_import_comment: "// discarding unused import ".to_string(),
            symbol_prefix: "fileDescriptor".to_string(),
        }
    }
}

/// How one import is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteDecision {
    /// Generated in the same run; removed and unqualified.
    Local,
    /// Descriptor metadata; kept and repointed.
    Shared,
    /// Anything else; untouched.
    Keep,
}

impl RewriteRules {
    pub fn classify(&self, edge: &ImportEdge) -> RewriteDecision {
        if edge.path.contains(&self.shared_marker) {
            RewriteDecision::Shared
        } else if edge.path.contains(&self.local_marker) {
            RewriteDecision::Local
        } else {
            RewriteDecision::Keep
        }
    }
}

/// Output of a rewrite, with what was changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    pub text: String,
    pub package: String,
    pub removed_imports: Vec<ImportEdge>,
    pub shared_imports: usize,
    pub renamed_symbols: usize,
}

/// Rewrite generated `source` destined for `target`.
pub fn rewrite(source: &str, target: &Utf8Path, rules: &RewriteRules) -> RewriteResult<Rewritten> {
    let section = parse_imports(source).map_err(|e| RewriteError::ImportParse {
        path: target.to_path_buf(),
        line: e.line,
        message: e.message,
    })?;

    let package = infer_package_name(target)?;
    let base = file_base_name(target)?;

    let mut local = Vec::new();
    let mut shared = Vec::new();
    for edge in &section.imports {
        match rules.classify(edge) {
            RewriteDecision::Local => local.push(edge.clone()),
            RewriteDecision::Shared => shared.push(edge.clone()),
            RewriteDecision::Keep => {}
        }
    }

    // All header edits come from the single parse and touch disjoint spans.
    let mut edits: Vec<(Range<usize>, &str)> = Vec::new();
    for edge in &local {
        edits.push((edge.line_span.clone(), ""));
    }
    // One shared import survives: the first named one, else the first.
    let kept = shared
        .iter()
        .position(|e| e.qualifier() != "_")
        .unwrap_or(0);
    let kept_qualifier = shared.get(kept).map(ImportEdge::qualifier);
    let mut requalify = Vec::new();
    for (i, edge) in shared.iter().enumerate() {
        if i == kept {
            edits.push((edge.path_span.clone(), rules.shared_canonical.as_str()));
            continue;
        }
        edits.push((edge.line_span.clone(), ""));
        let qualifier = edge.qualifier();
        if let Some(to) = &kept_qualifier
            && qualifier != "_"
            && &qualifier != to
        {
            requalify.push((qualifier, to.clone()));
        }
    }
    edits.push((section.package.name_span.clone(), package.as_str()));

    let head = apply_edits(&source[..section.body_start], edits);
    let body = strip_qualifiers(&source[section.body_start..], &local)?;
    let body = requalify_references(&body, &requalify)?;

    let text = strip_unused_import_comments(&(head + &body), &rules.unused_import_comment)?;
    let (text, renamed_symbols) = disambiguate_symbols(&text, &rules.symbol_prefix, &base)?;

    debug!(
        target = %target,
        removed = local.len(),
        shared = shared.len(),
        renamed = renamed_symbols,
        "rewrote generated file"
    );

    Ok(Rewritten {
        text,
        package,
        removed_imports: local,
        shared_imports: shared.len(),
        renamed_symbols,
    })
}

/// Rewrite `path` in place. No backup is kept.
pub fn rewrite_file(path: &Utf8Path, rules: &RewriteRules) -> RewriteResult<Rewritten> {
    let source = fs::read_to_string(path).map_err(|source| RewriteError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rewritten = rewrite(&source, path, rules)?;
    fs::write(path, &rewritten.text).map_err(|source| RewriteError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(rewritten)
}

/// Package name for a target: its parent directory's name.
///
/// `protocol/protobuf/steam/unified/auth.pb.go` becomes `unified`.
pub fn infer_package_name(target: &Utf8Path) -> RewriteResult<String> {
    target
        .parent()
        .and_then(|p| p.file_name())
        .map(str::to_string)
        .ok_or_else(|| RewriteError::PackageInference {
            path: target.to_path_buf(),
        })
}

/// File name up to its first `.` (`client_server.pb.go` becomes `client_server`).
pub fn file_base_name(target: &Utf8Path) -> RewriteResult<String> {
    target
        .file_name()
        .and_then(|name| name.split('.').next())
        .filter(|base| !base.is_empty())
        .map(str::to_string)
        .ok_or_else(|| RewriteError::InvalidTarget {
            path: target.to_path_buf(),
        })
}

fn apply_edits(text: &str, mut edits: Vec<(Range<usize>, &str)>) -> String {
    edits.sort_by_key(|(range, _)| range.start);
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (range, replacement) in edits {
        out.push_str(&text[cursor..range.start]);
        out.push_str(replacement);
        cursor = range.end;
    }
    out.push_str(&text[cursor..]);
    out
}

fn compile(pattern: &str) -> RewriteResult<Regex> {
    Regex::new(pattern).map_err(|source| RewriteError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Drop `alias.` before identifiers, for every removed import.
///
/// Textual: an `alias.` inside a string literal or comment is stripped too.
fn strip_qualifiers(body: &str, removed: &[ImportEdge]) -> RewriteResult<String> {
    let mut out = body.to_string();
    let mut seen = Vec::new();
    for edge in removed {
        let qualifier = edge.qualifier();
        if qualifier.is_empty() || qualifier == "_" || seen.contains(&qualifier) {
            continue;
        }
        let re = compile(&format!(r"\b{}\.([\p{{L}}_])", regex::escape(&qualifier)))?;
        out = re.replace_all(&out, "${1}").into_owned();
        seen.push(qualifier);
    }
    Ok(out)
}

/// Point `from.` references at `to.` after a duplicate import was dropped.
fn requalify_references(body: &str, renames: &[(String, String)]) -> RewriteResult<String> {
    let mut out = body.to_string();
    for (from, to) in renames {
        let re = compile(&format!(r"\b{}\.([\p{{L}}_])", regex::escape(from)))?;
        let replacement = format!("{to}.${{1}}");
        out = re.replace_all(&out, replacement.as_str()).into_owned();
    }
    Ok(out)
}

fn strip_unused_import_comments(text: &str, comment: &str) -> RewriteResult<String> {
    let re = compile(&format!(r"(?m)^[ \t]*{}.*\r?\n", regex::escape(comment)))?;
    Ok(re.replace_all(text, "").into_owned())
}

/// Prefix whole identifiers `<prefix><digits>` with `<base>_`.
fn disambiguate_symbols(text: &str, prefix: &str, base: &str) -> RewriteResult<(String, usize)> {
    let re = compile(&format!(r"\b{}[0-9]+\b", regex::escape(prefix)))?;
    let count = re.find_iter(text).count();
    let replacement = format!("{base}_${{0}}");
    Ok((re.replace_all(text, replacement.as_str()).into_owned(), count))
}
