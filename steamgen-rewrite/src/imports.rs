//! Partial parser for the header of a generated Go file.
//!
//! Only the package clause and the import declarations are recognised. The
//! scan stops at the first line that is neither a comment, blank, nor part of
//! an import declaration; everything after that offset is opaque body text.

use std::ops::Range;

/// The package clause of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageClause {
    pub name: String,
    /// Byte range of the package name.
    pub name_span: Range<usize>,
}

/// One import spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEdge {
    /// Explicit qualifier, if the spec names one.
    pub alias: Option<String>,
    pub path: String,
    /// 1-based line number.
    pub line: usize,
    /// Byte range of the whole line, including its newline.
    pub line_span: Range<usize>,
    /// Byte range of the path, without quotes.
    pub path_span: Range<usize>,
}

impl ImportEdge {
    /// Qualifier that body references use for this import.
    ///
    /// Falls back to the last path segment, cut at the first character that
    /// cannot appear in an identifier.
    pub fn qualifier(&self) -> String {
        if let Some(alias) = &self.alias {
            return alias.clone();
        }
        let last = self.path.rsplit('/').next().unwrap_or(&self.path);
        last.chars().take_while(|c| is_ident_char(*c)).collect()
    }
}

/// Result of parsing the header of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSection {
    pub package: PackageClause,
    pub imports: Vec<ImportEdge>,
    /// Byte offset where the opaque body begins.
    pub body_start: usize,
}

/// Why the header could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl ParseError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    BeforePackage,
    Imports,
    Block,
}

/// Parse the package clause and import declarations of `source`.
pub fn parse_imports(source: &str) -> Result<ImportSection, ParseError> {
    let mut state = State::BeforePackage;
    let mut in_comment = false;
    let mut package: Option<PackageClause> = None;
    let mut imports = Vec::new();
    let mut offset = 0;
    let mut line_no = 0;

    for raw in source.split_inclusive('\n') {
        line_no += 1;
        let start = offset;
        offset += raw.len();

        if in_comment {
            if let Some(end) = raw.find("*/") {
                in_comment = false;
                if !is_trivia(&raw[end + 2..]) {
                    return Err(ParseError::new(line_no, "code after block comment"));
                }
            }
            continue;
        }

        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("/*") {
            match rest.find("*/") {
                Some(end) if is_trivia(&rest[end + 2..]) => continue,
                Some(_) => return Err(ParseError::new(line_no, "code after block comment")),
                None => {
                    in_comment = true;
                    continue;
                }
            }
        }

        match state {
            State::BeforePackage => {
                let Some(rest) = keyword(trimmed, "package") else {
                    return Err(ParseError::new(line_no, "expected package clause"));
                };
                let name: String = rest.chars().take_while(|c| is_ident_char(*c)).collect();
                if name.is_empty() || !is_trivia(&rest[name.len()..]) {
                    return Err(ParseError::new(line_no, "malformed package clause"));
                }
                let name_start = start + offset_in(raw, rest);
                package = Some(PackageClause {
                    name_span: name_start..name_start + name.len(),
                    name,
                });
                state = State::Imports;
            }
            State::Imports => {
                let Some(rest) = keyword(trimmed, "import") else {
                    // First declaration that is not an import ends the section.
                    return finish(package, imports, start, line_no);
                };
                if let Some(after) = rest.strip_prefix('(') {
                    if after.trim_start().starts_with(')') {
                        continue;
                    }
                    if !is_trivia(after) {
                        return Err(ParseError::new(
                            line_no,
                            "import specs must start on the line after '('",
                        ));
                    }
                    state = State::Block;
                } else {
                    imports.push(parse_spec(raw, rest, start, line_no)?);
                }
            }
            State::Block => {
                if let Some(after) = trimmed.strip_prefix(')') {
                    if !is_trivia(after) {
                        return Err(ParseError::new(line_no, "code after import block"));
                    }
                    state = State::Imports;
                    continue;
                }
                imports.push(parse_spec(raw, trimmed, start, line_no)?);
            }
        }
    }

    match state {
        State::Block => Err(ParseError::new(line_no, "unterminated import block")),
        _ if in_comment => Err(ParseError::new(line_no, "unterminated block comment")),
        _ => finish(package, imports, source.len(), line_no),
    }
}

fn finish(
    package: Option<PackageClause>,
    imports: Vec<ImportEdge>,
    body_start: usize,
    line_no: usize,
) -> Result<ImportSection, ParseError> {
    let package = package.ok_or_else(|| ParseError::new(line_no, "missing package clause"))?;
    Ok(ImportSection {
        package,
        imports,
        body_start,
    })
}

/// Parse `[name] "path" [// comment]`; `spec` is a subslice of `raw`.
fn parse_spec(
    raw: &str,
    spec: &str,
    line_start: usize,
    line_no: usize,
) -> Result<ImportEdge, ParseError> {
    let spec = spec.trim_end();

    let (alias, quoted) = match spec.chars().next() {
        Some('"') | Some('`') => (None, spec),
        Some(_) => {
            let name: String = spec
                .chars()
                .take_while(|c| is_ident_char(*c) || *c == '.')
                .collect();
            if name.is_empty() {
                return Err(ParseError::new(
                    line_no,
                    format!("invalid import spec: {spec}"),
                ));
            }
            let quoted = spec[name.len()..].trim_start();
            (Some(name), quoted)
        }
        None => return Err(ParseError::new(line_no, "empty import spec")),
    };

    let quote = quoted
        .chars()
        .next()
        .filter(|c| *c == '"' || *c == '`')
        .ok_or_else(|| ParseError::new(line_no, format!("import path is not quoted: {spec}")))?;
    let inner = &quoted[1..];
    let close = inner
        .find(quote)
        .ok_or_else(|| ParseError::new(line_no, format!("unterminated import path: {spec}")))?;
    if !is_trivia(&inner[close + 1..]) {
        return Err(ParseError::new(
            line_no,
            format!("unexpected text after import path: {spec}"),
        ));
    }

    let path = inner[..close].to_string();
    let path_start = line_start + offset_in(raw, inner);

    Ok(ImportEdge {
        alias,
        path_span: path_start..path_start + path.len(),
        path,
        line: line_no,
        line_span: line_start..line_start + raw.len(),
    })
}

/// Byte offset of `inner` within `outer`; `inner` must be a subslice.
fn offset_in(outer: &str, inner: &str) -> usize {
    inner.as_ptr() as usize - outer.as_ptr() as usize
}

/// `text` with `kw` followed by whitespace or `(` stripped, trimmed at the start.
fn keyword<'a>(text: &'a str, kw: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(kw)?;
    match rest.chars().next() {
        Some(c) if c.is_whitespace() => Some(rest.trim_start()),
        Some('(') => Some(rest),
        _ => None,
    }
}

/// Whitespace, or a trailing line comment.
fn is_trivia(text: &str) -> bool {
    let t = text.trim();
    t.is_empty() || t.starts_with("//")
}

pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
