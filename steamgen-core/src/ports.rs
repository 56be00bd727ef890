//! Port traits abstracting all I/O away from the pipeline.

use camino::Utf8Path;

/// One external tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolInvocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// The command line as it would be typed.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// What a finished tool reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub status: Option<i32>,
    pub success: bool,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    /// Both captured streams, lossily decoded, stdout first.
    pub fn combined(&self) -> String {
        let mut out = String::from_utf8_lossy(&self.stdout).into_owned();
        if !self.stderr.is_empty() {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&String::from_utf8_lossy(&self.stderr));
        }
        out
    }
}

/// Runs external tools to completion.
///
/// A tool that cannot be started is an `Err`. A tool that runs and exits
/// non-zero is an `Ok` with `success == false`.
pub trait ToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> anyhow::Result<ToolOutput>;
}

/// File-system operations the pipelines perform.
pub trait FilePort {
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
    fn read_file(&self, path: &Utf8Path) -> anyhow::Result<Vec<u8>>;
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    /// Move `from` onto `to`, removing a stale `to` first.
    fn replace_file(&self, from: &Utf8Path, to: &Utf8Path) -> anyhow::Result<()>;
    fn remove_file(&self, path: &Utf8Path) -> anyhow::Result<()>;
    fn remove_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
    fn exists(&self, path: &Utf8Path) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_joins_with_spaces() {
        let inv = ToolInvocation::new("protoc", ["-I=Protobufs", "--go_out=out/", "a.proto"]);
        assert_eq!(inv.command_line(), "protoc -I=Protobufs --go_out=out/ a.proto");
        assert_eq!(inv.args.len(), 3);
    }

    #[test]
    fn combined_output_separates_streams() {
        let out = ToolOutput {
            status: Some(1),
            success: false,
            stdout: b"partial".to_vec(),
            stderr: b"a.proto:3:1: Expected \";\".\n".to_vec(),
        };
        assert_eq!(out.combined(), "partial\na.proto:3:1: Expected \";\".\n");
    }
}
