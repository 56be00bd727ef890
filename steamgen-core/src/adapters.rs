//! Default process- and filesystem-backed port implementations.

use crate::ports::{FilePort, ToolInvocation, ToolOutput, ToolRunner};
use anyhow::Context;
use camino::Utf8Path;
use fs_err as fs;
use std::io::{self, Read, Write};
use std::process::{Command, Stdio};
use std::thread;
use tracing::{debug, info};

/// Writer decorator that prefixes every line with `"> "`.
///
/// The prefix is written lazily before the first byte of each line, so output
/// ending in a newline leaves no dangling prefix.
#[derive(Debug)]
pub struct QuotedWriter<W: Write> {
    inner: W,
    at_line_start: bool,
}

impl<W: Write> QuotedWriter<W> {
    pub const PREFIX: &'static [u8] = b"> ";

    pub fn new(inner: W) -> Self {
        Self {
            inner,
            at_line_start: true,
        }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for QuotedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for line in buf.split_inclusive(|b| *b == b'\n') {
            if self.at_line_start {
                self.inner.write_all(Self::PREFIX)?;
            }
            self.inner.write_all(line)?;
            self.at_line_start = line.ends_with(b"\n");
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Runs tools as child processes, quoting their output to this process's
/// stdout/stderr while capturing it.
#[derive(Debug, Clone)]
pub struct ShellToolRunner {
    /// Log each command line before it runs.
    pub print_commands: bool,
    /// Forward the child's output to this process's streams.
    pub echo: bool,
}

impl Default for ShellToolRunner {
    fn default() -> Self {
        Self {
            print_commands: false,
            echo: true,
        }
    }
}

impl ShellToolRunner {
    pub fn new(print_commands: bool) -> Self {
        Self {
            print_commands,
            ..Self::default()
        }
    }
}

impl ToolRunner for ShellToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> anyhow::Result<ToolOutput> {
        if self.print_commands {
            info!("{}", invocation.command_line());
        }

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawn {}", invocation.program))?;
        let stdout = child.stdout.take().context("child stdout not captured")?;
        let stderr = child.stderr.take().context("child stderr not captured")?;
        let echo = self.echo;

        // Both pipes are drained concurrently so neither can fill up and block the child.
        let (stdout, stderr) = thread::scope(|s| {
            let out = s.spawn(move || pump(stdout, echo.then(|| QuotedWriter::new(io::stdout()))));
            let err = s.spawn(move || pump(stderr, echo.then(|| QuotedWriter::new(io::stderr()))));
            (join_pump(out), join_pump(err))
        });
        let stdout = stdout.with_context(|| format!("read stdout of {}", invocation.program))?;
        let stderr = stderr.with_context(|| format!("read stderr of {}", invocation.program))?;

        let status = child
            .wait()
            .with_context(|| format!("wait for {}", invocation.program))?;
        debug!(
            program = %invocation.program,
            status = ?status.code(),
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "tool finished"
        );

        Ok(ToolOutput {
            status: status.code(),
            success: status.success(),
            stdout,
            stderr,
        })
    }
}

/// Copy `source` to `echo` (if any) and return everything read.
fn pump<R: Read, W: Write>(mut source: R, mut echo: Option<W>) -> io::Result<Vec<u8>> {
    let mut captured = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = match source.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        captured.extend_from_slice(&buf[..n]);
        if let Some(w) = echo.as_mut() {
            // Echo is best effort; the captured copy is what gets reported.
            let _ = w.write_all(&buf[..n]).and_then(|()| w.flush());
        }
    }
    Ok(captured)
}

fn join_pump(handle: thread::ScopedJoinHandle<'_, io::Result<Vec<u8>>>) -> io::Result<Vec<u8>> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("output pump panicked")))
}

/// Filesystem operations via `fs-err`.
#[derive(Debug, Clone, Default)]
pub struct FsFilePort;

impl FilePort for FsFilePort {
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }

    fn read_file(&self, path: &Utf8Path) -> anyhow::Result<Vec<u8>> {
        fs::read(path).with_context(|| format!("read {}", path))
    }

    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn replace_file(&self, from: &Utf8Path, to: &Utf8Path) -> anyhow::Result<()> {
        if from != to {
            match fs::remove_file(to) {
                Ok(()) => debug!(path = %to, "removed stale target"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e).with_context(|| format!("remove stale {}", to)),
            }
        }
        fs::rename(from, to).with_context(|| format!("move {} to {}", from, to))
    }

    fn remove_file(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::remove_file(path).with_context(|| format!("remove {}", path))
    }

    fn remove_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        match fs::remove_dir_all(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove_dir_all {}", path)),
        }
    }

    fn exists(&self, path: &Utf8Path) -> bool {
        path.exists()
    }
}
