mod config;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Parser;
use config::ConfigMerger;
use std::process::ExitCode;
use steamgen_core::adapters::{FsFilePort, ShellToolRunner};
use steamgen_core::ports::FilePort;
use steamgen_core::{GenerateError, GenerateSettings, clean, pipeline, steamlang};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

const INVALID_TARGET: &str = "Invalid target!\nAvailable targets: clean, proto, steamlang";

#[derive(Debug, Parser)]
#[command(
    name = "steamgen",
    version,
    about = "Regenerates the go-steam protobuf and Steam language sources."
)]
struct Cli {
    /// Verbs to run: any of `clean`, `steamlang`, `proto`.
    targets: Vec<String>,

    /// Working root; relative layout paths are resolved against it.
    #[arg(long, default_value = ".", env = "STEAMGEN_ROOT")]
    root: Utf8PathBuf,

    /// Config file (default: <root>/steamgen.toml).
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    /// Only build these schema groups (repeatable). Default: all.
    #[arg(long = "group")]
    groups: Vec<String>,

    /// Print each external command before running it.
    #[arg(long, default_value_t = false)]
    print_commands: bool,

    /// Write the generation report as JSON to this file.
    #[arg(long)]
    report: Option<Utf8PathBuf>,

    /// List the schema groups and exit.
    #[arg(long, default_value_t = false)]
    list_groups: bool,
}

/// Verbs selected by the joined target string, in execution order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Verbs {
    clean: bool,
    steamlang: bool,
    proto: bool,
}

impl Verbs {
    fn from_targets(targets: &[String]) -> Self {
        let joined = targets.join(" ");
        Self {
            clean: joined.contains("clean"),
            steamlang: joined.contains("steamlang"),
            proto: joined.contains("proto"),
        }
    }

    fn any(&self) -> bool {
        self.clean || self.steamlang || self.proto
    }
}

fn main() -> ExitCode {
    match real_main() {
        Ok(code) => code,
        Err(e) => {
            error!("{:?}", e);
            let code = e
                .downcast_ref::<GenerateError>()
                .map(GenerateError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn real_main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.list_groups {
        cmd_list_groups();
        return Ok(ExitCode::SUCCESS);
    }

    let verbs = Verbs::from_targets(&cli.targets);
    if !verbs.any() {
        eprintln!("{INVALID_TARGET}");
        return Ok(ExitCode::from(1));
    }

    let config = config::load_or_default(&cli.root, cli.config.as_deref())?;
    let settings = ConfigMerger::new(config).merge(&cli.root, &cli.groups, cli.print_commands);
    debug!(?settings, ?verbs, "resolved settings");

    run_verbs(verbs, &settings, cli.report.as_ref())?;
    Ok(ExitCode::SUCCESS)
}

fn run_verbs(
    verbs: Verbs,
    settings: &GenerateSettings,
    report_path: Option<&Utf8PathBuf>,
) -> anyhow::Result<()> {
    let runner = ShellToolRunner::new(settings.print_commands);
    let fs = FsFilePort;

    if verbs.clean {
        let removed = clean::clean(settings, &fs)?;
        info!(removed = removed.len(), "clean finished");
    }

    if verbs.steamlang {
        steamlang::build_steam_language(settings, &runner, &fs)?;
    }

    if verbs.proto {
        let report = pipeline::generate_all(settings, &runner, &fs)?;
        if let Some(path) = report_path {
            let json = report.to_json().context("serialize generation report")?;
            fs.write_file(path, json.as_bytes())
                .with_context(|| format!("write report {}", path))?;
            info!("wrote report to {}", path);
        }
    }

    Ok(())
}

fn cmd_list_groups() {
    println!("{:<22} {:<28} FILES", "GROUP", "OUTPUT");
    for name in steamgen_catalog::group_names() {
        if let Some(group) = steamgen_catalog::lookup_group(name) {
            println!(
                "{:<22} {:<28} {}",
                group.name,
                group.output_dir,
                group.files.len()
            );
        }
    }
}
