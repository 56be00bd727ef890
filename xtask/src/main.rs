use anyhow::Context;
use clap::{Parser, Subcommand};
use fs_err as fs;
use std::process::Command as ProcessCommand;

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "Workspace helper tasks")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the report schema identifier written by `steamgen --report`.
    PrintSchemas,
    /// Create an empty generator layout (Protobufs/<group> and the protocol output dirs).
    InitLayout {
        #[arg(long, default_value = ".")]
        root: String,
        #[arg(long, default_value = "../protocol")]
        protocol_root: String,
    },
    /// Bless golden fixtures (overwrite expected outputs).
    BlessFixtures,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::PrintSchemas => {
            println!("{}", steamgen_core::report::REPORT_SCHEMA);
        }
        Command::InitLayout {
            root,
            protocol_root,
        } => {
            for group in steamgen_catalog::CATALOG {
                let source = format!("{root}/Protobufs/{}", group.source_subdir);
                fs::create_dir_all(&source).with_context(|| format!("create {source}"))?;
                let out = format!("{root}/{protocol_root}/{}", group.output_dir);
                fs::create_dir_all(&out).with_context(|| format!("create {out}"))?;
            }
            fs::create_dir_all(format!("{root}/{protocol_root}/steamlang"))?;
            println!("initialized {root}/Protobufs and {root}/{protocol_root}");
        }
        Command::BlessFixtures => {
            let status = ProcessCommand::new("cargo")
                .args(["test", "-p", "steamgen-rewrite", "--test", "golden_fixtures"])
                .env("STEAMGEN_BLESS", "1")
                .status()
                .context("run golden fixture blessing")?;
            if !status.success() {
                anyhow::bail!("bless-fixtures failed");
            }
        }
    }
    Ok(())
}
