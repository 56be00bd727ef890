//! Steam language generation: runs the .NET generator, then `gofmt`.

use crate::clean::STEAMLANG_OUTPUTS;
use crate::error::GenerateError;
use crate::ports::{FilePort, ToolInvocation, ToolRunner};
use crate::settings::GenerateSettings;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::info;

pub fn generator_invocation(settings: &GenerateSettings) -> ToolInvocation {
    ToolInvocation::new(
        settings.tools.dotnet.clone(),
        [
            "run".to_string(),
            "-c".to_string(),
            "release".to_string(),
            "-p".to_string(),
            settings.resolve(&settings.steamlang_generator).to_string(),
            settings.resolve(&settings.steamkit).to_string(),
            settings.steamlang_dir().to_string(),
        ],
    )
}

pub fn gofmt_invocation(settings: &GenerateSettings) -> ToolInvocation {
    let dir = settings.steamlang_dir();
    let mut args = vec!["-w".to_string()];
    args.extend(STEAMLANG_OUTPUTS.iter().map(|name| dir.join(name).to_string()));
    ToolInvocation::new(settings.tools.gofmt.clone(), args)
}

/// Generate `enums.go` and `messages.go` into `<protocol_root>/steamlang`.
pub fn build_steam_language(
    settings: &GenerateSettings,
    runner: &dyn ToolRunner,
    fs: &dyn FilePort,
) -> Result<Vec<Utf8PathBuf>, GenerateError> {
    info!("# Building Steam Language");
    let out_dir = settings.steamlang_dir();
    fs.create_dir_all(&out_dir)
        .map_err(|e| GenerateError::fs(&out_dir, e))?;

    for invocation in [generator_invocation(settings), gofmt_invocation(settings)] {
        run_checked(runner, invocation, &out_dir)?;
    }

    Ok(STEAMLANG_OUTPUTS.iter().map(|name| out_dir.join(name)).collect())
}

fn run_checked(
    runner: &dyn ToolRunner,
    invocation: ToolInvocation,
    target: &Utf8Path,
) -> Result<(), GenerateError> {
    let output = runner
        .run(&invocation)
        .map_err(|source| GenerateError::ToolUnavailable {
            target: target.to_path_buf(),
            tool: invocation.program.clone(),
            source,
        })?;
    if output.success {
        return Ok(());
    }
    Err(GenerateError::ToolInvocation {
        target: target.to_path_buf(),
        tool: invocation.program,
        args: invocation.args,
        status: output.status,
        output: output.combined(),
    })
}
