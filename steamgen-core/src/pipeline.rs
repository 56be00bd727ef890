//! Protobuf generation pipeline.
//!
//! Every selected schema is compiled, moved onto its target and rewritten,
//! strictly in catalog order. The first failure aborts the run; files
//! generated before it stay on disk.

use crate::error::GenerateError;
use crate::ports::{FilePort, ToolInvocation, ToolRunner};
use crate::report::{GeneratedFile, GenerationReport, sha256_hex};
use crate::settings::GenerateSettings;
use camino::{Utf8Path, Utf8PathBuf};
use steamgen_catalog::{IMPORT_ROOT, SchemaGroup, select_groups, validate};
use tracing::{debug, info};

/// One schema compilation, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    pub group: &'static str,
    pub source_subdir: &'static str,
    pub schema: &'static str,
    pub target: Utf8PathBuf,
    /// Rendered compiler options shared by the group.
    pub options: Vec<String>,
}

impl GenerationJob {
    /// Per-job output directory: the target's parent.
    pub fn out_dir(&self) -> &Utf8Path {
        self.target.parent().unwrap_or(Utf8Path::new("."))
    }

    /// Where `protoc-gen-go` writes its output for this job.
    ///
    /// The generator nests output under the mapped import path, which ends
    /// with the schema file name itself.
    pub fn compiler_output(&self) -> Utf8PathBuf {
        let file = self.schema.replacen(".proto", ".pb.go", 1);
        self.out_dir()
            .join(IMPORT_ROOT)
            .join(self.source_subdir)
            .join(self.schema)
            .join(file)
    }

    /// The intermediate tree removed after the job finishes.
    pub fn scratch_dir(&self) -> Utf8PathBuf {
        self.out_dir().join(IMPORT_ROOT)
    }
}

/// Resolve the selected groups into jobs, checking target uniqueness before
/// anything runs.
pub fn plan_jobs(settings: &GenerateSettings) -> Result<Vec<GenerationJob>, GenerateError> {
    let groups = select_groups(&settings.groups)?;
    validate(&groups)?;

    let protocol_dir = settings.protocol_dir();
    let mut jobs = Vec::new();
    for group in groups {
        jobs.extend(group_jobs(group, &protocol_dir));
    }
    Ok(jobs)
}

fn group_jobs(group: &'static SchemaGroup, protocol_dir: &Utf8Path) -> Vec<GenerationJob> {
    let options: Vec<String> = group.resolve_options().iter().map(|o| o.render()).collect();
    let out_dir = protocol_dir.join(group.output_dir);
    group
        .files
        .iter()
        .map(|mapping| GenerationJob {
            group: group.name,
            source_subdir: group.source_subdir,
            schema: mapping.schema,
            target: out_dir.join(mapping.target),
            options: options.clone(),
        })
        .collect()
}

/// The compiler command for one job.
pub fn protoc_invocation(settings: &GenerateSettings, job: &GenerationJob) -> ToolInvocation {
    let base = settings.source_base_dir();
    let mut args = vec![
        format!("-I={base}"),
        format!("-I={base}/google"),
        format!("-I={base}/{}", job.source_subdir),
        format!("--go_out={}", job.out_dir()),
    ];
    args.extend(job.options.iter().cloned());
    args.push(job.schema.to_string());
    ToolInvocation::new(settings.tools.protoc.clone(), args)
}

/// Build every selected schema group.
pub fn generate_all(
    settings: &GenerateSettings,
    runner: &dyn ToolRunner,
    fs: &dyn FilePort,
) -> Result<GenerationReport, GenerateError> {
    info!("# Building Protobufs");
    let jobs = plan_jobs(settings)?;
    debug!(jobs = jobs.len(), "planned generation jobs");

    let mut report = GenerationReport::default();
    for job in &jobs {
        report.files.push(run_job(settings, job, runner, fs)?);
    }

    let scratch = settings.valve_extensions_schema();
    if fs.exists(&scratch)
        && let Err(e) = fs.remove_file(&scratch)
    {
        debug!(path = %scratch, error = %format!("{e:#}"), "could not remove scratch schema");
    }

    info!(files = report.files.len(), bytes = report.total_bytes(), "protobuf build finished");
    Ok(report)
}

/// Compile, move and rewrite one schema.
pub fn run_job(
    settings: &GenerateSettings,
    job: &GenerationJob,
    runner: &dyn ToolRunner,
    fs: &dyn FilePort,
) -> Result<GeneratedFile, GenerateError> {
    let out_dir = job.out_dir();
    fs.create_dir_all(out_dir)
        .map_err(|e| GenerateError::fs(out_dir, e))?;

    info!("# Building: {}", job.target);
    let invocation = protoc_invocation(settings, job);
    let output = runner
        .run(&invocation)
        .map_err(|source| GenerateError::ToolUnavailable {
            target: job.target.clone(),
            tool: invocation.program.clone(),
            source,
        })?;
    if !output.success {
        return Err(GenerateError::ToolInvocation {
            target: job.target.clone(),
            tool: invocation.program,
            args: invocation.args,
            status: output.status,
            output: output.combined(),
        });
    }

    let generated = job.compiler_output();
    fs.replace_file(&generated, &job.target)
        .map_err(|e| GenerateError::fs(&generated, e))?;

    let bytes = fs
        .read_file(&job.target)
        .map_err(|e| GenerateError::fs(&job.target, e))?;
    let source = String::from_utf8(bytes).map_err(|e| {
        GenerateError::fs(&job.target, anyhow::Error::new(e).context("generated file is not UTF-8"))
    })?;
    let rewritten = steamgen_rewrite::rewrite(&source, &job.target, &settings.rewrite).map_err(
        |source| GenerateError::Rewrite {
            target: job.target.clone(),
            source,
        },
    )?;
    fs.write_file(&job.target, rewritten.text.as_bytes())
        .map_err(|e| GenerateError::fs(&job.target, e))?;

    let scratch = job.scratch_dir();
    fs.remove_dir_all(&scratch)
        .map_err(|e| GenerateError::fs(&scratch, e))?;

    Ok(GeneratedFile {
        group: job.group.to_string(),
        schema: job.schema.to_string(),
        target: job.target.clone(),
        bytes: rewritten.text.len() as u64,
        sha256: sha256_hex(rewritten.text.as_bytes()),
        removed_imports: rewritten.removed_imports.len() as u64,
        renamed_symbols: rewritten.renamed_symbols as u64,
    })
}
