//! Command implementations: transform and check

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use origami_core::{
    Config, DefaultFileDiscovery, Diagnostic, FileDiscovery, FileResult, TransformExecutor,
    render_json, render_report,
};
use tracing::info;

/// Expand explicit paths; with none given, discover from the working
/// directory. Directories go through the include/exclude gate, explicitly
/// named files are taken as-is.
fn resolve_inputs(paths: &[PathBuf], config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if paths.is_empty() {
        files = DefaultFileDiscovery::new(".").discover_files(config)?;
    } else {
        for path in paths {
            if path.is_dir() {
                files.extend(DefaultFileDiscovery::new(path).discover_files(config)?);
            } else if path.is_file() {
                files.push(path.clone());
            } else {
                bail!("no such file or directory: {}", path.display());
            }
        }
        files.sort();
        files.dedup();
    }
    Ok(files)
}

/// Mirror an input path below the output directory
fn output_path(file: &Path, out_dir: &Path) -> PathBuf {
    let relative = file
        .strip_prefix(".")
        .unwrap_or(file)
        .to_path_buf();
    if relative.is_absolute() {
        match relative.file_name() {
            Some(name) => out_dir.join(name),
            None => out_dir.to_path_buf(),
        }
    } else {
        out_dir.join(relative)
    }
}

pub fn transform(
    config: &Config,
    paths: &[PathBuf],
    out_dir: Option<&Path>,
    to_stdout: bool,
    sourcemap: bool,
    color: bool,
) -> anyhow::Result<ExitCode> {
    let files = resolve_inputs(paths, config)?;
    if files.is_empty() {
        info!("nothing to transform");
        return Ok(ExitCode::SUCCESS);
    }
    if to_stdout && files.len() != 1 {
        bail!("--stdout needs exactly one input file, got {}", files.len());
    }
    if !to_stdout && out_dir.is_none() {
        bail!("specify --out-dir (or --stdout for a single file)");
    }

    let emit_maps = sourcemap || config.transform.sourcemaps;
    let executor = TransformExecutor::new(config);
    let summary = executor.run(&files);

    let mut failed = false;
    for outcome in &summary.outcomes {
        match &outcome.result {
            FileResult::Failed { error, source } => {
                failed = true;
                eprint!("{}", render_report(error, &outcome.file, source, color));
            }
            FileResult::Unchanged => {
                if to_stdout {
                    let source = std::fs::read_to_string(&outcome.file)
                        .with_context(|| format!("reading {}", outcome.file.display()))?;
                    print!("{source}");
                } else if let Some(out_dir) = out_dir {
                    write_output(&outcome.file, out_dir, None)?;
                }
            }
            FileResult::Rewritten { text, map } => {
                if to_stdout {
                    print!("{text}");
                } else if let Some(out_dir) = out_dir {
                    let map_json = emit_maps
                        .then(|| serde_json::to_string(map))
                        .transpose()
                        .context("serializing position map")?;
                    write_output(&outcome.file, out_dir, Some((text, map_json)))?;
                }
            }
        }
    }

    eprintln!(
        "origami: {} rewritten, {} unchanged, {} failed",
        summary.rewritten_count(),
        summary.unchanged_count(),
        summary.failed_count()
    );
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Write one file's output below `out_dir`; `rewritten` is None for the
/// unchanged pass-through
fn write_output(
    file: &Path,
    out_dir: &Path,
    rewritten: Option<(&String, Option<String>)>,
) -> anyhow::Result<()> {
    let target = output_path(file, out_dir);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    match rewritten {
        Some((text, map_json)) => {
            std::fs::write(&target, text)
                .with_context(|| format!("writing {}", target.display()))?;
            if let Some(map_json) = map_json {
                let map_path = map_target(&target);
                std::fs::write(&map_path, map_json)
                    .with_context(|| format!("writing {}", map_path.display()))?;
            }
        }
        None => {
            std::fs::copy(file, &target)
                .with_context(|| format!("copying to {}", target.display()))?;
        }
    }
    Ok(())
}

fn map_target(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(".map");
    target.with_file_name(name)
}

pub fn check(
    config: &Config,
    paths: &[PathBuf],
    json: bool,
    color: bool,
) -> anyhow::Result<ExitCode> {
    let files = resolve_inputs(paths, config)?;
    let executor = TransformExecutor::new(config);
    let summary = executor.run(&files);

    if json {
        let diagnostics: Vec<Diagnostic> = summary
            .outcomes
            .iter()
            .filter_map(|outcome| match &outcome.result {
                FileResult::Failed { error, source } => {
                    Some(Diagnostic::from_error(error, &outcome.file, source))
                }
                _ => None,
            })
            .collect();
        println!("{}", render_json(&diagnostics));
    } else {
        for outcome in &summary.outcomes {
            if let FileResult::Failed { error, source } = &outcome.result {
                eprint!("{}", render_report(error, &outcome.file, source, color));
            }
        }
        eprintln!(
            "origami: checked {} files, {} would be rewritten, {} failed",
            summary.outcomes.len(),
            summary.rewritten_count(),
            summary.failed_count()
        );
    }

    Ok(if summary.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
