use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use mf_flatiron::{flatiron, FlatironOptions};
use mf_pipeline::{merge_fn, BuildConfiguration, BuildReport, CallbackError, MergeFiles, MergeOptions};
use mf_types::{Blob, File, MergeOutput, OutputFile};
use serde::Deserialize;
use tracing::debug;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Build(args) => cmd_build(args, cli.format).await,
    }
}

// ---------------------------------------------------------------------------
// Config file
// ---------------------------------------------------------------------------

/// Contents of the `--config` TOML file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub merge: MergeOptions,
    pub mode: Option<Mode>,
    pub separator: Option<String>,
    pub flatiron: FlatironOptions,
}

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }
}

/// Everything `build` needs after the config file and flags are combined.
#[derive(Debug)]
pub struct Resolved {
    pub options: MergeOptions,
    pub mode: Mode,
    pub separator: String,
    pub flatiron: FlatironOptions,
}

/// Apply command-line flags on top of the config file. Flags win.
pub fn resolve(args: &BuildArgs, file: FileConfig) -> anyhow::Result<Resolved> {
    let FileConfig {
        mut merge,
        mode,
        separator,
        mut flatiron,
    } = file;

    if !args.patterns.is_empty() {
        merge.patterns = args.patterns.clone();
    }
    if let Some(duplicates) = args.duplicates {
        merge.duplicates = duplicates;
    }
    if args.no_sort {
        merge.sort = false;
    }
    if let Some(encoding) = args.encoding {
        merge.encoding = encoding;
    }
    if args.dot {
        merge.glob.dot = true;
    }
    if let Some(name) = &args.output_file {
        merge.output_file_name = Some(name.clone());
    }
    if let Some(annotation) = &args.annotation {
        merge.annotation = Some(annotation.clone());
    }
    if args.trim_extensions {
        flatiron.trim_extensions = true;
    }
    if let Some(prefix) = &args.prefix {
        flatiron.prefix = prefix.clone();
    }
    if let Some(suffix) = &args.suffix {
        flatiron.suffix = suffix.clone();
    }

    let mode = args.mode.or(mode).unwrap_or(Mode::Concat);
    match mode {
        Mode::Copy => {
            if let Some(name) = &merge.output_file_name {
                bail!("copy mode writes many files, but an output file name ('{name}') was given");
            }
        }
        Mode::Concat | Mode::Json | Mode::Flatiron => {
            if merge.output_file_name.is_none() {
                merge.output_file_name = Some(default_file_name(mode).to_string());
            }
        }
    }

    Ok(Resolved {
        options: merge,
        mode,
        separator: args.separator.clone().or(separator).unwrap_or_else(|| "\n".to_string()),
        flatiron,
    })
}

fn default_file_name(mode: Mode) -> &'static str {
    match mode {
        Mode::Concat => "merged.txt",
        Mode::Json => "merged.json",
        Mode::Flatiron => "merged.js",
        Mode::Copy => "",
    }
}

// ---------------------------------------------------------------------------
// Built-in merges
// ---------------------------------------------------------------------------

/// Run one of the built-in merges over the deduplicated files.
pub fn builtin_merge(
    mode: Mode,
    separator: &str,
    options: &FlatironOptions,
    files: Vec<File>,
) -> Result<MergeOutput, CallbackError> {
    Ok(match mode {
        Mode::Concat => MergeOutput::Single(concat(files, separator)),
        Mode::Json => MergeOutput::from(serde_json::to_string(&files)?),
        Mode::Flatiron => MergeOutput::from(flatiron(&files, options)?),
        Mode::Copy => MergeOutput::Multiple(
            files
                .into_iter()
                .map(|file| OutputFile::new(file.path, file.content.into_blob()))
                .collect(),
        ),
    })
}

/// Join contents with `separator`. Stays text unless some file is binary.
fn concat(files: Vec<File>, separator: &str) -> Blob {
    let blobs: Vec<Blob> = files.into_iter().map(|f| f.content.into_blob()).collect();
    if blobs.iter().all(|b| matches!(b, Blob::Text(_))) {
        let texts: Vec<String> = blobs
            .into_iter()
            .filter_map(|b| match b {
                Blob::Text(text) => Some(text),
                Blob::Binary(_) => None,
            })
            .collect();
        return Blob::Text(texts.join(separator));
    }

    let mut bytes = Vec::new();
    for (i, blob) in blobs.iter().enumerate() {
        if i > 0 {
            bytes.extend_from_slice(separator.as_bytes());
        }
        match blob {
            Blob::Text(text) => bytes.extend_from_slice(text.as_bytes()),
            Blob::Binary(raw) => bytes.extend_from_slice(raw),
        }
    }
    Blob::from(bytes)
}

// ---------------------------------------------------------------------------
// build
// ---------------------------------------------------------------------------

/// Refuse to replace a non-empty output directory unless `clean` is set.
fn ensure_replaceable(output: &Path, clean: bool) -> anyhow::Result<()> {
    match std::fs::read_dir(output) {
        Ok(mut entries) => {
            if entries.next().is_some() && !clean {
                bail!(
                    "output directory {} is not empty; pass --clean to replace its contents",
                    output.display()
                );
            }
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("inspecting output directory {}", output.display()))
        }
    }
    Ok(())
}

async fn cmd_build(args: BuildArgs, format: OutputFormat) -> anyhow::Result<()> {
    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let resolved = resolve(&args, file)?;
    debug!(?resolved, "resolved build options");

    ensure_replaceable(&args.output, args.clean)?;

    let Resolved {
        options,
        mode,
        separator,
        flatiron: flatiron_options,
    } = resolved;
    let config = BuildConfiguration::builder()
        .options(options)
        .merge(merge_fn(move |files| builtin_merge(mode, &separator, &flatiron_options, files)))
        .build()
        .context("invalid configuration")?;

    let merge = MergeFiles::new(args.inputs.clone(), &args.output, config).context("invalid inputs")?;
    let report = merge.build().await.context("build failed")?;
    print_report(&report, merge.roots().len(), &args.output, format)
}

fn print_report(
    report: &BuildReport,
    roots: usize,
    output: &Path,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            println!(
                "{} Merged {} files ({} entries) from {} roots into {}",
                "✓".green().bold(),
                report.files.to_string().bold(),
                report.entries,
                roots,
                output.display().to_string().bold()
            );
            for path in &report.written {
                let shown = path.strip_prefix(output).unwrap_or(path);
                println!("  {} {}", "wrote:".green(), shown.display());
            }
            println!("  Digest: {}", report.digest_hex().cyan());
            println!("  Elapsed: {}ms", report.elapsed.as_millis());
        }
    }
    Ok(())
}
