use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mf_types::{DuplicateStrategy, Encoding};

#[derive(Parser)]
#[command(
    name = "mergefiles",
    about = "Merge files from several directories into one output",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge the input directories into the output directory
    Build(BuildArgs),
}

/// Built-in merge callbacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Join every file's contents with a separator
    Concat,
    /// JSON array of [path, contents] pairs
    Json,
    /// Nested mapping of path segments, wrapped in a prefix and suffix
    Flatiron,
    /// Write every file to the output unchanged
    Copy,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Input directories, highest priority last
    pub inputs: Vec<PathBuf>,
    #[arg(short, long)]
    pub output: PathBuf,
    /// TOML file with `[merge]`, `mode`, `separator`, and `[flatiron]` settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Glob pattern; repeatable, `!` prefix excludes
    #[arg(short, long = "pattern")]
    pub patterns: Vec<String>,
    #[arg(short, long)]
    pub duplicates: Option<DuplicateStrategy>,
    /// Keep completion order instead of sorting by root and path
    #[arg(long)]
    pub no_sort: bool,
    #[arg(short, long)]
    pub encoding: Option<Encoding>,
    /// Include dot files and directories
    #[arg(long)]
    pub dot: bool,
    /// Name of the single output file
    #[arg(long)]
    pub output_file: Option<String>,
    #[arg(short, long)]
    pub mode: Option<Mode>,
    /// Separator for the concat mode
    #[arg(long)]
    pub separator: Option<String>,
    /// Flatiron: drop file extensions from keys
    #[arg(long)]
    pub trim_extensions: bool,
    /// Flatiron: text before the JSON
    #[arg(long)]
    pub prefix: Option<String>,
    /// Flatiron: text after the JSON
    #[arg(long)]
    pub suffix: Option<String>,
    /// Label shown in logs
    #[arg(long)]
    pub annotation: Option<String>,
    /// Allow replacing a non-empty output directory
    #[arg(long)]
    pub clean: bool,
}
