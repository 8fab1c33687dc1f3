use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum MetadataBackend {
    Jsonl,
    Csv,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum DigestArg {
    Md5,
    Sha256,
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CliOptions {
    /// Input evidence image (raw dump or any binary blob)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output directory for carved segments and metadata
    #[arg(short, long, default_value = "./output")]
    pub output: PathBuf,

    /// Optional path to config file (YAML)
    #[arg(long)]
    pub config_path: Option<PathBuf>,

    /// Number of worker threads for header validation
    #[arg(long, default_value_t = num_cpus::get())]
    pub workers: usize,

    /// Metadata backend
    #[arg(long, value_enum, default_value_t = MetadataBackend::Jsonl)]
    pub metadata_backend: MetadataBackend,

    /// Override the configured fragment digest algorithm
    #[arg(long, value_enum)]
    pub digest: Option<DigestArg>,
}

pub fn parse() -> CliOptions {
    CliOptions::parse()
}
