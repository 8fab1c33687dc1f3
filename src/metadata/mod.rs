pub mod csv;
pub mod jsonl;

use std::path::Path;

use thiserror::Error;

/// One row per emitted segment, image and interstitial alike.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SegmentRecord {
    pub run_id: String,
    pub kind: String,
    pub global_start: u64,
    pub global_end: u64,
    pub size: u64,
    pub digest: String,
    pub path: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub evidence_len: u64,
    pub candidates_seen: u64,
    pub headers_parsed: u64,
    pub regions_validated: u64,
    pub image_segments: u64,
    pub other_segments: u64,
    pub bytes_emitted: u64,
}

#[derive(Debug, Clone, Copy)]
pub enum MetadataBackendKind {
    Jsonl,
    Csv,
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub trait MetadataSink: Send + Sync {
    fn record_segment(&self, record: &SegmentRecord) -> Result<(), MetadataError>;
    fn record_run_summary(&self, summary: &RunSummary) -> Result<(), MetadataError>;
    fn flush(&self) -> Result<(), MetadataError>;
}

pub fn build_sink(
    backend: MetadataBackendKind,
    tool_version: &str,
    config_hash: &str,
    evidence_path: &Path,
    run_output_dir: &Path,
) -> Result<Box<dyn MetadataSink>, MetadataError> {
    match backend {
        MetadataBackendKind::Jsonl => Ok(Box::new(jsonl::JsonlSink::new(
            tool_version,
            config_hash,
            evidence_path,
            run_output_dir,
        )?)),
        MetadataBackendKind::Csv => Ok(Box::new(csv::CsvSink::new(
            tool_version,
            config_hash,
            evidence_path,
            run_output_dir,
        )?)),
    }
}
