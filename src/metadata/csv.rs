use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;

use crate::metadata::{MetadataError, MetadataSink, RunSummary, SegmentRecord};

pub struct CsvSink {
    tool_version: String,
    config_hash: String,
    evidence_path: String,
    meta_dir: PathBuf,
    writer: Mutex<::csv::Writer<File>>,
}

#[derive(Serialize)]
struct SegmentRow<'a> {
    run_id: &'a str,
    kind: &'a str,
    global_start: u64,
    global_end: u64,
    size: u64,
    digest: &'a str,
    path: &'a str,
    tool_version: &'a str,
    config_hash: &'a str,
    evidence_path: &'a str,
}

impl CsvSink {
    pub fn new(
        tool_version: &str,
        config_hash: &str,
        evidence_path: &Path,
        run_output_dir: &Path,
    ) -> Result<Self, MetadataError> {
        let meta_dir = run_output_dir.join("metadata");
        std::fs::create_dir_all(&meta_dir)?;
        let file = File::create(meta_dir.join("carved_segments.csv"))?;
        Ok(Self {
            tool_version: tool_version.to_string(),
            config_hash: config_hash.to_string(),
            evidence_path: evidence_path.to_string_lossy().to_string(),
            meta_dir,
            writer: Mutex::new(::csv::Writer::from_writer(file)),
        })
    }
}

impl MetadataSink for CsvSink {
    fn record_segment(&self, record: &SegmentRecord) -> Result<(), MetadataError> {
        let row = SegmentRow {
            run_id: &record.run_id,
            kind: &record.kind,
            global_start: record.global_start,
            global_end: record.global_end,
            size: record.size,
            digest: &record.digest,
            path: &record.path,
            tool_version: &self.tool_version,
            config_hash: &self.config_hash,
            evidence_path: &self.evidence_path,
        };
        let mut guard = self.writer.lock().unwrap();
        guard.serialize(row)?;
        Ok(())
    }

    fn record_run_summary(&self, summary: &RunSummary) -> Result<(), MetadataError> {
        let file = File::create(self.meta_dir.join("run_summary.json"))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, summary)?;
        writer.flush()?;
        Ok(())
    }

    fn flush(&self) -> Result<(), MetadataError> {
        let mut guard = self.writer.lock().unwrap();
        guard.flush()?;
        Ok(())
    }
}
