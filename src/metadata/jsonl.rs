use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;

use crate::metadata::{MetadataError, MetadataSink, RunSummary, SegmentRecord};

pub struct JsonlSink {
    tool_version: String,
    config_hash: String,
    evidence_path: String,
    meta_dir: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

#[derive(Serialize)]
struct SegmentLine<'a> {
    #[serde(flatten)]
    segment: &'a SegmentRecord,
    tool_version: &'a str,
    config_hash: &'a str,
    evidence_path: &'a str,
}

impl JsonlSink {
    pub fn new(
        tool_version: &str,
        config_hash: &str,
        evidence_path: &Path,
        run_output_dir: &Path,
    ) -> Result<Self, MetadataError> {
        let meta_dir = run_output_dir.join("metadata");
        std::fs::create_dir_all(&meta_dir)?;
        let file = File::create(meta_dir.join("carved_segments.jsonl"))?;
        Ok(Self {
            tool_version: tool_version.to_string(),
            config_hash: config_hash.to_string(),
            evidence_path: evidence_path.to_string_lossy().to_string(),
            meta_dir,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }
}

impl MetadataSink for JsonlSink {
    fn record_segment(&self, record: &SegmentRecord) -> Result<(), MetadataError> {
        let line = SegmentLine {
            segment: record,
            tool_version: &self.tool_version,
            config_hash: &self.config_hash,
            evidence_path: &self.evidence_path,
        };
        let mut guard = self.writer.lock().unwrap();
        serde_json::to_writer(&mut *guard, &line)?;
        guard.write_all(b"\n")?;
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
