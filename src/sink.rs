use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::segments::SegmentKind;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination for carved segments. One uniquely named artifact per call;
/// failures surface as errors rather than being swallowed.
pub trait SegmentSink: Send + Sync {
    /// Persist one segment and return the artifact path relative to the run
    /// output directory.
    fn persist(&self, offset: u64, bytes: &[u8], kind: SegmentKind) -> Result<String, SinkError>;
}

pub fn sanitize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_ascii_lowercase()
}

/// Writes each segment as `carved/{offset:012X}.{ext}` under the run output
/// directory, extension chosen by segment kind.
pub struct DirectorySink {
    root: PathBuf,
    bmp_extension: String,
    other_extension: String,
}

impl DirectorySink {
    pub fn new(root: &Path, bmp_extension: &str, other_extension: &str) -> Self {
        Self {
            root: root.to_path_buf(),
            bmp_extension: sanitize_extension(bmp_extension),
            other_extension: sanitize_extension(other_extension),
        }
    }

    fn extension_for(&self, kind: SegmentKind) -> &str {
        match kind {
            SegmentKind::Image => &self.bmp_extension,
            SegmentKind::Other => &self.other_extension,
        }
    }
}

impl SegmentSink for DirectorySink {
    fn persist(&self, offset: u64, bytes: &[u8], kind: SegmentKind) -> Result<String, SinkError> {
        let dir = self.root.join("carved");
        fs::create_dir_all(&dir)?;
        let filename = format!("{:012X}.{}", offset, self.extension_for(kind));
        fs::write(dir.join(&filename), bytes)?;
        Ok(format!("carved/{filename}"))
    }
}
