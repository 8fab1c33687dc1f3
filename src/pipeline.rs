//! # Carve Pipeline
//!
//! Composes scanning, header parsing, validation, ordering and segment
//! planning into the end-to-end run, handing each planned segment to the
//! sink, digest and metadata collaborators.

use crossbeam_channel::{bounded, unbounded};
use thiserror::Error;
use tracing::{debug, info};

use crate::digest::Fingerprint;
use crate::evidence::{ByteSource, EvidenceError};
use crate::header;
use crate::metadata::{MetadataError, MetadataSink, RunSummary, SegmentRecord};
use crate::regions;
use crate::scanner;
use crate::segments::{self, SegmentKind};
use crate::sink::{SegmentSink, SinkError};
use crate::validate::{self, ValidatedRegion};

#[derive(Debug, Clone)]
pub struct CarveOptions {
    pub run_id: String,
    /// Worker threads for candidate evaluation. Values above 1 fan the
    /// candidate list out; observable output is identical to a
    /// single-threaded run.
    pub workers: usize,
}

#[derive(Debug, Clone)]
pub struct CarveSummary {
    pub evidence_len: u64,
    pub candidates_seen: u64,
    pub headers_parsed: u64,
    pub regions_validated: u64,
    pub image_segments: u64,
    pub other_segments: u64,
    pub bytes_emitted: u64,
}

#[derive(Debug, Error)]
pub enum CarveError {
    /// Terminal outcome, not an internal failure: the buffer holds no
    /// carvable BMP region, so no segmentation is attempted.
    #[error("no BMP images found in evidence")]
    NoImagesFound,
    #[error("evidence error: {0}")]
    Evidence(#[from] EvidenceError),
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),
    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),
}

struct CandidateVerdict {
    index: usize,
    parsed: bool,
    region: Option<ValidatedRegion>,
}

fn evaluate_candidate(source: &ByteSource, offset: u64) -> (bool, Option<ValidatedRegion>) {
    let Some(record) = header::parse_header(source, offset) else {
        debug!("candidate at offset {offset} has no parsable header");
        return (false, None);
    };
    match validate::validate(&record, source.len()) {
        Ok(region) => (true, Some(region)),
        Err(err) => {
            debug!("candidate at offset {offset} rejected: {err}");
            (true, None)
        }
    }
}

fn evaluate_sequential(source: &ByteSource, candidates: &[u64]) -> (u64, Vec<ValidatedRegion>) {
    let mut parsed = 0u64;
    let mut validated = Vec::new();
    for offset in candidates.iter().copied() {
        let (parse_ok, region) = evaluate_candidate(source, offset);
        if parse_ok {
            parsed += 1;
        }
        if let Some(region) = region {
            validated.push(region);
        }
    }
    (parsed, validated)
}

/// Fan candidate evaluation out over scoped worker threads. Verdicts are
/// re-assembled in candidate order before returning, so downstream ordering
/// sees exactly the sequence a sequential run would produce.
fn evaluate_parallel(
    source: &ByteSource,
    candidates: &[u64],
    workers: usize,
) -> (u64, Vec<ValidatedRegion>) {
    let mut verdicts: Vec<CandidateVerdict> = Vec::with_capacity(candidates.len());

    std::thread::scope(|scope| {
        let (job_tx, job_rx) = bounded::<(usize, u64)>(workers * 2);
        let (verdict_tx, verdict_rx) = unbounded::<CandidateVerdict>();

        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let verdict_tx = verdict_tx.clone();
            scope.spawn(move || {
                for (index, offset) in job_rx {
                    let (parsed, region) = evaluate_candidate(source, offset);
                    if verdict_tx
                        .send(CandidateVerdict {
                            index,
                            parsed,
                            region,
                        })
                        .is_err()
                    {
                        break;
                    }
                }
            });
        }
        drop(job_rx);
        drop(verdict_tx);

        scope.spawn(move || {
            for (index, offset) in candidates.iter().copied().enumerate() {
                if job_tx.send((index, offset)).is_err() {
                    break;
                }
            }
        });

        for verdict in verdict_rx {
            verdicts.push(verdict);
        }
    });

    verdicts.sort_by_key(|verdict| verdict.index);
    let parsed = verdicts.iter().filter(|verdict| verdict.parsed).count() as u64;
    let validated = verdicts
        .into_iter()
        .filter_map(|verdict| verdict.region)
        .collect();
    (parsed, validated)
}

fn run_summary(run_id: &str, summary: &CarveSummary) -> RunSummary {
    RunSummary {
        run_id: run_id.to_string(),
        evidence_len: summary.evidence_len,
        candidates_seen: summary.candidates_seen,
        headers_parsed: summary.headers_parsed,
        regions_validated: summary.regions_validated,
        image_segments: summary.image_segments,
        other_segments: summary.other_segments,
        bytes_emitted: summary.bytes_emitted,
    }
}

/// Run the carve end to end: scan for signatures, evaluate each candidate,
/// order the survivors, partition the buffer and emit every segment.
///
/// Zero validated regions short-circuits to [`CarveError::NoImagesFound`]
/// after the run summary is recorded; segmentation is never attempted on an
/// empty region list.
pub fn run_carve(
    source: &ByteSource,
    sink: &dyn SegmentSink,
    fingerprint: &dyn Fingerprint,
    meta_sink: &dyn MetadataSink,
    opts: &CarveOptions,
) -> Result<CarveSummary, CarveError> {
    let candidates: Vec<u64> = scanner::scan(source).collect();
    info!("found {} candidate signatures", candidates.len());

    let workers = opts.workers.max(1);
    let (headers_parsed, validated) = if workers > 1 && candidates.len() > 1 {
        evaluate_parallel(source, &candidates, workers)
    } else {
        evaluate_sequential(source, &candidates)
    };
    info!(
        "validated {} of {} candidates",
        validated.len(),
        candidates.len()
    );

    let mut summary = CarveSummary {
        evidence_len: source.len(),
        candidates_seen: candidates.len() as u64,
        headers_parsed,
        regions_validated: validated.len() as u64,
        image_segments: 0,
        other_segments: 0,
        bytes_emitted: 0,
    };

    if validated.is_empty() {
        meta_sink.record_run_summary(&run_summary(&opts.run_id, &summary))?;
        meta_sink.flush()?;
        return Err(CarveError::NoImagesFound);
    }

    let ordered = regions::order_regions(validated);
    let plan = segments::plan_segments(&ordered, source.len());

    for segment in &plan {
        let bytes = source.slice(segment.start, segment.len())?;
        let digest = fingerprint.fingerprint(bytes);
        let path = sink.persist(segment.start, bytes, segment.kind)?;
        match segment.kind {
            SegmentKind::Image => summary.image_segments += 1,
            SegmentKind::Other => summary.other_segments += 1,
        }
        summary.bytes_emitted += segment.len();
        info!(
            "{} segment at offset {} ({} bytes) digest={}",
            segment.kind.label(),
            segment.start,
            segment.len(),
            digest
        );
        meta_sink.record_segment(&SegmentRecord {
            run_id: opts.run_id.clone(),
            kind: segment.kind.label().to_string(),
            global_start: segment.start,
            global_end: segment.end,
            size: segment.len(),
            digest,
            path,
        })?;
    }

    meta_sink.record_run_summary(&run_summary(&opts.run_id, &summary))?;
    meta_sink.flush()?;

    info!(
        "run_summary candidates={} parsed={} validated={} images={} others={} bytes_emitted={}",
        summary.candidates_seen,
        summary.headers_parsed,
        summary.regions_validated,
        summary.image_segments,
        summary.other_segments,
        summary.bytes_emitted
    );

    Ok(summary)
}
