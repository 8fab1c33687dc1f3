use std::fs;

use bmpcarve::digest::{DigestKind, build_fingerprint};
use bmpcarve::evidence::ByteSource;
use bmpcarve::metadata::{self, MetadataBackendKind};
use bmpcarve::pipeline::{self, CarveError, CarveOptions};
use bmpcarve::sink::DirectorySink;

fn minimal_header_only_bmp() -> Vec<u8> {
    // 54-byte header whose declared file size is exactly the header length:
    // a bitmap with zero bytes of trailing pixel data.
    let mut data = Vec::new();
    data.extend_from_slice(b"BM");
    data.extend_from_slice(&54u32.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(&54u32.to_le_bytes());
    data.extend_from_slice(&40u32.to_le_bytes());
    data.extend_from_slice(&1i32.to_le_bytes());
    data.extend_from_slice(&1i32.to_le_bytes());
    data.extend_from_slice(&1u16.to_le_bytes());
    data.extend_from_slice(&24u16.to_le_bytes());
    data.extend_from_slice(&[0u8; 24]);
    data
}

struct RunOutcome {
    result: Result<pipeline::CarveSummary, CarveError>,
    run_output_dir: std::path::PathBuf,
    _temp_dir: tempfile::TempDir,
}

fn run_carve_with_bytes(buffer: Vec<u8>) -> RunOutcome {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let input_path = temp_dir.path().join("evidence.bin");
    fs::write(&input_path, &buffer).expect("write input");
    let run_output_dir = temp_dir.path().join("run");
    fs::create_dir_all(&run_output_dir).expect("output dir");

    let source = ByteSource::load(&input_path).expect("evidence");
    let sink = DirectorySink::new(&run_output_dir, "bmp", "other");
    let fingerprint = build_fingerprint(DigestKind::Md5);
    let meta_sink = metadata::build_sink(
        MetadataBackendKind::Jsonl,
        env!("CARGO_PKG_VERSION"),
        "confighash",
        &input_path,
        &run_output_dir,
    )
    .expect("metadata sink");

    let opts = CarveOptions {
        run_id: "boundary_test".to_string(),
        workers: 1,
    };
    let result = pipeline::run_carve(
        &source,
        &sink,
        fingerprint.as_ref(),
        meta_sink.as_ref(),
        &opts,
    );

    RunOutcome {
        result,
        run_output_dir,
        _temp_dir: temp_dir,
    }
}

fn carved_filenames(run_output_dir: &std::path::Path) -> Vec<String> {
    let carved = run_output_dir.join("carved");
    if !carved.exists() {
        return Vec::new();
    }
    let mut names: Vec<String> = fs::read_dir(carved)
        .expect("read carved dir")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn buffer_without_magic_reports_no_images() {
    let outcome = run_carve_with_bytes(vec![0u8; 4096]);
    assert!(matches!(outcome.result, Err(CarveError::NoImagesFound)));
    assert!(carved_filenames(&outcome.run_output_dir).is_empty());
}

#[test]
fn single_byte_buffer_reports_no_images() {
    let outcome = run_carve_with_bytes(vec![0x42]);
    assert!(matches!(outcome.result, Err(CarveError::NoImagesFound)));
}

#[test]
fn magic_false_positives_report_no_images() {
    // "BM" strewn through data that never parses into a plausible header.
    let mut buffer = Vec::new();
    for _ in 0..10 {
        buffer.extend_from_slice(b"BM");
        buffer.extend_from_slice(&[0x99u8; 61]);
    }
    let outcome = run_carve_with_bytes(buffer);
    assert!(matches!(outcome.result, Err(CarveError::NoImagesFound)));
}

#[test]
fn whole_buffer_is_one_minimal_bmp() {
    let buffer = minimal_header_only_bmp();
    let outcome = run_carve_with_bytes(buffer.clone());
    let summary = outcome.result.expect("carve");
    assert_eq!(summary.image_segments, 1);
    assert_eq!(summary.other_segments, 0);
    assert_eq!(summary.bytes_emitted, buffer.len() as u64);

    let names = carved_filenames(&outcome.run_output_dir);
    assert_eq!(names, vec!["000000000000.bmp".to_string()]);
    let artifact = fs::read(outcome.run_output_dir.join("carved").join(&names[0]))
        .expect("artifact");
    assert_eq!(artifact, buffer);
}

#[test]
fn declared_size_past_buffer_end_is_rejected() {
    // The declared file size reaches one byte past the evidence, so the
    // region is rejected at validation time instead of slicing out of range.
    let mut buffer = minimal_header_only_bmp();
    buffer[2..6].copy_from_slice(&55u32.to_le_bytes());
    let outcome = run_carve_with_bytes(buffer);
    assert!(matches!(outcome.result, Err(CarveError::NoImagesFound)));
}

#[test]
fn one_byte_gap_between_images_is_its_own_fragment() {
    let mut buffer = minimal_header_only_bmp();
    buffer.push(0x7F);
    buffer.extend_from_slice(&minimal_header_only_bmp());

    let outcome = run_carve_with_bytes(buffer.clone());
    let summary = outcome.result.expect("carve");
    assert_eq!(summary.image_segments, 2);
    assert_eq!(summary.other_segments, 1);
    assert_eq!(summary.bytes_emitted, buffer.len() as u64);

    let gap = fs::read(
        outcome
            .run_output_dir
            .join("carved")
            .join("000000000036.other"),
    )
    .expect("gap artifact");
    assert_eq!(gap, vec![0x7F]);
}

#[test]
fn abutting_images_leave_no_gap_fragment() {
    let mut buffer = minimal_header_only_bmp();
    buffer.extend_from_slice(&minimal_header_only_bmp());

    let outcome = run_carve_with_bytes(buffer);
    let summary = outcome.result.expect("carve");
    assert_eq!(summary.image_segments, 2);
    assert_eq!(summary.other_segments, 0);

    let names = carved_filenames(&outcome.run_output_dir);
    assert_eq!(
        names,
        vec![
            "000000000000.bmp".to_string(),
            "000000000036.bmp".to_string()
        ]
    );
}

#[test]
fn truncated_header_at_buffer_tail_is_dropped() {
    // Filler, then a magic whose header region is cut off by the end of the
    // evidence: the candidate is dropped without error.
    let mut buffer = vec![0u8; 100];
    buffer.extend_from_slice(&minimal_header_only_bmp()[..20]);
    let outcome = run_carve_with_bytes(buffer);
    assert!(matches!(outcome.result, Err(CarveError::NoImagesFound)));
}
