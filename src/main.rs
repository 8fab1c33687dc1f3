use anyhow::Result;
use tracing::info;

use bmpcarve::{cli, config, digest, evidence, logging, metadata, pipeline, sink, util};

fn main() -> Result<()> {
    logging::init_logging();

    let cli_opts = cli::parse();
    let loaded = config::load_config(cli_opts.config_path.as_deref())?;
    let mut cfg = loaded.config;
    if let Some(arg) = cli_opts.digest {
        cfg.digest = util::digest_from_cli(arg);
    }

    let run_output_dir = cli_opts.output.join(&cfg.run_id);
    util::ensure_output_dir(&run_output_dir)?;

    let tool_version = env!("CARGO_PKG_VERSION");
    info!(
        "starting run_id={} input={} output={} workers={}",
        cfg.run_id,
        cli_opts.input.display(),
        run_output_dir.display(),
        cli_opts.workers
    );

    let source = evidence::ByteSource::load(&cli_opts.input)?;
    info!("loaded {} bytes of evidence into memory", source.len());

    let segment_sink =
        sink::DirectorySink::new(&run_output_dir, &cfg.bmp_extension, &cfg.other_extension);
    let fingerprint = digest::build_fingerprint(cfg.digest);
    let meta_sink = metadata::build_sink(
        util::backend_from_cli(cli_opts.metadata_backend),
        tool_version,
        &loaded.config_hash,
        &cli_opts.input,
        &run_output_dir,
    )?;

    let opts = pipeline::CarveOptions {
        run_id: cfg.run_id.clone(),
        workers: cli_opts.workers,
    };

    match pipeline::run_carve(
        &source,
        &segment_sink,
        fingerprint.as_ref(),
        meta_sink.as_ref(),
        &opts,
    ) {
        Ok(summary) => {
            info!(
                "carve finished: {} image and {} other segments ({} bytes) in {}",
                summary.image_segments,
                summary.other_segments,
                summary.bytes_emitted,
                run_output_dir.display()
            );
            Ok(())
        }
        Err(pipeline::CarveError::NoImagesFound) => {
            info!("no BMP images found in {}", cli_opts.input.display());
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
