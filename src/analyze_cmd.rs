use anyhow::{Context, Result, anyhow};
use tracing::{info, warn};

use nimbus_engine::{RunController, RunState};
use nimbus_io::{DailyBatcher, GridArchive, ParquetSink, RecordSink, write_flow};

use crate::cli::AnalyzeArgs;
use crate::config;
use crate::convert;

/// Run the analysis over an archive and write daily Parquet statistics.
pub fn run(args: AnalyzeArgs) -> Result<()> {
    // Step 1: Load config and apply CLI overrides
    let mut cfg = config::load(&args.config)?;
    if let Some(dir) = args.input {
        cfg.io.input_dir = Some(dir);
    }
    if let Some(dir) = args.output {
        cfg.io.output_dir = Some(dir);
    }
    if let Some(s) = args.start {
        cfg.io.start = Some(s);
    }
    if let Some(s) = args.end {
        cfg.io.end = Some(s);
    }

    let input = cfg
        .io
        .input_dir
        .as_ref()
        .ok_or_else(|| anyhow!("no input directory: set [io].input_dir in config or use --input"))?;
    let output = cfg.io.output_dir.as_ref().ok_or_else(|| {
        anyhow!("no output directory: set [io].output_dir in config or use --output")
    })?;
    let start = cfg
        .io
        .start
        .as_deref()
        .ok_or_else(|| anyhow!("no start time: set [io].start in config or use --start"))
        .and_then(convert::parse_datetime)?;
    let end = cfg
        .io
        .end
        .as_deref()
        .ok_or_else(|| anyhow!("no end time: set [io].end in config or use --end"))
        .and_then(convert::parse_datetime)?;
    if end < start {
        anyhow::bail!("end {end} is before start {start}");
    }

    // Step 2: Build configs from TOML
    let engine_cfg = convert::build_engine_config(&cfg)?;
    let archive_cfg = convert::build_archive_config(&cfg.io, input)?;
    let writer_cfg = convert::build_writer_config(&cfg.io)?;

    let archive = GridArchive::new(archive_cfg)
        .with_context(|| format!("failed to open archive: {}", input.display()))?;
    let mut controller = RunController::new(engine_cfg).context("failed to start engine")?;
    let sink = ParquetSink::new(output, writer_cfg)
        .with_context(|| format!("failed to create output dir: {}", output.display()))?;
    let mut batcher = DailyBatcher::new(sink).with_min_records(cfg.io.min_daily_records);

    // Step 3: Drive the controller over the archive
    info!(
        input = %input.display(),
        %start,
        %end,
        "analysis started"
    );
    let mut n_records = 0usize;
    let mut n_tracking = 0usize;
    for record in controller.records(archive.inputs(start, end)) {
        let record = record.context("analysis step failed")?;
        n_records += 1;
        if record.state == RunState::Tracking {
            n_tracking += 1;
        }
        batcher
            .push(record)
            .context("failed to write daily statistics")?;
    }
    batcher
        .finish()
        .context("failed to write daily statistics")?;

    // Step 4: Optionally export the retained flows
    if cfg.io.export_flows {
        let dir = output.join("flows");
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create flow dir: {}", dir.display()))?;
        let mut n_flows = 0usize;
        for (timestamp, flow) in controller.flows() {
            write_flow(&dir, *timestamp, flow, cfg.spectral.resolution_km)
                .with_context(|| format!("failed to export flow at {timestamp}"))?;
            n_flows += 1;
        }
        info!(n_flows, dir = %dir.display(), "flows exported");
    }

    if n_records == 0 {
        warn!("no wet fields found in the requested period");
    }
    info!(
        n_records,
        n_tracking,
        days_written = batcher.days_written(),
        days_skipped = batcher.days_skipped(),
        files = batcher.sink().written().len(),
        "analysis complete"
    );
    Ok(())
}
