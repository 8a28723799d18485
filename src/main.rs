//! nodesel-export - replay recorded node visits into a sparse training file
//!
//! Usage: `nodesel-export <samples.jsonl> [output.svm]`
//!
//! Without an output path a timestamped file is created in
//! `NODESEL_OUTPUT_DIR` (default: local data dir). `NODESEL_MAX_DEPTH` and
//! `NODESEL_PRECISION` tune the export, `RUST_LOG` the logging.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use nodesel_features::constants::{APP_NAME, APP_VERSION};
use nodesel_features::logic::features::FEATURE_COUNT;
use nodesel_features::logic::snapshot::read_samples;
use nodesel_features::{
    DatasetWriter, ExportConfig, FeatureCalculator, FeatureResult, FeatureVector, LayoutInfo,
};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(input) = args.first() else {
        eprintln!("{} {}", APP_NAME, APP_VERSION);
        eprintln!("usage: nodesel-export <samples.jsonl> [output.svm]");
        return ExitCode::from(2);
    };
    let output = args.get(1).map(PathBuf::from);

    let config = ExportConfig::from_env();
    match run(Path::new(input), output, &config) {
        Ok(rows) => {
            log::info!("Export finished: {} rows", rows);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Export failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(input: &Path, output: Option<PathBuf>, config: &ExportConfig) -> FeatureResult<u64> {
    config.validate()?;
    log::debug!("Export config: {:?}", config);

    let samples = read_samples(input)?;
    log::info!("Loaded {} samples from {:?}", samples.len(), input);

    let writer = match output {
        Some(path) => DatasetWriter::create(path, config.exporter())?,
        None => DatasetWriter::in_dir(&config.output_dir, config.exporter())?,
    };
    let layout_path = writer.write_layout(&LayoutInfo::current(FEATURE_COUNT, config.max_depth))?;
    log::info!("Layout manifest: {:?}", layout_path);

    let mut skipped = 0usize;
    for (i, sample) in samples.iter().enumerate() {
        let mut vector = FeatureVector::for_layout();
        vector.set_max_depth(config.max_depth);
        sample.search.apply_normalizers(&mut vector);

        let calculator = FeatureCalculator::new(&sample.search);
        if let Err(e) = calculator.calculate(&sample.node, &mut vector) {
            log::warn!("Skipping sample {}: {}", i + 1, e);
            skipped += 1;
            continue;
        }

        writer.append_single(&vector, sample.label)?;
    }
    writer.flush()?;

    if skipped > 0 {
        log::warn!("{} of {} samples skipped", skipped, samples.len());
    }
    Ok(writer.rows_written())
}
