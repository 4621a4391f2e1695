use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use subsample_align::alignment::oracles::{at_least_kept, expected_kept_count};
use subsample_align::alignment::reference::compute_alignment_batch;
use subsample_align::alignment::sampling::uniform_emission_batch;
use subsample_align::{AlignmentBatch, AlignmentEngineBuilder, EmissionBatch, EngineConfig};

#[path = "alignment_probs/grid_formatter.rs"]
mod grid_formatter;
#[path = "alignment_probs/json_formatter.rs"]
mod json_formatter;

const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    /// Fixed-width text grid, one block per batch entry.
    Grid,
}

#[derive(Debug, Parser)]
#[command(name = "alignment_probs")]
#[command(about = "Compute alignment probabilities under stochastic subsampling")]
struct Args {
    /// Comma-separated emission probabilities; repeat for a batch. Ragged
    /// sequences are zero-padded.
    #[arg(long)]
    emissions: Vec<String>,
    #[arg(long, env = "SUBSAMPLE_ALIGN_RANDOM_BATCH", conflicts_with = "emissions")]
    random_batch: Option<usize>,
    #[arg(long, env = "SUBSAMPLE_ALIGN_LENGTH", default_value_t = 20)]
    length: usize,
    #[arg(long, env = "SUBSAMPLE_ALIGN_SEED", default_value_t = DEFAULT_SEED)]
    seed: u64,
    #[arg(long, env = "SUBSAMPLE_ALIGN_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "SUBSAMPLE_ALIGN_DEVICE")]
    device: Option<String>,
    #[arg(long, env = "SUBSAMPLE_ALIGN_DTYPE")]
    dtype: Option<String>,
    #[arg(long, env = "SUBSAMPLE_ALIGN_FLOOR")]
    floor: Option<f64>,
    #[arg(
        long,
        env = "SUBSAMPLE_ALIGN_FORMAT",
        value_enum,
        default_value_t = OutputFormat::Json
    )]
    format: OutputFormat,
    #[arg(long, env = "SUBSAMPLE_ALIGN_OUT")]
    out: Option<PathBuf>,
    /// Compare against the scalar reference and fail on mismatch.
    #[arg(long, env = "SUBSAMPLE_ALIGN_CROSS_CHECK", default_value_t = false)]
    cross_check: bool,
    #[arg(long, env = "SUBSAMPLE_ALIGN_TOLERANCE")]
    tolerance: Option<f64>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();

    let mut config = match args.config.as_ref() {
        Some(path) => EngineConfig::load(path).map_err(|err| err.to_string())?,
        None => EngineConfig::default(),
    };
    if let Some(device) = args.device.clone() {
        config.device = device;
    }
    if let Some(dtype) = args.dtype.clone() {
        config.dtype = dtype;
    }
    if let Some(floor) = args.floor {
        config.stability_floor = floor;
    }
    let dtype = config.compute_dtype().map_err(|err| err.to_string())?;

    let batch = load_batch(&args)?;
    if batch.is_empty() {
        return Err("no emission sequences given; use --emissions or --random-batch".to_string());
    }

    let engine = AlignmentEngineBuilder::new(config)
        .build()
        .map_err(|err| err.to_string())?;
    let alignment = engine.compute(&batch).map_err(|err| err.to_string())?;

    if args.cross_check {
        let tolerance = args.tolerance.unwrap_or_else(|| dtype.default_tolerance());
        cross_check(&batch, &alignment, tolerance)?;
    }

    let rendered = match args.format {
        OutputFormat::Json => json_formatter::render(&batch, &alignment)?,
        OutputFormat::Grid => grid_formatter::render(&batch, &alignment),
    };
    match args.out.as_ref() {
        Some(path) => std::fs::write(path, rendered)
            .map_err(|err| format!("Failed to write output '{}': {err}", path.display())),
        None => {
            print!("{rendered}");
            Ok(())
        }
    }
}

fn load_batch(args: &Args) -> Result<EmissionBatch, String> {
    if let Some(batch_size) = args.random_batch {
        let mut rng = StdRng::seed_from_u64(args.seed);
        return Ok(uniform_emission_batch(batch_size, args.length, &mut rng));
    }

    let rows = args
        .emissions
        .iter()
        .map(|sequence| {
            sequence
                .split(',')
                .map(parse_probability)
                .collect::<Result<Vec<f64>, String>>()
        })
        .collect::<Result<Vec<Vec<f64>>, String>>()?;
    Ok(EmissionBatch::from_rows_zero_padded(rows))
}

fn parse_probability(raw: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid emission probability '{raw}': {err}"))
}

fn cross_check(
    batch: &EmissionBatch,
    batched: &AlignmentBatch,
    tolerance: f64,
) -> Result<(), String> {
    let reference = compute_alignment_batch(batch).map_err(|err| err.to_string())?;
    let max_diff = reference
        .max_abs_diff(batched)
        .ok_or_else(|| "reference and batched outputs differ in shape".to_string())?;

    for (b, (row, matrix)) in batch.rows().zip(reference.iter()).enumerate() {
        let mass_gap = (matrix.total_mass() - expected_kept_count(row)).abs();
        let row_gap = at_least_kept(row)
            .iter()
            .enumerate()
            .map(|(m, p)| (matrix.row_mass(m) - p).abs())
            .fold(0.0, f64::max);
        tracing::debug!(batch = b, mass_gap, row_gap, "reference oracle check");
        if mass_gap > tolerance || row_gap > tolerance {
            return Err(format!(
                "batch entry {b}: reference mass check failed (total gap {mass_gap:.3e}, row gap {row_gap:.3e})"
            ));
        }
    }

    if max_diff > tolerance {
        return Err(format!(
            "cross-check failed: max |reference - batched| = {max_diff:.3e} exceeds tolerance {tolerance:.3e}"
        ));
    }
    if max_diff > tolerance * 0.5 {
        tracing::warn!(max_diff, tolerance, "cross-check passed close to tolerance");
    }
    eprintln!("cross-check ok: max |reference - batched| = {max_diff:.3e}");
    Ok(())
}
