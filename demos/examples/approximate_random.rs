use std::time::Instant;

use clap::Parser;
use clap::builder::RangedU64ValueParser;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use sparsify_approx::{ApproxConfig, ApproxError, approximate_with_config};
use sparsify_demos::parsers::FormatOptions;
use sparsify_matrix::SparseFormat;
use sparsify_matrix::dense::ColMajorMatrix;
use sparsify_matrix::sparse::{CsrMatrix, SparseView, extract_csc, extract_csr};
use sparsify_maybe_rayon::current_num_threads;
use tracing::info;
use tracing_forest::ForestLayer;
use tracing_forest::util::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

#[derive(Parser, Debug)]
#[command(version, about = "Approximate a random low-rank product on a random sparse pattern")]
struct Args {
    /// Rows of the template (columns of X).
    #[arg(long, default_value_t = 10_000)]
    rows: usize,

    /// Columns of the template (columns of Y).
    #[arg(long, default_value_t = 5_000)]
    cols: usize,

    /// Latent factors, i.e. the height of X and Y.
    #[arg(
        short,
        long,
        default_value_t = 32,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    latent: usize,

    /// Probability that a given entry belongs to the template.
    #[arg(short, long, default_value_t = 0.001)]
    density: f64,

    /// Storage format of the template.
    #[arg(short, long, ignore_case = true, value_enum, default_value_t = FormatOptions::Csr)]
    format: FormatOptions,

    /// Worker threads; 0 uses every available core.
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    /// Outer indices per parallel task.
    #[arg(short, long)]
    grain_size: Option<usize>,

    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    Registry::default()
        .with(env_filter)
        .with(ForestLayer::default())
        .init();

    let args = Args::parse();
    let mut rng = SmallRng::seed_from_u64(args.seed);
    let template = CsrMatrix::<f64>::rand(&mut rng, args.rows, args.cols, args.density)?;
    let x = ColMajorMatrix::<f64>::rand(&mut rng, args.latent, args.rows);
    let y = ColMajorMatrix::<f64>::rand(&mut rng, args.latent, args.cols);

    let mut config = ApproxConfig::new(args.threads);
    if let Some(grain_size) = args.grain_size {
        config = config.with_grain_size(grain_size);
    }

    let format = SparseFormat::from(args.format);
    let values = match format {
        SparseFormat::Csr => run(&extract_csr(&template)?, &x, &y, &config)?,
        SparseFormat::Csc => {
            let csc = template.to_csc()?;
            run(&extract_csc(&csc)?, &x, &y, &config)?
        }
    };

    let mean = values.iter().sum::<f64>() / values.len().max(1) as f64;
    info!(mean, "approximated {} entries", values.len());
    Ok(())
}

fn run<V: SparseView<f64>>(
    view: &V,
    x: &ColMajorMatrix<f64>,
    y: &ColMajorMatrix<f64>,
    config: &ApproxConfig,
) -> Result<Vec<f64>, ApproxError> {
    let pattern = view.pattern();
    info!(
        format = %view.format(),
        nnz = pattern.nnz(),
        available_threads = current_num_threads(),
        "generated problem"
    );

    let start = Instant::now();
    let values = approximate_with_config(&pattern, x, y, view.format(), config)?;
    info!(elapsed = ?start.elapsed(), "done");
    Ok(values)
}
