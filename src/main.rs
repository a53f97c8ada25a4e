//! # Main — CLI Entry Point
//!
//! Routes subcommands to the library: one-shot factoring, full
//! factorization, semiprime generation, and the engine listing. Handles the
//! shared concerns — tracing setup, the Rayon thread pool, and timing
//! output for the measurement harness.

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use factorhunt::Algorithm;

#[derive(Parser)]
#[command(name = "factorhunt", about = "Factor composite integers up to ~45 digits")]
struct Cli {
    /// Number of rayon worker threads (defaults to all logical cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Log filter, e.g. "debug" or "factorhunt=trace" (or set RUST_LOG)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find one nontrivial factor of n
    Factor {
        /// The composite to split (decimal)
        n: String,
        /// Pin a single engine instead of the driver's ladder
        #[arg(long, value_enum)]
        engine: Option<Algorithm>,
    },
    /// Full prime factorization of n
    Factorize {
        /// The integer to factor completely (decimal)
        n: String,
    },
    /// Generate a random semiprime test case
    Semiprime {
        /// Total decimal digits of the product
        #[arg(long, default_value_t = 20)]
        digits: u32,
        /// RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List the available engines
    Engines,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&cli.log))
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    match &cli.command {
        Commands::Factor { n, engine } => cli::run_factor(n, *engine),
        Commands::Factorize { n } => cli::run_factorize(n),
        Commands::Semiprime { digits, seed } => cli::run_semiprime(*digits, *seed),
        Commands::Engines => cli::run_engines(),
    }
}
