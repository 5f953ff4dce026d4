//! abft CLI: Conjugate Gradient with a protected sparse matrix.

use std::path::PathBuf;

use abft::abft::BitFlipRegion;
use abft::algorithm::CgOptions;
use abft::config::{BitFlipConfig, DEFAULT_MATRIX_FILE, RunConfig};
use abft::driver::{self, RunReport};
use abft::error::{Error, Result};
use abft::runtime::ContextRegistry;
use clap::{ArgAction, Parser};

#[derive(Parser)]
#[command(name = "abft")]
#[command(about = "Conjugate Gradient solver with fault-tolerant sparse matrix storage")]
#[command(version)]
#[command(after_help = "\
The -m|--mode argument selects the scheme protecting the sparse matrix:
  none (default), constraints, sed, sec7, sec8, secded

The -x|--inject-bitflip argument optionally takes a number of bits to flip
and INDEX or VALUE to restrict the targeted region of the matrix element.")]
struct Cli {
    /// Number of times to block the input matrix along the diagonal
    #[arg(short = 'b', long, default_value_t = 25, value_parser = clap::value_parser!(u64).range(1..))]
    num_blocks: u64,

    /// Convergence threshold on r·r
    #[arg(short, long, default_value_t = 0.001)]
    convergence: f64,

    /// Path to a Matrix Market file
    #[arg(short = 'f', long, default_value = DEFAULT_MATRIX_FILE)]
    matrix_file: PathBuf,

    /// Maximum number of iterations
    #[arg(short, long, default_value_t = 1000)]
    iterations: usize,

    /// Protection mode
    #[arg(short, long, default_value = "none")]
    mode: String,

    /// Implementation target
    #[arg(short, long, default_value = "cpu")]
    target: String,

    /// List available contexts and exit
    #[arg(short, long)]
    list: bool,

    /// Inject a random bit-flip into the matrix: [COUNT] [INDEX|VALUE]
    #[arg(short = 'x', long, num_args = 0..=2, value_name = "ARG")]
    inject_bitflip: Option<Vec<String>>,

    /// Seed for the right-hand side and fault injection
    #[arg(long)]
    seed: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let registry = ContextRegistry::with_defaults();
    if cli.list {
        list_contexts(&registry);
        return;
    }

    let result = build_config(&cli).and_then(|config| {
        let report = driver::run(&config, &registry)?;
        print_report(&config, &report);
        Ok(())
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn list_contexts(registry: &ContextRegistry) {
    println!("Available contexts:");
    for (target, mode) in registry.list() {
        println!("  {target:<10} {mode}");
    }
}

fn build_config(cli: &Cli) -> Result<RunConfig> {
    if cli.convergence < 0.0 || !cli.convergence.is_finite() {
        return Err(Error::invalid_argument(
            "convergence",
            format!("expected a non-negative number, got {}", cli.convergence),
        ));
    }

    let bitflip = cli
        .inject_bitflip
        .as_deref()
        .map(parse_bitflip)
        .transpose()?;

    Ok(RunConfig {
        matrix_file: cli.matrix_file.clone(),
        num_blocks: cli.num_blocks as usize,
        target: cli.target.clone(),
        mode: cli.mode.clone(),
        cg: CgOptions {
            max_iter: cli.iterations,
            conv_threshold: cli.convergence,
            track_residual_history: true,
        },
        bitflip,
        seed: cli.seed,
    })
}

/// Parse the optional `-x` arguments: a bit count and/or a region name
fn parse_bitflip(args: &[String]) -> Result<BitFlipConfig> {
    let mut config = BitFlipConfig::default();
    for arg in args {
        if let Ok(count) = arg.parse::<usize>() {
            if count == 0 {
                return Err(Error::invalid_argument("inject-bitflip", "count must be at least 1"));
            }
            config.count = count;
        } else {
            config.region = arg.parse::<BitFlipRegion>()?;
        }
    }
    Ok(config)
}

fn print_report(config: &RunConfig, report: &RunReport) {
    let n = report.n;
    println!();
    println!("context               = {}", report.context);
    println!("matrix size           = {n} x {n}");
    println!("matrix block size     = {0} x {0}", report.block_size);
    println!(
        "number of non-zeros   = {} ({:.4}%)",
        report.nnz,
        report.nnz as f64 / (n as f64 * n as f64) * 100.0
    );
    println!("maximum iterations    = {}", config.cg.max_iter);
    println!("convergence threshold = {}", config.cg.conv_threshold);
    println!();

    for flip in &report.flips {
        println!("flipped bit {} of element {}", flip.bit, flip.index);
    }
    if !report.flips.is_empty() {
        println!();
    }

    for (itr, rr) in report.cg.residual_history.iter().enumerate() {
        println!("iteration {itr:5} :  rr = {rr:12.4}");
    }
    println!();
    println!("ran for {} iterations", report.cg.iterations);
    if !report.cg.corrections.is_empty() {
        println!("corrected {} bit errors", report.cg.corrections.len());
    }
    println!();
    println!(
        "time taken = {:7.2} ms",
        report.elapsed.as_secs_f64() * 1e3
    );
    println!();
    println!("total error = {:.6}", report.error.total);
    println!("max error   = {:.6}", report.error.max);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["abft"]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.num_blocks, 25);
        assert_eq!(config.cg.max_iter, 1000);
        assert_eq!(config.cg.conv_threshold, 0.001);
        assert_eq!(config.target, "cpu");
        assert_eq!(config.mode, "none");
        assert_eq!(config.matrix_file, PathBuf::from(DEFAULT_MATRIX_FILE));
        assert!(config.bitflip.is_none());
    }

    #[test]
    fn test_inject_bitflip_args() {
        let cli = Cli::parse_from(["abft", "-x"]);
        assert_eq!(build_config(&cli).unwrap().bitflip, Some(BitFlipConfig::default()));

        let cli = Cli::parse_from(["abft", "-x", "3", "INDEX", "-m", "sec7"]);
        let config = build_config(&cli).unwrap();
        assert_eq!(
            config.bitflip,
            Some(BitFlipConfig {
                count: 3,
                region: BitFlipRegion::Index
            })
        );
        assert_eq!(config.mode, "sec7");

        let cli = Cli::parse_from(["abft", "-x", "0"]);
        assert!(build_config(&cli).is_err());
        let cli = Cli::parse_from(["abft", "-x", "ROW"]);
        assert!(build_config(&cli).is_err());
    }

    #[test]
    fn test_rejects_zero_blocks() {
        assert!(Cli::try_parse_from(["abft", "-b", "0"]).is_err());
    }
}
