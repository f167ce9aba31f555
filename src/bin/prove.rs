use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::bail;

use equal_teams::model::TEAM_SIZE;
use equal_teams::proof::ProofResult;
use equal_teams::smt::Z3Oracle;
use equal_teams::sweep::{run_sweep, Attempt, Strategy, SweepConfig};
use equal_teams::types::MAX_LEN;

#[derive(Debug, Parser)]
#[command(author, version, about = "Proof of the equal-teams threshold")]
struct Cli {
    /// Time limit per N (in seconds).
    #[arg(long, value_name = "SECONDS", default_value = "600")]
    limit: u64,

    /// Number of search workers (default: number of CPUs).
    #[arg(long, value_name = "INT")]
    threads: Option<usize>,

    /// First N to try.
    #[arg(long, value_name = "INT", default_value = "14")]
    start: usize,

    /// Last N to try.
    #[arg(long, value_name = "INT", default_value = "17")]
    end: usize,

    /// Use the static model instead of refinement.
    #[arg(long = "no-cegar", alias = "static")]
    no_cegar: bool,

    /// Log level.
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: simplelog::LevelFilter,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        args.log_level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    if args.start < TEAM_SIZE {
        bail!("--start must be at least the team size {}", TEAM_SIZE);
    }
    if args.end > MAX_LEN {
        bail!("--end must be at most {}", MAX_LEN);
    }

    let defaults = SweepConfig::default();
    let config = SweepConfig {
        time_limit: Duration::from_secs(args.limit),
        threads: args.threads.unwrap_or(defaults.threads).max(1),
        start: args.start,
        end: args.end,
        strategy: if args.no_cegar { Strategy::Static } else { Strategy::Cegar },
        ..defaults
    };

    println!(
        "Equal teams proof  mode={}  threads={}  limit={}s",
        config.strategy, config.threads, args.limit
    );
    println!();

    let time_total = std::time::Instant::now();

    let report = match run_sweep(&config, Z3Oracle::new(), |attempt| print_attempt(attempt, &config)) {
        Ok(report) => report,
        Err(e) => {
            println!();
            println!("Stopped by a solver fault after {} finished N:", e.partial.attempts.len());
            for attempt in &e.partial.attempts {
                println!("  N = {}: {}", attempt.n, summary(&attempt.result));
            }
            return Err(e.into());
        }
    };

    println!();
    match report.threshold() {
        Some(n) => println!("Every {} scores contain two disjoint equal teams", n),
        None if report.is_inconclusive() => println!("Inconclusive: time limit reached"),
        None => println!("No N in {}..={} is forced", config.start, config.end),
    }

    let time_total = time_total.elapsed();
    println!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}

fn summary(result: &ProofResult) -> &'static str {
    match result {
        ProofResult::Proven => "PROVEN",
        ProofResult::Disproven(_) => "DISPROVEN",
        ProofResult::Inconclusive => "INCONCLUSIVE",
    }
}

fn print_attempt(attempt: &Attempt, config: &SweepConfig) {
    println!("N = {}", attempt.n);
    match &attempt.result {
        ProofResult::Proven if config.strategy == Strategy::Cegar => {
            println!("  UNSAT after {} refinements", attempt.refinements)
        }
        ProofResult::Proven => println!("  UNSAT (static model)"),
        ProofResult::Disproven(values) => {
            println!("  SAT (counter-example found)");
            println!("    {}", values);
        }
        ProofResult::Inconclusive => {
            println!(
                "  » time limit {}s exceeded for N={}",
                config.time_limit.as_secs(),
                attempt.n
            )
        }
    }
    println!(
        "  {} oracle calls in {:.3} s",
        attempt.oracle_calls,
        attempt.elapsed.as_secs_f64()
    );
}
