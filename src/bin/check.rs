use clap::Parser;

use equal_teams::checker::{check, parse_values};
use equal_teams::model::TEAM_SIZE;

#[derive(Debug, Parser)]
#[command(author, version, about = "Find two disjoint teams with equal sum")]
struct Cli {
    /// Scores, separated by commas and/or spaces.
    #[arg(value_name = "INT", required = true, allow_hyphen_values = true)]
    values: Vec<String>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Warn,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let args = Cli::parse();

    let parsed = parse_values(&args.values)?;
    for token in &parsed.skipped {
        log::warn!("skipping '{}' (no leading integer)", token);
    }
    let values = parsed.values;
    println!("Parsed {} values: {:?}", values.len(), values);

    match check(&values, TEAM_SIZE)? {
        Some(pair) => {
            println!();
            println!("Found two disjoint subsets of size {} with sum = {}:", TEAM_SIZE, pair.sum);
            println!("  Indices {} → {:?}", pair.earlier, pair.earlier.pick(&values));
            println!("  Indices {} → {:?}", pair.later, pair.later.pick(&values));
        }
        None => {
            println!();
            println!("No two disjoint size-{} subsets have the same sum.", TEAM_SIZE);
        }
    }

    Ok(())
}
