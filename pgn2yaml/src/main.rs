mod converter;

use anyhow::{Context, Result};
use chusst_pgn::{
    parse_pgn_file, ParseOptions, DEFAULT_MAX_VARIATION_DEPTH, VARIATION_DEPTH_CEILING,
};
use clap::builder::RangedU64ValueParser;
use clap::Parser;
use converter::write_report;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// PGN file
    file: String,

    /// Path of the YAML file (if not specified, same as the PGN file with the extension changed)
    #[arg(short, long)]
    output: Option<String>,

    /// Maximum nesting depth of variations
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_VARIATION_DEPTH,
        value_parser = RangedU64ValueParser::<usize>::new().range(0..=VARIATION_DEPTH_CEILING as u64)
    )]
    max_depth: usize,

    /// Reject move suffix annotations (!, ?, !?...) instead of ignoring them
    #[arg(long)]
    strict_annotations: bool,

    /// Log every game, not only the malformed ones
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let pgn_path = PathBuf::from(cli.file);

    let options = ParseOptions::new()
        .max_variation_depth(cli.max_depth)
        .reject_suffix_annotations(cli.strict_annotations);

    let report = parse_pgn_file(&pgn_path, options).context(format!(
        "Unable to read PGN file {}",
        pgn_path.to_string_lossy()
    ))?;

    for error in report.errors() {
        warn!(
            line = error.line(),
            column = error.column(),
            category = %error.category(),
            "{}",
            error
        );
    }

    info!(
        games = report.database.len(),
        failed = report.outcomes.len() - report.database.len(),
        "parsed {}",
        pgn_path.to_string_lossy()
    );

    let yaml_path = cli.output.map_or_else(
        || {
            let mut path = pgn_path.clone();
            path.set_extension("yaml");
            path
        },
        PathBuf::from,
    );
    info!("Writing YAML file to {}", yaml_path.to_string_lossy());
    write_report(&report, &yaml_path)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_depth_is_bounded() {
        let cli = Cli::try_parse_from(["pgn2yaml", "games.pgn"]).unwrap();
        assert_eq!(cli.max_depth, DEFAULT_MAX_VARIATION_DEPTH);

        let ceiling = VARIATION_DEPTH_CEILING.to_string();
        let cli =
            Cli::try_parse_from(["pgn2yaml", "games.pgn", "--max-depth", ceiling.as_str()]).unwrap();
        assert_eq!(cli.max_depth, VARIATION_DEPTH_CEILING);

        let above = (VARIATION_DEPTH_CEILING + 1).to_string();
        assert!(Cli::try_parse_from(["pgn2yaml", "games.pgn", "--max-depth", above.as_str()]).is_err());
    }
}
