mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{ErrorLevel, Verbosity};

#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about,
	long_about = None,
	propagate_version = true,
	disable_help_subcommand = true,
)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[command(flatten)]
	verbose: Verbosity<ErrorLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
	#[clap(alias = "server")]
	/// Serve the building lookup API via http
	Serve(tools::serve::Subcommand),

	/// Look up the buildings around a place and print the resulting map scene
	Lookup(tools::lookup::Subcommand),

	/// Show the tile containing a position
	Tile(tools::tile::Subcommand),
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	run(cli)
}

fn run(cli: Cli) -> Result<()> {
	match &cli.command {
		Commands::Serve(arguments) => tools::serve::run(arguments),
		Commands::Lookup(arguments) => tools::lookup::run(arguments),
		Commands::Tile(arguments) => tools::tile::run(arguments),
	}
}

#[cfg(test)]
mod tests {
	use crate::{Cli, run};
	use anyhow::Result;
	use clap::Parser;

	pub fn run_command(arg_vec: Vec<&str>) -> Result<String> {
		let cli = Cli::try_parse_from(arg_vec)?;
		let msg = format!("{cli:?}");
		run(cli)?;
		Ok(msg)
	}

	#[test]
	fn help() {
		let err = run_command(vec!["footprints"]).unwrap_err().to_string();
		assert!(err.starts_with("A thin proxy that looks up building footprints in vector tiles and serves them as GeoJSON."));
		assert!(err.contains("\nUsage: footprints [OPTIONS] <COMMAND>"));
	}

	#[test]
	fn version() {
		let err = run_command(vec!["footprints", "-V"]).unwrap_err().to_string();
		assert!(err.starts_with("footprints "));
	}

	#[test]
	fn lookup_subcommand() {
		let output = run_command(vec!["footprints", "lookup"]).unwrap_err().to_string();
		assert!(output.starts_with("Look up the buildings around a place"));
	}

	#[test]
	fn tile_subcommand() {
		let output = run_command(vec!["footprints", "tile"]).unwrap_err().to_string();
		assert!(output.starts_with("Show the tile containing a position"));
	}

	#[test]
	fn verbosity() {
		let cli = Cli::try_parse_from(["footprints", "-vv", "tile", "0", "0"]).unwrap();
		assert_eq!(cli.verbose.log_level_filter(), log::LevelFilter::Info);
	}
}
