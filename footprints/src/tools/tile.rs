use anyhow::Result;
use footprints::lookup::map_to_tile;
use serde_json::json;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// Latitude in degrees
	#[arg(allow_negative_numbers = true)]
	pub lat: f64,

	/// Longitude in degrees
	#[arg(allow_negative_numbers = true)]
	pub lon: f64,

	/// Zoom level
	#[arg(default_value_t = 16)]
	pub zoom: u8,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	println!("{}", describe(arguments)?);
	Ok(())
}

fn describe(arguments: &Subcommand) -> Result<String> {
	let tile = map_to_tile(arguments.lat, arguments.lon, arguments.zoom)?;
	let bbox = tile.to_geo_bbox();
	Ok(serde_json::to_string_pretty(&json!({
		"tile": tile,
		"path": tile.to_string(),
		"bbox": bbox,
	}))?)
}
