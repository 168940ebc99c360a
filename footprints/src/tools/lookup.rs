use anyhow::{Result, bail};
use footprints::{
	Config,
	upstream::MapboxUpstream,
	viewer::{LookupRequest, render_lookup},
};
use std::{path::PathBuf, sync::Arc};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// Free-text place to look up, e.g. "Ferry Building, San Francisco"
	#[arg(conflicts_with_all = ["lat", "lon"])]
	pub query: Option<String>,

	/// Latitude in degrees, use together with --lon
	#[arg(long, allow_negative_numbers = true, requires = "lon")]
	pub lat: Option<f64>,

	/// Longitude in degrees, use together with --lat
	#[arg(long, allow_negative_numbers = true, requires = "lat")]
	pub lon: Option<f64>,

	/// Zoom level of the tile to search. Default: upstream.zoom of the configuration
	#[arg(short, long)]
	pub zoom: Option<u8>,

	/// Path to a YAML configuration file
	#[arg(short = 'c', long, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Access token of the mapping API. Overrides $MAPBOX_ACCESS_TOKEN.
	#[arg(long)]
	pub token: Option<String>,
}

impl Subcommand {
	fn request(&self) -> Result<LookupRequest> {
		Ok(match (&self.query, self.lat, self.lon) {
			(Some(query), None, None) => LookupRequest::Query(query.clone()),
			(None, Some(lat), Some(lon)) => LookupRequest::Point { lat, lon },
			_ => bail!("either a query or --lat and --lon are required"),
		})
	}
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	let request = arguments.request()?;

	let mut config = Config::from_optional_path(arguments.config.as_deref())?;
	config.apply_env();
	config.upstream.override_optional_access_token(&arguments.token);

	let upstream = Arc::new(MapboxUpstream::new(&config.upstream)?);
	let scene = render_lookup(&config, upstream, &request, arguments.zoom).await?;

	println!("{}", serde_json::to_string_pretty(&scene)?);
	Ok(())
}
