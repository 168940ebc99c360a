use anyhow::Result;
use footprints::{Config, server::FootprintServer};
use std::path::PathBuf;
use tokio::time::{Duration, sleep};

#[derive(clap::Args, Debug)]
#[command(disable_version_flag = true, verbatim_doc_comment)]
pub struct Subcommand {
	/// Path to a YAML configuration file for server, CORS, upstream and viewer.
	/// Command line arguments override configuration file settings.
	#[arg(short = 'c', long, value_name = "FILE", display_order = 0)]
	pub config: Option<PathBuf>,

	/// Serve via socket ip. Default: 0.0.0.0
	#[arg(short = 'i', long, display_order = 0)]
	pub ip: Option<String>,

	/// Serve via port. Default: 8080
	#[arg(short, long, display_order = 0)]
	pub port: Option<u16>,

	/// Serve the map client from a local folder.
	#[arg(short = 's', long = "static", value_name = "DIR", display_order = 1)]
	pub static_dir: Option<PathBuf>,

	/// Access token of the mapping API. Overrides $MAPBOX_ACCESS_TOKEN.
	#[arg(long, display_order = 2)]
	pub token: Option<String>,

	/// Shutdown server automatically after x milliseconds.
	#[arg(long, display_order = 4)]
	pub auto_shutdown: Option<u64>,
}

/// Defaults, then config file, then environment, then command line.
pub fn load_config(arguments: &Subcommand) -> Result<Config> {
	let mut config = Config::from_optional_path(arguments.config.as_deref())?;
	config.apply_env();

	config.server.override_optional_ip(&arguments.ip);
	config.server.override_optional_port(&arguments.port);
	config.server.override_optional_static_dir(&arguments.static_dir);
	config.upstream.override_optional_access_token(&arguments.token);

	Ok(config)
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	let config = load_config(arguments)?;

	let mut server = FootprintServer::from_config(&config)?;

	eprintln!("   {:30}  <-  {}", "/api/*", config.upstream.base_url);
	if let Some(dir) = &config.server.static_dir {
		eprintln!("   {:30}  <-  {}", "/*", dir.display());
	}

	server.start().await?;
	eprintln!("listening on http://{}/", server.address());

	if let Some(milliseconds) = arguments.auto_shutdown {
		sleep(Duration::from_millis(milliseconds)).await;
	} else {
		loop {
			sleep(Duration::from_secs(60)).await;
		}
	}

	server.stop().await;
	Ok(())
}

#[cfg(test)]
mod tests {
	use crate::tests::run_command;
	use anyhow::Result;
	use std::io::Write;

	#[test]
	fn test_local() -> Result<()> {
		run_command(vec![
			"footprints",
			"serve",
			"-i",
			"127.0.0.1",
			"-p",
			"50401",
			"--token",
			"pk.test",
			"--auto-shutdown",
			"500",
		])?;
		Ok(())
	}

	#[test]
	fn test_config_file() -> Result<()> {
		let mut file = tempfile::NamedTempFile::new()?;
		writeln!(file, "server:\n  ip: 127.0.0.1\n  port: 50402\nupstream:\n  zoom: 17")?;
		let path = file.path().to_str().unwrap().to_string();
		run_command(vec!["footprints", "serve", "-c", &path, "--auto-shutdown", "300"])?;
		Ok(())
	}

	#[test]
	fn test_invalid_config_file() -> Result<()> {
		let mut file = tempfile::NamedTempFile::new()?;
		writeln!(file, "upstream:\n  base_url: ftp://example.org")?;
		let path = file.path().to_str().unwrap().to_string();
		let err = run_command(vec!["footprints", "serve", "-c", &path]).unwrap_err();
		assert!(err.to_string().contains("base_url"), "{err}");
		Ok(())
	}
}
