//! `urlstate` command line tool.
//!
//! Decodes a URL against a parameter file, or replays root writes through an
//! in-memory navigator and prints where the URL ends up.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use urlstate_sync::{MemoryNavigator, QueryParams, SessionConfig};

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "urlstate")]
#[command(about = "Inspect and rewrite structured URL query state")]
#[command(version)]
struct Cli {
	/// Verbose logging
	#[arg(short, long, global = true)]
	verbose: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Print the structured snapshot of a URL
	Decode {
		/// Parameter file (TOML)
		#[arg(short, long, value_name = "FILE")]
		config: PathBuf,
		/// Path with query and hash, e.g. `/search?q=rust#top`
		href: String,
	},
	/// Apply root writes and print the resulting URL
	Set {
		/// Parameter file (TOML)
		#[arg(short, long, value_name = "FILE")]
		config: PathBuf,
		/// Starting path with query and hash
		href: String,
		/// Writes as `key=json`; `key=` removes the key
		#[arg(value_name = "KEY=VALUE", required = true, value_parser = parse_write)]
		writes: Vec<Write>,
	},
}

/// One `key=value` argument.
#[derive(Debug, Clone, PartialEq)]
struct Write {
	key: String,
	/// `None` removes the key.
	value: Option<Value>,
}

/// Right-hand sides that are not JSON are taken as plain strings.
fn parse_write(arg: &str) -> Result<Write, String> {
	let (key, raw) = arg.split_once('=').ok_or_else(|| format!("expected KEY=VALUE, got `{arg}`"))?;
	if key.is_empty() {
		return Err(format!("missing key in `{arg}`"));
	}
	let value = if raw.is_empty() {
		None
	} else {
		Some(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned())))
	};
	Ok(Write { key: key.to_owned(), value })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	tracing_subscriber::fmt()
		.with_max_level(if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO })
		.with_writer(std::io::stderr)
		.init();

	match cli.command {
		Command::Decode { config, href } => decode(&config, &href),
		Command::Set { config, href, writes } => set(&config, &href, writes).await,
	}
}

fn load(path: &Path) -> anyhow::Result<SessionConfig> {
	let source = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
	SessionConfig::from_toml_str(&source).with_context(|| format!("invalid parameter file {}", path.display()))
}

fn decode(config: &Path, href: &str) -> anyhow::Result<()> {
	let config = load(config)?;
	let registry = config.registry();
	let navigator = Arc::new(MemoryNavigator::new(href));
	// Reading must not rewrite the URL being inspected.
	let params = QueryParams::client(registry, navigator, config.options.show_defaults(false))?;
	println!("{}", serde_json::to_string_pretty(&params)?);
	Ok(())
}

async fn set(config: &Path, href: &str, writes: Vec<Write>) -> anyhow::Result<()> {
	let config = load(config)?;
	let registry = config.registry();
	let navigator = Arc::new(MemoryNavigator::new(href));
	let params = QueryParams::client(registry, navigator.clone(), config.options)?;

	for write in writes {
		tracing::debug!(key = %write.key, remove = write.value.is_none(), "applying write");
		match write.value {
			Some(value) => params.set(&write.key, value),
			None => params.remove(&write.key),
		}
	}
	params.settled().await;

	println!("{}", navigator.href());
	println!("navigations: {}", navigator.navigations().len());
	Ok(())
}
