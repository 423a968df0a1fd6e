//! fixturekit CLI
//!
//! Loads XML fixtures into a database and dumps live tables back out.
//!
//! ## Usage
//!
//! ```bash
//! fixturekit loaddata --profile liveDB.properties --operation refresh \
//!     --key ARTICLE_AUTHOR=AUTHOR_ID,LANG_CODE authors.xml
//! fixturekit dumpdata --profile prefDB.properties --output dump.xml CATEGORY ALERT_TYPE
//! ```
//!
//! Log output goes to stderr and follows `RUST_LOG` when set.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use colored::Colorize;
use fixturekit::commands::{
	DumpDataArgs, DumpDataCommand, DumpDataOptions, LoadDataArgs, LoadDataCommand, LoadDataOptions,
	parse_key_columns,
};
use fixturekit::{DatabaseOperation, FixtureFormat, NULL_TOKEN};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fixturekit")]
#[command(about = "Load, apply and dump DbUnit-style XML fixtures", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Verbosity level (can be repeated)
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	verbosity: u8,
}

#[derive(Subcommand)]
enum Commands {
	/// Install fixtures in the database
	Loaddata {
		/// Fixture files, applied in order
		#[arg(value_name = "FIXTURE", required = true)]
		fixtures: Vec<PathBuf>,

		/// Configuration profile (.properties or .toml)
		#[arg(short, long, value_name = "FILE")]
		profile: PathBuf,

		/// Let environment variables with this prefix override profile keys
		#[arg(long, value_name = "PREFIX")]
		env_prefix: Option<String>,

		/// DDL script executed before loading
		#[arg(short, long, value_name = "FILE")]
		schema: Option<PathBuf>,

		/// NONE, INSERT, CLEAN_INSERT, REFRESH, UPDATE, DELETE or DELETE_ALL
		#[arg(short, long, default_value = "CLEAN_INSERT")]
		operation: DatabaseOperation,

		/// Fixture layout: flat or full (detected when omitted)
		#[arg(short, long)]
		format: Option<FixtureFormat>,

		/// Key columns for REFRESH, UPDATE and DELETE (repeatable)
		#[arg(short, long = "key", value_name = "TABLE=COL,COL", value_parser = key_columns)]
		keys: Vec<(String, Vec<String>)>,

		/// Cell text loaded as null
		#[arg(long, value_name = "TEXT", default_value = NULL_TOKEN)]
		null_token: String,

		/// Apply statements without a transaction
		#[arg(long)]
		no_transaction: bool,
	},

	/// Write tables out as a fixture
	Dumpdata {
		/// Tables to dump, in output order (all tables when omitted)
		#[arg(value_name = "TABLE")]
		tables: Vec<String>,

		/// Configuration profile (.properties or .toml)
		#[arg(short, long, value_name = "FILE")]
		profile: PathBuf,

		/// Let environment variables with this prefix override profile keys
		#[arg(long, value_name = "PREFIX")]
		env_prefix: Option<String>,

		/// Output layout: flat or full
		#[arg(short, long, default_value = "flat")]
		format: FixtureFormat,

		/// Output file (defaults to stdout)
		#[arg(short = 'O', long, value_name = "FILE")]
		output: Option<PathBuf>,

		/// Order the rows of a table by these columns (repeatable)
		#[arg(short, long = "key", value_name = "TABLE=COL,COL", value_parser = key_columns)]
		keys: Vec<(String, Vec<String>)>,

		/// Text written for null cells
		#[arg(long, value_name = "TEXT", default_value = NULL_TOKEN)]
		null_token: String,

		/// Spaces per nesting level, 0 for one line
		#[arg(long, default_value_t = 2)]
		indent: usize,
	},
}

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	init_logging(cli.verbosity);

	let result = match cli.command {
		Commands::Loaddata {
			fixtures,
			profile,
			env_prefix,
			schema,
			operation,
			format,
			keys,
			null_token,
			no_transaction,
		} => {
			let mut options = LoadDataOptions::new()
				.with_profile(profile)
				.with_operation(operation)
				.with_null_token(null_token)
				.with_transaction(!no_transaction)
				.with_verbosity(cli.verbosity);
			options.env_prefix = env_prefix;
			options.schema = schema;
			options.format = format;
			for (table, columns) in keys {
				options = options.with_key(&table, columns);
			}
			run_loaddata(fixtures, options).await
		}
		Commands::Dumpdata {
			tables,
			profile,
			env_prefix,
			format,
			output,
			keys,
			null_token,
			indent,
		} => {
			let mut options = DumpDataOptions::new()
				.with_profile(profile)
				.with_format(format)
				.with_null_token(null_token)
				.with_indent(indent);
			options.env_prefix = env_prefix;
			options.output = output;
			for (table, columns) in keys {
				options = options.with_key(&table, columns);
			}
			run_dumpdata(tables, options).await
		}
	};

	if let Err(e) = result {
		eprintln!("{}: {:#}", "Error".red().bold(), e);
		process::exit(1);
	}
}

fn init_logging(verbosity: u8) {
	let default_level = match verbosity {
		0 => "warn",
		1 => "info",
		_ => "debug",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}

fn key_columns(spec: &str) -> Result<(String, Vec<String>), String> {
	parse_key_columns(spec).map_err(|e| e.to_string())
}

async fn run_loaddata(fixtures: Vec<PathBuf>, options: LoadDataOptions) -> anyhow::Result<()> {
	let operation = options.operation;
	let result = LoadDataCommand::new()
		.execute(LoadDataArgs { fixture_paths: fixtures }, options)
		.await?;

	println!(
		"{} {} fixture(s) with {}",
		"Loaded".green(),
		result.fixtures_loaded,
		operation.to_string().cyan()
	);
	Ok(())
}

async fn run_dumpdata(tables: Vec<String>, options: DumpDataOptions) -> anyhow::Result<()> {
	let output = options.output.clone();
	let result = DumpDataCommand::new()
		.execute(DumpDataArgs { tables }, options)
		.await?;

	match output {
		Some(path) => eprintln!(
			"{} {} table(s), {} row(s) to {}",
			"Dumped".green(),
			result.tables,
			result.rows,
			path.display()
		),
		None => println!("{}", result.content),
	}
	Ok(())
}
