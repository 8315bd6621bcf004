mod cmd;
mod output;
mod prompts;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::{ModuleArgs, cmd_codegen, cmd_init_config, cmd_run};
use crate::output::{OutputFormat, print_error};

/// csmod - build-environment construction for C# modules
#[derive(Parser)]
#[command(name = "csmod")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Configuration file (default: <config dir>/csmod/config.json if present)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build the module tree and write it to the output directory
  Codegen {
    #[command(flatten)]
    module: ModuleArgs,

    /// Directory the generated tree is written to (default: the context directory)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
  },

  /// Build the module environment and run the module
  Run {
    #[command(flatten)]
    module: ModuleArgs,
  },

  /// Write the default configuration
  InitConfig {
    /// Destination (default: <config dir>/csmod/config.json)
    #[arg(long)]
    path: Option<PathBuf>,

    /// Overwrite an existing file without asking
    #[arg(short, long)]
    force: bool,
  },
}

fn init_tracing(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let result = match cli.command {
    Commands::Codegen { module, output, format } => cmd_codegen(cli.config.as_deref(), &module, output, format),
    Commands::Run { module } => cmd_run(cli.config.as_deref(), &module).map(|code| {
      if code != 0 {
        std::process::exit(code);
      }
    }),
    Commands::InitConfig { path, force } => cmd_init_config(path, force),
  };

  if let Err(err) = result {
    print_error(&format!("{err:#}"));
    std::process::exit(1);
  }
}
