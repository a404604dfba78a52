// obsync - Orange Book import and reference reconciliation

mod exit_codes;
mod import;
mod reference;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use orangebook_pipeline::CancelToken;
use tracing_subscriber::EnvFilter;

use exit_codes::EXIT_SUCCESS;
use reference::SeedTable;
use settings::ConfigCommands;

#[derive(Parser)]
#[command(name = "obsync")]
#[command(about = "Import the Orange Book products feed and link it to reference data")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a products.txt feed into the database
    #[command(after_help = "\
Examples:
  obsync import products.txt --db orangebook.sqlite
  obsync import products.txt --db orangebook.sqlite --json
  obsync import products.txt --db orangebook.sqlite --config strict.toml --output result.json

Logging goes to stderr; set RUST_LOG=debug for per-row detail.")]
    Import {
        /// `~`-delimited products file (first line is a header)
        file: PathBuf,

        /// SQLite database (created if missing)
        #[arg(long, env = "OBSYNC_DB")]
        db: PathBuf,

        /// Resolution config (TOML); defaults to the user config, then built-ins
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the JSON report to stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON report to a file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Load patent use codes (`code~definition`, first line is a header)
    #[command(after_help = "\
Examples:
  obsync use-codes patent_use_codes.txt --db orangebook.sqlite")]
    UseCodes {
        file: PathBuf,

        #[arg(long, env = "OBSYNC_DB")]
        db: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Load a reference table from CSV
    #[command(after_help = "\
Examples:
  obsync seed organizations organizations.csv --db orangebook.sqlite
  obsync seed categories categories.csv --db orangebook.sqlite --json")]
    Seed {
        #[arg(value_enum)]
        table: SeedTable,

        file: PathBuf,

        #[arg(long, env = "OBSYNC_DB")]
        db: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Inspect or validate resolution config
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Ctrl-C trips the import's cancel token. The run stops at the next row
/// boundary, keeps what it committed and exits with `EXIT_IMPORT_CANCELLED`.
fn install_ctrlc_handler(cancel: CancelToken) {
    let installed = ctrlc::set_handler(move || {
        if !cancel.is_cancelled() {
            eprintln!("\nReceived Ctrl-C. Finishing the current row and stopping...");
        }
        cancel.cancel();
    });
    if let Err(e) = installed {
        tracing::warn!("cannot install Ctrl-C handler: {e}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Import {
            file,
            db,
            config,
            json,
            output,
        } => {
            let cancel = CancelToken::new();
            install_ctrlc_handler(cancel.clone());
            import::cmd_import(file, db, config, json, output, &cancel)
        }
        Commands::UseCodes { file, db, json } => reference::cmd_use_codes(file, db, json),
        Commands::Seed {
            table,
            file,
            db,
            json,
        } => reference::cmd_seed(table, file, db, json),
        Commands::Config(cmd) => settings::cmd_config(cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}
