use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod error;
mod evaluation;
mod logging;
mod models;
mod output;
mod server;

use crate::config::Config;
use crate::evaluation::Evaluator;
use crate::models::{EvaluationInput, EvaluationRequest};
use crate::output::OutputFormat;

/// Heuristic LLM evaluation stub - scores answers with token overlap heuristics
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output - log every request at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP evaluation server (default)
    Serve {
        /// Address to bind, overrides config and environment
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on, overrides config and environment
        #[arg(long)]
        port: Option<u16>,
    },
    /// Score a JSON request file locally and print the result
    Eval {
        /// Path to a JSON evaluation request
        request_file: PathBuf,

        /// Output format: plain or json
        #[arg(short, long, default_value = "plain")]
        format: OutputFormat,
    },
}

/// Load `.env` if present; a missing file is not an error
fn load_dotenv() -> anyhow::Result<()> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(err).context("Failed to load .env file"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    load_dotenv()?;
    let mut config = Config::load(args.config.as_deref())?;
    logging::init_tracing(&config.logging, args.verbose)?;

    let command = args.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    });

    match command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            server::serve(config.server).await
        }
        Command::Eval {
            request_file,
            format,
        } => {
            let request = EvaluationRequest::from_file(&request_file)?;
            let input = EvaluationInput::from(request);
            let response = Evaluator::new().evaluate(&input);

            output::print_response(&response, &input.metrics, format)
        }
    }
}
