//! Local, trusted access to the same read/append operations the HTTP
//! endpoint exposes. Request validation is skipped.

use std::process::ExitCode;

use bitacora_common::id::{prefix, prefixed_ulid};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing::Instrument;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sheets_api::config::{self, Config};
use sheets_api::error::ApiError;
use sheets_api::sheets::{self, Reply, SheetsRequest};
use sheets_api::validation::{RequestContext, RequestValidator};

#[derive(Parser)]
#[command(name = "sheets-cli")]
#[command(about = "Read or append spreadsheet rows from the command line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the values of a sheet as JSON
    Read {
        /// Sheet type (logistica, contactos, usuarios)
        #[arg(long)]
        tipo: String,
    },

    /// Append rows to a sheet
    Write {
        /// Sheet type (logistica, contactos, usuarios)
        #[arg(long, required_unless_present = "body", requires = "rows")]
        tipo: Option<String>,
        /// JSON array of rows, e.g. '[["Alice","555-1234"]]'
        #[arg(long, requires = "tipo")]
        rows: Option<String>,
        /// Full write payload, sent as an HTTP client would, e.g.
        /// '{"tipo":"contactos","rows":[["Alice"]]}'
        #[arg(long, conflicts_with_all = ["tipo", "rows"])]
        body: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    config::load_env_files();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let span = tracing::info_span!("cli", invocation = %prefixed_ulid(prefix::CLI));

    match run(cli).instrument(span).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err.message(), "command failed");
            println!("{}", json!({ "ok": false, "error": err.message() }));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<Value, ApiError> {
    let config = Config::from_env().map_err(|e| ApiError::internal(e.to_string()))?;
    let backend = sheets::connect(&config)?;

    RequestValidator::new(&config).validate_request(&RequestContext::local())?;

    let (action, tipo, body) = match cli.command {
        Commands::Read { tipo } => ("read", Some(tipo), String::new()),
        Commands::Write { body: Some(body), .. } => ("write", None, body),
        Commands::Write { tipo, rows, .. } => ("write", None, write_body(tipo, rows)?),
    };

    let req = SheetsRequest {
        action: Some(action),
        tipo: tipo.as_deref(),
        body: body.as_bytes(),
    };

    match sheets::dispatch(&config, backend.as_ref(), &req).await? {
        Reply::Read(data) => Ok(json!({ "ok": true, "data": data })),
        Reply::Written { rows } => Ok(json!({ "ok": true, "rows": rows })),
        Reply::InvalidAction => Err(ApiError::bad_request("Invalid action")),
    }
}

/// Build the write payload from `--tipo` and `--rows`.
fn write_body(tipo: Option<String>, rows: Option<String>) -> Result<String, ApiError> {
    let rows: Value = serde_json::from_str(rows.as_deref().unwrap_or_default())
        .map_err(|e| ApiError::bad_request(format!("--rows is not valid JSON: {e}")))?;
    Ok(json!({ "tipo": tipo.unwrap_or_default(), "rows": rows }).to_string())
}
