//! rest-mock command line.
//!
//! Validates mock configuration files and dry-runs a request against the
//! handlers they declare.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hyper::Method;
use serde_json::json;
use url::Url;

use rest_mock::config::load_config;
use rest_mock::handler::declarative::build_handlers;
use rest_mock::lifecycle;
use rest_mock::observability::logging;
use rest_mock::observability::record::SerializedResponse;
use rest_mock::{IncomingRequest, Rest};

#[derive(Parser)]
#[command(name = "rest-mock")]
#[command(about = "Validate and dry-run declarative HTTP mocks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a configuration file for errors
    Validate { config: PathBuf },
    /// Show which handler answers a request, and with what
    Check {
        config: PathBuf,

        #[arg(short, long, default_value = "GET")]
        method: String,

        #[arg(short, long)]
        url: Url,

        #[arg(short, long)]
        referrer: Option<String>,

        /// Request header as `name: value`, repeatable
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        #[arg(short, long)]
        body: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => {
            let loaded = load_config(&config)?;
            println!(
                "{}: ok ({} handlers)",
                config.display(),
                loaded.handlers.len()
            );
        }
        Commands::Check {
            config,
            method,
            url,
            referrer,
            headers,
            body,
        } => {
            let loaded = load_config(&config)?;
            logging::init(&loaded.diagnostics);

            let rest = Rest::from_config(&loaded)?;
            let handlers = build_handlers(&rest, &loaded)?;

            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
            let mut req = IncomingRequest::new(method, url);
            for header in &headers {
                let (name, value) = header
                    .split_once(':')
                    .ok_or_else(|| format!("header must look like `name: value`: {header}"))?;
                req = req.with_header(name.trim(), value.trim())?;
            }
            if let Some(referrer) = referrer {
                req = req.with_referrer(referrer);
            }
            if let Some(body) = body {
                req = req.with_body(body);
            }

            for handler in &handlers {
                if let Some(response) = lifecycle::run(handler, &req).await? {
                    let report = json!({
                        "handler": handler.info(),
                        "delay_ms": response.delay.as_millis() as u64,
                        "once": response.once,
                        "response": SerializedResponse::from(&response),
                    });
                    println!("{}", serde_json::to_string_pretty(&report)?);
                    return Ok(());
                }
            }

            tracing::warn!(method = %req.method, url = %req.url, "No handler matched");
            eprintln!("No handler matched {} {}", req.method, req.url);
            std::process::exit(1);
        }
    }

    Ok(())
}
