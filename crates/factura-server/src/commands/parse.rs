//! Parse command - run the extraction pipeline on a local file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use serde::Deserialize;
use tracing::{debug, info};

use factura_core::models::config::api_key_from_env;
use factura_core::{ExtractionOutcome, InvoiceEnvelope, InvoiceExtractor, OpenAiClient};

use super::load_config;

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON
    #[arg(long)]
    pretty: bool,

    /// Report inconsistencies in the extracted amounts
    #[arg(long)]
    check: bool,
}

pub async fn run(args: ParseArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let api_key = api_key_from_env()?;
    let client = OpenAiClient::new(api_key, &config.upstream)?;
    let extractor = InvoiceExtractor::new(Arc::new(client)).with_config(&config.extraction);

    info!("Processing file: {}", args.input.display());

    let outcome = extractor.process_file(&args.input).await;

    if args.check {
        report_issues(&outcome);
    }

    let failed = outcome.is_error();
    let body = outcome.into_value();
    let output = if args.pretty {
        serde_json::to_string_pretty(&body)?
    } else {
        serde_json::to_string(&body)?
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    if failed {
        anyhow::bail!("Extraction failed for {}", args.input.display());
    }
    Ok(())
}

fn report_issues(outcome: &ExtractionOutcome) {
    let ExtractionOutcome::Parsed(value) = outcome else {
        return;
    };

    match InvoiceEnvelope::deserialize(value) {
        Ok(envelope) => {
            let issues = envelope.invoice.issues();
            if !issues.is_empty() {
                eprintln!("{}", style("Validation issues:").yellow());
                for issue in &issues {
                    eprintln!("  - {}", issue);
                }
            }
        }
        Err(e) => {
            eprintln!(
                "{} Reply does not match the invoice schema: {}",
                style("!").yellow(),
                e
            );
        }
    }
}
