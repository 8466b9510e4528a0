use std::fs;
use std::path::PathBuf;

use alloy_primitives::{Address, Bytes, U256};
use anyhow::{bail, Context, Result};
use clap::Parser;
use gateway::{Network, Outcome};
use gateway_types::{NetworkConfig, Submission};
use serde::Serialize;
use tracing::{debug, info, warn};

/// CLI that deploys the configured contracts in memory and relays a batch of
/// direct calls and signed meta-transactions against them, in order.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Network configuration (chain id and deployments) as JSON.
    #[clap(long, value_name = "FILE", env = "GATEWAY_CONFIG")]
    config: PathBuf,

    /// JSON array of submissions to relay.
    #[clap(long, value_name = "FILE")]
    submissions: PathBuf,

    /// Address recorded as the relayer of every meta-transaction.
    #[clap(long, env = "RELAYER_ADDRESS", default_value_t = Address::ZERO)]
    relayer: Address,

    /// Exit with an error if any submission fails.
    #[clap(long)]
    strict: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    index: usize,
    target: Address,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    nonce: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    return_data: Option<Bytes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    // Load environment variables if present
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment variables from {:?}", path),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => bail!("failed to load .env file: {}", e),
    }

    let args = Args::parse();

    let config: NetworkConfig = serde_json::from_slice(
        &fs::read(&args.config).with_context(|| format!("reading {}", args.config.display()))?,
    )
    .context("parsing network config")?;
    let submissions: Vec<Submission> = serde_json::from_slice(
        &fs::read(&args.submissions)
            .with_context(|| format!("reading {}", args.submissions.display()))?,
    )
    .context("parsing submissions")?;

    let network = Network::from_config(&config)?;
    for domain in network.domains() {
        info!(name = %domain.name, chain_id = domain.chain_id, contract = %domain.verifying_contract, "contract ready");
    }

    let mut failures = 0usize;
    let mut reports = Vec::with_capacity(submissions.len());
    for (index, submission) in submissions.iter().enumerate() {
        let target = submission.target();
        let report = match network.submit(args.relayer, submission) {
            Ok(Outcome::Called(return_data)) => {
                info!(index, %target, "direct call succeeded");
                Report {
                    index,
                    target,
                    ok: true,
                    nonce: None,
                    return_data: Some(return_data),
                    error: None,
                }
            }
            Ok(Outcome::Executed(receipt)) => {
                info!(index, %target, user = %receipt.event.user, nonce = %receipt.nonce, "meta-transaction executed");
                Report {
                    index,
                    target,
                    ok: true,
                    nonce: Some(receipt.nonce),
                    return_data: Some(receipt.return_data),
                    error: None,
                }
            }
            Err(e) => {
                warn!(index, %target, "submission failed: {e}");
                failures += 1;
                Report {
                    index,
                    target,
                    ok: false,
                    nonce: None,
                    return_data: None,
                    error: Some(e.to_string()),
                }
            }
        };
        reports.push(report);
    }

    println!("{}", serde_json::to_string_pretty(&reports)?);

    if args.strict && failures > 0 {
        bail!("{failures} of {} submissions failed", submissions.len());
    }
    Ok(())
}
