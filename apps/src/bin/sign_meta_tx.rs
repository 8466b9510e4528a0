use alloy_primitives::{Address, Bytes, U256};
use alloy_signer_local::PrivateKeySigner;
use anyhow::Result;
use clap::Parser;
use gateway::{sign_meta_transaction, typed_data};
use gateway_types::{Domain, MetaTransaction};
use tracing::info;

/// CLI to sign a meta-transaction for a relayer and print it as JSON.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// EIP-712 domain name of the target contract.
    #[clap(long)]
    name: String,

    /// Chain the target contract lives on.
    #[clap(long, env = "CHAIN_ID")]
    chain_id: u64,

    /// Address of the target (verifying) contract.
    #[clap(long)]
    contract: Address,

    /// The signer's current nonce on the target contract.
    #[clap(long, default_value = "0")]
    nonce: U256,

    /// ABI-encoded call, selector included, as hex.
    #[clap(long)]
    call: Bytes,

    /// Private key to sign with; if omitted, a random key is generated.
    #[clap(long, env = "USER_PRIVATE_KEY")]
    private_key: Option<PrivateKeySigner>,

    /// Also print the `eth_signTypedData_v4` payload.
    #[clap(long)]
    typed_data: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let signer = match args.private_key {
        Some(pk) => pk,
        None => PrivateKeySigner::random(),
    };
    let domain = Domain::new(args.name, args.chain_id, args.contract);

    let signed = sign_meta_transaction(&signer, &domain, args.nonce, &args.call)?;
    info!(from = %signed.from, contract = %signed.contract, nonce = %signed.nonce, "signed meta-transaction");

    if args.typed_data {
        let message = MetaTransaction {
            nonce: signed.nonce,
            from: signed.from,
            function_signature: signed.function_signature.clone(),
        };
        let payload = typed_data::typed_data_json(&domain, &message);
        let digest = typed_data::digest_from_json(&payload.to_string())?;
        eprintln!("Digest (EIP-712): {digest}");
        eprintln!("{}", serde_json::to_string_pretty(&payload)?);
    }

    println!("{}", serde_json::to_string_pretty(&signed)?);

    Ok(())
}
