//! INSCRIBE CLI - build and sign inscription reveal transactions

use anyhow::{anyhow, Context, Result};
use bitcoin::secp256k1::Secp256k1;
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use std::path::PathBuf;

use inscribe::brc20::{self, Brc20Operation, Brc20Params};
use inscribe::{commit_address, BuildRequest, Inscription, NetworkParams, PrivateKey};

/// Main CLI arguments
#[derive(Parser)]
#[command(name = "inscribe")]
#[command(about = "Build and sign Ordinals inscription reveal transactions")]
#[command(version = "0.1.0")]
struct Args {
    /// Network provider
    #[arg(short = 'p', long, default_value = "testnet")]
    provider: String,

    /// Custom network magic (overrides provider)
    #[arg(long)]
    magic: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Build and sign a transaction from a JSON request file
    Build {
        /// Path to the request file
        #[arg(long)]
        request: PathBuf,
    },
    /// Print the Taproot address to fund before revealing an inscription
    CommitAddress {
        /// Private key (hex) that will sign the reveal
        #[arg(long)]
        private_key: String,
        /// Content type of the inscription
        #[arg(long)]
        content_type: String,
        /// Body as text
        #[arg(long, conflicts_with = "body_hex")]
        body: Option<String>,
        /// Body as hex
        #[arg(long)]
        body_hex: Option<String>,
    },
    /// Print a BRC-20 inscription body
    Brc20 {
        /// Operation
        #[arg(value_enum)]
        operation: Brc20Op,
        /// Ticker
        #[arg(long)]
        tick: String,
        /// Amount (mint, transfer)
        #[arg(long)]
        amt: Option<String>,
        /// Maximum supply (deploy)
        #[arg(long)]
        max: Option<String>,
        /// Limit per mint (deploy)
        #[arg(long)]
        lim: Option<String>,
        /// Decimals (deploy)
        #[arg(long)]
        dec: Option<u8>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Brc20Op {
    Deploy,
    Mint,
    Transfer,
}

impl From<Brc20Op> for Brc20Operation {
    fn from(op: Brc20Op) -> Self {
        match op {
            Brc20Op::Deploy => Brc20Operation::Deploy,
            Brc20Op::Mint => Brc20Operation::Mint,
            Brc20Op::Transfer => Brc20Operation::Transfer,
        }
    }
}

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    // Determine network parameters based on provider and magic flags
    let network_params = if let Some(magic) = args.magic.as_ref() {
        NetworkParams::from_magic(magic).map_err(|e| anyhow!("Invalid magic value: {}", e))?
    } else {
        NetworkParams::from_provider(&args.provider)
            .map_err(|e| anyhow!("Invalid provider: {}", e))?
    };

    match args.command {
        Commands::Build { request } => {
            let build_request = BuildRequest::load_from_file(&request)
                .with_context(|| format!("Failed to load request {}", request.display()))?;
            let builder = build_request
                .into_builder(network_params)
                .context("Failed to prepare transaction builder")?;
            let raw_hex = builder.build().context("Failed to build transaction")?;
            println!("{}", raw_hex);
        }
        Commands::CommitAddress {
            private_key,
            content_type,
            body,
            body_hex,
        } => {
            let body = match (body, body_hex) {
                (_, Some(body_hex)) => hex::decode(body_hex.trim()).context("Invalid body hex")?,
                (Some(body), None) => body.into_bytes(),
                (None, None) => Vec::new(),
            };
            let private_key = PrivateKey::from_hex(&private_key).context("Invalid private key")?;
            let inscription = Inscription::new(content_type, body);

            let secp = Secp256k1::new();
            let address = commit_address(&secp, &private_key, &inscription, network_params.network)
                .context("Failed to derive commit address")?;
            info!("Commit address for {} byte inscription", inscription.body.len());
            println!("{}", address);
        }
        Commands::Brc20 {
            operation,
            tick,
            amt,
            max,
            lim,
            dec,
        } => {
            let params = Brc20Params {
                amount: amt,
                max_supply: max,
                limit_per_mint: lim,
                decimals: dec,
            };
            let inscription = brc20::inscription(operation.into(), &tick, &params)
                .context("Failed to create BRC-20 inscription")?;
            let output = serde_json::json!({
                "content_type": inscription.content_type,
                "body": String::from_utf8_lossy(&inscription.body),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
