//! Reveal transaction builder
//!
//! Inputs and outputs are accumulated in order, then [`TransactionBuilder::build`]
//! validates the change invariant, signs every input and serializes the
//! result. A build either returns a fully signed transaction or an error;
//! the builder itself is never mutated by a build.

use bitcoin::absolute::LockTime;
use bitcoin::consensus::encode::serialize_hex;
use bitcoin::secp256k1::Secp256k1;
use bitcoin::transaction::Version;
use bitcoin::{Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, Witness};
use log::{debug, info};
use std::str::FromStr;

use crate::address::{classify, script_pubkey_for, SpendKind};
use crate::envelope::Inscription;
use crate::error::{InscribeError, Result};
use crate::keys::PrivateKey;
use crate::network::NetworkParams;
use crate::signer::{sign_input, InputToSign, SigningContext};

/// Default change ceiling: 0.01 BTC in satoshis
pub const DEFAULT_MAX_CHANGE: u64 = 1_000_000;

/// Length of a display-order txid in hex characters
const TXID_HEX_LEN: usize = 64;

/// A previous output to spend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    /// Previous transaction id, display-order hex
    pub txid: String,
    /// Previous output index
    pub vout: u32,
    /// Spending private key, hex
    pub private_key: String,
    /// Address the previous output was paid to
    pub address: String,
    /// Previous output value in satoshis, decimal
    pub amount: String,
    /// Envelope payload; only Taproot inputs use it
    pub inscription: Option<Inscription>,
}

impl Input {
    pub fn new(
        txid: impl Into<String>,
        vout: u32,
        private_key: impl Into<String>,
        address: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            txid: txid.into(),
            vout,
            private_key: private_key.into(),
            address: address.into(),
            amount: amount.into(),
            inscription: None,
        }
    }

    /// Attach the inscription revealed by this input
    pub fn with_inscription(mut self, inscription: Inscription) -> Self {
        self.inscription = Some(inscription);
        self
    }
}

/// A payment to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// Destination address
    pub address: String,
    /// Amount in satoshis, decimal
    pub amount: String,
}

impl Output {
    pub fn new(address: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            amount: amount.into(),
        }
    }
}

/// Builder configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Address encoding of the target network
    pub network: NetworkParams,
    /// A build fails when inputs exceed outputs by this many satoshis or more
    pub max_change: u64,
    /// Transaction version
    pub version: i32,
    /// Transaction lock time (consensus encoding)
    pub lock_time: u32,
    /// Sequence number written on every input
    pub sequence: u32,
}

impl BuilderConfig {
    /// Defaults for `network`
    pub fn new(network: NetworkParams) -> Self {
        Self {
            network,
            max_change: DEFAULT_MAX_CHANGE,
            version: 2,
            lock_time: 0,
            sequence: Sequence::MAX.0,
        }
    }

    pub fn with_max_change(mut self, max_change: u64) -> Self {
        self.max_change = max_change;
        self
    }
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self::new(NetworkParams::default())
    }
}

/// Accumulates inputs and outputs, then signs and serializes them
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    config: BuilderConfig,
    inputs: Vec<Input>,
    outputs: Vec<Output>,
}

/// An input after its fields have been decoded
struct ResolvedInput<'a> {
    outpoint: OutPoint,
    private_key: PrivateKey,
    prevout: TxOut,
    kind: SpendKind,
    inscription: Option<&'a Inscription>,
}

impl TransactionBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self {
            config,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// Append an input
    pub fn add_input(&mut self, input: Input) -> &mut Self {
        self.inputs.push(input);
        self
    }

    /// Append an output
    pub fn add_output(&mut self, output: Output) -> &mut Self {
        self.outputs.push(output);
        self
    }

    /// Sign and serialize, returning the raw transaction as lowercase hex
    pub fn build(&self) -> Result<String> {
        let tx = self.build_transaction()?;
        Ok(serialize_hex(&tx))
    }

    /// Sign every input and return the finished transaction
    pub fn build_transaction(&self) -> Result<Transaction> {
        self.validate()?;

        let network = &self.config.network;
        let resolved = self
            .inputs
            .iter()
            .map(|input| resolve_input(input, network))
            .collect::<Result<Vec<_>>>()?;

        let output = self
            .outputs
            .iter()
            .map(|output| {
                Ok(TxOut {
                    value: Amount::from_sat(parse_amount(&output.amount)?),
                    script_pubkey: script_pubkey_for(&output.address, network)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut tx = Transaction {
            version: Version(self.config.version),
            lock_time: LockTime::from_consensus(self.config.lock_time),
            input: resolved
                .iter()
                .map(|r| TxIn {
                    previous_output: r.outpoint,
                    script_sig: ScriptBuf::new(),
                    sequence: Sequence(self.config.sequence),
                    witness: Witness::new(),
                })
                .collect(),
            output,
        };

        let prevouts: Vec<TxOut> = resolved.iter().map(|r| r.prevout.clone()).collect();
        let secp = Secp256k1::new();
        let ctx = SigningContext {
            secp: &secp,
            tx: &tx,
            prevouts: &prevouts,
        };

        let signed = resolved
            .iter()
            .enumerate()
            .map(|(index, r)| {
                let input = InputToSign {
                    index,
                    private_key: &r.private_key,
                    inscription: r.inscription,
                };
                sign_input(r.kind, &input, &ctx)
            })
            .collect::<Result<Vec<_>>>()?;

        for (txin, signed) in tx.input.iter_mut().zip(signed) {
            txin.script_sig = signed.script_sig;
            txin.witness = signed.witness;
        }

        info!(
            "Built transaction {} with {} inputs and {} outputs ({} vbytes)",
            tx.compute_txid(),
            tx.input.len(),
            tx.output.len(),
            tx.vsize()
        );
        Ok(tx)
    }

    /// Check the non-empty and change invariants
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(InscribeError::Validation("transaction has no inputs".to_string()));
        }
        if self.outputs.is_empty() {
            return Err(InscribeError::Validation("transaction has no outputs".to_string()));
        }

        let change = self.change()?;
        if change >= i128::from(self.config.max_change) {
            return Err(InscribeError::Validation(format!(
                "change of {} sat reaches the maximum of {} sat",
                change, self.config.max_change
            )));
        }
        debug!("Change: {} sat", change);
        Ok(())
    }

    /// Sum of input values minus sum of output values; may be negative
    pub fn change(&self) -> Result<i128> {
        let mut total_in = 0i128;
        for input in &self.inputs {
            total_in += i128::from(parse_amount(&input.amount)?);
        }
        let mut total_out = 0i128;
        for output in &self.outputs {
            total_out += i128::from(parse_amount(&output.amount)?);
        }
        Ok(total_in - total_out)
    }
}

fn resolve_input<'a>(input: &'a Input, network: &NetworkParams) -> Result<ResolvedInput<'a>> {
    let outpoint = OutPoint {
        txid: parse_txid(&input.txid)?,
        vout: input.vout,
    };
    let private_key = PrivateKey::from_hex(&input.private_key)?;
    let prevout = TxOut {
        value: Amount::from_sat(parse_amount(&input.amount)?),
        script_pubkey: script_pubkey_for(&input.address, network)?,
    };
    let kind = classify(&input.address, network)?;
    debug!("Input {} classified as {}", outpoint, kind);

    Ok(ResolvedInput {
        outpoint,
        private_key,
        prevout,
        kind,
        inscription: input.inscription.as_ref(),
    })
}

/// Parse a display-order txid, left-padding short strings with zeros
pub fn parse_txid(txid: &str) -> Result<Txid> {
    let txid = txid.trim();
    if txid.len() > TXID_HEX_LEN {
        return Err(InscribeError::Decode(format!(
            "txid has {} hex characters, expected at most {}",
            txid.len(),
            TXID_HEX_LEN
        )));
    }
    let padded = format!("{:0>width$}", txid, width = TXID_HEX_LEN);
    Txid::from_str(&padded).map_err(|e| InscribeError::Decode(format!("invalid txid {}: {}", txid, e)))
}

/// Parse a decimal satoshi amount
pub fn parse_amount(amount: &str) -> Result<u64> {
    amount
        .trim()
        .parse::<u64>()
        .map_err(|e| InscribeError::Decode(format!("invalid amount {:?}: {}", amount, e)))
}
