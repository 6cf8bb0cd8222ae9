//! Build requests loaded from JSON
//!
//! ```json
//! {
//!   "inputs": [{
//!     "txid": "…", "vout": 1, "private_key": "…", "address": "tb1p…",
//!     "amount": "1600",
//!     "inscription": { "content_type": "text/plain;charset=utf-8", "body": "…" }
//!   }],
//!   "outputs": [{ "address": "tb1p…", "amount": "546" }],
//!   "max_change": 1000000
//! }
//! ```
//!
//! An inscription carries either a UTF-8 `body` or a hex `body_hex`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::builder::{BuilderConfig, Input, Output, TransactionBuilder};
use crate::envelope::Inscription;
use crate::error::{InscribeError, Result};
use crate::network::NetworkParams;

/// Inscription as written in a request file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InscriptionEntry {
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_hex: Option<String>,
}

impl InscriptionEntry {
    /// Decode into an [`Inscription`]
    pub fn to_inscription(&self) -> Result<Inscription> {
        let body = match (&self.body, &self.body_hex) {
            (Some(text), None) => text.as_bytes().to_vec(),
            (None, Some(hex_body)) => hex::decode(hex_body.trim())?,
            (Some(_), Some(_)) => {
                return Err(InscribeError::Validation(
                    "inscription has both body and body_hex".to_string(),
                ))
            }
            (None, None) => Vec::new(),
        };
        Ok(Inscription::new(self.content_type.clone(), body))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEntry {
    pub txid: String,
    pub vout: u32,
    pub private_key: String,
    pub address: String,
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inscription: Option<InscriptionEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEntry {
    pub address: String,
    pub amount: String,
}

/// A complete build request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequest {
    pub inputs: Vec<InputEntry>,
    pub outputs: Vec<OutputEntry>,
    /// Overrides the default change ceiling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_change: Option<u64>,
}

impl BuildRequest {
    /// Parse a request from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| InscribeError::Decode(format!("invalid build request: {}", e)))
    }

    /// Load a request from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            InscribeError::Serialization(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Write the request back out as pretty JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| InscribeError::Serialization(format!("failed to encode request: {}", e)))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Turn the request into a builder for `network`
    pub fn into_builder(self, network: NetworkParams) -> Result<TransactionBuilder> {
        let mut config = BuilderConfig::new(network);
        if let Some(max_change) = self.max_change {
            config.max_change = max_change;
        }

        let mut builder = TransactionBuilder::new(config);
        for entry in self.inputs {
            let mut input =
                Input::new(entry.txid, entry.vout, entry.private_key, entry.address, entry.amount);
            if let Some(inscription) = entry.inscription {
                input = input.with_inscription(inscription.to_inscription()?);
            }
            builder.add_input(input);
        }
        for entry in self.outputs {
            builder.add_output(Output::new(entry.address, entry.amount));
        }
        Ok(builder)
    }
}
