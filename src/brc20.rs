//! BRC-20 inscription payloads
//!
//! BRC-20 operations are plain JSON inscriptions. This module builds the
//! JSON bodies for `deploy`, `mint` and `transfer` and wraps them as an
//! [`Inscription`] ready to be revealed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::envelope::Inscription;
use crate::error::{InscribeError, Result};

/// Protocol identifier carried in the `p` field
pub const BRC20_PROTOCOL: &str = "brc-20";

/// Content type of every BRC-20 inscription
pub const BRC20_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

/// BRC20 inscription content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brc20InscriptionContent {
    /// Protocol
    pub p: String,
    /// Operation
    pub op: String,
    /// Ticker
    pub tick: String,
    /// Maximum supply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
    /// Limit per mint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lim: Option<String>,
    /// Decimals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dec: Option<String>,
    /// Amount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amt: Option<String>,
}

/// BRC20 operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Brc20Operation {
    /// Deploy a new token
    Deploy,
    /// Mint tokens
    Mint,
    /// Transfer tokens
    Transfer,
}

impl fmt::Display for Brc20Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Brc20Operation::Deploy => write!(f, "deploy"),
            Brc20Operation::Mint => write!(f, "mint"),
            Brc20Operation::Transfer => write!(f, "transfer"),
        }
    }
}

impl FromStr for Brc20Operation {
    type Err = InscribeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "deploy" => Ok(Brc20Operation::Deploy),
            "mint" => Ok(Brc20Operation::Mint),
            "transfer" => Ok(Brc20Operation::Transfer),
            other => Err(InscribeError::Decode(format!("unknown BRC-20 operation: {}", other))),
        }
    }
}

/// Operation parameters; fields that do not apply to the operation are ignored
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Brc20Params {
    pub amount: Option<String>,
    pub max_supply: Option<String>,
    pub limit_per_mint: Option<String>,
    pub decimals: Option<u8>,
}

/// Serialize the JSON body for `operation` on `ticker`.
///
/// Deploy requires a maximum supply; mint and transfer require an amount.
pub fn create_inscription_content(
    operation: Brc20Operation,
    ticker: &str,
    params: &Brc20Params,
) -> Result<String> {
    if ticker.is_empty() {
        return Err(InscribeError::Validation("BRC-20 ticker is empty".to_string()));
    }

    let mut content = Brc20InscriptionContent {
        p: BRC20_PROTOCOL.to_string(),
        op: operation.to_string(),
        tick: ticker.to_string(),
        max: None,
        lim: None,
        dec: None,
        amt: None,
    };

    match operation {
        Brc20Operation::Deploy => {
            content.max = Some(params.max_supply.clone().ok_or_else(|| {
                InscribeError::Validation("deploy requires a maximum supply".to_string())
            })?);
            content.lim = params.limit_per_mint.clone();
            content.dec = params.decimals.map(|d| d.to_string());
        }
        Brc20Operation::Mint | Brc20Operation::Transfer => {
            content.amt = Some(params.amount.clone().ok_or_else(|| {
                InscribeError::Validation(format!("{} requires an amount", operation))
            })?);
        }
    }

    serde_json::to_string(&content).map_err(|e| {
        InscribeError::Serialization(format!("failed to serialize BRC-20 content: {}", e))
    })
}

/// Build the inscription for a BRC-20 operation
pub fn inscription(
    operation: Brc20Operation,
    ticker: &str,
    params: &Brc20Params,
) -> Result<Inscription> {
    let body = create_inscription_content(operation, ticker, params)?;
    Ok(Inscription::new(BRC20_CONTENT_TYPE, body.into_bytes()))
}
