//! Network parameters for address classification
//!
//! Carries the pieces of a network's address encoding the classifier needs:
//! the bech32 human-readable prefix and the base58 version bytes.

use bitcoin::Network;

use crate::error::{InscribeError, Result};

/// Network parameters for address encoding
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkParams {
    /// Bech32 prefix (e.g., "bc" for mainnet, "tb" for testnet)
    pub bech32_prefix: String,
    /// P2PKH address prefix (e.g., 0x00 for mainnet, 0x6f for testnet)
    pub p2pkh_prefix: u8,
    /// P2SH address prefix (e.g., 0x05 for mainnet, 0xc4 for testnet)
    pub p2sh_prefix: u8,
    /// Bitcoin network (mainnet, testnet, signet, regtest)
    pub network: Network,
}

impl NetworkParams {
    /// Create network parameters for mainnet
    pub fn mainnet() -> Self {
        Self {
            bech32_prefix: String::from("bc"),
            p2pkh_prefix: 0x00,
            p2sh_prefix: 0x05,
            network: Network::Bitcoin,
        }
    }

    /// Create network parameters for testnet
    pub fn testnet() -> Self {
        Self {
            bech32_prefix: String::from("tb"),
            p2pkh_prefix: 0x6f,
            p2sh_prefix: 0xc4,
            network: Network::Testnet,
        }
    }

    /// Create network parameters for signet (uses testnet address encoding)
    pub fn signet() -> Self {
        Self {
            bech32_prefix: String::from("tb"),
            p2pkh_prefix: 0x6f,
            p2sh_prefix: 0xc4,
            network: Network::Signet,
        }
    }

    /// Create network parameters for regtest
    pub fn regtest() -> Self {
        Self {
            bech32_prefix: String::from("bcrt"),
            p2pkh_prefix: 0x6f,
            p2sh_prefix: 0xc4,
            network: Network::Regtest,
        }
    }

    /// Get the network parameters for a given provider preset
    pub fn from_provider(provider: &str) -> Result<Self> {
        match provider.to_lowercase().as_str() {
            "mainnet" | "bitcoin" => Ok(Self::mainnet()),
            "testnet" => Ok(Self::testnet()),
            "signet" => Ok(Self::signet()),
            "regtest" | "localhost" => Ok(Self::regtest()),
            _ => Err(InscribeError::Decode(format!(
                "Unknown provider: {}. Supported networks: mainnet, testnet, signet, regtest",
                provider
            ))),
        }
    }

    /// Create network parameters from a network name or a magic string
    /// of the form "p2sh_prefix:p2pkh_prefix:bech32_prefix", e.g. "05:00:bc".
    ///
    /// The bech32 prefix selects the network used for address decoding, so
    /// only `bc`, `tb` and `bcrt` are accepted.
    pub fn from_magic(magic: &str) -> Result<Self> {
        if let Ok(params) = Self::from_provider(magic) {
            return Ok(params);
        }

        let parts: Vec<&str> = magic.split(':').collect();
        if parts.len() != 3 {
            return Err(InscribeError::Decode(format!(
                "Invalid magic format. Expected network name or 'p2sh_prefix:p2pkh_prefix:bech32_prefix', got '{}'",
                magic
            )));
        }

        let p2sh_prefix = u8::from_str_radix(parts[0], 16)
            .map_err(|_| InscribeError::Decode(format!("Invalid p2sh_prefix: {}", parts[0])))?;
        let p2pkh_prefix = u8::from_str_radix(parts[1], 16)
            .map_err(|_| InscribeError::Decode(format!("Invalid p2pkh_prefix: {}", parts[1])))?;

        let bech32_prefix = parts[2].to_lowercase();
        let network = match bech32_prefix.as_str() {
            "bc" => Network::Bitcoin,
            "tb" => Network::Testnet,
            "bcrt" => Network::Regtest,
            other => {
                return Err(InscribeError::Decode(format!(
                    "Unsupported bech32 prefix '{}'. Expected bc, tb or bcrt",
                    other
                )))
            }
        };

        Ok(Self {
            bech32_prefix,
            p2pkh_prefix,
            p2sh_prefix,
            network,
        })
    }
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self::testnet()
    }
}
