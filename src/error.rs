//! Error types for transaction building and signing
//!
//! Every failure surfaced by [`crate::TransactionBuilder::build`] is one of
//! the variants below. A failed build leaves nothing usable behind.

use thiserror::Error;

/// Errors raised while accumulating, signing or serializing a transaction
#[derive(Debug, Error)]
pub enum InscribeError {
    /// Empty input/output set or a change amount above the configured ceiling
    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed transaction id, address, private key, public key or amount
    #[error("Decode error: {0}")]
    Decode(String),

    /// Failure building a locking, reveal or redeem script
    #[error("Script construction error: {0}")]
    ScriptConstruction(String),

    /// Signature algorithm or signature-hash failure
    #[error("Signing error: {0}")]
    Signing(String),

    /// Final wire-encoding failure
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, InscribeError>;

impl From<hex::FromHexError> for InscribeError {
    fn from(err: hex::FromHexError) -> Self {
        InscribeError::Decode(format!("invalid hex: {}", err))
    }
}

impl From<bitcoin::address::ParseError> for InscribeError {
    fn from(err: bitcoin::address::ParseError) -> Self {
        InscribeError::Decode(format!("invalid address: {}", err))
    }
}

impl From<secp256k1::Error> for InscribeError {
    fn from(err: secp256k1::Error) -> Self {
        InscribeError::Decode(format!("invalid key material: {}", err))
    }
}

impl From<bitcoin::script::PushBytesError> for InscribeError {
    fn from(err: bitcoin::script::PushBytesError) -> Self {
        InscribeError::ScriptConstruction(format!("push too large: {}", err))
    }
}

impl From<bitcoin::sighash::TaprootError> for InscribeError {
    fn from(err: bitcoin::sighash::TaprootError) -> Self {
        InscribeError::Signing(format!("taproot sighash: {}", err))
    }
}

impl From<std::io::Error> for InscribeError {
    fn from(err: std::io::Error) -> Self {
        InscribeError::Serialization(err.to_string())
    }
}
