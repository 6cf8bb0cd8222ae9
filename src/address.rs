//! Address classification
//!
//! Decides which signing strategy an input needs from the address its
//! previous output was paid to. The verdict is computed once per input and
//! passed down as a [`SpendKind`].

use std::fmt;
use std::str::FromStr;

use bitcoin::{Address, AddressType, ScriptBuf};

use crate::error::{InscribeError, Result};
use crate::network::NetworkParams;

/// Textual prefix of mainnet base58 P2PKH addresses (version byte 0x00)
pub const LEGACY_P2PKH_PREFIX: char = '1';

/// Bech32 separator between the human-readable part and the data part
const BECH32_SEPARATOR: char = '1';

/// How an input is signed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpendKind {
    /// Taproot script-path reveal of an inscription leaf
    Taproot,
    /// Native segwit v0 (P2WPKH)
    NativeSegwit,
    /// Legacy P2PKH
    Legacy,
    /// P2SH-wrapped segwit, and anything else not matched above
    ScriptHashOrWrapped,
}

impl fmt::Display for SpendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpendKind::Taproot => "taproot",
            SpendKind::NativeSegwit => "native-segwit",
            SpendKind::Legacy => "legacy",
            SpendKind::ScriptHashOrWrapped => "p2sh-wrapped",
        };
        f.write_str(name)
    }
}

/// Decode an address and check it belongs to `params.network`
pub fn parse_address(address: &str, params: &NetworkParams) -> Result<Address> {
    let unchecked = Address::from_str(address.trim())?;
    unchecked.require_network(params.network).map_err(|e| {
        InscribeError::Decode(format!("address {} is not valid for {}: {}", address, params.network, e))
    })
}

/// Locking script of the output an address receives
pub fn script_pubkey_for(address: &str, params: &NetworkParams) -> Result<ScriptBuf> {
    Ok(parse_address(address, params)?.script_pubkey())
}

/// Whether the text before the last `'1'` matches the network's bech32 prefix.
///
/// This is a textual check only: the checksum is not validated, so a
/// malformed string with the right prefix still counts as segwit.
pub fn has_segwit_prefix(address: &str, params: &NetworkParams) -> bool {
    match address.rfind(BECH32_SEPARATOR) {
        Some(pos) => address[..pos].eq_ignore_ascii_case(&params.bech32_prefix),
        None => false,
    }
}

/// Classify the address an input's previous output was paid to
pub fn classify(address: &str, params: &NetworkParams) -> Result<SpendKind> {
    let address = address.trim();
    let decoded = parse_address(address, params)?;

    let kind = if decoded.address_type() == Some(AddressType::P2tr) {
        SpendKind::Taproot
    } else if has_segwit_prefix(address, params) {
        SpendKind::NativeSegwit
    } else if address.starts_with(LEGACY_P2PKH_PREFIX) {
        SpendKind::Legacy
    } else {
        SpendKind::ScriptHashOrWrapped
    };

    Ok(kind)
}
