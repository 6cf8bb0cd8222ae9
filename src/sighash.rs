//! Signature hashes for the supported spend types
//!
//! - Taproot script-path (BIP341), through `SighashCache`
//! - Segwit v0 (BIP143), with the preimage assembled here byte by byte
//! - Legacy P2PKH, through `SighashCache`

use bitcoin::consensus::encode::serialize;
use bitcoin::hashes::{sha256d, Hash};
use bitcoin::sighash::{Prevouts, SighashCache};
use bitcoin::taproot::TapLeafHash;
use bitcoin::{Amount, EcdsaSighashType, Script, ScriptBuf, TapSighashType, Transaction, TxOut};

use crate::error::{InscribeError, Result};
use crate::keys::PublicKey;

/// `SIGHASH_ALL` as written into segwit v0 preimages
pub const SIGHASH_ALL: u32 = 0x01;

/// P2PKH-equivalent script code used when signing a P2WPKH spend
pub fn p2wpkh_script_code(public_key: &PublicKey) -> ScriptBuf {
    ScriptBuf::new_p2pkh(&public_key.pubkey_hash())
}

fn hash_prevouts(tx: &Transaction) -> [u8; 32] {
    let mut data = Vec::with_capacity(tx.input.len() * 36);
    for input in &tx.input {
        data.extend_from_slice(&serialize(&input.previous_output));
    }
    sha256d::Hash::hash(&data).to_byte_array()
}

fn hash_sequences(tx: &Transaction) -> [u8; 32] {
    let mut data = Vec::with_capacity(tx.input.len() * 4);
    for input in &tx.input {
        data.extend_from_slice(&input.sequence.0.to_le_bytes());
    }
    sha256d::Hash::hash(&data).to_byte_array()
}

fn hash_outputs(tx: &Transaction) -> [u8; 32] {
    let mut data = Vec::new();
    for output in &tx.output {
        data.extend_from_slice(&serialize(output));
    }
    sha256d::Hash::hash(&data).to_byte_array()
}

/// BIP143 preimage for `SIGHASH_ALL`.
///
/// Layout, in order: version, hashPrevouts, hashSequence, outpoint,
/// scriptCode (length-prefixed), value, sequence, hashOutputs, lock time,
/// sighash type.
pub fn segwit_v0_preimage(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    value: Amount,
) -> Result<Vec<u8>> {
    let input = tx.input.get(input_index).ok_or_else(|| {
        InscribeError::Signing(format!(
            "input index {} out of range for {} inputs",
            input_index,
            tx.input.len()
        ))
    })?;

    let mut preimage = Vec::with_capacity(156 + script_code.len());
    preimage.extend_from_slice(&tx.version.0.to_le_bytes());
    preimage.extend_from_slice(&hash_prevouts(tx));
    preimage.extend_from_slice(&hash_sequences(tx));
    preimage.extend_from_slice(input.previous_output.txid.as_byte_array());
    preimage.extend_from_slice(&input.previous_output.vout.to_le_bytes());
    preimage.extend_from_slice(&serialize(&script_code.to_owned()));
    preimage.extend_from_slice(&value.to_sat().to_le_bytes());
    preimage.extend_from_slice(&input.sequence.0.to_le_bytes());
    preimage.extend_from_slice(&hash_outputs(tx));
    preimage.extend_from_slice(&tx.lock_time.to_consensus_u32().to_le_bytes());
    preimage.extend_from_slice(&SIGHASH_ALL.to_le_bytes());

    Ok(preimage)
}

/// Double-SHA256 of the BIP143 preimage
pub fn segwit_v0_sighash(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    value: Amount,
) -> Result<[u8; 32]> {
    let preimage = segwit_v0_preimage(tx, input_index, script_code, value)?;
    Ok(sha256d::Hash::hash(&preimage).to_byte_array())
}

/// BIP341 script-path sighash with the default sighash type.
///
/// `prevouts` must hold the spent output of every input, in input order.
pub fn taproot_script_spend_sighash(
    tx: &Transaction,
    prevouts: &[TxOut],
    input_index: usize,
    leaf_hash: TapLeafHash,
) -> Result<[u8; 32]> {
    if prevouts.len() != tx.input.len() {
        return Err(InscribeError::Signing(format!(
            "expected {} previous outputs, got {}",
            tx.input.len(),
            prevouts.len()
        )));
    }

    let mut cache = SighashCache::new(tx);
    let sighash = cache.taproot_script_spend_signature_hash(
        input_index,
        &Prevouts::All(prevouts),
        leaf_hash,
        TapSighashType::Default,
    )?;
    Ok(sighash.to_byte_array())
}

/// Legacy sighash for spending `script_pubkey` with `SIGHASH_ALL`
pub fn legacy_sighash(
    tx: &Transaction,
    input_index: usize,
    script_pubkey: &Script,
) -> Result<[u8; 32]> {
    let cache = SighashCache::new(tx);
    let sighash = cache
        .legacy_signature_hash(input_index, script_pubkey, EcdsaSighashType::All.to_u32())
        .map_err(|e| InscribeError::Signing(format!("legacy sighash: {}", e)))?;
    Ok(sighash.to_byte_array())
}
