//! Per-input signing procedures
//!
//! Each procedure is a pure function of the spend kind, the input being
//! signed and the frozen unsigned transaction. It returns the scriptSig and
//! witness for that input and touches nothing else, so the builder can sign
//! every input against the same transaction before writing any of them back.

use bitcoin::script::{Builder as ScriptBuilder, PushBytesBuf};
use bitcoin::secp256k1::{Secp256k1, Signing, Verification};
use bitcoin::{ScriptBuf, Transaction, TxOut, Witness};
use log::{debug, warn};

use crate::address::SpendKind;
use crate::envelope::Inscription;
use crate::error::{InscribeError, Result};
use crate::keys::{PrivateKey, PublicKey};
use crate::sighash::{legacy_sighash, p2wpkh_script_code, segwit_v0_sighash, taproot_script_spend_sighash};
use crate::taproot::ScriptCommitment;

/// Transaction-wide data shared by every input's signing procedure
pub struct SigningContext<'a, C: Signing + Verification> {
    /// secp256k1 context
    pub secp: &'a Secp256k1<C>,
    /// Unsigned transaction, frozen while signing
    pub tx: &'a Transaction,
    /// Previous output of every input, in input order
    pub prevouts: &'a [TxOut],
}

impl<'a, C: Signing + Verification> SigningContext<'a, C> {
    fn prevout(&self, index: usize) -> Result<&'a TxOut> {
        self.prevouts.get(index).ok_or_else(|| {
            InscribeError::Signing(format!("no previous output recorded for input {}", index))
        })
    }
}

/// The input being signed
pub struct InputToSign<'a> {
    /// Position in the transaction
    pub index: usize,
    /// Spending key
    pub private_key: &'a PrivateKey,
    /// Envelope payload, required for Taproot inputs
    pub inscription: Option<&'a Inscription>,
}

/// Unlocking data produced for one input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignedInput {
    pub script_sig: ScriptBuf,
    pub witness: Witness,
}

/// Dispatch to the signing procedure for `kind`
pub fn sign_input<C: Signing + Verification>(
    kind: SpendKind,
    input: &InputToSign<'_>,
    ctx: &SigningContext<'_, C>,
) -> Result<SignedInput> {
    debug!("Signing input {} as {}", input.index, kind);
    match kind {
        SpendKind::Taproot => sign_taproot(input, ctx),
        SpendKind::NativeSegwit => sign_native_segwit(input, ctx),
        SpendKind::Legacy => sign_legacy(input, ctx),
        SpendKind::ScriptHashOrWrapped => sign_wrapped_segwit(input, ctx),
    }
}

/// Script-path reveal: witness is `[signature, reveal script, control block]`
pub fn sign_taproot<C: Signing + Verification>(
    input: &InputToSign<'_>,
    ctx: &SigningContext<'_, C>,
) -> Result<SignedInput> {
    let inscription = input.inscription.ok_or_else(|| {
        InscribeError::Validation(format!(
            "input {} spends a taproot output but carries no inscription",
            input.index
        ))
    })?;

    let internal_key = input.private_key.public_key(ctx.secp).x_only();
    let reveal_script = inscription.reveal_script(&internal_key)?;
    let commitment = ScriptCommitment::new(ctx.secp, internal_key, reveal_script);
    let control_block = commitment.control_block()?;

    if ctx.prevout(input.index)?.script_pubkey != commitment.script_pubkey() {
        warn!(
            "Input {} previous output does not pay to the reveal commitment",
            input.index
        );
    }

    let sighash =
        taproot_script_spend_sighash(ctx.tx, ctx.prevouts, input.index, commitment.leaf_hash)?;
    let signature = input.private_key.sign_schnorr(ctx.secp, sighash);

    let mut witness = Witness::new();
    witness.push(signature.to_vec());
    witness.push(commitment.leaf_script.as_bytes());
    witness.push(control_block.serialize());

    Ok(SignedInput {
        script_sig: ScriptBuf::new(),
        witness,
    })
}

/// P2WPKH: witness is `[signature || sighash type, compressed public key]`
pub fn sign_native_segwit<C: Signing + Verification>(
    input: &InputToSign<'_>,
    ctx: &SigningContext<'_, C>,
) -> Result<SignedInput> {
    let public_key = input.private_key.public_key(ctx.secp);
    Ok(SignedInput {
        script_sig: ScriptBuf::new(),
        witness: segwit_v0_witness(input, &public_key, ctx)?,
    })
}

/// P2PKH: scriptSig is `<signature || sighash type> <compressed public key>`
pub fn sign_legacy<C: Signing + Verification>(
    input: &InputToSign<'_>,
    ctx: &SigningContext<'_, C>,
) -> Result<SignedInput> {
    let public_key = input.private_key.public_key(ctx.secp);
    let prevout = ctx.prevout(input.index)?;

    let sighash = legacy_sighash(ctx.tx, input.index, &prevout.script_pubkey)?;
    let signature = input.private_key.sign_ecdsa(ctx.secp, sighash);

    let script_sig = ScriptBuilder::new()
        .push_slice(PushBytesBuf::try_from(signature.to_vec())?)
        .push_slice(public_key.compressed())
        .into_script();

    Ok(SignedInput {
        script_sig,
        witness: Witness::new(),
    })
}

/// P2SH-wrapped P2WPKH: the P2WPKH witness plus a scriptSig pushing the
/// 22-byte redeem script `OP_0 <20-byte key hash>`
pub fn sign_wrapped_segwit<C: Signing + Verification>(
    input: &InputToSign<'_>,
    ctx: &SigningContext<'_, C>,
) -> Result<SignedInput> {
    let public_key = input.private_key.public_key(ctx.secp);
    let witness = segwit_v0_witness(input, &public_key, ctx)?;

    let script_sig = ScriptBuilder::new()
        .push_slice(PushBytesBuf::try_from(redeem_script(&public_key).into_bytes())?)
        .into_script();

    Ok(SignedInput { script_sig, witness })
}

/// Witness program wrapped by a P2SH-P2WPKH output
pub fn redeem_script(public_key: &PublicKey) -> ScriptBuf {
    ScriptBuf::new_p2wpkh(&public_key.wpubkey_hash())
}

fn segwit_v0_witness<C: Signing + Verification>(
    input: &InputToSign<'_>,
    public_key: &PublicKey,
    ctx: &SigningContext<'_, C>,
) -> Result<Witness> {
    let prevout = ctx.prevout(input.index)?;
    let script_code = p2wpkh_script_code(public_key);

    let sighash = segwit_v0_sighash(ctx.tx, input.index, &script_code, prevout.value)?;
    let signature = input.private_key.sign_ecdsa(ctx.secp, sighash);

    let mut witness = Witness::new();
    witness.push(signature.to_vec());
    witness.push(public_key.compressed());
    Ok(witness)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::absolute::LockTime;
    use bitcoin::hashes::Hash;
    use bitcoin::transaction::Version;
    use bitcoin::{Amount, OutPoint, ScriptHash, Sequence, TxIn, Txid};
    use std::str::FromStr;

    fn unsigned_tx(prevout: &TxOut) -> Transaction {
        Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: vec![TxIn {
                previous_output: OutPoint {
                    txid: Txid::from_str(
                        "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b",
                    )
                    .unwrap(),
                    vout: 0,
                },
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness: Witness::new(),
            }],
            output: vec![TxOut {
                value: Amount::from_sat(prevout.value.to_sat() - 200),
                script_pubkey: prevout.script_pubkey.clone(),
            }],
        }
    }

    fn key() -> PrivateKey {
        PrivateKey::from_slice(&[0x11; 32]).unwrap()
    }

    #[test]
    fn test_wrapped_segwit_script_sig_is_23_bytes() {
        let secp = Secp256k1::new();
        let private_key = key();
        let public_key = private_key.public_key(&secp);
        let prevout = TxOut {
            value: Amount::from_sat(10_000),
            script_pubkey: ScriptBuf::new_p2sh(&ScriptHash::hash(
                redeem_script(&public_key).as_bytes(),
            )),
        };
        let tx = unsigned_tx(&prevout);
        let prevouts = [prevout];
        let ctx = SigningContext { secp: &secp, tx: &tx, prevouts: &prevouts };
        let input = InputToSign { index: 0, private_key: &private_key, inscription: None };

        let signed = sign_input(SpendKind::ScriptHashOrWrapped, &input, &ctx).unwrap();
        let bytes = signed.script_sig.as_bytes();
        assert_eq!(bytes.len(), 23);
        assert_eq!(&bytes[..3], &[0x16, 0x00, 0x14]);
        assert_eq!(&bytes[3..], &public_key.wpubkey_hash().to_byte_array()[..]);
        assert_eq!(signed.witness.len(), 2);
        assert_eq!(signed.witness.nth(1).unwrap(), &public_key.compressed()[..]);
    }

    #[test]
    fn test_legacy_script_sig_shape() {
        let secp = Secp256k1::new();
        let private_key = key();
        let public_key = private_key.public_key(&secp);
        let prevout = TxOut {
            value: Amount::from_sat(10_000),
            script_pubkey: ScriptBuf::new_p2pkh(&public_key.pubkey_hash()),
        };
        let tx = unsigned_tx(&prevout);
        let prevouts = [prevout];
        let ctx = SigningContext { secp: &secp, tx: &tx, prevouts: &prevouts };
        let input = InputToSign { index: 0, private_key: &private_key, inscription: None };

        let signed = sign_input(SpendKind::Legacy, &input, &ctx).unwrap();
        assert!(signed.witness.is_empty());

        let pushes: Vec<Vec<u8>> = signed
            .script_sig
            .instructions()
            .map(|i| i.unwrap().push_bytes().unwrap().as_bytes().to_vec())
            .collect();
        assert_eq!(pushes.len(), 2);
        assert_eq!(*pushes[0].last().unwrap(), 0x01);
        assert_eq!(pushes[1], public_key.compressed().to_vec());
    }

    #[test]
    fn test_taproot_requires_inscription() {
        let secp = Secp256k1::new();
        let private_key = key();
        let prevout = TxOut {
            value: Amount::from_sat(10_000),
            script_pubkey: ScriptBuf::new(),
        };
        let tx = unsigned_tx(&prevout);
        let prevouts = [prevout];
        let ctx = SigningContext { secp: &secp, tx: &tx, prevouts: &prevouts };
        let input = InputToSign { index: 0, private_key: &private_key, inscription: None };

        assert!(matches!(
            sign_input(SpendKind::Taproot, &input, &ctx),
            Err(InscribeError::Validation(_))
        ));
    }

    #[test]
    fn test_missing_prevout_is_signing_error() {
        let secp = Secp256k1::new();
        let private_key = key();
        let prevout = TxOut {
            value: Amount::from_sat(10_000),
            script_pubkey: ScriptBuf::new(),
        };
        let tx = unsigned_tx(&prevout);
        let ctx = SigningContext { secp: &secp, tx: &tx, prevouts: &[] };
        let input = InputToSign { index: 0, private_key: &private_key, inscription: None };

        assert!(matches!(
            sign_input(SpendKind::NativeSegwit, &input, &ctx),
            Err(InscribeError::Signing(_))
        ));
    }
}
