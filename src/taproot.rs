//! Taproot commitments for inscription reveals
//!
//! A reveal commits to exactly one leaf, so the Merkle root is the leaf's
//! tap-hash and the control block carries no inclusion proof.

use bitcoin::key::{TapTweak, TweakedPublicKey, UntweakedPublicKey};
use bitcoin::secp256k1::{Parity, Secp256k1, Signing, Verification};
use bitcoin::taproot::{ControlBlock, LeafVersion, TapLeafHash, TapNodeHash};
use bitcoin::{Address, Network, Script, ScriptBuf};
use log::debug;

use crate::envelope::Inscription;
use crate::error::{InscribeError, Result};
use crate::keys::PrivateKey;

/// Output key for a key-path-only Taproot output (no script tree)
pub fn key_path_output_key<C: Verification>(
    secp: &Secp256k1<C>,
    internal_key: UntweakedPublicKey,
) -> TweakedPublicKey {
    internal_key.tap_tweak(secp, None).0
}

/// Key-path-only Taproot address for `internal_key`
pub fn key_path_address<C: Verification>(
    secp: &Secp256k1<C>,
    internal_key: UntweakedPublicKey,
    network: Network,
) -> Address {
    Address::p2tr_tweaked(key_path_output_key(secp, internal_key), network)
}

/// A single-leaf script-path commitment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptCommitment {
    /// Untweaked internal key
    pub internal_key: UntweakedPublicKey,
    /// The committed leaf script
    pub leaf_script: ScriptBuf,
    /// Tap-hash of the leaf (also the Merkle root)
    pub leaf_hash: TapLeafHash,
    /// Internal key tweaked by the leaf hash
    pub output_key: TweakedPublicKey,
    /// Parity of the output key
    pub output_key_parity: Parity,
}

impl ScriptCommitment {
    /// Commit `leaf_script` under `internal_key`
    pub fn new<C: Verification>(
        secp: &Secp256k1<C>,
        internal_key: UntweakedPublicKey,
        leaf_script: ScriptBuf,
    ) -> Self {
        let leaf_hash = TapLeafHash::from_script(&leaf_script, LeafVersion::TapScript);
        let merkle_root = TapNodeHash::from(leaf_hash);
        let (output_key, output_key_parity) = internal_key.tap_tweak(secp, Some(merkle_root));

        Self {
            internal_key,
            leaf_script,
            leaf_hash,
            output_key,
            output_key_parity,
        }
    }

    /// Control block proving the leaf is committed under the output key.
    ///
    /// Layout: `leaf_version | parity`, the 32-byte internal key, and an
    /// empty Merkle path.
    pub fn control_block(&self) -> Result<ControlBlock> {
        let mut bytes = Vec::with_capacity(33);
        bytes.push(LeafVersion::TapScript.to_consensus() | self.output_key_parity.to_u8());
        bytes.extend_from_slice(&self.internal_key.serialize());

        let control_block = ControlBlock::decode(&bytes).map_err(|e| {
            InscribeError::ScriptConstruction(format!("invalid control block: {}", e))
        })?;
        debug!("Built control block: {} bytes", bytes.len());
        Ok(control_block)
    }

    /// Locking script of the committed output
    pub fn script_pubkey(&self) -> ScriptBuf {
        ScriptBuf::new_p2tr_tweaked(self.output_key)
    }

    /// Address of the committed output
    pub fn address(&self, network: Network) -> Address {
        Address::p2tr_tweaked(self.output_key, network)
    }
}

/// Address that must be funded before `inscription` can be revealed with
/// `private_key`.
///
/// The internal key is the key's x-only public key, and the single leaf is
/// the reveal script built from the same key.
pub fn commit_address<C: Signing + Verification>(
    secp: &Secp256k1<C>,
    private_key: &PrivateKey,
    inscription: &Inscription,
    network: Network,
) -> Result<Address> {
    let internal_key = private_key.public_key(secp).x_only();
    let script = inscription.reveal_script(&internal_key)?;
    Ok(ScriptCommitment::new(secp, internal_key, script).address(network))
}

/// Check that `control_block` proves `leaf_script` under `output_key`
pub fn verify_control_block<C: Verification>(
    secp: &Secp256k1<C>,
    control_block: &ControlBlock,
    output_key: TweakedPublicKey,
    leaf_script: &Script,
) -> bool {
    control_block.verify_taproot_commitment(secp, output_key.to_x_only_public_key(), leaf_script)
}
