//! Key and signature value types
//!
//! Private and public keys are validated when they are constructed so that a
//! malformed key fails at the input boundary instead of deep inside signing.

use bitcoin::hashes::Hash;
use bitcoin::key::{Keypair, UntweakedPublicKey};
use bitcoin::{EcdsaSighashType, PubkeyHash, TapSighashType, WPubkeyHash};
use secp256k1::{Message, Secp256k1, SecretKey, Signing, Verification};

use crate::error::{InscribeError, Result};

/// A secp256k1 signing key parsed from hex
#[derive(Clone, Copy)]
pub struct PrivateKey {
    secret: SecretKey,
}

impl PrivateKey {
    /// Parse a 32-byte private key from hex
    pub fn from_hex(private_key_hex: &str) -> Result<Self> {
        let bytes = hex::decode(private_key_hex.trim())
            .map_err(|e| InscribeError::Decode(format!("invalid private key hex: {}", e)))?;
        Self::from_slice(&bytes)
    }

    /// Build a private key from raw bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let secret = SecretKey::from_slice(bytes)
            .map_err(|e| InscribeError::Decode(format!("invalid private key: {}", e)))?;
        Ok(Self { secret })
    }

    /// Derive the matching public key
    pub fn public_key<C: Signing>(&self, secp: &Secp256k1<C>) -> PublicKey {
        PublicKey(secp256k1::PublicKey::from_secret_key(secp, &self.secret))
    }

    /// Sign a 32-byte digest with ECDSA and tag it with `SIGHASH_ALL`
    pub fn sign_ecdsa<C: Signing>(&self, secp: &Secp256k1<C>, digest: [u8; 32]) -> Signature {
        let message = Message::from_digest(digest);
        let signature = secp.sign_ecdsa(&message, &self.secret);
        Signature::Ecdsa(bitcoin::ecdsa::Signature {
            signature,
            sighash_type: EcdsaSighashType::All,
        })
    }

    /// Sign a 32-byte digest with BIP340 Schnorr using the untweaked key.
    ///
    /// No auxiliary randomness is mixed in, so the signature is deterministic.
    pub fn sign_schnorr<C: Signing>(&self, secp: &Secp256k1<C>, digest: [u8; 32]) -> Signature {
        let keypair = Keypair::from_secret_key(secp, &self.secret);
        let message = Message::from_digest(digest);
        let signature = secp.sign_schnorr_no_aux_rand(&message, &keypair);
        Signature::Schnorr(bitcoin::taproot::Signature {
            signature,
            sighash_type: TapSighashType::Default,
        })
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// A validated secp256k1 public key
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey(secp256k1::PublicKey);

impl PublicKey {
    /// Parse a compressed (33-byte) or uncompressed (65-byte) public key
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        secp256k1::PublicKey::from_slice(bytes)
            .map(Self)
            .map_err(|e| InscribeError::Decode(format!("invalid public key: {}", e)))
    }

    /// The underlying secp256k1 key
    pub fn inner(&self) -> &secp256k1::PublicKey {
        &self.0
    }

    /// 33-byte compressed SEC1 serialization
    pub fn compressed(&self) -> [u8; 33] {
        self.0.serialize()
    }

    /// 65-byte uncompressed SEC1 serialization
    pub fn uncompressed(&self) -> [u8; 65] {
        self.0.serialize_uncompressed()
    }

    /// 32-byte x-only key used as the Taproot internal key
    pub fn x_only(&self) -> UntweakedPublicKey {
        self.0.x_only_public_key().0
    }

    /// HASH160 of the compressed key
    pub fn pubkey_hash(&self) -> PubkeyHash {
        PubkeyHash::hash(&self.compressed())
    }

    /// HASH160 of the compressed key, as a witness program
    pub fn wpubkey_hash(&self) -> WPubkeyHash {
        WPubkeyHash::hash(&self.compressed())
    }

    /// Verify `signature` over `digest` against this key
    pub fn verify<C: Verification>(
        &self,
        secp: &Secp256k1<C>,
        digest: [u8; 32],
        signature: &Signature,
    ) -> bool {
        let message = Message::from_digest(digest);
        match signature {
            Signature::Ecdsa(sig) => secp.verify_ecdsa(&message, &sig.signature, &self.0).is_ok(),
            Signature::Schnorr(sig) => secp
                .verify_schnorr(&sig.signature, &message, &self.x_only())
                .is_ok(),
        }
    }
}

/// A signature ready to be placed in a witness or scriptSig
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signature {
    /// DER-encoded ECDSA with a trailing sighash byte
    Ecdsa(bitcoin::ecdsa::Signature),
    /// 64-byte BIP340 signature (default sighash, no trailing byte)
    Schnorr(bitcoin::taproot::Signature),
}

impl Signature {
    /// Wire bytes as they appear in the witness stack or scriptSig
    pub fn to_vec(&self) -> Vec<u8> {
        match self {
            Signature::Ecdsa(sig) => sig.to_vec(),
            Signature::Schnorr(sig) => sig.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HEX: &str = "0000000000000000000000000000000000000000000000000000000000000001";

    #[test]
    fn test_private_key_parsing() {
        assert!(PrivateKey::from_hex(KEY_HEX).is_ok());
        assert!(matches!(PrivateKey::from_hex("xyz"), Err(InscribeError::Decode(_))));
        // Zero is not a valid scalar
        assert!(PrivateKey::from_hex(&"00".repeat(32)).is_err());
        // Wrong length
        assert!(PrivateKey::from_hex("01").is_err());
    }

    #[test]
    fn test_public_key_serializations() {
        let secp = Secp256k1::new();
        let key = PrivateKey::from_hex(KEY_HEX).unwrap().public_key(&secp);

        // Generator point
        assert_eq!(
            hex::encode(key.compressed()),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
        assert_eq!(key.uncompressed()[0], 0x04);
        assert_eq!(key.x_only().serialize(), key.compressed()[1..]);

        let reparsed = PublicKey::from_slice(&key.uncompressed()).unwrap();
        assert_eq!(reparsed, key);
        assert!(PublicKey::from_slice(&[0x05; 33]).is_err());
    }

    #[test]
    fn test_signatures_verify() {
        let secp = Secp256k1::new();
        let private_key = PrivateKey::from_hex(KEY_HEX).unwrap();
        let public_key = private_key.public_key(&secp);
        let digest = [7u8; 32];

        let ecdsa = private_key.sign_ecdsa(&secp, digest);
        assert!(public_key.verify(&secp, digest, &ecdsa));
        assert_eq!(*ecdsa.to_vec().last().unwrap(), 0x01);

        let schnorr = private_key.sign_schnorr(&secp, digest);
        assert!(public_key.verify(&secp, digest, &schnorr));
        assert_eq!(schnorr.to_vec().len(), 64);
        assert!(!public_key.verify(&secp, [8u8; 32], &schnorr));

        // Deterministic signing
        assert_eq!(schnorr, private_key.sign_schnorr(&secp, digest));
        assert_eq!(ecdsa, private_key.sign_ecdsa(&secp, digest));
    }
}
