use anyhow::Result;
use bitcoin::consensus::encode::deserialize;
use bitcoin::hashes::Hash;
use bitcoin::secp256k1::{schnorr, Message, Secp256k1, SecretKey};
use bitcoin::sighash::{Prevouts, SighashCache};
use bitcoin::taproot::ControlBlock;
use bitcoin::{Address, Amount, Network, ScriptBuf, TapSighashType, Transaction, TxOut};

use inscribe::brc20::{self, Brc20Operation, Brc20Params};
use inscribe::envelope::parse_reveal_script;
use inscribe::taproot::key_path_address;
use inscribe::{
    commit_address, BuilderConfig, InscribeError, Inscription, Input, NetworkParams, Output,
    PrivateKey, ScriptCommitment, TransactionBuilder,
};

const PREVIOUS_TXID: &str = "9f9ff5acc7b3966ccfc6acc77027209d62aab34e563a09180c58ef7296fca74";
const PRIVATE_KEY: &str = "e54ae5a9cba4c4d2ef3b3ef1fbc8ec5b8a3a6ef2b4b2e4e9a7f4e0c2d1b3a596";

fn transfer_inscription() -> Result<Inscription> {
    Ok(brc20::inscription(
        Brc20Operation::Transfer,
        "ordi",
        &Brc20Params {
            amount: Some("1".to_string()),
            ..Default::default()
        },
    )?)
}

fn receive_address(seed: u8) -> Address {
    let secp = Secp256k1::new();
    let key = SecretKey::from_slice(&[seed; 32]).unwrap().x_only_public_key(&secp).0;
    key_path_address(&secp, key, Network::Testnet)
}

fn reveal_builder() -> Result<(TransactionBuilder, Address)> {
    let _ = env_logger::builder().is_test(true).try_init();

    let secp = Secp256k1::new();
    let inscription = transfer_inscription()?;
    let private_key = PrivateKey::from_hex(PRIVATE_KEY)?;
    let funding = commit_address(&secp, &private_key, &inscription, Network::Testnet)?;

    let mut builder = TransactionBuilder::new(BuilderConfig::new(NetworkParams::testnet()));
    builder
        .add_input(
            Input::new(PREVIOUS_TXID, 1, PRIVATE_KEY, funding.to_string(), "1600")
                .with_inscription(inscription),
        )
        .add_output(Output::new(receive_address(2).to_string(), "546"))
        .add_output(Output::new(receive_address(3).to_string(), "754"));
    Ok((builder, funding))
}

#[test]
fn test_brc20_transfer_reveal() -> Result<()> {
    let (builder, funding) = reveal_builder()?;
    let tx = builder.build_transaction()?;

    assert_eq!(tx.input.len(), 1);
    assert_eq!(tx.input[0].previous_output.txid.to_string(), format!("0{}", PREVIOUS_TXID));
    assert_eq!(tx.input[0].previous_output.vout, 1);
    assert!(tx.input[0].script_sig.is_empty());

    assert_eq!(tx.output.len(), 2);
    assert_eq!(tx.output[0].value, Amount::from_sat(546));
    assert_eq!(tx.output[1].value, Amount::from_sat(754));
    assert_eq!(tx.output[0].script_pubkey, receive_address(2).script_pubkey());
    assert_eq!(tx.output[1].script_pubkey, receive_address(3).script_pubkey());

    let witness = tx.input[0].witness.to_vec();
    assert_eq!(witness.len(), 3);
    assert_eq!(witness[0].len(), 64);
    assert_eq!(witness[2].len(), 33);

    // The reveal script carries the BRC-20 body
    let reveal_script = ScriptBuf::from_bytes(witness[1].clone());
    assert_eq!(parse_reveal_script(&reveal_script), Some(transfer_inscription()?));

    // The control block proves the script under the funded output key
    let secp = Secp256k1::new();
    let private_key = PrivateKey::from_hex(PRIVATE_KEY)?;
    let internal_key = private_key.public_key(&secp).x_only();
    let commitment = ScriptCommitment::new(&secp, internal_key, reveal_script.clone());
    assert_eq!(commitment.script_pubkey(), funding.script_pubkey());

    let control_block = ControlBlock::decode(&witness[2])?;
    assert_eq!(control_block.internal_key, internal_key);
    assert!(control_block.verify_taproot_commitment(
        &secp,
        commitment.output_key.to_x_only_public_key(),
        &reveal_script
    ));

    // The signature verifies against an independently computed sighash
    let prevouts = [TxOut {
        value: Amount::from_sat(1600),
        script_pubkey: funding.script_pubkey(),
    }];
    let sighash = SighashCache::new(&tx).taproot_script_spend_signature_hash(
        0,
        &Prevouts::All(&prevouts),
        commitment.leaf_hash,
        TapSighashType::Default,
    )?;
    let signature = schnorr::Signature::from_slice(&witness[0])?;
    secp.verify_schnorr(
        &signature,
        &Message::from_digest(sighash.to_byte_array()),
        &internal_key,
    )?;

    Ok(())
}

#[test]
fn test_reveal_is_deterministic() -> Result<()> {
    let (first, _) = reveal_builder()?;
    let (second, _) = reveal_builder()?;

    let first_hex = first.build()?;
    assert_eq!(first_hex, second.build()?);
    assert_eq!(first_hex, first.build()?);
    assert_eq!(first_hex, first_hex.to_lowercase());

    let decoded: Transaction = deserialize(&hex::decode(&first_hex)?)?;
    assert_eq!(decoded, first.build_transaction()?);
    Ok(())
}

#[test]
fn test_taproot_input_without_inscription_fails() -> Result<()> {
    let secp = Secp256k1::new();
    let private_key = PrivateKey::from_hex(PRIVATE_KEY)?;
    let address = key_path_address(&secp, private_key.public_key(&secp).x_only(), Network::Testnet);

    let mut builder = TransactionBuilder::new(BuilderConfig::new(NetworkParams::testnet()));
    builder
        .add_input(Input::new(PREVIOUS_TXID, 0, PRIVATE_KEY, address.to_string(), "1600"))
        .add_output(Output::new(receive_address(2).to_string(), "1000"));

    assert!(builder.build().is_err());
    Ok(())
}

#[test]
fn test_large_inscription_reveal() -> Result<()> {
    let secp = Secp256k1::new();
    let inscription = Inscription::new("application/octet-stream", vec![0x5a; 4000]);
    let private_key = PrivateKey::from_hex(PRIVATE_KEY)?;
    let funding = commit_address(&secp, &private_key, &inscription, Network::Testnet)?;

    let mut builder = TransactionBuilder::new(BuilderConfig::new(NetworkParams::testnet()));
    builder
        .add_input(
            Input::new(PREVIOUS_TXID, 0, PRIVATE_KEY, funding.to_string(), "20000")
                .with_inscription(inscription.clone()),
        )
        .add_output(Output::new(receive_address(4).to_string(), "10000"));

    let tx = builder.build_transaction()?;
    let witness = tx.input[0].witness.to_vec();
    let reveal_script = ScriptBuf::from_bytes(witness[1].clone());
    assert_eq!(parse_reveal_script(&reveal_script), Some(inscription));
    Ok(())
}

#[test]
fn test_change_ceiling_blocks_reveal() -> Result<()> {
    let (mut builder, funding) = reveal_builder()?;
    builder.add_input(Input::new(PREVIOUS_TXID, 2, PRIVATE_KEY, funding.to_string(), "1000000"));

    match builder.build() {
        Err(InscribeError::Validation(_)) => Ok(()),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_reveal_from_uncommitted_output_still_builds() -> Result<()> {
    let secp = Secp256k1::new();
    let private_key = PrivateKey::from_hex(PRIVATE_KEY)?;
    let internal_key = private_key.public_key(&secp).x_only();
    let key_path = key_path_address(&secp, internal_key, Network::Testnet);

    let mut builder = TransactionBuilder::new(BuilderConfig::new(NetworkParams::testnet()));
    builder
        .add_input(
            Input::new(PREVIOUS_TXID, 1, PRIVATE_KEY, key_path.to_string(), "1600")
                .with_inscription(transfer_inscription()?),
        )
        .add_output(Output::new(receive_address(2).to_string(), "1000"));

    let tx = builder.build_transaction()?;
    let witness = tx.input[0].witness.to_vec();
    assert_eq!(witness.len(), 3);

    // Signed over the key-path output that was actually supplied
    let commitment =
        ScriptCommitment::new(&secp, internal_key, ScriptBuf::from_bytes(witness[1].clone()));
    assert_ne!(commitment.script_pubkey(), key_path.script_pubkey());
    let prevouts = [TxOut {
        value: Amount::from_sat(1600),
        script_pubkey: key_path.script_pubkey(),
    }];
    let sighash = SighashCache::new(&tx).taproot_script_spend_signature_hash(
        0,
        &Prevouts::All(&prevouts),
        commitment.leaf_hash,
        TapSighashType::Default,
    )?;
    secp.verify_schnorr(
        &schnorr::Signature::from_slice(&witness[0])?,
        &Message::from_digest(sighash.to_byte_array()),
        &internal_key,
    )?;
    Ok(())
}
