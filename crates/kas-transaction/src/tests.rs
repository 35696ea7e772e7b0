//! Tests for the kas-transaction crate.
//!
//! End-to-end scenarios covering fee conservation, dust folding, the
//! builder's sealing rules, signing with both schemes, and verification of
//! signatures against independently recomputed signature hashes.

use kas_primitives::chainhash::Hash;
use kas_primitives::ec::{PrivateKey, SchnorrSignature};
use kas_script::{Address, AddressError, Prefix, ScriptPublicKey};

use crate::builder::{build_from_utxos, build_transaction, select_utxos, TransactionBuilder};
use crate::config::{BuilderConfig, NetworkType, MAX_SOMPI};
use crate::input::TransactionOutpoint;
use crate::mass;
use crate::sighash::{
    calc_schnorr_signature_hash, SighashReusedValues, SIG_HASH_ALL, SIG_HASH_NONE, SIG_HASH_SINGLE,
};
use crate::signer::{sign_input, sign_transaction, verify_input, verify_transaction, SigningKey};
use crate::template::p2pk::SIGNATURE_SCRIPT_LEN;
use crate::transaction::{SignableTransaction, Transaction};
use crate::utxo::UtxoEntry;
use crate::TransactionError;

// -----------------------------------------------------------------------
// Fixtures
// -----------------------------------------------------------------------

fn schnorr_key(seed: u8) -> SigningKey {
    SigningKey::Schnorr(PrivateKey::from_bytes(&[seed; 32]).unwrap())
}

fn ecdsa_key(seed: u8) -> SigningKey {
    SigningKey::Ecdsa(PrivateKey::from_bytes(&[seed; 32]).unwrap())
}

fn utxo_for(key: &SigningKey, txid_byte: u8, index: u32, amount: u64) -> UtxoEntry {
    UtxoEntry::new(
        TransactionOutpoint::new(Hash::new([txid_byte; 32]), index),
        amount,
        key.script_public_key(),
    )
    .with_address(key.address(Prefix::Mainnet))
}

fn recipient() -> ScriptPublicKey {
    schnorr_key(0x55).script_public_key()
}

fn change() -> ScriptPublicKey {
    schnorr_key(0x66).script_public_key()
}

fn assert_fee_conservation(signable: &SignableTransaction) {
    let inputs: u64 = signable.entries.iter().map(|e| e.amount).sum();
    let outputs: u64 = signable.tx.outputs.iter().map(|o| o.value).sum();
    assert_eq!(outputs + signable.fee().unwrap(), inputs);
}

// -----------------------------------------------------------------------
// build_transaction
// -----------------------------------------------------------------------

#[test]
fn test_build_creates_change_above_dust() {
    let key = schnorr_key(1);
    let utxo = utxo_for(&key, 0xa1, 0, 2_000_000);
    let signable = build_transaction(
        &utxo,
        &recipient(),
        1_000_000,
        1_000,
        &change(),
        &BuilderConfig::default(),
    )
    .unwrap();

    let tx = &signable.tx;
    assert_eq!(tx.outputs.len(), 2);
    assert_eq!(tx.outputs[0].value, 1_000_000);
    assert_eq!(tx.outputs[0].script_public_key, recipient());
    assert_eq!(tx.outputs[1].value, 999_000);
    assert_eq!(tx.outputs[1].script_public_key, change());
    assert_eq!(signable.fee().unwrap(), 1_000);
    assert_fee_conservation(&signable);
}

#[test]
fn test_build_leaves_inputs_unsigned() {
    let key = schnorr_key(1);
    let utxo = utxo_for(&key, 0xa1, 3, 2_000_000);
    let signable =
        build_transaction(&utxo, &recipient(), 1_000_000, 1_000, &change(), &BuilderConfig::default()).unwrap();

    assert_eq!(signable.tx.inputs.len(), 1);
    let input = &signable.tx.inputs[0];
    assert_eq!(input.previous_outpoint, utxo.outpoint);
    assert!(input.signature_script.is_empty());
    assert_eq!(input.sequence, 0);
    assert!(!signable.tx.is_fully_signed());
}

#[test]
fn test_change_of_one_sompi_folds_into_fee() {
    let utxo = utxo_for(&schnorr_key(1), 0xa1, 0, 2_000_000);
    let signable =
        build_transaction(&utxo, &recipient(), 1_000_000, 999_999, &change(), &BuilderConfig::default())
            .unwrap();

    assert_eq!(signable.tx.outputs.len(), 1);
    assert_eq!(signable.fee().unwrap(), 1_000_000);
    assert_fee_conservation(&signable);
}

#[test]
fn test_sub_dust_change_raises_fee_by_exactly_the_change() {
    let utxo = utxo_for(&schnorr_key(1), 0xa1, 0, 1_001_500);
    let signable =
        build_transaction(&utxo, &recipient(), 1_000_000, 1_000, &change(), &BuilderConfig::default()).unwrap();

    assert_eq!(signable.tx.outputs.len(), 1);
    assert_eq!(signable.fee().unwrap(), 1_000 + 500);
    assert_fee_conservation(&signable);
}

#[test]
fn test_change_at_threshold_is_kept() {
    let utxo = utxo_for(&schnorr_key(1), 0xa1, 0, 1_002_000);
    let signable =
        build_transaction(&utxo, &recipient(), 1_000_000, 1_000, &change(), &BuilderConfig::default()).unwrap();
    assert_eq!(signable.tx.outputs.len(), 2);
    assert_eq!(signable.tx.outputs[1].value, 1_000);
}

#[test]
fn test_insufficient_funds() {
    let utxo = utxo_for(&schnorr_key(1), 0xa1, 0, 500_000);
    let err = build_transaction(&utxo, &recipient(), 1_000_000, 1_000, &change(), &BuilderConfig::default())
        .unwrap_err();
    assert!(matches!(
        err,
        TransactionError::InsufficientFunds { required: 1_001_000, available: 500_000 }
    ));
}

#[test]
fn test_custom_dust_threshold_and_sequence() {
    let config = BuilderConfig::from_json(r#"{"dust_threshold":10000,"default_sequence":7}"#).unwrap();
    let utxo = utxo_for(&schnorr_key(1), 0xa1, 0, 1_006_000);
    let signable = build_transaction(&utxo, &recipient(), 1_000_000, 1_000, &change(), &config).unwrap();
    assert_eq!(signable.tx.outputs.len(), 1);
    assert_eq!(signable.fee().unwrap(), 6_000);
    assert_eq!(signable.tx.inputs[0].sequence, 7);
}

// -----------------------------------------------------------------------
// TransactionBuilder rules
// -----------------------------------------------------------------------

#[test]
fn test_builder_multi_input_multi_output() {
    let a = schnorr_key(1);
    let b = ecdsa_key(2);
    let mut builder = TransactionBuilder::default();
    builder
        .add_input(utxo_for(&a, 0x01, 0, 3_000_000))
        .unwrap()
        .add_input(utxo_for(&b, 0x02, 1, 2_000_000))
        .unwrap()
        .add_output(recipient(), 1_500_000)
        .unwrap()
        .add_output(b.script_public_key(), 2_500_000)
        .unwrap()
        .set_fee(5_000)
        .unwrap()
        .add_change_output(change())
        .unwrap();

    assert_eq!(builder.total_input().unwrap(), 5_000_000);
    assert_eq!(builder.estimate_mass(), mass::estimate_mass(2, 3, 0));
    assert_eq!(builder.minimum_fee(), builder.estimate_mass());

    let signable = builder.build().unwrap();
    assert_eq!(signable.tx.outputs.len(), 3);
    assert_eq!(signable.tx.outputs[2].value, 995_000);
    assert_fee_conservation(&signable);
}

#[test]
fn test_set_fee_may_change_before_build() {
    let mut builder = TransactionBuilder::default();
    builder
        .add_input(utxo_for(&schnorr_key(1), 0x01, 0, 2_000_000))
        .unwrap()
        .add_output(recipient(), 1_000_000)
        .unwrap()
        .add_change_output(change())
        .unwrap()
        .set_fee(1_000)
        .unwrap()
        .set_fee(3_000)
        .unwrap();
    let signable = builder.build().unwrap();
    assert_eq!(signable.tx.outputs[1].value, 997_000);
}

#[test]
fn test_builder_is_sealed_after_build() {
    let mut builder = TransactionBuilder::default();
    builder
        .add_input(utxo_for(&schnorr_key(1), 0x01, 0, 2_000_000))
        .unwrap()
        .add_output(recipient(), 1_000_000)
        .unwrap();
    builder.build().unwrap();
    assert!(builder.is_sealed());

    for result in [
        builder.set_fee(10).map(|_| ()),
        builder.add_output(recipient(), 5_000).map(|_| ()),
        builder.add_input(utxo_for(&schnorr_key(2), 0x02, 0, 5_000)).map(|_| ()),
        builder.add_change_output(change()).map(|_| ()),
        builder.set_payload(vec![1]).map(|_| ()),
        builder.set_lock_time(1).map(|_| ()),
    ] {
        assert!(matches!(result, Err(TransactionError::ValidationError(_))));
    }
}

#[test]
fn test_builder_sealed_when_signing_starts() {
    let key = schnorr_key(1);
    let mut builder = TransactionBuilder::default();
    builder
        .add_input(utxo_for(&key, 0x01, 0, 2_000_000))
        .unwrap()
        .add_output(recipient(), 1_000_000)
        .unwrap();
    let signed = builder.sign(std::slice::from_ref(&key), SIG_HASH_ALL).unwrap();
    assert!(signed.tx.is_fully_signed());
    assert!(matches!(builder.set_fee(1), Err(TransactionError::ValidationError(_))));
}

#[test]
fn test_change_output_ordering_rules() {
    let mut builder = TransactionBuilder::default();
    builder.add_change_output(change()).unwrap();
    assert!(matches!(
        builder.add_change_output(change()),
        Err(TransactionError::ValidationError(_))
    ));
    assert!(matches!(
        builder.add_output(recipient(), 5_000),
        Err(TransactionError::ValidationError(_))
    ));
}

#[test]
fn test_invalid_amounts() {
    let mut builder = TransactionBuilder::default();
    for amount in [0, 999, MAX_SOMPI + 1] {
        assert!(matches!(
            builder.add_output(recipient(), amount),
            Err(TransactionError::InvalidAmount(_))
        ));
    }
    assert!(matches!(builder.set_fee(MAX_SOMPI + 1), Err(TransactionError::InvalidAmount(_))));
    assert!(matches!(
        builder.add_input(utxo_for(&schnorr_key(1), 0x01, 0, MAX_SOMPI + 1)),
        Err(TransactionError::InvalidAmount(_))
    ));
}

#[test]
fn test_output_total_overflow() {
    let mut builder = TransactionBuilder::default();
    builder.add_output(recipient(), MAX_SOMPI).unwrap();
    for _ in 0..5 {
        builder.add_output(recipient(), MAX_SOMPI).unwrap();
    }
    assert!(matches!(
        builder.add_output(recipient(), MAX_SOMPI),
        Err(TransactionError::InvalidAmount(_))
    ));
}

#[test]
fn test_duplicate_input_rejected() {
    let utxo = utxo_for(&schnorr_key(1), 0x01, 0, 2_000_000);
    let mut builder = TransactionBuilder::default();
    builder.add_input(utxo.clone()).unwrap();
    assert!(matches!(builder.add_input(utxo), Err(TransactionError::ValidationError(_))));
}

#[test]
fn test_build_without_inputs_fails() {
    let mut builder = TransactionBuilder::default();
    builder.add_output(recipient(), 5_000).unwrap();
    assert!(matches!(builder.build(), Err(TransactionError::ValidationError(_))));
    assert!(!builder.is_sealed());
}

#[test]
fn test_address_network_is_enforced() {
    let key = schnorr_key(1);
    let mut builder = TransactionBuilder::new(BuilderConfig::for_network(NetworkType::Testnet));

    let mainnet = key.address(Prefix::Mainnet);
    assert!(matches!(
        builder.add_output_to_address(&mainnet, 5_000),
        Err(TransactionError::InvalidAddress(AddressError::PrefixMismatch { .. }))
    ));
    assert!(matches!(
        builder.add_change_address(&mainnet),
        Err(TransactionError::InvalidAddress(_))
    ));

    let testnet: Address = key.address(Prefix::Testnet);
    builder.add_output_to_address(&testnet, 5_000).unwrap();
    builder.add_change_address(&testnet).unwrap();
}

// -----------------------------------------------------------------------
// UTXO selection
// -----------------------------------------------------------------------

#[test]
fn test_select_utxos_largest_first() {
    let key = schnorr_key(1);
    let utxos = vec![
        utxo_for(&key, 1, 0, 10_000),
        utxo_for(&key, 2, 0, 500_000),
        utxo_for(&key, 3, 0, 200_000),
    ];
    let selected = select_utxos(&utxos, 600_000).unwrap();
    let amounts: Vec<u64> = selected.iter().map(|e| e.amount).collect();
    assert_eq!(amounts, vec![500_000, 200_000]);

    assert!(matches!(
        select_utxos(&utxos, 1_000_000),
        Err(TransactionError::InsufficientFunds { required: 1_000_000, available: 710_000 })
    ));
    assert!(matches!(
        select_utxos(&[], 0),
        Err(TransactionError::InsufficientFunds { required: 0, available: 0 })
    ));
}

#[test]
fn test_build_from_utxos_pays_minimum_fee() {
    let key = schnorr_key(1);
    let utxos: Vec<UtxoEntry> = (0..4).map(|i| utxo_for(&key, i, 0, 1_000_000)).collect();
    let config = BuilderConfig::default();

    let signable = build_from_utxos(&utxos, &recipient(), 2_500_000, &change(), &config).unwrap();
    assert_eq!(signable.tx.inputs.len(), 3);
    let fee = signable.fee().unwrap();
    assert!(fee >= mass::minimum_fee(signable.mass(), config.fee_rate));
    assert_fee_conservation(&signable);

    let signed = sign_transaction(&signable, &[key], SIG_HASH_ALL).unwrap();
    verify_transaction(&signed).unwrap();
}

#[test]
fn test_build_from_utxos_insufficient() {
    let key = schnorr_key(1);
    let utxos = vec![utxo_for(&key, 1, 0, 1_000_000)];
    assert!(matches!(
        build_from_utxos(&utxos, &recipient(), 1_000_000, &change(), &BuilderConfig::default()),
        Err(TransactionError::InsufficientFunds { available: 1_000_000, .. })
    ));
}

// -----------------------------------------------------------------------
// Signing & verification
// -----------------------------------------------------------------------

fn two_input_signable(a: &SigningKey, b: &SigningKey) -> SignableTransaction {
    let mut builder = TransactionBuilder::default();
    builder
        .add_input(utxo_for(a, 0x01, 0, 3_000_000))
        .unwrap()
        .add_input(utxo_for(b, 0x02, 1, 2_000_000))
        .unwrap()
        .add_output(recipient(), 4_000_000)
        .unwrap()
        .set_fee(10_000)
        .unwrap()
        .add_change_output(change())
        .unwrap();
    builder.build().unwrap()
}

#[test]
fn test_schnorr_signature_verifies_against_recomputed_hash() {
    let key = schnorr_key(1);
    let utxo = utxo_for(&key, 0xa1, 0, 2_000_000);
    let signable =
        build_transaction(&utxo, &recipient(), 1_000_000, 1_000, &change(), &BuilderConfig::default()).unwrap();

    let script = sign_input(&signable.tx, 0, &key, &utxo, SIG_HASH_ALL, &mut SighashReusedValues::new()).unwrap();
    let bytes = script.as_bytes();
    assert_eq!(bytes.len(), 66);
    assert_eq!(bytes[0], 0x41);
    assert_eq!(bytes[65], SIG_HASH_ALL.to_u8());

    let hash = calc_schnorr_signature_hash(&signable.tx, 0, &utxo, SIG_HASH_ALL, &mut SighashReusedValues::new())
        .unwrap();
    let sig = SchnorrSignature::from_bytes(&bytes[1..65]).unwrap();
    assert!(key.private_key().x_only_public_key().verify(hash.as_bytes(), &sig));
}

#[test]
fn test_sign_and_verify_mixed_schemes() {
    let a = schnorr_key(1);
    let b = ecdsa_key(2);
    let signable = two_input_signable(&a, &b);

    let signed = sign_transaction(&signable, &[b.clone(), a.clone()], SIG_HASH_ALL).unwrap();
    assert!(signed.tx.is_fully_signed());
    verify_transaction(&signed).unwrap();

    // Signing fixes only the signature scripts.
    assert_eq!(signed.tx.id(), signable.tx.id());
    assert_eq!(signed.tx.outputs, signable.tx.outputs);

    let parsed = Transaction::from_hex(&signed.tx.to_hex()).unwrap();
    assert_eq!(parsed, signed.tx);
}

#[test]
fn test_signing_keeps_estimated_mass() {
    let a = schnorr_key(1);
    let b = ecdsa_key(2);
    let signable = two_input_signable(&a, &b);
    let unsigned_mass = signable.mass();

    let signed = sign_transaction(&signable, &[a, b], SIG_HASH_ALL).unwrap();
    for input in &signed.tx.inputs {
        assert_eq!(input.signature_script.len(), SIGNATURE_SCRIPT_LEN);
    }
    assert_eq!(signed.mass(), unsigned_mass);
}

#[test]
fn test_ecdsa_signatures_are_deterministic() {
    let a = ecdsa_key(3);
    let b = ecdsa_key(4);
    let signable = two_input_signable(&a, &b);
    let keys = [a, b];
    let first = sign_transaction(&signable, &keys, SIG_HASH_ALL).unwrap();
    let second = sign_transaction(&signable, &keys, SIG_HASH_ALL).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_prepopulated_cache_supports_parallel_signing() {
    let a = ecdsa_key(3);
    let b = ecdsa_key(4);
    let signable = two_input_signable(&a, &b);
    let keys = [a, b];
    let sequential = sign_transaction(&signable, &keys, SIG_HASH_ALL).unwrap();

    let mut reused = SighashReusedValues::new();
    reused.populate(&signable.tx, SIG_HASH_ALL);
    let scripts: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = keys
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let mut cache = reused.clone();
                let signable = &signable;
                scope.spawn(move || {
                    sign_input(&signable.tx, i, key, &signable.entries[i], SIG_HASH_ALL, &mut cache)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect()
    });

    for (input, script) in sequential.tx.inputs.iter().zip(scripts) {
        assert_eq!(input.signature_script, script);
    }
}

#[test]
fn test_failed_signing_returns_no_partial_result() {
    let a = schnorr_key(1);
    let b = schnorr_key(2);
    let signable = two_input_signable(&a, &b);

    let err = sign_transaction(&signable, std::slice::from_ref(&a), SIG_HASH_ALL).unwrap_err();
    assert!(matches!(err, TransactionError::SigningError(_)));
    assert!(signable.tx.inputs.iter().all(|i| i.signature_script.is_empty()));
}

#[test]
fn test_scheme_mismatch_is_rejected() {
    let schnorr = schnorr_key(1);
    let ecdsa = SigningKey::Ecdsa(schnorr.private_key().clone());
    let utxo = utxo_for(&schnorr, 0xa1, 0, 2_000_000);
    let signable =
        build_transaction(&utxo, &recipient(), 1_000_000, 1_000, &change(), &BuilderConfig::default()).unwrap();

    let err = sign_input(&signable.tx, 0, &ecdsa, &utxo, SIG_HASH_ALL, &mut SighashReusedValues::new())
        .unwrap_err();
    assert!(matches!(err, TransactionError::SigningError(_)));

    let other = schnorr_key(9);
    let err = sign_input(&signable.tx, 0, &other, &utxo, SIG_HASH_ALL, &mut SighashReusedValues::new())
        .unwrap_err();
    assert!(matches!(err, TransactionError::SigningError(_)));
}

#[test]
fn test_single_without_output_fails_to_sign() {
    let a = schnorr_key(1);
    let b = schnorr_key(2);
    let mut builder = TransactionBuilder::default();
    builder
        .add_input(utxo_for(&a, 0x01, 0, 3_000_000))
        .unwrap()
        .add_input(utxo_for(&b, 0x02, 0, 2_000_000))
        .unwrap()
        .add_output(recipient(), 4_000_000)
        .unwrap();
    let signable = builder.build().unwrap();

    assert!(matches!(
        sign_transaction(&signable, &[a.clone(), b.clone()], SIG_HASH_SINGLE),
        Err(TransactionError::SigningError(_))
    ));
    let signed = sign_transaction(&signable, &[a, b], SIG_HASH_NONE).unwrap();
    verify_transaction(&signed).unwrap();
}

#[test]
fn test_tampering_breaks_verification() {
    let a = schnorr_key(1);
    let b = ecdsa_key(2);
    let signed = sign_transaction(&two_input_signable(&a, &b), &[a, b], SIG_HASH_ALL).unwrap();

    let mut tampered = signed.clone();
    tampered.tx.outputs[0].value -= 1;
    assert!(verify_input(&tampered.tx, 0, &tampered.entries[0]).is_err());
    assert!(verify_input(&tampered.tx, 1, &tampered.entries[1]).is_err());

    let mut wrong_amount = signed.entries[0].clone();
    wrong_amount.amount += 1;
    assert!(verify_input(&signed.tx, 0, &wrong_amount).is_err());

    let mut unsigned = signed.clone();
    unsigned.tx.inputs[0].signature_script = kas_script::Script::new();
    assert!(matches!(
        verify_input(&unsigned.tx, 0, &unsigned.entries[0]),
        Err(TransactionError::ValidationError(_))
    ));
}
