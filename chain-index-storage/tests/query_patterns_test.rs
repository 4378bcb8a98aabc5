//! Pattern-driven query tests through `StorageEngine`: compiled
//! predicates applied to `fold_inputs`/`delete_inputs`/`mark_inputs`, and
//! persisted pattern CRUD round-tripping through their textual form.

use chain_index_core::{BinaryDataRow, Checkpoint, Input, Pattern, ScriptRow, SortDirection, StatusFlag, StorageConfig};
use chain_index_storage::query::InputRecord;
use chain_index_storage::StorageEngine;

fn engine_with_inputs() -> StorageEngine {
    let engine = StorageEngine::open(StorageConfig::in_memory(10)).unwrap();
    engine.insert_checkpoints(&[Checkpoint { slot_no: 0, header_hash: vec![0] }, Checkpoint {
        slot_no: 10,
        header_hash: vec![1],
    }])
    .unwrap();

    let records = vec![
        InputRecord {
            input: Input {
                extended_output_reference: vec![1],
                address: "addr1".to_string(),
                value: vec![1],
                datum_hash: None,
                script_hash: None,
                payment_credential: "credA".to_string(),
                created_at: 0,
                spent_at: None,
                transaction_index: 0,
                output_index: 0,
            },
            binary_data: None,
            script: None,
        },
        InputRecord {
            input: Input {
                extended_output_reference: vec![2],
                address: "addr2".to_string(),
                value: vec![1],
                datum_hash: None,
                script_hash: None,
                payment_credential: "credB".to_string(),
                created_at: 10,
                spent_at: Some(10),
                transaction_index: 0,
                output_index: 0,
            },
            binary_data: None,
            script: None,
        },
    ];
    engine.insert_inputs(&records).unwrap();
    engine
}

#[test]
fn fold_inputs_by_address_pattern_matches_only_that_address() {
    let engine = engine_with_inputs();
    let mut refs = Vec::new();
    engine
        .fold_inputs(&Pattern::Address("addr1".to_string()), StatusFlag::Any, SortDirection::Ascending, |input| {
            refs.push(input.extended_output_reference);
            Ok(())
        })
        .unwrap();
    assert_eq!(refs, vec![vec![1]]);
}

#[test]
fn fold_inputs_by_payment_credential_pattern_matches_only_that_credential() {
    let engine = engine_with_inputs();
    let mut refs = Vec::new();
    engine
        .fold_inputs(
            &Pattern::PaymentCredential("credB".to_string()),
            StatusFlag::Any,
            SortDirection::Ascending,
            |input| {
                refs.push(input.extended_output_reference);
                Ok(())
            },
        )
        .unwrap();
    assert_eq!(refs, vec![vec![2]]);
}

#[test]
fn fold_inputs_status_flag_narrows_spent_vs_unspent() {
    let engine = engine_with_inputs();

    let mut unspent = Vec::new();
    engine
        .fold_inputs(&Pattern::MatchAll, StatusFlag::Unspent, SortDirection::Ascending, |input| {
            unspent.push(input.extended_output_reference);
            Ok(())
        })
        .unwrap();
    assert_eq!(unspent, vec![vec![1]]);

    let mut spent = Vec::new();
    engine
        .fold_inputs(&Pattern::MatchAll, StatusFlag::Spent, SortDirection::Ascending, |input| {
            spent.push(input.extended_output_reference);
            Ok(())
        })
        .unwrap();
    assert_eq!(spent, vec![vec![2]]);
}

#[test]
fn delete_inputs_removes_every_row_matching_the_pattern() {
    let engine = engine_with_inputs();
    let deleted = engine.delete_inputs(&[Pattern::Address("addr1".to_string())]).unwrap();
    assert_eq!(deleted, 1);

    let mut remaining = Vec::new();
    engine
        .fold_inputs(&Pattern::MatchAll, StatusFlag::Any, SortDirection::Ascending, |input| {
            remaining.push(input.extended_output_reference);
            Ok(())
        })
        .unwrap();
    assert_eq!(remaining, vec![vec![2]]);
}

#[test]
fn mark_inputs_sets_spent_at_only_for_matching_rows() {
    let engine = engine_with_inputs();
    let marked = engine.mark_inputs(5, &[Pattern::Address("addr1".to_string())]).unwrap();
    assert_eq!(marked, 1);

    let mut spent_at = Vec::new();
    engine
        .fold_inputs(&Pattern::MatchAll, StatusFlag::Any, SortDirection::Ascending, |input| {
            spent_at.push((input.extended_output_reference, input.spent_at));
            Ok(())
        })
        .unwrap();
    spent_at.sort();
    assert_eq!(spent_at, vec![(vec![1], Some(5)), (vec![2], Some(10))]);
}

#[test]
fn persisted_patterns_round_trip_through_their_textual_form() {
    let engine = StorageEngine::open(StorageConfig::in_memory(10)).unwrap();
    let writer = engine.short_lived_writer();
    writer
        .insert_patterns(&[
            Pattern::MatchAll,
            Pattern::Address("addr1".to_string()),
            Pattern::PaymentCredential("cred1".to_string()),
        ])
        .unwrap();

    let mut listed = engine.reader().list_patterns().unwrap();
    listed.sort_by_key(chain_index_core::pattern_to_text);
    let mut expected =
        vec![Pattern::MatchAll, Pattern::Address("addr1".to_string()), Pattern::PaymentCredential("cred1".to_string())];
    expected.sort_by_key(chain_index_core::pattern_to_text);
    assert_eq!(listed, expected);

    let removed = writer.delete_pattern(&Pattern::MatchAll).unwrap();
    assert_eq!(removed, 1);
    assert_eq!(engine.reader().list_patterns().unwrap().len(), 2);
}

#[test]
fn short_lived_writer_also_writes_binary_data_and_scripts() {
    let engine = StorageEngine::open(StorageConfig::in_memory(10)).unwrap();
    let writer = engine.short_lived_writer();

    let datum = BinaryDataRow { binary_data_hash: vec![1, 2], binary_data: vec![9, 9] };
    let script = ScriptRow { script_hash: vec![3, 4], script: vec![0xAB] };

    assert_eq!(writer.insert_binary_data(&[datum.clone()]).unwrap(), 1);
    assert_eq!(writer.insert_scripts(&[script.clone()]).unwrap(), 1);

    assert_eq!(engine.get_binary_data(&datum.binary_data_hash).unwrap(), Some(datum.binary_data));
    assert_eq!(engine.get_script(&script.script_hash).unwrap(), Some(script.script));
}
