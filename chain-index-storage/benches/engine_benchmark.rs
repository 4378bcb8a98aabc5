//! Throughput benchmarks for the two hottest paths in the storage core:
//! bulk ingestion (`insert_inputs`) and the streaming query path
//! (`fold_inputs`), at a few representative batch/table sizes.

use chain_index_core::{Checkpoint, Input, Pattern, SortDirection, StatusFlag};
use chain_index_storage::query::{checkpoints, inputs, InputRecord};
use criterion::{criterion_group, criterion_main, Criterion};
use rusqlite::Connection;

fn fresh_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    chain_index_storage::migrations::run_migrations(&conn).unwrap();
    checkpoints::insert_checkpoints(
        &conn,
        &(0..2_000u64).map(|slot_no| Checkpoint { slot_no, header_hash: vec![0; 32] }).collect::<Vec<_>>(),
    )
    .unwrap();
    conn
}

fn sample_record(created_at: u64, index: u32) -> InputRecord {
    InputRecord {
        input: Input {
            extended_output_reference: format!("ref-{created_at}-{index}").into_bytes(),
            address: format!("addr-{}", index % 50),
            value: vec![1; 16],
            datum_hash: None,
            script_hash: None,
            payment_credential: format!("cred-{}", index % 50),
            created_at,
            spent_at: None,
            transaction_index: index,
            output_index: 0,
        },
        binary_data: None,
        script: None,
    }
}

fn bench_insert_inputs_batch_1000(c: &mut Criterion) {
    c.bench_function("insert_inputs_batch_1000", |bench| {
        bench.iter_batched(
            || {
                let conn = fresh_conn();
                let records: Vec<InputRecord> =
                    (0..1_000u32).map(|i| sample_record((i % 2_000) as u64, i)).collect();
                (conn, records)
            },
            |(conn, records)| {
                inputs::insert_inputs(&conn, &records).unwrap();
            },
            criterion::BatchSize::LargeInput,
        );
    });
}

fn bench_fold_inputs_over_10_000_rows(c: &mut Criterion) {
    let conn = fresh_conn();
    let records: Vec<InputRecord> = (0..10_000u32).map(|i| sample_record((i % 2_000) as u64, i)).collect();
    inputs::insert_inputs(&conn, &records).unwrap();

    c.bench_function("fold_inputs_over_10_000_rows", |bench| {
        bench.iter(|| {
            let mut count = 0usize;
            inputs::fold_inputs(
                &conn,
                &Pattern::MatchAll,
                StatusFlag::Unspent,
                SortDirection::Ascending,
                &mut |_input| {
                    count += 1;
                    Ok(())
                },
            )
            .unwrap();
            criterion::black_box(count);
        });
    });
}

fn bench_fold_inputs_by_address(c: &mut Criterion) {
    let conn = fresh_conn();
    let records: Vec<InputRecord> = (0..10_000u32).map(|i| sample_record((i % 2_000) as u64, i)).collect();
    inputs::insert_inputs(&conn, &records).unwrap();

    c.bench_function("fold_inputs_by_address", |bench| {
        bench.iter(|| {
            let mut count = 0usize;
            inputs::fold_inputs(
                &conn,
                &Pattern::Address("addr-7".to_string()),
                StatusFlag::Any,
                SortDirection::Descending,
                &mut |_input| {
                    count += 1;
                    Ok(())
                },
            )
            .unwrap();
            criterion::black_box(count);
        });
    });
}

criterion_group!(
    benches,
    bench_insert_inputs_batch_1000,
    bench_fold_inputs_over_10_000_rows,
    bench_fold_inputs_by_address,
);
criterion_main!(benches);
