//! # Eartton Codec Benchmarks
//!
//! | Path | Operation |
//! |------|-----------|
//! | encode | `Operation::encode` for mint and transfer bodies |
//! | decode | `Operation::decode` of the same bodies |
//! | hash | building and hashing a chain of cells |
//! | boc | bag-of-cells serialize / deserialize |
//! | address | state-init address derivation |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use eartton_protocol::prelude::*;

fn holder(byte: u8) -> Address {
    Address::new(0, Hash::new([byte; 32]))
}

fn transfer(with_payload: bool) -> Operation {
    let payload = with_payload.then(|| {
        let mut b = CellBuilder::new();
        b.append_bytes(&[0xab; 96]).unwrap();
        b.finalize()
    });
    Operation::Transfer {
        query_id: 7,
        amount: Amount::from_whole_tokens(1_000),
        destination: holder(0x22),
        response_destination: holder(0x33),
        forward_amount: Amount::from_nano(10_000_000),
        has_forward_payload: with_payload,
        forward_payload: payload,
    }
}

fn bench_operation_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("operation-codec");

    let ops = [
        (
            "mint",
            Operation::Mint {
                query_id: 1,
                to: holder(0x11),
                amount: Amount::from_whole_tokens(1_000),
            },
        ),
        ("transfer", transfer(false)),
        ("transfer_payload", transfer(true)),
    ];

    for (name, op) in &ops {
        group.bench_with_input(BenchmarkId::new("encode", name), op, |b, op| {
            b.iter(|| black_box(op.encode().unwrap()));
        });
        let body = op.encode().unwrap();
        group.bench_with_input(BenchmarkId::new("decode", name), &body, |b, body| {
            b.iter(|| black_box(Operation::decode(body).unwrap()));
        });
    }

    group.finish();
}

fn bench_cell_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("cell-hash");

    for depth in [1usize, 4, 16] {
        group.throughput(Throughput::Elements(depth as u64));
        group.bench_with_input(BenchmarkId::new("chain", depth), &depth, |b, &depth| {
            b.iter(|| {
                // Hashes are computed at finalize.
                let mut cell = Cell::empty();
                for i in 0..depth {
                    let mut builder = CellBuilder::new();
                    builder.append_uint(i as u128, 64).unwrap();
                    builder.append_child(cell).unwrap();
                    cell = builder.finalize();
                }
                black_box(cell.hash())
            });
        });
    }

    group.finish();
}

fn bench_boc(c: &mut Criterion) {
    let mut group = c.benchmark_group("boc");
    let body = transfer(true).encode().unwrap();
    let bytes = boc::serialize(&body);

    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("serialize", |b| b.iter(|| black_box(boc::serialize(&body))));
    group.bench_function("deserialize", |b| {
        b.iter(|| black_box(boc::deserialize(&bytes).unwrap()));
    });

    group.finish();
}

fn bench_address_derivation(c: &mut Criterion) {
    let config = IssuerConfig::new(holder(0x44), Cell::empty(), Cell::empty());
    let data = config.initial_state().to_cell().unwrap();
    let code = Cell::empty();

    c.bench_function("derive_address", |b| {
        b.iter(|| black_box(derive_address(0, &code, &data)));
    });
}

criterion_group!(
    benches,
    bench_operation_codec,
    bench_cell_hash,
    bench_boc,
    bench_address_derivation
);
criterion_main!(benches);
