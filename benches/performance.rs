//! Performance benchmarks for the subscription registry.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use event_subscriptions::{
    decode_subscription, encode_subscription, Address, Amount, MemoryRegistry, Subscription,
    SubscriptionManager, SubscriptionParams, B256,
};

fn populate(registry: &MemoryRegistry, count: u32) {
    let manager = SubscriptionManager::new(registry);
    for i in 0..count {
        let mut subscriber = [0u8; 20];
        subscriber[16..].copy_from_slice(&i.to_be_bytes());
        let id = manager.subscribe(
            SubscriptionParams::new(
                Address::repeat_byte(0xAA),
                B256::repeat_byte(0x11),
                Address::from(subscriber),
                [0xde, 0xad, 0xbe, 0xef],
            )
            .with_gas(50_000, Amount::from(1u64)),
        );
        // Enough for every iteration criterion will run
        manager.deposit(&id, &Amount::from(u128::MAX)).unwrap();
    }
}

/// Benchmark notification fan-out with varying subscriber counts
fn bench_notify(c: &mut Criterion) {
    let mut group = c.benchmark_group("notify_subscribers");

    for subscribers in [1, 10, 100, 1000] {
        group.bench_with_input(
            BenchmarkId::new("subscribers", subscribers),
            &subscribers,
            |b, &count| {
                let registry = MemoryRegistry::new();
                populate(&registry, count);
                let manager = SubscriptionManager::new(&registry);
                let event_data = vec![0u8; 64];

                b.iter(|| {
                    black_box(manager.notify_subscribers(
                        &Address::repeat_byte(0xAA),
                        &B256::repeat_byte(0x11),
                        &event_data,
                        &Address::ZERO,
                    ));
                });
            },
        );
    }

    group.finish();
}

/// Benchmark the canonical codec
fn bench_codec(c: &mut Criterion) {
    let mut sub = Subscription::new(
        SubscriptionParams::new(
            Address::repeat_byte(0xAA),
            B256::repeat_byte(0x11),
            Address::repeat_byte(0xBB),
            [1, 2, 3, 4],
        )
        .with_gas(100_000, Amount::from(1_000_000_000u64)),
    );
    sub.deposit_balance = Amount::from(u128::MAX);
    let encoded = encode_subscription(&sub);

    c.bench_function("encode_subscription", |b| {
        b.iter(|| black_box(encode_subscription(&sub)))
    });
    c.bench_function("decode_subscription", |b| {
        b.iter(|| black_box(decode_subscription(&encoded).unwrap()))
    });
}

/// Benchmark state root over a populated registry
fn bench_state_root(c: &mut Criterion) {
    let registry = MemoryRegistry::new();
    populate(&registry, 1000);

    c.bench_function("state_root_1000", |b| {
        b.iter(|| black_box(registry.state_root()))
    });
}

criterion_group!(benches, bench_notify, bench_codec, bench_state_root);
criterion_main!(benches);
