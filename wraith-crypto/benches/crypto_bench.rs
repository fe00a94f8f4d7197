//! Criterion benchmarks for WRAITH crypto: meta keys, stealth generation, envelope, reconstruction, signing.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use wraith_crypto::{
    generate_stealth_address, open_envelope, reconstruct_stealth_key, seal_envelope,
    stealth_address_for_view, MetaKeyPair,
};

fn recipient() -> MetaKeyPair {
    MetaKeyPair::derive(&[0x5A; 64], "1234").unwrap()
}

fn bench_meta_keys(c: &mut Criterion) {
    let mut g = c.benchmark_group("meta_keys");
    g.throughput(Throughput::Elements(1));
    g.bench_function("derive", |b| {
        b.iter(|| black_box(MetaKeyPair::derive(&[0x5A; 64], "1234")).unwrap());
    });
    g.finish();
}

fn bench_stealth_generation(c: &mut Criterion) {
    let meta = recipient().meta_address();
    let mut g = c.benchmark_group("stealth_generation");
    g.throughput(Throughput::Elements(1));
    g.bench_function("generate_stealth_address", |b| {
        b.iter(|| black_box(generate_stealth_address(&meta)).unwrap());
    });
    g.finish();
}

fn bench_envelope(c: &mut Criterion) {
    let keys = recipient();
    let out = generate_stealth_address(&keys.meta_address()).unwrap();
    let envelope = seal_envelope(&out.ephemeral, &keys.view_pub()).unwrap();

    let mut g = c.benchmark_group("envelope");
    g.throughput(Throughput::Elements(1));
    g.bench_function("seal", |b| {
        b.iter(|| black_box(seal_envelope(&out.ephemeral, &keys.view_pub())).unwrap());
    });
    g.bench_function("open", |b| {
        b.iter(|| {
            black_box(open_envelope(&envelope, &keys.view().secret, &out.ephemeral.public))
                .unwrap()
        });
    });
    g.finish();
}

fn bench_recipient(c: &mut Criterion) {
    let keys = recipient();
    let out = generate_stealth_address(&keys.meta_address()).unwrap();

    let mut g = c.benchmark_group("recipient");
    g.throughput(Throughput::Elements(1));
    g.bench_function("scan_with_view_key", |b| {
        b.iter(|| {
            black_box(stealth_address_for_view(
                &keys.view().secret,
                &keys.spend_pub(),
                &out.ephemeral.public,
            ))
            .unwrap()
        });
    });
    g.bench_function("reconstruct_stealth_key", |b| {
        b.iter(|| {
            black_box(reconstruct_stealth_key(
                keys.spend(),
                &keys.view_pub(),
                &out.ephemeral.secret,
            ))
            .unwrap()
        });
    });
    let one_time =
        reconstruct_stealth_key(keys.spend(), &keys.view_pub(), &out.ephemeral.secret).unwrap();
    g.bench_function("one_time_sign", |b| {
        b.iter(|| black_box(one_time.sign(b"transfer")).unwrap());
    });
    g.finish();
}

criterion_group!(
    benches,
    bench_meta_keys,
    bench_stealth_generation,
    bench_envelope,
    bench_recipient
);
criterion_main!(benches);
