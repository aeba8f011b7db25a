use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use mstream_merkle::{reader_root, verify_proof, Blake3, DomainHasher, Sha3_256, StreamTree};

const SEG: usize = 64;

#[inline]
fn det_bytes(n: usize, seed: u64) -> Vec<u8> {
    let (mut a, c) = (1664525u64.wrapping_mul(seed).wrapping_add(1013904223), 1013904223u64);
    (0..n)
        .map(|_| {
            a = a.wrapping_mul(1664525).wrapping_add(c);
            (a >> 24) as u8
        })
        .collect()
}

fn bench_root(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream_root");
    for &k in &[10usize, 14usize] {
        let leaves = 1usize << k;
        let data = det_bytes(leaves * SEG, 2024);
        group.throughput(Throughput::Bytes(data.len() as u64));

        group.bench_function(BenchmarkId::new("blake3", format!("2^{k}")), |b| {
            b.iter(|| reader_root(black_box(data.as_slice()), DomainHasher::new(Blake3::new()), SEG))
        });
        group.bench_function(BenchmarkId::new("sha3-256", format!("2^{k}")), |b| {
            b.iter(|| reader_root(black_box(data.as_slice()), DomainHasher::new(Sha3_256::new()), SEG))
        });
    }
    group.finish();
}

fn bench_prove_verify(c: &mut Criterion) {
    let leaves = (1usize << 12) + 3;
    let data = det_bytes(leaves * SEG, 7);
    let index = (leaves / 3) as u64;

    c.bench_function("prove_2^12+3", |b| {
        b.iter_batched(
            || {
                let mut t = StreamTree::new(DomainHasher::new(Blake3::new()));
                t.set_index(index).ok();
                t
            },
            |mut t| {
                for seg in data.chunks(SEG) {
                    t.push(black_box(seg)).ok();
                }
                black_box(t.prove().ok())
            },
            BatchSize::SmallInput,
        )
    });

    let mut t = StreamTree::new(DomainHasher::new(Blake3::new()));
    t.set_index(index).ok();
    for seg in data.chunks(SEG) {
        t.push(seg).ok();
    }
    let Ok((root, proof)) = t.prove() else { return };
    let leaf = &data[index as usize * SEG..(index as usize + 1) * SEG];
    let mut h = DomainHasher::new(Blake3::new());
    c.bench_function("verify_2^12+3", |b| {
        b.iter(|| {
            verify_proof(
                black_box(leaf),
                &proof.steps,
                index,
                leaves as u64,
                &root,
                &mut h,
            )
        })
    });
}

criterion_group!(benches, bench_root, bench_prove_verify);
criterion_main!(benches);
