// In benches/codec_bench.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use ndarray::{ArrayD, IxDyn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use photon_codecs::addressing::{IdentityContext, PrimaryKey};
use photon_codecs::kernels::anscombe;
use photon_codecs::{CellValue, CodecConfig, PhotonCodec, TransformParameters};

// --- Mock Data Generation ---

/// Generates a low-count movie, the regime the codec is built for.
fn generate_movie(shape: &[usize]) -> ArrayD<u16> {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    ArrayD::from_shape_fn(IxDyn(shape), |_| rng.random_range(0u16..32))
}

// --- Benchmark Suite ---

const BENCH_SHAPE: [usize; 3] = [200, 64, 64];

fn bench_forward_transform(c: &mut Criterion) {
    let movie = generate_movie(&BENCH_SHAPE).mapv(f64::from);
    let params = TransformParameters::default();

    let mut group = c.benchmark_group("anscombe");
    group.throughput(Throughput::Elements(movie.len() as u64));
    group.bench_function("forward", |b| {
        b.iter(|| anscombe::forward(black_box(&movie), black_box(&params)).unwrap())
    });
    group.finish();
}

fn bench_encode_in_memory(c: &mut Criterion) {
    let codec = PhotonCodec::new(CodecConfig::default()).unwrap();
    let movie: CellValue = generate_movie(&BENCH_SHAPE).into();
    let context = IdentityContext::new("bench", "Scan", "movie", PrimaryKey::new().with("scan_id", 1));

    let mut group = c.benchmark_group("codec");
    group.throughput(Throughput::Bytes((BENCH_SHAPE.iter().product::<usize>() * 2) as u64));
    group.bench_function("encode_memory", |b| {
        b.iter(|| codec.encode(black_box(&movie), black_box(&context)).unwrap())
    });

    let record = codec.encode(&movie, &context).unwrap();
    group.bench_function("decode_read_all", |b| {
        b.iter(|| codec.decode(black_box(&record)).unwrap().read_all().unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_forward_transform, bench_encode_in_memory);
criterion_main!(benches);
