use criterion::{Criterion, black_box, criterion_group, criterion_main};
use tf_core::{DitherMode, NoProgress, TileCorpus, TileShape};
use tf_palette::{NearestAssigner, Quantizer, random_palette};

fn noisy_corpus(shape: TileShape, tiles: usize) -> TileCorpus {
    let mut corpus = TileCorpus::with_capacity(shape, tiles);
    let mut state = 0x2545_f491u32;
    let mut pixels = vec![0u8; shape.area()];
    for _ in 0..tiles {
        for p in &mut pixels {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            *p = (state >> 24) as u8;
        }
        let _ = corpus.push_pixels(&pixels);
    }
    corpus
}

fn bench_quantize(c: &mut Criterion) {
    let shape = TileShape::new(8, 8).unwrap();
    let corpus = noisy_corpus(shape, 20_000);
    let mut group = c.benchmark_group("quantize");
    for mode in [DitherMode::Ordered, DitherMode::Error, DitherMode::None] {
        let quantizer = Quantizer::new(mode);
        group.bench_function(format!("{mode}_20k_n512"), |b| {
            b.iter(|| quantizer.run(black_box(&corpus), 512, &mut NoProgress));
        });
    }
    group.finish();
}

fn bench_nearest(c: &mut Criterion) {
    let shape = TileShape::new(8, 8).unwrap();
    let corpus = noisy_corpus(shape, 5_000);
    let palette = random_palette(256, shape, 1).unwrap();
    let assigner = NearestAssigner::new(&palette).unwrap();
    c.bench_function("nearest_5k_n256", |b| {
        b.iter(|| assigner.assign(black_box(&corpus)));
    });
}

criterion_group!(benches, bench_quantize, bench_nearest);
criterion_main!(benches);
