use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mmrag_retrieval::index::{EmbeddingMatrix, VectorIndex};
use mmrag_retrieval::{chunk_text, Chunk, Modality, Reranker};

const DIM: usize = 256;

/// Deterministic pseudo-random rows, unit-normalized
fn matrix(rows: usize) -> EmbeddingMatrix {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let data: Vec<Vec<f32>> = (0..rows)
        .map(|_| {
            (0..DIM)
                .map(|_| {
                    state ^= state << 13;
                    state ^= state >> 7;
                    state ^= state << 17;
                    (state % 2000) as f32 / 1000.0 - 1.0
                })
                .collect()
        })
        .collect();
    let mut m = EmbeddingMatrix::from_rows(data).expect("bench matrix");
    m.normalize_rows();
    m
}

fn bench_chunking(c: &mut Criterion) {
    let text = "lorem ipsum dolor sit amet consectetur adipiscing elit ".repeat(5_000);
    c.bench_function("chunk_text 40k words", |b| {
        b.iter(|| chunk_text(black_box(&text), 300, 60))
    });
}

fn bench_search(c: &mut Criterion) {
    let m = matrix(10_000);
    let query = m.row(42).expect("row").to_vec();
    let mut index = VectorIndex::new(m.dimension());
    index.add(&m).expect("add");
    c.bench_function("flat search 10k x 256, k=16", |b| {
        b.iter(|| index.search(black_box(&query), 16).expect("search"))
    });
}

fn bench_rerank(c: &mut Criterion) {
    let chunks: Vec<Chunk> = (0..32)
        .map(|i| {
            Chunk::new(
                format!("revenue grew {i} percent in the northern region this quarter"),
                "report.txt",
                Modality::Text,
            )
            .with_score(1.0 / (i + 1) as f32)
        })
        .collect();
    let reranker = Reranker::default();
    c.bench_function("rerank 32 chunks", |b| {
        b.iter(|| reranker.rank(black_box("northern region revenue"), &chunks))
    });
}

criterion_group!(benches, bench_chunking, bench_search, bench_rerank);
criterion_main!(benches);
