use criterion::{BenchmarkGroup, Criterion, Throughput, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use sparsify_matrix::sparse::{CsrMatrix, extract_csr};

fn conversion_benchmark(c: &mut Criterion) {
    const SMALL_DIMS: [(usize, usize); 3] = [(8, 8), (10, 10), (12, 12)];
    const LARGE_DIMS: [(usize, usize); 2] = [(16, 10), (18, 8)];
    const DENSITY: f64 = 0.01;

    let inner = |g: &mut BenchmarkGroup<_>, dims: &[(usize, usize)]| {
        for (lg_nrows, lg_ncols) in dims {
            let mut rng = SmallRng::seed_from_u64(0);
            let nrows = 1 << lg_nrows;
            let ncols = 1 << lg_ncols;
            let matrix = CsrMatrix::<f64>::rand(&mut rng, nrows, ncols, DENSITY).unwrap();
            let name = format!("2^{lg_nrows} x 2^{lg_ncols}");
            g.throughput(Throughput::Elements(matrix.nnz() as u64));
            g.bench_function(&name, |b| {
                b.iter(|| extract_csr(&matrix).map(|view| view.to_csc()))
            });
        }
    };

    let mut g = c.benchmark_group("csr_to_csc");
    inner(&mut g, &SMALL_DIMS);
    g.sample_size(10);
    inner(&mut g, &LARGE_DIMS);
}

criterion_group!(benches, conversion_benchmark);
criterion_main!(benches);
