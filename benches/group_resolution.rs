use criterion::Throughput;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use eddynet::network::{get_group_array, get_next_index, PairRecord};

/// `n_files` files of `per_file` observations, observation `k` of every file matched with
/// observation `(k + shift) % per_file` of each of the `window` following files.
fn chained_records(n_files: usize, per_file: u32, window: usize) -> (Vec<PairRecord>, Vec<u32>) {
    let mut records = Vec::new();
    for i in 0..n_files {
        for j in i + 1..(i + window + 1).min(n_files) {
            let shift = (j - i) as u32;
            let ii: Vec<u32> = (0..per_file).step_by(3).collect();
            let ij = ii.iter().map(|k| (k + shift) % per_file).collect();
            records.push(PairRecord::new(i, j, ii, ij));
        }
    }
    (records, vec![per_file; n_files])
}

fn bench_group_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_group_array");

    for n_files in [10usize, 50, 200] {
        let (records, nb_obs) = chained_records(n_files, 300, 5);
        group.throughput(Throughput::Elements(
            records.iter().map(|r| r.len() as u64).sum(),
        ));
        group.bench_with_input(
            BenchmarkId::from_parameter(n_files),
            &(records, nb_obs),
            |b, (records, nb_obs)| b.iter(|| get_group_array(records, nb_obs)),
        );
    }
    group.finish();

    let (records, nb_obs) = chained_records(200, 300, 5);
    let groups = get_group_array(&records, &nb_obs);
    c.bench_function("get_next_index", |b| b.iter(|| get_next_index(&groups)));
}

criterion_group!(benches, bench_group_resolution);
criterion_main!(benches);
