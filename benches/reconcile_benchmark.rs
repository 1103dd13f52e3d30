use combinato_sorting::{collect_all_sorting, extract_clusters, DetectionRecord, SortRecord};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::{Array1, Array2};

// Synthetic channel: every tenth event is an artifact, 20 classes spread over 8 groups
fn synthetic_channel(n_spikes: usize) -> (DetectionRecord, SortRecord) {
    let times = Array1::from_iter((0..n_spikes).map(|t| t as f64 / 32.0));
    let waveforms = Array2::from_shape_fn((n_spikes, 64), |(event, sample)| {
        ((event + sample) % 17) as f64
    });
    let artifacts = Array1::from_iter((0..n_spikes).map(|event| i64::from(event % 10 == 3)));
    let detection = DetectionRecord::new(times, waveforms, artifacts).unwrap();

    let index: Vec<i64> = (0..n_spikes)
        .filter(|event| event % 10 != 3)
        .map(|event| event as i64)
        .collect();
    let classes = Array1::from_iter((0..index.len()).map(|event| (event % 20) as i64));
    let groups = Array2::from_shape_fn((20, 2), |(class, col)| {
        if col == 0 {
            class as i64
        } else {
            (class as i64 % 8) - 2
        }
    });
    let sort = SortRecord::new(Array1::from(index), classes, groups).unwrap();

    (detection, sort)
}

pub fn bench_collect_all_sorting(c: &mut Criterion) {
    let (detection, sort) = synthetic_channel(100_000);

    c.bench_function("collect_all_sorting", |b| {
        b.iter(|| black_box(collect_all_sorting(black_box(&detection), black_box(&sort))))
    });
}

pub fn bench_extract_clusters(c: &mut Criterion) {
    let (detection, sort) = synthetic_channel(100_000);
    let sorting = collect_all_sorting(&detection, &sort).unwrap();

    c.bench_function("extract_clusters", |b| {
        b.iter(|| black_box(extract_clusters(black_box(&sorting))))
    });
}

criterion_group!(benches, bench_collect_all_sorting, bench_extract_clusters);
criterion_main!(benches);
