//! Figure construction benchmarks
//!
//! Times the two figure builders on synthetic lattice networks with a day of
//! hourly snapshots. The net power map is the expensive one: it rebuilds
//! node summaries, branch flows and arrow geometry for every snapshot, so it
//! is also timed over half a year of snapshots on a small lattice.
//!
//! ```bash
//! cargo bench -p copper-viz
//! cargo bench -p copper-viz -- net_power
//! ```

use copper_algo::{node_values, DisplayMode};
use copper_core::fixtures::grid;
use copper_viz::{colored_network_figure, net_power_figure};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const SIZES: &[(usize, usize)] = &[(5, 5), (10, 10), (20, 20)];
const HOURS: usize = 24;
/// A year of two-hourly snapshots has 4380 of them.
const LONG_HORIZONS: &[usize] = &[1095, 2190, 4380];

fn bench_net_power_figure(c: &mut Criterion) {
    let mut group = c.benchmark_group("net_power");
    for &(rows, cols) in SIZES {
        let network = grid(rows, cols, HOURS);
        group.bench_with_input(
            BenchmarkId::new("figure", rows * cols),
            &network,
            |b, network| b.iter(|| black_box(net_power_figure(network).unwrap())),
        );
    }
    group.finish();
}

fn bench_net_power_horizon(c: &mut Criterion) {
    let mut group = c.benchmark_group("net_power_horizon");
    group.sample_size(10);
    for &hours in LONG_HORIZONS {
        let network = grid(6, 6, hours);
        group.bench_with_input(BenchmarkId::new("snapshots", hours), &network, |b, network| {
            b.iter(|| black_box(net_power_figure(network).unwrap()))
        });
    }
    group.finish();
}

fn bench_colored_network_figure(c: &mut Criterion) {
    let mut group = c.benchmark_group("colored_network");
    for &(rows, cols) in SIZES {
        let network = grid(rows, cols, HOURS);
        let values = node_values(&network, DisplayMode::Generation, None);
        group.bench_with_input(
            BenchmarkId::new("generation", rows * cols),
            &(network, values),
            |b, (network, values)| {
                b.iter(|| black_box(colored_network_figure(network, values).unwrap()))
            },
        );
    }
    group.finish();
}

fn bench_figure_json(c: &mut Criterion) {
    let network = grid(10, 10, HOURS);
    let figure = net_power_figure(&network).unwrap();
    c.bench_function("figure_to_json_100_bus", |b| {
        b.iter(|| black_box(figure.to_json().unwrap()))
    });
}

criterion_group!(
    benches,
    bench_net_power_figure,
    bench_net_power_horizon,
    bench_colored_network_figure,
    bench_figure_json
);
criterion_main!(benches);
