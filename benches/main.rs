// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

use criterion::{criterion_group, criterion_main, Criterion};
use lammps_rs::prelude::*;

fn benchmark(c: &mut Criterion) {
    c.bench_function("Data::from_file", |b| {
        b.iter(|| {
            std::hint::black_box(Data::from_file("test_files/butane.data").unwrap());
        })
    });

    let data = Data::from_file("test_files/butane.data").unwrap();

    c.bench_function("Data::reset_all_types", |b| {
        b.iter(|| {
            let mut data = data.clone();
            data.reset_atom_types().unwrap();
            data.reset_all_types(true).unwrap();
            std::hint::black_box(data);
        })
    });

    c.bench_function("Data::bond_graph", |b| {
        b.iter(|| {
            std::hint::black_box(data.bond_graph());
        })
    });

    c.bench_function("LogReader::to_table", |b| {
        b.iter(|| {
            std::hint::black_box(
                LogReader::open("test_files/log.lammps", None)
                    .unwrap()
                    .to_table()
                    .unwrap(),
            );
        })
    });

    c.bench_function("DumpReader::snapshots", |b| {
        b.iter(|| {
            std::hint::black_box(
                DumpReader::open("test_files/dump.lammpstrj")
                    .unwrap()
                    .snapshots()
                    .fold(0, |sum, snapshot| sum + snapshot.unwrap().n_entries()),
            );
        })
    });

    c.bench_function("DumpReader::snapshots (gzip)", |b| {
        b.iter(|| {
            std::hint::black_box(
                DumpReader::open("test_files/dump.lammpstrj.gz")
                    .unwrap()
                    .snapshots()
                    .fold(0, |sum, snapshot| sum + snapshot.unwrap().n_entries()),
            );
        })
    });

    let params = HistogramParams::new("c_dist")
        .with_bins(50)
        .with_group_by("c_btype");
    c.bench_function("DumpLocalReader::histograms", |b| {
        b.iter(|| {
            std::hint::black_box(
                DumpLocalReader::open("test_files/dump.local")
                    .unwrap()
                    .histograms(&params)
                    .unwrap(),
            );
        })
    });

    c.bench_function("AveTimeReader::to_table", |b| {
        b.iter(|| {
            std::hint::black_box(
                AveTimeReader::open("test_files/rdf.time")
                    .unwrap()
                    .to_table()
                    .unwrap(),
            );
        })
    });
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
