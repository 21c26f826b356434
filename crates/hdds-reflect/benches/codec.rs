// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec Benchmark
//!
//! Encode and decode of a nested class holding a sequence of classes and
//! polymorphic pointees, at several sequence lengths.

#![allow(clippy::cast_precision_loss)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hdds_reflect::{
    reflect_member, reflect_parent, ClassBuilder, GenericSerializer, Poly, TypeDescriptor,
    TypeInfo, TypeRegistry,
};

#[derive(Debug, Clone, Default)]
struct Sample {
    id: u64,
    value: f64,
    label: String,
}

#[derive(Debug, Default)]
struct Annotated {
    sample: Sample,
    notes: Vec<String>,
}

#[derive(Debug, Default)]
struct Batch {
    name: String,
    samples: Vec<Sample>,
    extra: Vec<Poly<Sample>>,
}

impl TypeInfo for Sample {
    fn type_descriptor() -> TypeDescriptor {
        ClassBuilder::<Sample>::new("Sample")
            .member(reflect_member!(Sample, id))
            .member(reflect_member!(Sample, value))
            .member(reflect_member!(Sample, label))
            .with_factory()
            .build()
    }
}

impl TypeInfo for Annotated {
    fn type_descriptor() -> TypeDescriptor {
        ClassBuilder::<Annotated>::new("Annotated")
            .parent(reflect_parent!(Annotated, sample))
            .member(reflect_member!(Annotated, notes))
            .with_factory()
            .build()
    }
}

impl TypeInfo for Batch {
    fn type_descriptor() -> TypeDescriptor {
        ClassBuilder::<Batch>::new("Batch")
            .member(reflect_member!(Batch, name))
            .member(reflect_member!(Batch, samples))
            .member(reflect_member!(Batch, extra, "owned"))
            .build()
    }
}

fn batch(len: usize) -> Batch {
    let samples: Vec<Sample> = (0..len)
        .map(|i| Sample {
            id: i as u64,
            value: i as f64 * 0.5,
            label: format!("sample-{i}"),
        })
        .collect();
    let extra = samples
        .iter()
        .take(len / 4)
        .map(|sample| {
            Poly::new(Annotated {
                sample: sample.clone(),
                notes: vec!["bench".to_owned()],
            })
        })
        .collect();
    Batch {
        name: "bench".to_owned(),
        samples,
        extra,
    }
}

fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry.register::<Batch>();
    registry.register::<Annotated>();
    registry
}

fn bench_encode(c: &mut Criterion) {
    let registry = registry();
    let mut group = c.benchmark_group("encode");
    for len in [16usize, 256, 4096] {
        let value = batch(len);
        let mut serializer = GenericSerializer::new(&registry);
        group.bench_with_input(BenchmarkId::from_parameter(len), &value, |b, value| {
            b.iter(|| {
                serializer.begin_write();
                serializer.write(black_box(value)).expect("encode");
                black_box(serializer.end_write().len())
            });
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let registry = registry();
    let mut group = c.benchmark_group("decode");
    for len in [16usize, 256, 4096] {
        let bytes = hdds_reflect::encode(&registry, &batch(len)).expect("encode");
        let mut serializer = GenericSerializer::new(&registry);
        let mut target = Batch::default();
        group.bench_with_input(BenchmarkId::from_parameter(len), &bytes, |b, bytes| {
            b.iter(|| {
                serializer.begin_read(black_box(bytes));
                serializer.serialize(&mut target).expect("decode");
                serializer.end_read();
            });
        });
    }
    group.finish();
}

criterion_group!(codec_benches, bench_encode, bench_decode);
criterion_main!(codec_benches);
