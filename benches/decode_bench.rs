use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

fn npy_f32(len: usize) -> Vec<u8> {
    let header = format!("{{'descr': '<f4', 'fortran_order': False, 'shape': ({len},), }}");
    let mut out = Vec::new();
    out.extend_from_slice(b"\x93NUMPY\x01\x00");
    out.extend_from_slice(&(header.len() as u16).to_le_bytes());
    out.extend_from_slice(header.as_bytes());
    for i in 0..len {
        out.extend_from_slice(&(i as f32).to_le_bytes());
    }
    out
}

fn bench_decode_single(c: &mut Criterion) {
    let bytes = npy_f32(256 * 1024);

    c.bench_function("decode_f32_1mb", |b| {
        b.iter(|| npyread::read_bytes(black_box(&bytes), false, "bench").unwrap())
    });
}

fn bench_decode_packed(c: &mut Criterion) {
    let entry = npy_f32(64 * 1024);
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for i in 0..8 {
        writer
            .start_file(format!("arr_{i}.npy"), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(&entry).unwrap();
    }
    let archive = writer.finish().unwrap().into_inner();

    c.bench_function("decode_npz_8_entries", |b| {
        b.iter(|| npyread::read_bytes(black_box(&archive), true, "bench").unwrap())
    });
}

criterion_group!(benches, bench_decode_single, bench_decode_packed);
criterion_main!(benches);
