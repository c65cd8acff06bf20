//! Benchmarks for the CubbyKV protocol codec

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cubbykv::protocol::{decode_frame, encode_frame, escape, parse_command, unescape, Command};

fn codec_benchmarks(c: &mut Criterion) {
    let delimiter_heavy: Vec<u8> = b"field:".repeat(64);

    c.bench_function("escape_delimiter_heavy", |b| {
        b.iter(|| escape(black_box(&delimiter_heavy)))
    });

    let escaped = escape(&delimiter_heavy);
    c.bench_function("unescape_delimiter_heavy", |b| {
        b.iter(|| unescape(black_box(&escaped)))
    });

    let raw = cubbykv::protocol::encode_command(&Command::Store {
        key: delimiter_heavy.clone(),
        value: delimiter_heavy.clone(),
    });
    c.bench_function("parse_store_command", |b| {
        b.iter(|| parse_command(black_box(&raw)).unwrap())
    });

    let frame = encode_frame(&Command::Store {
        key: delimiter_heavy.clone(),
        value: delimiter_heavy,
    });
    c.bench_function("decode_frame", |b| {
        b.iter(|| decode_frame(black_box(&frame)).unwrap())
    });
}

criterion_group!(benches, codec_benchmarks);
criterion_main!(benches);
