use criterion::{black_box, criterion_group, criterion_main, Criterion};
use qrcodec::render::to_bgr_bytes;
use qrcodec::{decode_bgr, ECLevel, QrEncoder};

fn bench_encode_v1(c: &mut Criterion) {
    c.bench_function("encode_v1_alphanumeric", |b| {
        b.iter(|| {
            let mut encoder = QrEncoder::new(ECLevel::M);
            encoder
                .encode(black_box(b"HELLO WORLD"), Some(5), 1)
                .unwrap();
        })
    });
}

fn bench_encode_v9_auto_mask(c: &mut Criterion) {
    let payload = vec![0x7Eu8; 150];
    c.bench_function("encode_v9_byte_auto_mask", |b| {
        b.iter(|| {
            let mut encoder = QrEncoder::new(ECLevel::M);
            encoder.encode(black_box(&payload), None, 9).unwrap();
        })
    });
}

fn bench_decode_v1(c: &mut Criterion) {
    let mut encoder = QrEncoder::new(ECLevel::M);
    encoder.encode(b"HELLO WORLD", Some(5), 1).unwrap();
    let (bgr, width, height) = to_bgr_bytes(encoder.matrix().unwrap(), 4, 4);

    c.bench_function("decode_v1_from_bitmap", |b| {
        b.iter(|| decode_bgr(black_box(&bgr), black_box(width), black_box(height)))
    });
}

fn bench_decode_v9(c: &mut Criterion) {
    let mut encoder = QrEncoder::new(ECLevel::M);
    let payload: Vec<u8> = (0..150).map(|i| (i % 251) as u8).collect();
    encoder.encode(&payload, Some(2), 9).unwrap();
    let (bgr, width, height) = to_bgr_bytes(encoder.matrix().unwrap(), 4, 4);

    c.bench_function("decode_v9_from_bitmap", |b| {
        b.iter(|| decode_bgr(black_box(&bgr), black_box(width), black_box(height)))
    });
}

criterion_group!(
    benches,
    bench_encode_v1,
    bench_encode_v9_auto_mask,
    bench_decode_v1,
    bench_decode_v9
);
criterion_main!(benches);
