use std::hint::black_box;
use std::io::Cursor;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use image::{ImageFormat, Rgb, RgbImage};
use vismatch::color::analyze_colors;
use vismatch::pattern::analyze_pattern;
use vismatch::{AnalyzeOptions, SourceImage, analyze_image};

/// 带渐变和条纹的 1024x768 测试图
fn test_png() -> Vec<u8> {
    let img = RgbImage::from_fn(1024, 768, |x, y| {
        if (x / 32) % 2 == 0 {
            Rgb([(x / 4) as u8, (y / 3) as u8, 180])
        } else {
            Rgb([240, 200, (x ^ y) as u8])
        }
    });
    let mut buf = Cursor::new(vec![]);
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn benchmark_analysis(c: &mut Criterion) {
    let png = test_png();
    let source = SourceImage::decode(&png).unwrap();
    let options = AnalyzeOptions::default();

    let mut group = c.benchmark_group("特征提取");
    group.throughput(Throughput::Elements(1));
    group.bench_function("PNG 解码", |b| b.iter(|| SourceImage::decode(black_box(&png))));
    group.bench_function("颜色分析", |b| b.iter(|| analyze_colors(black_box(&source), &options)));
    group.bench_function("图案分析", |b| b.iter(|| analyze_pattern(black_box(&source))));
    group.bench_function("完整分析", |b| b.iter(|| analyze_image(black_box(&png), &options)));
    group.finish();
}

fn benchmark_hash(c: &mut Criterion) {
    let png = test_png();

    let mut group = c.benchmark_group("哈希计算");
    group.throughput(Throughput::Bytes(png.len() as u64));
    group.bench_function("BLAKE3", |b| b.iter(|| vismatch::utils::hash_bytes(black_box(&png))));
    group.finish();
}

criterion_group!(benches, benchmark_analysis, benchmark_hash);
criterion_main!(benches);
