use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use vismatch::catalog::Product;
use vismatch::features::{DominantColor, Pattern, Rgb, Style, Temperature, Texture, VisualProfile};
use vismatch::ranker::{SortBy, rank};
use vismatch::similarity::Category;
use vismatch::{RankOptions, SimilarityEngine};

const PATTERNS: [Pattern; 4] = [Pattern::Solid, Pattern::Striped, Pattern::Floral, Pattern::Geometric];
const TEXTURES: [Texture; 4] = [Texture::Smooth, Texture::Matte, Texture::Rough, Texture::Textured];
const STYLES: [Style; 4] = [Style::Modern, Style::Classic, Style::Bohemian, Style::Minimalist];

fn profile(i: usize) -> VisualProfile {
    let dominant_colors = (0..5)
        .map(|k| {
            let rgb = Rgb::new((i * 37 + k * 51) as u8, (i * 11 + k * 17) as u8, (i * 5 + k * 85) as u8);
            DominantColor {
                hex: format!("#{:02X}{:02X}{:02X}", rgb.r, rgb.g, rgb.b),
                rgb,
                percentage: 20,
                count: 2000,
            }
        })
        .collect();
    VisualProfile {
        dominant_colors,
        color_palette: Some(vec!["red".into(), "navy".into(), "white".into()]),
        primary_hue: Some((i * 7 % 360) as u16),
        temperature: Some(if i % 2 == 0 { Temperature::Warm } else { Temperature::Cool }),
        brightness: Some((i % 101) as u8),
        contrast: Some((i * 3 % 101) as u8),
        pattern: Some(PATTERNS[i % 4]),
        texture: Some(TEXTURES[i / 4 % 4]),
        complexity: Some((i * 13 % 101) as u8),
        symmetry: Some((i * 29 % 101) as u8),
        style: Some(STYLES[i / 16 % 4]),
    }
}

fn catalog(n: usize) -> Vec<Product> {
    (0..n)
        .map(|i| {
            let mut product = Product::new(format!("sku-{}", i));
            product.price = Some((i * 17 % 500) as f64);
            product.views = (i * 31 % 5000) as u64;
            product.visual = profile(i);
            product
        })
        .collect()
}

fn benchmark_ranking(c: &mut Criterion) {
    let query = profile(7);
    let products = catalog(500);
    let engine = SimilarityEngine::new(Category::Clothing);

    let mut group = c.benchmark_group("排序");
    group.throughput(Throughput::Elements(products.len() as u64));
    group.bench_function("单次相似度", |b| b.iter(|| engine.compare(black_box(&query), &products[0].visual)));
    group.bench_function("500 个候选", |b| {
        let options = RankOptions { category: Category::Clothing, ..Default::default() };
        b.iter(|| rank(black_box(&query), &products, &options))
    });
    group.bench_function("500 个候选按价格排序", |b| {
        let options = RankOptions { sort_by: SortBy::PriceLow, price_weight: 0.2, ..Default::default() };
        b.iter(|| rank(black_box(&query), &products, &options))
    });
    group.finish();
}

criterion_group!(benches, benchmark_ranking);
criterion_main!(benches);
