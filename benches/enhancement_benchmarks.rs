use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use bgremover::{EnhancementConfig, Enhancer, ImageIOService};
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};

fn photo_png(size: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(size, size, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8])
    });
    ImageIOService::encode_png(&DynamicImage::ImageRgb8(image), false).unwrap()
}

fn cutout_png(size: u32) -> Vec<u8> {
    let centre = size as f32 / 2.0;
    let image = RgbaImage::from_fn(size, size, |x, y| {
        let distance = ((x as f32 - centre).powi(2) + (y as f32 - centre).powi(2)).sqrt();
        let alpha = if distance < size as f32 / 3.0 { 255 } else { 0 };
        Rgba([120, 80, 200, alpha])
    });
    ImageIOService::encode_png(&DynamicImage::ImageRgba8(image), false).unwrap()
}

fn bench_enhancement(c: &mut Criterion) {
    let enhancer = Enhancer::new(EnhancementConfig::default());
    let mut group = c.benchmark_group("enhancement");
    group.sample_size(20);

    for size in [256u32, 1024] {
        let photo = photo_png(size);
        group.bench_with_input(BenchmarkId::new("input", size), &photo, |b, bytes| {
            b.iter(|| enhancer.enhance_input(black_box(bytes)));
        });

        let cutout = cutout_png(size);
        group.bench_with_input(BenchmarkId::new("output", size), &cutout, |b, bytes| {
            b.iter(|| enhancer.enhance_output(black_box(bytes)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_enhancement);
criterion_main!(benches);
