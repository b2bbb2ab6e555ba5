use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tiny_skia::Pixmap;

use motionmark::render::device::pixmap::PixmapDevice;
use motionmark::render::device::recording::RecordingDevice;
use motionmark::util::config::BenchConfig;
use motionmark::{Engine, HostActions, Viewport};

const WIDTH: u32 = 800;
const HEIGHT: u32 = 400;
const LEVELS: [i32; 4] = [0, 8, 12, 16];

fn engine_at(level: i32) -> Engine {
    let mut engine = Engine::new(&BenchConfig { complexity: level, seed: Some(1), ..BenchConfig::default() });
    engine.attach(&mut HostActions::default());
    engine
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let viewport = Viewport::new(WIDTH as f32, HEIGHT as f32);

    let mut raster = c.benchmark_group("raster");
    raster.sample_size(20);
    for level in LEVELS {
        let mut engine = engine_at(level);
        let mut pixmap = Pixmap::new(WIDTH, HEIGHT).unwrap();
        let mut device = PixmapDevice::new();
        raster.bench_with_input(BenchmarkId::from_parameter(level), &level, |b, _| {
            b.iter(|| {
                engine.render_frame(viewport, |vp| device.lease(pixmap.as_mut(), vp)).unwrap();
            })
        });
    }
    raster.finish();

    // Scene-side cost only: batching, mapping and split toggling without a rasterizer.
    let mut batching = c.benchmark_group("batching");
    for level in LEVELS {
        let mut engine = engine_at(level);
        let mut device = RecordingDevice::counting();
        batching.bench_with_input(BenchmarkId::from_parameter(level), &level, |b, _| {
            b.iter(|| {
                device.reset();
                engine.render_frame(viewport, |_| Ok(&mut device)).unwrap();
            })
        });
    }
    batching.finish();

    // Full loop with synthetic 16 ms timestamps, the way a display refresh drives it.
    c.bench_function("headless_loop", |b| {
        let mut engine = engine_at(8);
        let mut device = RecordingDevice::counting();
        let mut host = HostActions::default();
        let mut now = Duration::ZERO;
        b.iter(|| {
            now += Duration::from_millis(16);
            engine.on_animation_frame(now, &mut host);
            if host.take().invalidate {
                engine.render_frame(viewport, |_| Ok(&mut device)).unwrap();
            }
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
