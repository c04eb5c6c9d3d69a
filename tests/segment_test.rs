use fast_growcut_rust::common::{Config, RgbaView, ThreadingStrategy};
use fast_growcut_rust::mask::composite_overlay;
use fast_growcut_rust::segment::{segment, Segmentation};
use image::{Rgba, RgbaImage};

const WIDTH: u32 = 40;
const HEIGHT: u32 = 30;
const CENTER: (i64, i64) = (20, 15);
const RADIUS: i64 = 10;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn distance2(x: u32, y: u32) -> i64 {
    let dx = x as i64 - CENTER.0;
    let dy = y as i64 - CENTER.1;
    dx * dx + dy * dy
}

/// Yellow disc on a dark blue background with a little deterministic noise.
fn disc_image() -> RgbaImage {
    RgbaImage::from_fn(WIDTH, HEIGHT, |x, y| {
        let noise = ((x * 31 + y * 17) % 5) as u8 * 2;
        if distance2(x, y) <= RADIUS * RADIUS {
            Rgba([220 - noise, 200 + noise, 60, 255])
        } else {
            Rgba([30 + noise, 40, 50 - noise, 255])
        }
    })
}

/// Green 5x5 block in the centre, red frame around the image.
fn disc_overlay() -> RgbaImage {
    RgbaImage::from_fn(WIDTH, HEIGHT, |x, y| {
        let dx = (x as i64 - CENTER.0).abs();
        let dy = (y as i64 - CENTER.1).abs();
        if dx <= 2 && dy <= 2 {
            Rgba([0, 255, 0, 255])
        } else if x == 0 || y == 0 || x == WIDTH - 1 || y == HEIGHT - 1 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

fn view(image: &RgbaImage) -> RgbaView<'_> {
    RgbaView::new(image.as_raw(), image.width() as usize, image.height() as usize).unwrap()
}

fn run(config: &Config) -> Segmentation {
    let image = disc_image();
    let overlay = disc_overlay();
    segment(&view(&image), &view(&overlay), config).unwrap()
}

#[test]
fn disc_is_cut_out_test() {
    init_logger();
    let image = disc_image();
    let result = run(&Config::default());
    assert!(result.outcome.converged);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let foreground = result.mask.is_foreground(x as usize, y as usize);
            if distance2(x, y) <= 7 * 7 {
                assert!(foreground, "({x}, {y}) should be foreground");
            } else if distance2(x, y) >= 12 * 12 {
                assert!(!foreground, "({x}, {y}) should be background");
            }
        }
    }

    let output = RgbaImage::from_raw(WIDTH, HEIGHT, result.to_rgba8(&view(&image)).unwrap())
        .unwrap();
    assert_eq!(output.get_pixel(20, 15)[3], 0xFF);
    assert_eq!(output.get_pixel(0, 0)[3], 0x00);
    for (out, src) in output.pixels().zip(image.pixels()) {
        assert_eq!(out.0[..3], src.0[..3]);
    }
}

#[test]
fn seeds_keep_full_strength_test() {
    init_logger();
    let overlay = disc_overlay();
    let result = run(&Config::default());
    for (x, y, px) in overlay.enumerate_pixels() {
        let strength = result.strength[(x as usize, y as usize)];
        match px.0 {
            [0, 255, 0, 255] => assert_eq!(strength, 1.0),
            [255, 0, 0, 255] => assert_eq!(strength, -1.0),
            _ => assert!(strength.abs() <= 1.0),
        }
    }
}

#[test]
fn thread_count_does_not_change_result_test() {
    init_logger();
    let reference = run(&Config {
        threading_strategy: ThreadingStrategy::SingleThread,
        ..Config::default()
    });
    let reference_bits: Vec<u32> = reference.strength.data.iter().map(|v| v.to_bits()).collect();
    for (threads, workers) in [(1, 1), (2, 3), (4, 4), (8, 28)] {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap();
        let config = Config {
            num_workers: Some(workers),
            ..Config::default()
        };
        let result = pool.install(|| run(&config));
        let bits: Vec<u32> = result.strength.data.iter().map(|v| v.to_bits()).collect();
        assert_eq!(bits, reference_bits, "threads={threads} workers={workers}");
        assert_eq!(result.outcome, reference.outcome);
    }
}

#[test]
fn overlay_preview_test() {
    let image = disc_image();
    let overlay = disc_overlay();
    let preview = composite_overlay(&view(&image), &view(&overlay), 0x80).unwrap();
    let preview = RgbaImage::from_raw(WIDTH, HEIGHT, preview).unwrap();
    assert_eq!(preview.get_pixel(20, 15).0, [0, 255, 0, 255]);
    assert_eq!(preview.get_pixel(0, 10).0, [255, 0, 0, 255]);
    assert_eq!(preview.get_pixel(5, 5), image.get_pixel(5, 5));
}
