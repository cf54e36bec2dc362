#![allow(dead_code)]

use std::io::Cursor;

use anyhow::anyhow;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;
use vibecheck::{BoundingBox, EarbudCandidate, ObjectDetector, RawDetection, WireCandidate};

pub const FRAME_WIDTH: u32 = 640;
pub const FRAME_HEIGHT: u32 = 480;

/// Mid-gray backdrop for the earphone frames. Dark enough that the thin wire
/// averages below the wire brightness limit, bright enough for strong edges.
pub const BACKDROP: Rgb<u8> = Rgb([170, 170, 170]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Uniform single-color frame.
pub fn blank_frame(color: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, color)
}

/// Frame with a dark earbud at each ear and a short dark wire between them,
/// all in the top band of the frame.
pub fn earphone_frame() -> RgbImage {
    let mut img = earbuds_only_frame();
    draw_wire(&mut img);
    img
}

/// The earphone frame without the connecting wire.
pub fn earbuds_only_frame() -> RgbImage {
    let mut img = blank_frame(BACKDROP);
    draw_filled_circle_mut(&mut img, (200, 70), 20, BLACK);
    draw_filled_circle_mut(&mut img, (440, 70), 20, BLACK);
    img
}

/// The earphone layout shifted into the lower half of the frame.
pub fn low_earphone_frame() -> RgbImage {
    let mut img = blank_frame(BACKDROP);
    draw_filled_circle_mut(&mut img, (200, 380), 20, BLACK);
    draw_filled_circle_mut(&mut img, (440, 380), 20, BLACK);
    draw_filled_rect_mut(&mut img, Rect::at(296, 378).of_size(48, 4), BLACK);
    img
}

fn draw_wire(img: &mut RgbImage) {
    draw_filled_rect_mut(img, Rect::at(296, 68).of_size(48, 4), BLACK);
}

/// Red frame with `green_columns` matcha-green columns at the left of the
/// 100x100 region starting at (100, 100).
pub fn drink_frame(green_columns: u32) -> RgbImage {
    let mut img = blank_frame(Rgb([200, 60, 60]));
    if green_columns > 0 {
        draw_filled_rect_mut(
            &mut img,
            Rect::at(100, 100).of_size(green_columns, 100),
            Rgb([110, 170, 90]),
        );
    }
    img
}

pub fn encode_png(img: &RgbImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("Failed to encode test image");
    bytes
}

pub fn data_url(img: &RgbImage) -> Vec<u8> {
    format!("data:image/png;base64,{}", STANDARD.encode(encode_png(img))).into_bytes()
}

pub fn raw(class_name: &str, confidence: f32, bbox: BoundingBox) -> RawDetection {
    RawDetection {
        class_id: 0,
        class_name: class_name.to_string(),
        confidence,
        bbox,
    }
}

/// Detector that returns the same boxes for every frame.
pub struct FixedDetector {
    pub detections: Vec<RawDetection>,
}

impl FixedDetector {
    pub fn new(detections: Vec<RawDetection>) -> Self {
        Self { detections }
    }
}

impl ObjectDetector for FixedDetector {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn detect(&self, _frame: &RgbImage) -> anyhow::Result<Vec<RawDetection>> {
        Ok(self.detections.clone())
    }
}

/// Detector whose inference always fails.
pub struct FailingDetector;

impl ObjectDetector for FailingDetector {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn detect(&self, _frame: &RgbImage) -> anyhow::Result<Vec<RawDetection>> {
        Err(anyhow!("inference exploded"))
    }
}

pub fn earbud(x: i32, y: i32, circularity: f64, area: f64, brightness: f64) -> EarbudCandidate {
    EarbudCandidate {
        center: Point::new(x, y),
        area,
        circularity,
        aspect_ratio: 1.0,
        brightness,
    }
}

pub fn wire(x: i32, y: i32, brightness: f64) -> WireCandidate {
    WireCandidate {
        center: Point::new(x, y),
        length: 60,
        start: Point::new(x - 30, y - 2),
        end: Point::new(x + 30, y + 2),
        brightness,
    }
}
