use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use image::GrayImage;
use imageproc::point::Point;
use serde::Serialize;

/// Prop categories a frame is scored against.
///
/// Variants are declared in the lexical order of their display names, so the
/// derived `Ord` is the order used for sorted labels and suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum CanonicalLabel {
    Books,
    Camera,
    Matcha,
    Plushie,
    #[serde(rename = "Wired Earphones")]
    WiredEarphones,
}

impl CanonicalLabel {
    pub const ALL: [CanonicalLabel; 5] = [
        CanonicalLabel::Books,
        CanonicalLabel::Camera,
        CanonicalLabel::Matcha,
        CanonicalLabel::Plushie,
        CanonicalLabel::WiredEarphones,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalLabel::Books => "Books",
            CanonicalLabel::Camera => "Camera",
            CanonicalLabel::Matcha => "Matcha",
            CanonicalLabel::Plushie => "Plushie",
            CanonicalLabel::WiredEarphones => "Wired Earphones",
        }
    }
}

impl fmt::Display for CanonicalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Axis-aligned box in source-image pixels, corner form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).abs()
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).abs()
    }

    /// Width over height, 0 for a degenerate box.
    pub fn aspect_ratio(&self) -> f32 {
        let h = self.height();
        if h > 0.0 { self.width() / h } else { 0.0 }
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);
        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - inter;
        if union > 0.0 { inter / union } else { 0.0 }
    }

    /// Integer pixel rectangle `(x, y, width, height)` clipped to the frame.
    /// Coordinates are truncated toward zero before clipping.
    pub fn clip_to(&self, frame_width: u32, frame_height: u32) -> Option<(u32, u32, u32, u32)> {
        let clamp = |v: f32, max: u32| (v.max(0.0) as u32).min(max);
        let x1 = clamp(self.x1.min(self.x2), frame_width);
        let y1 = clamp(self.y1.min(self.y2), frame_height);
        let x2 = clamp(self.x1.max(self.x2), frame_width);
        let y2 = clamp(self.y1.max(self.y2), frame_height);

        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some((x1, y1, x2 - x1, y2 - y1))
    }
}

/// Detection as reported by the object model, before any gating.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    pub class_id: usize,
    pub class_name: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

/// An admitted detection. Only built after the gate and validators passed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub name: String,
    pub label: CanonicalLabel,
    pub confidence: f64,
}

impl Detection {
    pub fn new(name: impl Into<String>, label: CanonicalLabel, confidence: f64) -> Self {
        Self {
            name: name.into(),
            label,
            confidence: round_confidence(confidence),
        }
    }
}

/// Round to three decimals, the precision reported to callers.
pub fn round_confidence(confidence: f64) -> f64 {
    (confidence * 1000.0).round() / 1000.0
}

/// Per-request analysis output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    pub detected: Vec<Detection>,
    pub labels: Vec<CanonicalLabel>,
    pub score: u8,
    pub suggestions: Vec<String>,
    pub ready: bool,
}

impl ResultRecord {
    /// Record with nothing detected and no suggestions, used for failed requests.
    pub fn empty(ready: bool) -> Self {
        Self {
            detected: Vec::new(),
            labels: Vec::new(),
            score: 0,
            suggestions: Vec::new(),
            ready,
        }
    }

    /// Best confidence seen for each label.
    pub fn best_confidences(&self) -> BTreeMap<CanonicalLabel, f64> {
        crate::scoring::best_per_label(&self.detected)
    }

    pub fn label_set(&self) -> BTreeSet<CanonicalLabel> {
        self.labels.iter().copied().collect()
    }
}

/// Response envelope: `ok` plus the record fields, or an error message with
/// an empty record.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub record: ResultRecord,
}

impl Response {
    pub fn success(record: ResultRecord) -> Self {
        Self {
            ok: true,
            error: None,
            record,
        }
    }

    pub fn failure(error: impl fmt::Display, ready: bool) -> Self {
        Self {
            ok: false,
            error: Some(error.to_string()),
            record: ResultRecord::empty(ready),
        }
    }
}

/// Roughly circular dark blob in the ear region.
#[derive(Debug, Clone, PartialEq)]
pub struct EarbudCandidate {
    pub center: Point<i32>,
    pub area: f64,
    pub circularity: f64,
    pub aspect_ratio: f64,
    pub brightness: f64,
}

/// Thin elongated dark shape that may be the cable.
#[derive(Debug, Clone, PartialEq)]
pub struct WireCandidate {
    pub center: Point<i32>,
    pub length: u32,
    pub start: Point<i32>,
    pub end: Point<i32>,
    pub brightness: f64,
}

/// External contour traced from an edge map, with its bounding box.
#[derive(Debug, Clone)]
pub struct Contour {
    /// Chain-compressed boundary: only the corners of straight runs are kept.
    pub points: Vec<Point<i32>>,
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl Contour {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    /// Enclosed polygon area (shoelace).
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut twice = 0.0;
        for i in 0..n {
            let p = self.points[i];
            let q = self.points[(i + 1) % n];
            twice += p.x as f64 * q.y as f64 - q.x as f64 * p.y as f64;
        }
        (twice / 2.0).abs()
    }

    /// Closed boundary length.
    pub fn perimeter(&self) -> f64 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }
        (0..n)
            .map(|i| {
                let p = self.points[i];
                let q = self.points[(i + 1) % n];
                let dx = (q.x - p.x) as f64;
                let dy = (q.y - p.y) as f64;
                (dx * dx + dy * dy).sqrt()
            })
            .sum()
    }

    /// `4π·area / perimeter²`: 1.0 for a perfect circle, 0 when undefined.
    pub fn circularity(&self) -> f64 {
        let perimeter = self.perimeter();
        if perimeter <= 0.0 {
            return 0.0;
        }
        4.0 * std::f64::consts::PI * self.area() / (perimeter * perimeter)
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width() as f64 / self.height().max(1) as f64
    }

    /// Radius of the circle with the same area.
    pub fn radius(&self) -> f64 {
        (self.area() / std::f64::consts::PI).sqrt()
    }

    pub fn bbox_center(&self) -> Point<i32> {
        Point::new(
            (self.min_x + self.width() / 2) as i32,
            (self.min_y + self.height() / 2) as i32,
        )
    }

    /// Area centroid of the polygon, truncated to whole pixels.
    /// `None` when the polygon has no area.
    pub fn centroid(&self) -> Option<Point<i32>> {
        let n = self.points.len();
        if n < 3 {
            return None;
        }
        let (mut m00, mut m10, mut m01) = (0.0f64, 0.0f64, 0.0f64);
        for i in 0..n {
            let p = self.points[i];
            let q = self.points[(i + 1) % n];
            let (px, py, qx, qy) = (p.x as f64, p.y as f64, q.x as f64, q.y as f64);
            let cross = px * qy - qx * py;
            m00 += cross;
            m10 += (px + qx) * cross;
            m01 += (py + qy) * cross;
        }
        if m00 == 0.0 {
            return None;
        }
        // m00 is twice the signed area; the centroid divides by 6·A = 3·m00.
        let cx = m10 / (3.0 * m00);
        let cy = m01 / (3.0 * m00);
        Some(Point::new(cx as i32, cy as i32))
    }

    /// Mean grayscale value over the bounding box.
    pub fn average_brightness(&self, gray: &GrayImage) -> f64 {
        let mut sum: u64 = 0;
        let mut count: u64 = 0;

        let max_x = self.max_x.min(gray.width().saturating_sub(1));
        let max_y = self.max_y.min(gray.height().saturating_sub(1));

        for y in self.min_y..=max_y {
            for x in self.min_x..=max_x {
                sum += gray.get_pixel(x, y)[0] as u64;
                count += 1;
            }
        }

        if count > 0 {
            sum as f64 / count as f64
        } else {
            0.0
        }
    }
}
