//! Class-specific plausibility checks run after the confidence gate.
//!
//! A generic detector happily labels any mug a "cup" and any flat rectangle a
//! "book". These checks look at the box itself and drop detections that cannot
//! be the prop we score for. Rejections are a normal outcome, not an error.

use image::RgbImage;
use log::debug;

use crate::models::{BoundingBox, CanonicalLabel};

/// Hue band (0–179 scale) counted as matcha green.
pub const GREEN_HUE_MIN: u8 = 40;
pub const GREEN_HUE_MAX: u8 = 80;
/// Minimum share of green pixels in a drink crop.
pub const MIN_GREEN_RATIO: f64 = 0.15;

/// Accepted width/height range for a book box.
pub const BOOK_MIN_ASPECT: f32 = 0.3;
pub const BOOK_MAX_ASPECT: f32 = 3.0;

pub type Validator = fn(&RgbImage, &BoundingBox) -> bool;

/// Labels with an extra check. Labels not listed pass once gated.
pub const VALIDATORS: &[(CanonicalLabel, Validator)] = &[
    (CanonicalLabel::Matcha, validate_drink),
    (CanonicalLabel::Books, validate_book),
];

pub fn validator_for(label: CanonicalLabel) -> Option<Validator> {
    VALIDATORS
        .iter()
        .find(|(l, _)| *l == label)
        .map(|(_, validator)| *validator)
}

/// Run the validator registered for `label`, if any.
pub fn passes(label: CanonicalLabel, frame: &RgbImage, bbox: &BoundingBox) -> bool {
    match validator_for(label) {
        Some(validator) => validator(frame, bbox),
        None => true,
    }
}

/// Reject drinks whose crop is not green enough to be matcha.
pub fn validate_drink(frame: &RgbImage, bbox: &BoundingBox) -> bool {
    let Some(ratio) = green_ratio(frame, bbox) else {
        return true;
    };
    if ratio < MIN_GREEN_RATIO {
        debug!("Rejected cup as matcha (green ratio: {:.2})", ratio);
        return false;
    }
    true
}

/// Reject book boxes that are too thin or too wide to be a book.
pub fn validate_book(_frame: &RgbImage, bbox: &BoundingBox) -> bool {
    let aspect = bbox.aspect_ratio();
    if !(BOOK_MIN_ASPECT..=BOOK_MAX_ASPECT).contains(&aspect) {
        debug!("Rejected book (aspect ratio: {:.2})", aspect);
        return false;
    }
    true
}

/// Fraction of crop pixels inside the green hue band.
/// `None` when the box does not overlap the frame.
pub fn green_ratio(frame: &RgbImage, bbox: &BoundingBox) -> Option<f64> {
    let (x, y, w, h) = bbox.clip_to(frame.width(), frame.height())?;

    let mut green: u64 = 0;
    for py in y..y + h {
        for px in x..x + w {
            let hue = hue_179(frame.get_pixel(px, py).0);
            if (GREEN_HUE_MIN..=GREEN_HUE_MAX).contains(&hue) {
                green += 1;
            }
        }
    }

    Some(green as f64 / (w as u64 * h as u64) as f64)
}

/// Hue of an RGB pixel on the 8-bit 0–179 scale. Achromatic pixels get 0.
pub fn hue_179([r, g, b]: [u8; 3]) -> u8 {
    let (r, g, b) = (r as f32, g as f32, b as f32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    if delta == 0.0 {
        return 0;
    }

    let mut hue = if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if hue < 0.0 {
        hue += 360.0;
    }

    ((hue / 2.0).round() as u16 % 180) as u8
}
