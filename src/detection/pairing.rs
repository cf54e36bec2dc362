use log::debug;

use super::EarphoneParams;
use crate::models::{EarbudCandidate, WireCandidate};

/// Find a left/right earbud pair joined by a wire and score it.
///
/// Pairs are visited left-major in candidate order and the first one that
/// clears every check and scores at least `min_confidence` wins, even if a
/// later pair would score higher. Returns the capped confidence.
pub fn find_pair(
    earbuds: &[EarbudCandidate],
    wires: &[WireCandidate],
    width: u32,
    height: u32,
    params: &EarphoneParams,
) -> Option<f64> {
    let frame_center_x = (width / 2) as i32;
    let (left, right): (Vec<&EarbudCandidate>, Vec<&EarbudCandidate>) =
        earbuds.iter().partition(|e| e.center.x < frame_center_x);

    for l in &left {
        for r in &right {
            if !is_symmetric_pair(l, r, width, height, params) {
                continue;
            }
            if !wire_connects(l, r, wires, height, params) {
                continue;
            }

            let confidence = pair_confidence(l, r, height, params);
            debug!(
                "earbud pair ({}, {}) / ({}, {}) scored {:.3}",
                l.center.x, l.center.y, r.center.x, r.center.y, confidence
            );
            if confidence >= params.min_confidence {
                return Some(confidence.min(params.max_confidence));
            }
        }
    }

    None
}

/// Same height, ear-like spacing, both dark.
fn is_symmetric_pair(
    left: &EarbudCandidate,
    right: &EarbudCandidate,
    width: u32,
    height: u32,
    params: &EarphoneParams,
) -> bool {
    let y_diff = (left.center.y - right.center.y).abs() as f64;
    if y_diff > height as f64 * params.max_vertical_offset {
        return false;
    }

    let x_distance = (left.center.x - right.center.x).abs() as f64;
    let w = width as f64;
    if !(x_distance > w * params.min_separation && x_distance < w * params.max_separation) {
        return false;
    }

    left.brightness <= params.max_earbud_brightness
        && right.brightness <= params.max_earbud_brightness
}

/// A dark wire centered between the buds, near their vertical midpoint.
fn wire_connects(
    left: &EarbudCandidate,
    right: &EarbudCandidate,
    wires: &[WireCandidate],
    height: u32,
    params: &EarphoneParams,
) -> bool {
    let (lx, rx) = (left.center.x, right.center.x);
    let mid_y = (left.center.y + right.center.y) as f64 / 2.0;
    let tolerance = height as f64 * params.wire_vertical_tolerance;

    wires.iter().any(|wire| {
        let between = (lx < wire.center.x && wire.center.x < rx)
            || (rx < wire.center.x && wire.center.x < lx);
        between
            && (wire.center.y as f64 - mid_y).abs() < tolerance
            && wire.brightness < params.max_wire_brightness
    })
}

/// Weighted blend of roundness, height symmetry and size match, uncapped.
pub fn pair_confidence(
    left: &EarbudCandidate,
    right: &EarbudCandidate,
    height: u32,
    params: &EarphoneParams,
) -> f64 {
    let avg_circularity = (left.circularity + right.circularity) / 2.0;
    let y_diff = (left.center.y - right.center.y).abs() as f64;
    let symmetry = 1.0 - y_diff / (height as f64 * params.max_vertical_offset);
    let size_match =
        1.0 - (left.area - right.area).abs() / left.area.max(right.area).max(1.0);

    avg_circularity * 0.4 + symmetry * 0.4 + size_match * 0.2
}
