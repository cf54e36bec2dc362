use image::GrayImage;
use imageproc::point::Point;
use log::debug;

use super::EarphoneParams;
use crate::models::{Contour, EarbudCandidate, WireCandidate};

/// Earbud and wire shapes found in the ear region of one frame.
#[derive(Debug, Clone, Default)]
pub struct Candidates {
    pub earbuds: Vec<EarbudCandidate>,
    pub wires: Vec<WireCandidate>,
}

/// Sort contours into earbud and wire candidates.
///
/// Only dark, reasonably sized shapes whose bounding-box center lies in the
/// upper band of the frame are considered. A contour inside the earbud aspect
/// band is never also considered as a wire.
pub fn classify_contours(
    contours: &[Contour],
    gray: &GrayImage,
    params: &EarphoneParams,
) -> Candidates {
    let (width, height) = gray.dimensions();
    let region_limit = (height as f64 * params.region_fraction) as i32;
    let max_area = (width as f64 * height as f64 * params.max_area_fraction).trunc();

    let mut candidates = Candidates::default();

    for contour in contours {
        if contour.points.len() < params.min_points {
            continue;
        }
        if contour.bbox_center().y > region_limit {
            continue;
        }

        let area = contour.area();
        if area < params.min_area || area > max_area {
            continue;
        }

        let aspect = contour.aspect_ratio();
        if aspect < params.min_aspect || aspect > params.max_aspect {
            continue;
        }

        let brightness = contour.average_brightness(gray);
        if brightness > params.max_brightness {
            continue;
        }

        if (params.earbud_min_aspect..=params.earbud_max_aspect).contains(&aspect) {
            if let Some(earbud) = earbud_candidate(contour, area, aspect, brightness, params) {
                debug!(
                    "earbud candidate at ({}, {}): area={:.1} circ={:.3} brightness={:.1}",
                    earbud.center.x, earbud.center.y, earbud.area, earbud.circularity, brightness
                );
                candidates.earbuds.push(earbud);
            }
        } else if let Some(wire) = wire_candidate(contour, aspect, brightness, params) {
            debug!(
                "wire candidate at ({}, {}): length={} brightness={:.1}",
                wire.center.x, wire.center.y, wire.length, brightness
            );
            candidates.wires.push(wire);
        }
    }

    candidates
}

fn earbud_candidate(
    contour: &Contour,
    area: f64,
    aspect: f64,
    brightness: f64,
    params: &EarphoneParams,
) -> Option<EarbudCandidate> {
    if contour.perimeter() <= 0.0 {
        return None;
    }
    let circularity = contour.circularity();
    if circularity <= params.min_circularity {
        return None;
    }
    let center = contour.centroid()?;
    let radius = contour.radius();
    if !(params.earbud_min_radius..=params.earbud_max_radius).contains(&radius) {
        return None;
    }

    Some(EarbudCandidate {
        center,
        area,
        circularity,
        aspect_ratio: aspect,
        brightness,
    })
}

fn wire_candidate(
    contour: &Contour,
    aspect: f64,
    brightness: f64,
    params: &EarphoneParams,
) -> Option<WireCandidate> {
    let elongation = aspect.max(1.0 / aspect.max(0.001));
    if elongation <= params.wire_min_elongation {
        return None;
    }

    let (w, h) = (contour.width(), contour.height());
    if w.min(h) >= params.wire_max_thickness || w.max(h) <= params.wire_min_length {
        return None;
    }

    Some(WireCandidate {
        center: contour.bbox_center(),
        length: w.max(h),
        start: Point::new(contour.min_x as i32, contour.min_y as i32),
        end: Point::new((contour.min_x + w) as i32, (contour.min_y + h) as i32),
        brightness,
    })
}
