//! Model-free wired earphone detection.
//!
//! No pretrained class exists for wired earphones, so this module looks for
//! them with classical vision: two dark round blobs at ear height on either
//! side of the frame, joined by a thin dark wire. The check is all-or-nothing
//! and tuned to stay quiet rather than guess.

pub mod candidates;
pub mod contours;
pub mod pairing;
pub mod preprocessing;

use anyhow::Result;
use image::{GrayImage, RgbImage};
use log::{debug, warn};

use crate::debug::DebugConfig;
use crate::models::Contour;

pub use candidates::Candidates;

/// Tunables for [`EarphoneDetector`]. Fractions are relative to frame size.
#[derive(Debug, Clone, PartialEq)]
pub struct EarphoneParams {
    /// Pre-blur sigma. `canny` blurs again with sigma 1.4, so edges are
    /// found on a frame smoothed by roughly sigma 2 overall.
    pub blur_sigma: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Two earbuds plus one wire.
    pub min_contours: usize,
    /// Upper share of the frame where ears are expected.
    pub region_fraction: f64,
    pub min_points: usize,
    pub min_area: f64,
    pub max_area_fraction: f64,
    pub min_aspect: f64,
    pub max_aspect: f64,
    pub max_brightness: f64,
    pub earbud_min_aspect: f64,
    pub earbud_max_aspect: f64,
    pub min_circularity: f64,
    pub earbud_min_radius: f64,
    pub earbud_max_radius: f64,
    pub wire_min_elongation: f64,
    pub wire_max_thickness: u32,
    pub wire_min_length: u32,
    pub max_vertical_offset: f64,
    pub min_separation: f64,
    pub max_separation: f64,
    pub max_earbud_brightness: f64,
    pub wire_vertical_tolerance: f64,
    pub max_wire_brightness: f64,
    pub min_confidence: f64,
    pub max_confidence: f64,
}

impl Default for EarphoneParams {
    fn default() -> Self {
        Self {
            blur_sigma: 1.4,
            canny_low: 80.0,
            canny_high: 200.0,
            min_contours: 3,
            region_fraction: 0.3,
            min_points: 8,
            min_area: 100.0,
            max_area_fraction: 0.05,
            min_aspect: 0.1,
            max_aspect: 10.0,
            max_brightness: 150.0,
            earbud_min_aspect: 0.6,
            earbud_max_aspect: 1.8,
            min_circularity: 0.4,
            earbud_min_radius: 8.0,
            earbud_max_radius: 30.0,
            wire_min_elongation: 4.0,
            wire_max_thickness: 8,
            wire_min_length: 40,
            max_vertical_offset: 0.08,
            min_separation: 0.25,
            max_separation: 0.65,
            max_earbud_brightness: 120.0,
            wire_vertical_tolerance: 0.1,
            max_wire_brightness: 100.0,
            min_confidence: 0.7,
            max_confidence: 0.95,
        }
    }
}

/// Outcome of one heuristic run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarphoneDetection {
    pub detected: bool,
    pub confidence: f64,
}

impl EarphoneDetection {
    pub fn not_detected() -> Self {
        Self {
            detected: false,
            confidence: 0.0,
        }
    }

    fn accepted(confidence: f64) -> Self {
        Self {
            detected: true,
            confidence,
        }
    }
}

/// Edge map plus the grayscale it was computed from.
struct Prepared {
    gray: GrayImage,
    edges: GrayImage,
}

/// Classical-vision wired earphone detector.
#[derive(Debug, Clone, Default)]
pub struct EarphoneDetector {
    pub params: EarphoneParams,
    debug: Option<DebugConfig>,
}

impl EarphoneDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(mut self, params: EarphoneParams) -> Self {
        self.params = params;
        self
    }

    /// Write intermediate images to `debug` on every run.
    pub fn with_debug(mut self, debug: DebugConfig) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Run the full heuristic. Never fails: any internal error is reported
    /// as "not detected".
    pub fn detect(&self, img: &RgbImage) -> EarphoneDetection {
        match self.try_detect(img) {
            Ok(Some(confidence)) => EarphoneDetection::accepted(confidence),
            Ok(None) => EarphoneDetection::not_detected(),
            Err(e) => {
                debug!("Earphone heuristic failed: {:#}", e);
                EarphoneDetection::not_detected()
            }
        }
    }

    fn try_detect(&self, img: &RgbImage) -> Result<Option<f64>> {
        let (width, height) = img.dimensions();
        let prepared = self.prepare(img)?;

        // Step 1: Find contours
        let contours = contours::find_external_contours(&prepared.edges);
        debug!("Found {} external contours", contours.len());
        if contours.len() < self.params.min_contours {
            return Ok(None);
        }

        // Step 2: Classify earbud / wire shapes
        let found = candidates::classify_contours(&contours, &prepared.gray, &self.params);
        debug!(
            "Found {} earbud and {} wire candidates",
            found.earbuds.len(),
            found.wires.len()
        );
        if found.earbuds.len() < 2 || found.wires.is_empty() {
            return Ok(None);
        }

        // Step 3: Pair and score
        let confidence =
            pairing::find_pair(&found.earbuds, &found.wires, width, height, &self.params);
        if let Some(c) = confidence {
            debug!("Wired earphones detected (confidence: {:.3})", c);
        }
        Ok(confidence)
    }

    fn prepare(&self, img: &RgbImage) -> Result<Prepared> {
        let (width, height) = img.dimensions();
        if width < 3 || height < 3 {
            anyhow::bail!("frame too small for edge detection: {}x{}", width, height);
        }

        let gray = preprocessing::to_grayscale(img);
        let blurred = preprocessing::apply_blur(&gray, self.params.blur_sigma);
        let edges =
            preprocessing::detect_edges(&blurred, self.params.canny_low, self.params.canny_high);
        let dilated = preprocessing::dilate_edges(&edges);

        if let Some(debug) = &self.debug {
            match debug.start_run() {
                Ok(run) => {
                    run.save_input(img);
                    run.save_stage(1, "grayscale", &gray);
                    run.save_stage(2, "blur", &blurred);
                    run.save_stage(3, "edges", &edges);
                    run.save_stage(4, "dilated", &dilated);
                }
                Err(e) => warn!("Failed to prepare debug run: {:#}", e),
            }
        }

        Ok(Prepared {
            gray,
            edges: dilated,
        })
    }

    /// Get all external contours of a frame (for debugging)
    pub fn get_contours(&self, img: &RgbImage) -> Result<Vec<Contour>> {
        let prepared = self.prepare(img)?;
        Ok(contours::find_external_contours(&prepared.edges))
    }

    /// Get earbud and wire candidates of a frame (for debugging)
    pub fn get_candidates(&self, img: &RgbImage) -> Result<Candidates> {
        let prepared = self.prepare(img)?;
        let contours = contours::find_external_contours(&prepared.edges);
        Ok(candidates::classify_contours(
            &contours,
            &prepared.gray,
            &self.params,
        ))
    }
}
