use std::path::Path;

use anyhow::{Context, Result, anyhow};
use image::{Rgb, RgbImage};
use log::{debug, info};
use rten::Model;
use rten_tensor::NdTensor;
use rten_tensor::prelude::*;

use super::backend::ObjectDetector;
use super::coco;
use crate::models::{BoundingBox, RawDetection};

/// Gray used to pad letterboxed input.
const PAD_COLOR: Rgb<u8> = Rgb([114, 114, 114]);

/// Upper bound on detections kept after NMS.
const MAX_DETECTIONS: usize = 300;

/// YOLOv8-style COCO detector running on the `rten` runtime.
///
/// Expects a single `[1, 3, S, S]` float input in `[0, 1]` and a single
/// `[1, 4 + C, N]` output where rows 0..4 are `cx, cy, w, h` in input pixels
/// and the remaining rows are per-class scores.
pub struct YoloDetector {
    model: Model,
    input_size: u32,
    score_floor: f32,
    nms_iou: f32,
}

impl YoloDetector {
    /// Load a model converted to the `.rten` format.
    pub fn load<P: AsRef<Path>>(model_path: P, input_size: u32) -> Result<Self> {
        let model_path = model_path.as_ref();
        if input_size == 0 {
            return Err(anyhow!("model input size must be positive"));
        }
        let model = Model::load_file(model_path).with_context(|| {
            format!("failed to load detection model from {}", model_path.display())
        })?;
        info!("Loaded detection model from {}", model_path.display());

        Ok(Self {
            model,
            input_size,
            score_floor: 0.25,
            nms_iou: 0.7,
        })
    }

    /// Minimum class score for a box to be reported at all.
    pub fn with_score_floor(mut self, score_floor: f32) -> Self {
        self.score_floor = score_floor;
        self
    }

    pub fn with_nms_iou(mut self, nms_iou: f32) -> Self {
        self.nms_iou = nms_iou;
        self
    }
}

impl ObjectDetector for YoloDetector {
    fn name(&self) -> &'static str {
        "yolo-rten"
    }

    fn detect(&self, frame: &RgbImage) -> Result<Vec<RawDetection>> {
        let letterbox = Letterbox::fit(frame.width(), frame.height(), self.input_size);
        let input = to_input_tensor(&letterbox.apply(frame), self.input_size);

        let output = self
            .model
            .run_one(input.view().into(), None)
            .context("detection model inference failed")?;
        let output: NdTensor<f32, 3> = output
            .try_into()
            .map_err(|_| anyhow!("detection model returned a non-f32 or non-3D output"))?;

        let rows = output.size(1);
        let anchors = output.size(2);
        if rows <= 4 {
            return Err(anyhow!("unexpected output shape [1, {}, {}]", rows, anchors));
        }

        let data = output.to_vec();
        let mut detections = decode_predictions(
            &data,
            rows,
            anchors,
            &letterbox,
            frame.width(),
            frame.height(),
            self.score_floor,
        );
        non_maximum_suppression(&mut detections, self.nms_iou);
        debug!("Model returned {} boxes after NMS", detections.len());

        Ok(detections)
    }
}

/// Aspect-preserving resize into a square canvas, centered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub new_width: u32,
    pub new_height: u32,
    pub pad_x: u32,
    pub pad_y: u32,
    pub size: u32,
}

impl Letterbox {
    pub fn fit(width: u32, height: u32, size: u32) -> Self {
        let scale = (size as f32 / width.max(1) as f32).min(size as f32 / height.max(1) as f32);
        let new_width = ((width as f32 * scale).round() as u32).min(size).max(1);
        let new_height = ((height as f32 * scale).round() as u32).min(size).max(1);
        Self {
            scale,
            new_width,
            new_height,
            pad_x: size.saturating_sub(new_width) / 2,
            pad_y: size.saturating_sub(new_height) / 2,
            size,
        }
    }

    pub fn apply(&self, frame: &RgbImage) -> RgbImage {
        let resized = image::imageops::resize(
            frame,
            self.new_width,
            self.new_height,
            image::imageops::FilterType::Triangle,
        );
        let mut canvas = RgbImage::from_pixel(self.size, self.size, PAD_COLOR);
        image::imageops::overlay(&mut canvas, &resized, self.pad_x.into(), self.pad_y.into());
        canvas
    }

    /// Map a letterbox-space point back to frame pixels.
    pub fn to_frame(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.pad_x as f32) / self.scale,
            (y - self.pad_y as f32) / self.scale,
        )
    }
}

/// HWC u8 -> NCHW f32 in `[0, 1]`.
fn to_input_tensor(canvas: &RgbImage, size: u32) -> NdTensor<f32, 4> {
    let s = size as usize;
    let mut data = vec![0.0f32; 3 * s * s];
    for (x, y, pixel) in canvas.enumerate_pixels() {
        let offset = y as usize * s + x as usize;
        for c in 0..3 {
            data[c * s * s + offset] = pixel[c] as f32 / 255.0;
        }
    }
    NdTensor::from_data([1, 3, s, s], data)
}

/// Turn the raw `[4 + C, N]` prediction grid (batch 0, row-major) into
/// frame-space detections, keeping the best class per anchor.
pub fn decode_predictions(
    data: &[f32],
    rows: usize,
    anchors: usize,
    letterbox: &Letterbox,
    frame_width: u32,
    frame_height: u32,
    score_floor: f32,
) -> Vec<RawDetection> {
    let at = |row: usize, i: usize| data[row * anchors + i];
    let num_classes = rows - 4;
    let (fw, fh) = (frame_width as f32, frame_height as f32);

    let mut detections = Vec::new();
    for i in 0..anchors {
        let mut best_class = 0;
        let mut best_score = f32::MIN;
        for class_id in 0..num_classes {
            let score = at(4 + class_id, i);
            if score > best_score {
                best_score = score;
                best_class = class_id;
            }
        }
        if best_score < score_floor {
            continue;
        }

        let (cx, cy, w, h) = (at(0, i), at(1, i), at(2, i), at(3, i));
        let (x1, y1) = letterbox.to_frame(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = letterbox.to_frame(cx + w / 2.0, cy + h / 2.0);
        let bbox = BoundingBox::new(
            x1.clamp(0.0, fw),
            y1.clamp(0.0, fh),
            x2.clamp(0.0, fw),
            y2.clamp(0.0, fh),
        );
        if bbox.width() <= 0.0 || bbox.height() <= 0.0 {
            continue;
        }

        detections.push(RawDetection {
            class_id: best_class,
            class_name: coco::class_name(best_class),
            confidence: best_score.clamp(0.0, 1.0),
            bbox,
        });
    }

    detections
}

/// Class-aware NMS: keep the highest-scoring box of each overlapping group.
pub fn non_maximum_suppression(detections: &mut Vec<RawDetection>, iou_threshold: f32) {
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<RawDetection> = Vec::with_capacity(detections.len());
    for candidate in detections.drain(..) {
        let overlaps = kept.iter().any(|k| {
            k.class_id == candidate.class_id && k.bbox.iou(&candidate.bbox) > iou_threshold
        });
        if !overlaps {
            kept.push(candidate);
        }
        if kept.len() >= MAX_DETECTIONS {
            break;
        }
    }

    *detections = kept;
}
