use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_INPUT_SIZE: u32 = 640;
const DEFAULT_SCORE_FLOOR: f32 = 0.25;
const DEFAULT_NMS_IOU: f32 = 0.7;

pub const CONFIG_ENV: &str = "VIBECHECK_CONFIG";
pub const MODEL_PATH_ENV: &str = "VIBECHECK_MODEL_PATH";

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    model: Option<ModelConfigFile>,
    debug_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ModelConfigFile {
    path: Option<PathBuf>,
    input_size: Option<u32>,
    score_floor: Option<f32>,
    nms_iou: Option<f32>,
}

/// Startup configuration for the analyzer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// `.rten` detection model; `None` runs heuristic-only.
    pub model_path: Option<PathBuf>,
    /// Square model input side in pixels.
    pub input_size: u32,
    /// Minimum class score a model box needs to be reported.
    pub score_floor: f32,
    pub nms_iou: f32,
    /// Where to write intermediate heuristic images.
    pub debug_dir: Option<PathBuf>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            input_size: DEFAULT_INPUT_SIZE,
            score_floor: DEFAULT_SCORE_FLOOR,
            nms_iou: DEFAULT_NMS_IOU,
            debug_dir: None,
        }
    }
}

impl AnalyzerConfig {
    /// Defaults, then the file named by `path` (or `VIBECHECK_CONFIG`), then
    /// environment overrides. Call [`AnalyzerConfig::validate`] after applying
    /// command line flags.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
        let file_cfg = match path.map(Path::to_path_buf).or(env_path) {
            Some(path) => read_config_file(&path)?,
            None => ConfigFile::default(),
        };
        let mut cfg = Self::from_file(file_cfg);
        cfg.apply_env();
        Ok(cfg)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(raw).context("invalid config")?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: ConfigFile) -> Self {
        let model = file.model.unwrap_or_default();
        Self {
            model_path: model.path,
            input_size: model.input_size.unwrap_or(DEFAULT_INPUT_SIZE),
            score_floor: model.score_floor.unwrap_or(DEFAULT_SCORE_FLOOR),
            nms_iou: model.nms_iou.unwrap_or(DEFAULT_NMS_IOU),
            debug_dir: file.debug_dir,
        }
    }

    fn apply_env(&mut self) {
        if let Ok(path) = std::env::var(MODEL_PATH_ENV) {
            if !path.trim().is_empty() {
                self.model_path = Some(PathBuf::from(path));
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 || self.input_size % 32 != 0 {
            return Err(anyhow!(
                "model input_size must be a positive multiple of 32, got {}",
                self.input_size
            ));
        }
        if !(0.0..=1.0).contains(&self.score_floor) {
            return Err(anyhow!(
                "model score_floor must be within [0, 1], got {}",
                self.score_floor
            ));
        }
        if !(0.0..=1.0).contains(&self.nms_iou) {
            return Err(anyhow!(
                "model nms_iou must be within [0, 1], got {}",
                self.nms_iou
            ));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("invalid config {}", path.display()))
}
