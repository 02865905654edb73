use crate::image_classifier::models::model_config::ModelConfig;
use chrono::Offset;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClassifierKind {
    TractOnnx,
    Fake,
}

impl ClassifierKind {
    pub fn parse(value: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        match value.trim().to_lowercase().as_str() {
            "tract" | "onnx" | "tract_onnx" => Ok(ClassifierKind::TractOnnx),
            "fake" => Ok(ClassifierKind::Fake),
            other => Err(format!("unknown classifier kind: {:?}", other).into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub model: ModelConfig,
    pub classifier: ClassifierKind,
    pub label_threshold: f32,
    pub preview_width: f32,
    pub preview_max_height: f32,
    pub logger_timezone: chrono::FixedOffset,
    pub busy_repaint_rate: Duration,
    pub window_title: String,
    pub heading: String,
    pub subheading: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: ModelConfig {
                model_dir: PathBuf::from("./models/cnn_1_exported"),
                model_file: "model.onnx".to_string(),
                input_shape: (300, 300),
            },
            classifier: ClassifierKind::TractOnnx,
            label_threshold: 0.5,
            preview_width: 300.0,
            preview_max_height: 1200.0,
            logger_timezone: chrono::Utc.fix(),
            busy_repaint_rate: Duration::from_millis(100),
            window_title: "Hotdog or NotHotdog?".to_string(),
            heading: "Hotdog or NotHotdog?".to_string(),
            subheading: "Is your image a hotdog or not?".to_string(),
        }
    }
}

impl Config {
    /// Defaults with `HOTDOG_MODEL_DIR` and `HOTDOG_CLASSIFIER` applied on top.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Largest preview kept in memory and uploaded as a texture, (width, height).
    pub fn preview_bounds(&self) -> (u32, u32) {
        (self.preview_width as u32, self.preview_max_height as u32)
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, Box<dyn std::error::Error + Send + Sync>>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model_dir) = lookup("HOTDOG_MODEL_DIR").filter(|v| !v.trim().is_empty()) {
            self.model.model_dir = PathBuf::from(model_dir);
        }

        if let Some(kind) = lookup("HOTDOG_CLASSIFIER") {
            self.classifier = ClassifierKind::parse(&kind)?;
        }

        Ok(self)
    }
}
