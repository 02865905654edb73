use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub model_dir: PathBuf,
    pub model_file: String,
    /// (height, width) of the grayscale image the model was trained on.
    pub input_shape: (u32, u32),
}

impl ModelConfig {
    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(&self.model_file)
    }

    /// NHWC shape of the single-image batch the model expects.
    pub fn tensor_shape(&self) -> [usize; 4] {
        [1, self.input_shape.0 as usize, self.input_shape.1 as usize, 1]
    }
}
