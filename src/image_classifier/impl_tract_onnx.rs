use crate::image_classifier::interface::{ImageClassifier, InputTensor, Prediction};
use crate::image_classifier::models::model_config::ModelConfig;
use tract_onnx::prelude::*;

pub struct ImageClassifierTractOnnx {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>,
    config: ModelConfig,
}

impl ImageClassifierTractOnnx {
    pub fn new(config: ModelConfig) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        if !config.model_dir.is_dir() {
            return Err(format!(
                "model directory not found: {}",
                config.model_dir.display()
            )
            .into());
        }

        let model_path = config.model_path();
        if !model_path.is_file() {
            return Err(format!("model file not found: {}", model_path.display()).into());
        }

        let model = tract_onnx::onnx()
            .model_for_path(&model_path)
            .map_err(|e| format!("could not load model {}: {}", model_path.display(), e))?;

        Self::from_inference_model(model, config)
    }

    /// Pins the input to one grayscale NHWC image and builds the runnable plan.
    pub fn from_inference_model(
        model: InferenceModel,
        config: ModelConfig,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let model = model
            .with_input_fact(0, f32::fact(config.tensor_shape()).into())?
            .into_optimized()?
            .into_runnable()?;

        Ok(Self { model, config })
    }
}

impl ImageClassifier for ImageClassifierTractOnnx {
    fn predict(
        &self,
        input: &InputTensor,
    ) -> Result<Prediction, Box<dyn std::error::Error + Send + Sync>> {
        let expected = self.config.tensor_shape();
        if input.shape() != expected {
            return Err(format!(
                "input shape {:?} does not match model input {:?}",
                input.shape(),
                expected
            )
            .into());
        }

        let outputs = self.model.run(tvec!(input.to_tensor().into_tvalue()))?;

        let output = outputs
            .first()
            .ok_or("model produced no outputs")?
            .to_array_view::<f32>()?;

        // Single sigmoid unit, e.g. [1, 1]
        if output.len() != 1 {
            return Err(format!(
                "model output shape {:?} is not a single probability",
                output.shape()
            )
            .into());
        }
        let probability = *output.iter().next().ok_or("model produced an empty output")?;

        Prediction::new(probability)
    }
}
