use tract_onnx::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Label {
    Hotdog,
    NotHotdog,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Hotdog => "hotdog",
            Label::NotHotdog => "nothotdog",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    probability: f32,
}

impl Prediction {
    pub fn new(probability: f32) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(format!("model output {} is not a probability", probability).into());
        }
        Ok(Self { probability })
    }

    pub fn probability(&self) -> f32 {
        self.probability
    }

    /// Strictly greater than the threshold is a hotdog; the threshold itself is not.
    pub fn label(&self, threshold: f32) -> Label {
        if self.probability > threshold {
            Label::Hotdog
        } else {
            Label::NotHotdog
        }
    }
}

/// Normalized NHWC batch of one grayscale image, values in [0, 1].
#[derive(Clone, PartialEq)]
pub struct InputTensor(tract_ndarray::Array4<f32>);

impl std::fmt::Debug for InputTensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InputTensor({:?})", self.shape())
    }
}

impl InputTensor {
    pub fn new(array: tract_ndarray::Array4<f32>) -> Self {
        Self(array)
    }

    pub fn shape(&self) -> &[usize] {
        self.0.shape()
    }

    #[cfg(test)]
    pub fn values(&self) -> impl Iterator<Item = &f32> {
        self.0.iter()
    }

    pub fn to_tensor(&self) -> Tensor {
        Tensor::from(self.0.clone())
    }
}

pub trait ImageClassifier: Send + Sync {
    fn predict(
        &self,
        input: &InputTensor,
    ) -> Result<Prediction, Box<dyn std::error::Error + Send + Sync>>;
}
