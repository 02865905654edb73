use crate::image_classifier::interface::{ImageClassifier, InputTensor, Prediction};
use crate::library::logger::interface::Logger;
use rand::distr::{Distribution, Uniform};
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Behavior {
    Random,
    #[cfg(test)]
    Fixed(f32),
    #[cfg(test)]
    Fail(String),
}

pub struct ImageClassifierFake {
    logger: Arc<dyn Logger + Send + Sync>,
    behavior: Behavior,
}

impl ImageClassifierFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("image_classifier_fake"),
            behavior: Behavior::Random,
        }
    }

    #[cfg(test)]
    pub fn with_probability(logger: Arc<dyn Logger + Send + Sync>, probability: f32) -> Self {
        Self {
            logger: logger.with_namespace("image_classifier_fake"),
            behavior: Behavior::Fixed(probability),
        }
    }

    #[cfg(test)]
    pub fn failing(logger: Arc<dyn Logger + Send + Sync>, message: &str) -> Self {
        Self {
            logger: logger.with_namespace("image_classifier_fake"),
            behavior: Behavior::Fail(message.to_string()),
        }
    }
}

impl ImageClassifier for ImageClassifierFake {
    fn predict(
        &self,
        input: &InputTensor,
    ) -> Result<Prediction, Box<dyn std::error::Error + Send + Sync>> {
        self.logger
            .info(&format!("predict({:?})", input.shape()))?;

        match &self.behavior {
            Behavior::Random => {
                let mut rng = rand::rng();
                let probability_dist = Uniform::new_inclusive(0.0f32, 1.0)?;
                Prediction::new(probability_dist.sample(&mut rng))
            }
            #[cfg(test)]
            Behavior::Fixed(probability) => Prediction::new(*probability),
            #[cfg(test)]
            Behavior::Fail(message) => Err(message.clone().into()),
        }
    }
}
