use crate::config::Config;
use crate::hotdog_app::core::{Effect, Event};
use crate::image_classifier::interface::ImageClassifier;
use crate::image_classifier::tract::image::prepare_upload;
use crate::library::logger::interface::Logger;
use std::sync::mpsc::Sender;
use std::sync::Arc;

#[derive(Clone)]
pub struct RunEffect {
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    image_classifier: Arc<dyn ImageClassifier + Send + Sync>,
    event_sender: Sender<Event>,
}

impl RunEffect {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        image_classifier: Arc<dyn ImageClassifier + Send + Sync>,
        event_sender: Sender<Event>,
    ) -> Self {
        Self {
            config,
            logger,
            image_classifier,
            event_sender,
        }
    }

    pub fn run_effect(&self, effect: Effect) {
        let _ = self.logger.info(&format!("Running effect: {:?}", effect));

        let event = match effect {
            Effect::ReadUpload { id, path } => {
                let result: Result<Arc<[u8]>, Box<dyn std::error::Error + Send + Sync>> =
                    std::fs::read(&path)
                        .map(Arc::<[u8]>::from)
                        .map_err(|e| e.into());
                Event::UploadReadDone { id, result }
            }
            Effect::PrepareUpload { upload } => {
                let result = prepare_upload(
                    &upload.bytes,
                    self.config.model.input_shape,
                    self.config.preview_bounds(),
                )
                .map(Arc::new);
                Event::UploadPrepareDone {
                    id: upload.id,
                    result,
                }
            }
            Effect::Classify { id, prepared } => {
                let result = self.image_classifier.predict(&prepared.tensor);
                if let Err(e) = &result {
                    let _ = self.logger.error(&format!("Inference failed: {}", e));
                }
                Event::ClassifyDone { id, result }
            }
        };

        // Receiver is gone only when the window has closed.
        let _ = self.event_sender.send(event);
    }
}
