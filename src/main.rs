use config::{ClassifierKind, Config};
use eframe::egui;
use hotdog_app::main::HotdogApp;
use image_classifier::impl_fake::ImageClassifierFake;
use image_classifier::impl_tract_onnx::ImageClassifierTractOnnx;
use image_classifier::interface::ImageClassifier;
use library::logger::{impl_console::LoggerConsole, interface::Logger};
use std::sync::Arc;

mod config;
mod hotdog_app;
mod image_classifier;
mod library;

fn load_classifier(
    config: &Config,
    logger: Arc<dyn Logger + Send + Sync>,
) -> Result<Arc<dyn ImageClassifier + Send + Sync>, Box<dyn std::error::Error + Send + Sync>> {
    match config.classifier {
        ClassifierKind::TractOnnx => {
            logger.info(&format!(
                "Loading model from {}",
                config.model.model_path().display()
            ))?;
            let classifier = ImageClassifierTractOnnx::new(config.model.clone())?;
            logger.info("Model loaded")?;
            Ok(Arc::new(classifier))
        }
        ClassifierKind::Fake => {
            logger.info("Using fake classifier, predictions are random")?;
            Ok(Arc::new(ImageClassifierFake::new(logger)))
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env()?;

    let logger: Arc<dyn Logger + Send + Sync> = Arc::new(LoggerConsole::new(config.logger_timezone));

    let image_classifier = match load_classifier(&config, logger.clone()) {
        Ok(image_classifier) => image_classifier,
        Err(e) => {
            let _ = logger.error(&format!("Startup failed: {}", e));
            return Err(e);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([520.0, 720.0]),
        ..Default::default()
    };

    let app = HotdogApp::new(config.clone(), logger, image_classifier);

    eframe::run_native(
        &config.window_title,
        options,
        Box::new(|_cc| Box::new(app)),
    )
    .map_err(|e| e.to_string())?;

    Ok(())
}
