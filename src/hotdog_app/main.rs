use crate::config::Config;
use crate::hotdog_app::core::{init, transition, Effect, Event, Model, State, UploadId};
use crate::hotdog_app::run_effect::RunEffect;
use crate::image_classifier::interface::ImageClassifier;
use crate::library::logger::interface::Logger;
use eframe::egui;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;

pub struct HotdogApp {
    pub(super) config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    pub(super) model: Model,
    run_effect: RunEffect,
    event_receiver: Receiver<Event>,
    pub(super) path_input: String,
    pub(super) preview: Option<(UploadId, egui::TextureHandle)>,
}

impl HotdogApp {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        image_classifier: Arc<dyn ImageClassifier + Send + Sync>,
    ) -> Self {
        let (event_sender, event_receiver) = channel();
        let logger = logger.with_namespace("hotdog_app");
        let run_effect = RunEffect::new(
            config.clone(),
            logger.clone(),
            image_classifier,
            event_sender,
        );
        let (model, effects) = init();

        let app = Self {
            config,
            logger,
            model,
            run_effect,
            event_receiver,
            path_input: String::new(),
            preview: None,
        };

        app.spawn_effects(effects);

        app
    }

    pub fn state(&self) -> &State {
        &self.model.state
    }

    pub fn dispatch(&mut self, event: Event) {
        let _ = self.logger.info(&format!(
            "\nold state:\n\t{:?}\n\nevent:\n\t{}",
            self.model.state,
            event.to_display_string(),
        ));

        let (new_model, effects) = transition(&self.config, self.model.clone(), event);

        let _ = self.logger.info(&format!(
            "\nnew state:\n\t{:?}\n\neffects:\n\t{:?}",
            new_model.state, effects
        ));

        if let Some(notice) = state_notice(&new_model.state) {
            if state_notice(&self.model.state) != Some(notice) {
                let _ = self.logger.error(notice);
            }
        }

        self.model = new_model;

        self.spawn_effects(effects);
    }

    /// Dispatches every effect result that has arrived since the last frame.
    pub fn poll_events(&mut self) -> usize {
        let events: Vec<Event> = self.event_receiver.try_iter().collect();
        let count = events.len();
        for event in events {
            self.dispatch(event);
        }
        count
    }

    #[cfg(test)]
    pub fn wait_for_event(&mut self, timeout: std::time::Duration) -> bool {
        match self.event_receiver.recv_timeout(timeout) {
            Ok(event) => {
                self.dispatch(event);
                true
            }
            Err(_) => false,
        }
    }

    fn spawn_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            let run_effect = self.run_effect.clone();
            std::thread::spawn(move || run_effect.run_effect(effect));
        }
    }
}

fn state_notice(state: &State) -> Option<&str> {
    match state {
        State::Idle { notice } | State::Ready { notice, .. } => notice.as_deref(),
        _ => None,
    }
}

/// Blank input means nothing was chosen.
pub fn upload_path_event(input: &str) -> Option<Event> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(Event::UploadPath(PathBuf::from(trimmed)))
}

pub fn dropped_file_event(file: &egui::DroppedFile) -> Option<Event> {
    if let Some(bytes) = &file.bytes {
        let name = if file.name.is_empty() {
            file.path
                .as_ref()
                .and_then(|path| path.file_name())
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "dropped file".to_string())
        } else {
            file.name.clone()
        };
        return Some(Event::UploadBytes {
            name,
            bytes: bytes.clone(),
        });
    }

    file.path.clone().map(Event::UploadPath)
}

impl eframe::App for HotdogApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_events();

        let dropped_files = ctx.input(|i| i.raw.dropped_files.clone());
        if let Some(event) = dropped_files.last().and_then(dropped_file_event) {
            self.dispatch(event);
        }

        for event in self.render(ctx) {
            self.dispatch(event);
        }

        if self.model.state.is_busy() {
            ctx.request_repaint_after(self.config.busy_repaint_rate);
        }
    }
}
