use crate::hotdog_app::core::{Event, State};
use crate::hotdog_app::main::{upload_path_event, HotdogApp};
use crate::image_classifier::tract::image::Preview;
use eframe::egui;

const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 60, 60);

impl HotdogApp {
    /// Draws the current state and returns the events the user triggered this frame.
    pub fn render(&mut self, ctx: &egui::Context) -> Vec<Event> {
        self.sync_preview(ctx);

        let mut events = Vec::new();
        let config = &self.config;
        let state = &self.model.state;
        let preview = &self.preview;
        let path_input = &mut self.path_input;

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading(&config.heading);
                ui.label(egui::RichText::new(&config.subheading).size(18.0).strong());
                ui.add_space(16.0);

                ui.label("Upload your image here");
                ui.horizontal(|ui| {
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut *path_input).hint_text("path/to/image.jpg"),
                    );
                    let entered =
                        response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                    if ui.button("Upload").clicked() || entered {
                        events.extend(upload_path_event(path_input.as_str()));
                    }
                });
                ui.label(egui::RichText::new("or drop an image file on this window").weak());
                ui.add_space(8.0);

                match state {
                    State::Idle { notice: Some(notice) } => {
                        ui.colored_label(ERROR_COLOR, notice.as_str());
                    }
                    State::Idle { notice: None } => {}
                    State::Loading { name, .. } => {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label(format!("Loading {}...", name));
                        });
                    }
                    State::Ready { upload, notice } => {
                        ui.label(format!("{} is ready", upload.name));
                        if let Some(notice) = notice {
                            ui.colored_label(ERROR_COLOR, notice.as_str());
                        }
                    }
                    State::Classifying { upload } | State::Displayed { upload, .. } => {
                        ui.label(upload.name.as_str());
                    }
                }
                ui.add_space(8.0);

                if ui.button("Submit").clicked() {
                    events.push(Event::Submit);
                }
                ui.add_space(8.0);

                if let (Some(upload), Some((_, texture))) = (state.shown_upload(), preview) {
                    let size = preview_size(
                        &upload.prepared.preview,
                        config.preview_width,
                        config.preview_max_height,
                    );
                    ui.image((texture.id(), size));
                }

                match state {
                    State::Classifying { .. } => {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label("Classifying...");
                        });
                    }
                    State::Displayed {
                        label, prediction, ..
                    } => {
                        ui.label(
                            egui::RichText::new(format!("Your image prediction is: {}", label))
                                .size(18.0),
                        );
                        ui.label(
                            egui::RichText::new(format!(
                                "probability {:.3}",
                                prediction.probability()
                            ))
                            .weak(),
                        );
                    }
                    _ => {}
                }
            });
        });

        events
    }

    /// Keeps one texture for the image on screen, uploaded to the GPU once per upload.
    fn sync_preview(&mut self, ctx: &egui::Context) {
        let Some(upload) = self.model.state.shown_upload() else {
            self.preview = None;
            return;
        };

        if matches!(&self.preview, Some((id, _)) if *id == upload.id) {
            return;
        }

        let preview = &upload.prepared.preview;
        let image = egui::ColorImage::from_rgba_unmultiplied(
            [preview.width as usize, preview.height as usize],
            &preview.rgba,
        );
        let texture = ctx.load_texture(
            format!("upload-{}", upload.id),
            image,
            egui::TextureOptions::default(),
        );
        self.preview = Some((upload.id, texture));
    }
}

/// Fills `width`, unless that would make the preview taller than `max_height`.
pub fn preview_size(preview: &Preview, width: f32, max_height: f32) -> egui::Vec2 {
    let (w, h) = (preview.width.max(1) as f32, preview.height.max(1) as f32);
    let scale = (width / w).min(max_height / h);
    egui::vec2(w * scale, h * scale)
}
