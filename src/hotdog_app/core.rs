use crate::config::Config;
use crate::image_classifier::interface::{Label, Prediction};
use crate::image_classifier::tract::image::PreparedUpload;
use std::path::PathBuf;
use std::sync::Arc;

pub type UploadId = u64;

#[derive(Clone, PartialEq)]
pub struct Upload {
    pub id: UploadId,
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl std::fmt::Debug for Upload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upload")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// An upload that decoded cleanly and is waiting for Submit.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadyUpload {
    pub id: UploadId,
    pub name: String,
    pub prepared: Arc<PreparedUpload>,
}

#[derive(Clone, Debug)]
pub enum State {
    Idle {
        notice: Option<String>,
    },
    Loading {
        id: UploadId,
        name: String,
    },
    Ready {
        upload: ReadyUpload,
        notice: Option<String>,
    },
    Classifying {
        upload: ReadyUpload,
    },
    Displayed {
        upload: ReadyUpload,
        prediction: Prediction,
        label: Label,
    },
}

impl State {
    pub fn is_busy(&self) -> bool {
        matches!(self, State::Loading { .. } | State::Classifying { .. })
    }

    /// Upload whose image is currently on screen.
    pub fn shown_upload(&self) -> Option<&ReadyUpload> {
        match self {
            State::Classifying { upload } | State::Displayed { upload, .. } => Some(upload),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Model {
    pub state: State,
    pub last_upload_id: UploadId,
}

#[derive(Debug)]
pub enum Event {
    UploadPath(PathBuf),
    UploadBytes {
        name: String,
        bytes: Arc<[u8]>,
    },
    UploadReadDone {
        id: UploadId,
        result: Result<Arc<[u8]>, Box<dyn std::error::Error + Send + Sync>>,
    },
    UploadPrepareDone {
        id: UploadId,
        result: Result<Arc<PreparedUpload>, Box<dyn std::error::Error + Send + Sync>>,
    },
    Submit,
    ClassifyDone {
        id: UploadId,
        result: Result<Prediction, Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Event {
    pub fn to_display_string(&self) -> String {
        match self {
            Event::UploadBytes { name, bytes } => {
                format!("UploadBytes {{ name: {:?}, bytes: {} }}", name, bytes.len())
            }
            Event::UploadReadDone {
                id,
                result: Ok(bytes),
            } => format!("UploadReadDone {{ id: {}, result: Ok({} bytes) }}", id, bytes.len()),
            event => format!("{:?}", event),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    ReadUpload {
        id: UploadId,
        path: PathBuf,
    },
    PrepareUpload {
        upload: Upload,
    },
    Classify {
        id: UploadId,
        prepared: Arc<PreparedUpload>,
    },
}

pub fn init() -> (Model, Vec<Effect>) {
    (
        Model {
            state: State::Idle { notice: None },
            last_upload_id: 0,
        },
        vec![],
    )
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn transition(config: &Config, model: Model, event: Event) -> (Model, Vec<Effect>) {
    let Model {
        state,
        last_upload_id,
    } = model;

    match (state, event) {
        // A new upload always replaces whatever was there before
        (_, Event::UploadPath(path)) => {
            let id = last_upload_id + 1;
            (
                Model {
                    state: State::Loading {
                        id,
                        name: display_name(&path),
                    },
                    last_upload_id: id,
                },
                vec![Effect::ReadUpload { id, path }],
            )
        }
        (_, Event::UploadBytes { name, bytes }) => {
            let id = last_upload_id + 1;
            (
                Model {
                    state: State::Loading {
                        id,
                        name: name.clone(),
                    },
                    last_upload_id: id,
                },
                vec![Effect::PrepareUpload {
                    upload: Upload { id, name, bytes },
                }],
            )
        }

        (State::Loading { id, name }, Event::UploadReadDone { id: done_id, result })
            if id == done_id =>
        {
            match result {
                Ok(bytes) => (
                    Model {
                        state: State::Loading {
                            id,
                            name: name.clone(),
                        },
                        last_upload_id,
                    },
                    vec![Effect::PrepareUpload {
                        upload: Upload { id, name, bytes },
                    }],
                ),
                Err(e) => (
                    Model {
                        state: State::Idle {
                            notice: Some(format!("could not read {}: {}", name, e)),
                        },
                        last_upload_id,
                    },
                    vec![],
                ),
            }
        }

        (State::Loading { id, name }, Event::UploadPrepareDone { id: done_id, result })
            if id == done_id =>
        {
            let state = match result {
                Ok(prepared) => State::Ready {
                    upload: ReadyUpload { id, name, prepared },
                    notice: None,
                },
                Err(e) => State::Idle {
                    notice: Some(e.to_string()),
                },
            };
            (
                Model {
                    state,
                    last_upload_id,
                },
                vec![],
            )
        }

        (State::Ready { upload, .. }, Event::Submit)
        | (State::Displayed { upload, .. }, Event::Submit) => {
            let effects = vec![Effect::Classify {
                id: upload.id,
                prepared: upload.prepared.clone(),
            }];
            (
                Model {
                    state: State::Classifying { upload },
                    last_upload_id,
                },
                effects,
            )
        }

        (State::Classifying { upload }, Event::ClassifyDone { id, result }) if upload.id == id => {
            let state = match result {
                Ok(prediction) => State::Displayed {
                    label: prediction.label(config.label_threshold),
                    prediction,
                    upload,
                },
                Err(e) => State::Ready {
                    upload,
                    notice: Some(format!("could not classify image: {}", e)),
                },
            };
            (
                Model {
                    state,
                    last_upload_id,
                },
                vec![],
            )
        }

        // Submit without an upload, duplicate submits, and results of replaced uploads
        (state, _) => (
            Model {
                state,
                last_upload_id,
            },
            vec![],
        ),
    }
}
