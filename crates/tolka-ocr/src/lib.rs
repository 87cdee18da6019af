use std::path::{Path, PathBuf};

use image::RgbImage;

pub mod models;

pub use models::{MODEL_SPECS, ModelSpec, ModelStore};

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("missing model files: {0:?}")]
    MissingModels(Vec<&'static str>),

    #[error("failed to load model {path}: {message}")]
    ModelLoad { path: PathBuf, message: String },

    #[error("recognition failed: {0}")]
    Recognize(String),
}

/// Text extraction from a captured frame.
///
/// Implementations are CPU-bound and synchronous; callers run them off the
/// async executor (`spawn_blocking`).
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &RgbImage) -> Result<String, OcrError>;
}

/// Pure-Rust recognizer backed by the ocrs detection + recognition models.
pub struct OcrsRecognizer {
    engine: ocrs::OcrEngine,
}

impl OcrsRecognizer {
    /// Load both models from a ready `ModelStore`.
    pub fn from_store(store: &ModelStore) -> Result<Self, OcrError> {
        let missing = store.missing();
        if !missing.is_empty() {
            return Err(OcrError::MissingModels(
                missing.iter().map(|spec| spec.filename).collect(),
            ));
        }

        let detection_model = load_model(&store.path(&models::DETECTION_MODEL))?;
        let recognition_model = load_model(&store.path(&models::RECOGNITION_MODEL))?;

        let engine = ocrs::OcrEngine::new(ocrs::OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|e| OcrError::Recognize(format!("engine init: {e}")))?;

        tracing::info!(dir = %store.dir().display(), "OCR engine ready");
        Ok(Self { engine })
    }
}

fn load_model(path: &Path) -> Result<rten::Model, OcrError> {
    rten::Model::load_file(path).map_err(|e| OcrError::ModelLoad {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

impl TextRecognizer for OcrsRecognizer {
    fn recognize(&self, image: &RgbImage) -> Result<String, OcrError> {
        let (width, height) = image.dimensions();
        let source = ocrs::ImageSource::from_bytes(image.as_raw(), (width, height))
            .map_err(|e| OcrError::Recognize(format!("image conversion: {e}")))?;

        let input = self
            .engine
            .prepare_input(source)
            .map_err(|e| OcrError::Recognize(format!("prepare input: {e}")))?;

        self.engine
            .get_text(&input)
            .map_err(|e| OcrError::Recognize(format!("text extraction: {e}")))
    }
}
