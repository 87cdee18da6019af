use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "tolka";
const MODEL_FOLDER_NAME: &str = "ocr_models";

/// One downloadable model artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    pub url: &'static str,
    pub filename: &'static str,
}

pub const DETECTION_MODEL: ModelSpec = ModelSpec {
    url: "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten",
    filename: "text-detection.rten",
};

pub const RECOGNITION_MODEL: ModelSpec = ModelSpec {
    url: "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten",
    filename: "text-recognition.rten",
};

/// Everything the OCR engine needs on disk.
pub const MODEL_SPECS: [ModelSpec; 2] = [DETECTION_MODEL, RECOGNITION_MODEL];

/// On-disk location of the OCR model files.
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// `<config_dir>/tolka/ocr_models`.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(MODEL_FOLDER_NAME))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, spec: &ModelSpec) -> PathBuf {
        self.dir.join(spec.filename)
    }

    /// Model files not yet present on disk.
    pub fn missing(&self) -> Vec<&'static ModelSpec> {
        MODEL_SPECS
            .iter()
            .filter(|spec| !self.dir.join(spec.filename).exists())
            .collect()
    }

    pub fn is_ready(&self) -> bool {
        self.missing().is_empty()
    }

    /// Create the model directory if needed.
    pub fn ensure_dir(&self) -> std::io::Result<()> {
        if !self.dir.exists() {
            std::fs::create_dir_all(&self.dir)?;
        }
        Ok(())
    }
}
