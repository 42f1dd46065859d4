use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("Malformed package: {message}")]
    MalformedPackage { message: String },

    #[error("Invalid package state: {message}")]
    InvalidState { message: String },

    #[error("Source slide {index} not found (source has {available} slides)")]
    SourceNotFound { index: usize, available: usize },

    #[error("Integrity violation: {message}")]
    IntegrityViolation { message: String },

    #[error("Repair failed: {message}")]
    RepairFailure { message: String },

    #[error("Slide indices {indices:?} are out of range for {slide_count} slides")]
    OutOfRangeRemoval { indices: Vec<usize>, slide_count: usize },

    #[error("Missing required part '{part_path}'")]
    MissingPart { part_path: String },

    #[error("XML parsing error at {location}: {message}")]
    XmlParse { message: String, location: String },

    #[error("XML serialization error: {0}")]
    XmlWrite(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

impl DeckError {
    pub(crate) fn integrity(message: impl Into<String>) -> Self {
        Self::IntegrityViolation {
            message: message.into(),
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPackage {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DeckError>;
