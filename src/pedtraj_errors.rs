use thiserror::Error;

use crate::{constants::AgentId, records::raw_record::ParseRecordError};

#[derive(Error, Debug)]
pub enum PedTrajError {
    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV reader error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Artifact (de)serialization error: {0}")]
    PostcardError(#[from] postcard::Error),

    #[error("JSON configuration error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Error while parsing a trajectory record: {0}")]
    Parsing(ParseRecordError),

    #[error("Agent {0} is not part of the sequence lookup table")]
    UnknownAgent(AgentId),

    #[error("Invalid loader parameter: {0}")]
    InvalidLoaderParameter(String),

    #[error("Artifact format version mismatch: expected {expected}, found {found}")]
    ArtifactVersionMismatch { expected: u32, found: u32 },

    #[error("No dataset file available for the requested mode")]
    EmptyDatasetList,

    #[error("No validation dataset is available")]
    NoValidationData,

    #[error("No dataset holds a full window of {seq_length} frames")]
    InsufficientFrames { seq_length: usize },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
}

impl From<ParseRecordError> for PedTrajError {
    fn from(err: ParseRecordError) -> Self {
        PedTrajError::Parsing(err)
    }
}

impl PartialEq for PedTrajError {
    fn eq(&self, other: &Self) -> bool {
        use PedTrajError::*;
        match (self, other) {
            // foreign errors are not comparable: same variant means equal
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,
            (PostcardError(a), PostcardError(b)) => a == b,
            (JsonError(_), JsonError(_)) => true,

            (Parsing(a), Parsing(b)) => a == b,
            (UnknownAgent(a), UnknownAgent(b)) => a == b,
            (InvalidLoaderParameter(a), InvalidLoaderParameter(b)) => a == b,
            (
                ArtifactVersionMismatch {
                    expected: e1,
                    found: f1,
                },
                ArtifactVersionMismatch {
                    expected: e2,
                    found: f2,
                },
            ) => e1 == e2 && f1 == f2,
            (ShapeMismatch(a), ShapeMismatch(b)) => a == b,

            (EmptyDatasetList, EmptyDatasetList) => true,
            (NoValidationData, NoValidationData) => true,
            (InsufficientFrames { seq_length: a }, InsufficientFrames { seq_length: b }) => a == b,

            _ => false,
        }
    }
}
