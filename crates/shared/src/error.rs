use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    Transport,
    Navigation,
    Busy,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("required field '{field}' is blank")]
    MissingRequiredField { field: String },
    #[error("donation set is empty")]
    EmptyDonation,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("network failure: {0}")]
    Network(String),
    #[error("endpoint rejected submission with status {status}")]
    Status { status: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("malformed navigation token '{0}'")]
    MalformedToken(String),
    #[error("unknown screen '{0}'")]
    UnknownScreen(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error("a submission is already in progress")]
    SubmissionInProgress,
    #[error("session store failure: {0}")]
    Session(String),
}

impl FlowError {
    pub fn code(&self) -> ErrorCode {
        match self {
            FlowError::Validation(_) => ErrorCode::Validation,
            FlowError::Transport(_) => ErrorCode::Transport,
            FlowError::Navigation(_) => ErrorCode::Navigation,
            FlowError::SubmissionInProgress => ErrorCode::Busy,
            FlowError::Session(_) => ErrorCode::Internal,
        }
    }
}
