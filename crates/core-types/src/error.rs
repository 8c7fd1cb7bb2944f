use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid id provided: {0:?}")]
    InvalidIdentifier(String),
}
