
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HbnbError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Data corruption: {message}")]
    DataCorruption { message: String },
    #[error("Input error: {0}")]
    Input(String),
    #[error("Output error: {0}")]
    Output(String),
}

pub type Result<T> = std::result::Result<T, HbnbError>;

// Helper conversions. io errors surface while writing; reads map theirs to Input.
impl From<rusqlite::Error> for HbnbError {
    fn from(e: rusqlite::Error) -> Self { Self::Persistence(e.to_string()) }
}
impl From<serde_json::Error> for HbnbError {
    fn from(e: serde_json::Error) -> Self { Self::DataCorruption { message: e.to_string() } }
}
impl From<config::ConfigError> for HbnbError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl From<std::io::Error> for HbnbError {
    fn from(e: std::io::Error) -> Self { Self::Output(e.to_string()) }
}

/// Misuse of the shell. These are printed, never propagated.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    #[error("** class name missing **")]
    ClassNameMissing,
    #[error("** class doesn't exist **")]
    ClassUnknown,
    #[error("** instance id missing **")]
    InstanceIdMissing,
    #[error("** no instance found **")]
    NoInstanceFound,
    #[error("** attribute name missing **")]
    AttributeNameMissing,
    #[error("** value missing **")]
    ValueMissing,
    #[error("Error")]
    MalformedMapping,
}
