use thiserror::Error;

/// The common error type used by this crate
#[derive(Error, Debug, PartialEq)]
pub enum Error {
    /// Bracketed tree text could not be read
    #[error("Malformed tree: {0}")]
    TreeSyntax(String),

    /// A node with more than two children reached grammar estimation
    #[error("Attempted to construct a grammar with an illegal tree: {0}")]
    IllegalTree(String),

    /// A parse was requested before any training data was seen
    #[error("Parser has not been trained")]
    NotTrained,

    /// Reading or writing a file failed
    #[error("I/O failure: {0}")]
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(format!("{value}"))
    }
}
