use std::fmt;

/// Error type returned by mecab-rs public APIs.
#[derive(Debug)]
pub enum MecabError {
    /// No MeCab shared library could be located on this system.
    LibraryNotFound(String),
    /// A candidate library path could not be loaded.
    LibraryLoad(String),
    /// Required symbol could not be resolved from the library.
    SymbolLoad(String),
    /// Rust string contained an interior `NUL` byte for C interop.
    NulByte(std::ffi::NulError),
    /// Option value failed validation before any native call.
    InvalidOptions(String),
    /// Native model/tagger/lattice construction or configuration failed.
    TaggerInit(String),
    /// Native parse call reported an error.
    Parse(String),
    /// Caller supplied an invalid argument to a parse entry point.
    InvalidArgument(String),
}

impl fmt::Display for MecabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MecabError::LibraryNotFound(message) => {
                write!(f, "mecab library not found: {message}")
            }
            MecabError::LibraryLoad(message) => write!(f, "failed to load library: {message}"),
            MecabError::SymbolLoad(message) => write!(f, "failed to load symbol: {message}"),
            MecabError::NulByte(error) => write!(f, "string contains NUL byte: {error}"),
            MecabError::InvalidOptions(message) => write!(f, "invalid options: {message}"),
            MecabError::TaggerInit(message) => {
                write!(f, "failed to initialize mecab: {message}")
            }
            MecabError::Parse(message) => write!(f, "mecab parse error: {message}"),
            MecabError::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
        }
    }
}

impl std::error::Error for MecabError {}

impl From<std::ffi::NulError> for MecabError {
    fn from(value: std::ffi::NulError) -> Self {
        MecabError::NulByte(value)
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MecabError>;
