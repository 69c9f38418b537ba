/// Errors raised while loading or assigning a language.
#[derive(Debug, thiserror::Error)]
pub enum LanguageError {
    #[error("incompatible language version {version}, expected {min}..={max}")]
    IncompatibleVersion { version: u32, min: u32, max: u32 },

    #[error("invalid token pattern `{pattern}`: {message}")]
    InvalidTokenPattern { pattern: String, message: String },

    #[error("invalid language table: {0}")]
    InvalidTable(String),

    #[error("language blob too small: {0} bytes")]
    TooSmall(usize),

    #[error("invalid language blob magic")]
    InvalidMagic,

    #[error("language blob size mismatch: header says {header} bytes, found {actual}")]
    SizeMismatch { header: usize, actual: usize },

    #[error("language blob checksum mismatch: expected {expected:08x}, found {actual:08x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("language blob decode error: {0}")]
    Decode(#[from] postcard::Error),
}
