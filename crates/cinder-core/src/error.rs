//! Error types for Cinder

use thiserror::Error;

/// Coarse classification of a [`CinderError`].
///
/// Schema errors are fatal to a compiler run. Marshal and lookup errors are
/// confined to the single script call that raised them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Schema,
    Marshal,
    Lookup,
    Io,
    Parse,
    Config,
}

/// The main error type for Cinder operations
#[derive(Debug, Error)]
pub enum CinderError {
    // ─── Schema ──────────────────────────────────────────
    #[error("Duplicate type name: {name} (declared in {first} and again in {second})")]
    DuplicateType {
        name: String,
        first: String,
        second: String,
    },

    #[error("Duplicate field name: {type_name}.{field}")]
    DuplicateField { type_name: String, field: String },

    #[error("Unknown field type '{type_name}' for field {path}")]
    UnknownFieldType { path: String, type_name: String },

    #[error("Recursive default cycle: {}", .path.join(" -> "))]
    RecursiveDefaultCycle { path: Vec<String> },

    #[error("Recursive record layout: {}", .path.join(" -> "))]
    RecursiveLayout { path: Vec<String> },

    #[error("Invalid default for {path}: {reason}")]
    InvalidDefault { path: String, reason: String },

    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    #[error("Record too large: {0}")]
    RecordTooLarge(String),

    #[error("Layout mismatch at {path}: record offset {record}, reflection offset {reflected}")]
    LayoutMismatch {
        path: String,
        record: usize,
        reflected: usize,
    },

    // ─── Marshal ─────────────────────────────────────────
    #[error("Type {0} is lowered more than once")]
    DuplicateRecord(String),

    #[error("Type check failed at {path}: expected a table")]
    NotATable { path: String },

    #[error("Type check failed: missing field {path}")]
    MissingField { path: String },

    #[error("Type check failed at {path}: expected {expected}, got {found}")]
    WrongKind {
        path: String,
        expected: String,
        found: String,
    },

    #[error("Value out of range at {path}: {value}")]
    OutOfRange { path: String, value: String },

    // ─── Lookup ──────────────────────────────────────────
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Component not found: entity {entity} has no {component}")]
    ComponentNotFound { component: String, entity: String },

    // ─── Io / parsing ────────────────────────────────────
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl CinderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CinderError::DuplicateType { .. }
            | CinderError::DuplicateField { .. }
            | CinderError::UnknownFieldType { .. }
            | CinderError::RecursiveDefaultCycle { .. }
            | CinderError::RecursiveLayout { .. }
            | CinderError::InvalidDefault { .. }
            | CinderError::InvalidIdentifier(_)
            | CinderError::RecordTooLarge(_)
            | CinderError::LayoutMismatch { .. }
            | CinderError::DuplicateRecord(_) => ErrorKind::Schema,
            CinderError::NotATable { .. }
            | CinderError::MissingField { .. }
            | CinderError::WrongKind { .. }
            | CinderError::OutOfRange { .. } => ErrorKind::Marshal,
            CinderError::EntityNotFound(_) | CinderError::ComponentNotFound { .. } => {
                ErrorKind::Lookup
            }
            CinderError::IoError(_) => ErrorKind::Io,
            CinderError::TomlParseError(_)
            | CinderError::TomlSerError(_)
            | CinderError::JsonParseError(_) => ErrorKind::Parse,
            CinderError::ConfigError(_) => ErrorKind::Config,
        }
    }

    pub fn is_schema_error(&self) -> bool {
        self.kind() == ErrorKind::Schema
    }
}

/// Result type alias for Cinder operations
pub type Result<T> = std::result::Result<T, CinderError>;

impl From<toml::de::Error> for CinderError {
    fn from(err: toml::de::Error) -> Self {
        CinderError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for CinderError {
    fn from(err: toml::ser::Error) -> Self {
        CinderError::TomlSerError(err.to_string())
    }
}

impl From<serde_json::Error> for CinderError {
    fn from(err: serde_json::Error) -> Self {
        CinderError::JsonParseError(err.to_string())
    }
}
