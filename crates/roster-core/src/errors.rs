use thiserror::Error;

/// Result type alias using RosterError
pub type Result<T> = std::result::Result<T, RosterError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers and tests can match on
/// without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    InvalidSchema,
    TypeMismatch,
    NotFound,
    Deleted,

    // Storage
    ConstraintViolation,
    ChecksumMismatch,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidSchema => "ERR_INVALID_SCHEMA",
            ExErrorKind::TypeMismatch => "ERR_TYPE_MISMATCH",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Deleted => "ERR_DELETED",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::ChecksumMismatch => "ERR_CHECKSUM_MISMATCH",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification (`kind`) for programmatic handling plus optional
/// context: the failing operation, the entity involved, and for storage
/// failures the name of the violated constraint.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    constraint: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            constraint: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add the name of the violated constraint
    pub fn with_constraint(mut self, name: impl Into<String>) -> Self {
        self.constraint = Some(name.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the violated constraint name, if known
    pub fn constraint(&self) -> Option<&str> {
        self.constraint.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// True for unique/check/primary-key failures raised by storage
    pub fn is_constraint_violation(&self) -> bool {
        self.kind == ExErrorKind::ConstraintViolation
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(constraint) = &self.constraint {
            write!(f, " (constraint: {})", constraint)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain errors raised before anything reaches storage
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RosterError {
    /// Schema declaration is malformed
    #[error("Invalid schema for table {table}: {reason}")]
    InvalidSchema { table: String, reason: String },

    /// Column name is not part of the table
    #[error("Unknown column {column} in table {table}")]
    UnknownColumn { table: String, column: String },

    /// A value of the wrong type was assigned to a column
    #[error("Type mismatch for column {column}: expected {expected}, got {got}")]
    TypeMismatch {
        column: String,
        expected: String,
        got: String,
    },

    /// A value is not acceptable for the target operation
    #[error("Invalid value for column {column}: {reason}")]
    InvalidValue { column: String, reason: String },

    /// Session handle does not refer to any tracked object
    #[error("Object {key} is not tracked by this session")]
    UnknownObject { key: usize },

    /// Session handle refers to an object already removed
    #[error("Object {key} was deleted")]
    ObjectDeleted { key: usize },

    /// A query shape is not valid for the requested retrieval
    #[error("Invalid query: {reason}")]
    InvalidQuery { reason: String },
}

impl From<RosterError> for ExError {
    fn from(err: RosterError) -> Self {
        let message = err.to_string();
        match err {
            RosterError::InvalidSchema { table, .. } => ExError::new(ExErrorKind::InvalidSchema)
                .with_entity_id(table)
                .with_op("validate_schema")
                .with_message(message),

            RosterError::UnknownColumn { table, .. } => ExError::new(ExErrorKind::InvalidSchema)
                .with_entity_id(table)
                .with_message(message),

            RosterError::TypeMismatch { .. } => {
                ExError::new(ExErrorKind::TypeMismatch).with_message(message)
            }

            RosterError::InvalidValue { .. } | RosterError::InvalidQuery { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }

            RosterError::UnknownObject { key } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(key.to_string())
                .with_message(message),

            RosterError::ObjectDeleted { key } => ExError::new(ExErrorKind::Deleted)
                .with_entity_id(key.to_string())
                .with_message(message),
        }
    }
}
