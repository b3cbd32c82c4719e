//! Service layer error types
//!
//! Every failure of a reaction mutation is one of three outcomes: a policy
//! denial, a missing resource, or a collaborator failure (lookup or store).

use reaction_common::AppError;
use reaction_core::DomainError;
use std::fmt;

/// Mutation an access decision was made for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Save,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the access policy refused a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The channel has been archived
    ArchivedChannel,
    /// The default channel is read-only for non-administrators
    TownSquareReadOnly,
}

impl DenyReason {
    /// Machine-readable reason code
    pub fn code(&self) -> &'static str {
        match self {
            Self::ArchivedChannel => "ARCHIVED_CHANNEL",
            Self::TownSquareReadOnly => "TOWN_SQUARE_READ_ONLY",
        }
    }

    /// Localizable message id; only the archived case depends on the operation
    pub fn message_id(&self, operation: Operation) -> &'static str {
        match (self, operation) {
            (Self::ArchivedChannel, Operation::Save) => {
                "api.reaction.save.archived_channel.app_error"
            }
            (Self::ArchivedChannel, Operation::Delete) => {
                "api.reaction.delete.archived_channel.app_error"
            }
            (Self::TownSquareReadOnly, _) => "api.reaction.town_square_read_only",
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::ArchivedChannel => "channel is archived",
            Self::TownSquareReadOnly => "the default channel is read-only",
        }
    }
}

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Resource not found
    NotFound { resource: &'static str, id: String },

    /// Access policy denied the mutation
    Forbidden {
        operation: Operation,
        reason: DenyReason,
    },

    /// Store gateway failure, propagated as-is
    Store(DomainError),

    /// Post, channel or user lookup failure, propagated as-is
    Lookup(DomainError),

    /// Validation error
    Validation(String),

    /// Internal error
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::Forbidden { operation, reason } => {
                write!(f, "Cannot {operation} reaction: {}", reason.describe())
            }
            Self::Store(e) | Self::Lookup(e) => write!(f, "{e}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) | Self::Lookup(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Create a policy denial
    pub fn forbidden(operation: Operation, reason: DenyReason) -> Self {
        Self::Forbidden { operation, reason }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Denial reason, if this is a policy denial
    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Self::Forbidden { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    /// Localizable message id for policy denials
    pub fn message_id(&self) -> Option<&'static str> {
        match self {
            Self::Forbidden { operation, reason } => Some(reason.message_id(*operation)),
            _ => None,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Forbidden { .. } => 403,
            Self::Store(e) | Self::Lookup(e) => {
                if e.is_not_found() {
                    404
                } else if e.is_validation() {
                    400
                } else if e.is_conflict() {
                    409
                } else {
                    500
                }
            }
            Self::Validation(_) => 400,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Forbidden { reason, .. } => reason.code(),
            Self::Store(e) | Self::Lookup(e) => e.code(),
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound { resource, id } => {
                AppError::NotFound(format!("{resource} {id}"))
            }
            ServiceError::Forbidden { operation, reason } => {
                AppError::forbidden(reason.code(), reason.message_id(operation))
            }
            ServiceError::Store(e) | ServiceError::Lookup(e) => AppError::Domain(e),
            ServiceError::Validation(msg) => AppError::Validation(msg),
            ServiceError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
