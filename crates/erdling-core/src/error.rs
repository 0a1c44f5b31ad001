use crate::ids::{AttributeId, EntityId, RelationshipId};

pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("schema contains no entities")]
    EmptySchema,

    #[error("duplicate entity name: {name}")]
    DuplicateEntity { name: String },

    #[error("unknown entity: {0}")]
    UnknownEntity(EntityId),

    #[error("unknown attribute: {0}")]
    UnknownAttribute(AttributeId),

    #[error("unknown relationship: {0}")]
    UnknownRelationship(RelationshipId),

    #[error("display name must not be empty")]
    InvalidName,

    #[error("invalid snapshot: {message}")]
    InvalidSnapshot { message: String },
}

/// Failure reported by an external collaborator (schema parsing service,
/// name-translation service, project persistence backend).
///
/// The engine treats every kind the same way: the requested mutation did not
/// happen and the model is unchanged. The kind exists so the controller layer
/// can react differently (prompt login, prompt top-up, generic retry).
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    pub message: String,
}

impl ServiceError {
    pub fn new(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    Unauthorized,
    InsufficientBalance,
    Unreachable,
    Protocol,
}

impl std::fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unauthorized => "unauthorized",
            Self::InsufficientBalance => "insufficient balance",
            Self::Unreachable => "service unreachable",
            Self::Protocol => "protocol error",
        };
        f.write_str(s)
    }
}
