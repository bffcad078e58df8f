//! Ports and adapters infrastructure
//!
//! Each domain defines port traits for the storage and collaborator
//! systems it depends on; adapters implement them (PostgreSQL in
//! `infra_db`, in-memory mocks behind each domain's `mock` feature).
//! All port implementations share the unified `PortError` so domain
//! services can map failures uniformly.
//!
//! ```rust,ignore
//! // In domain_billing/src/ports.rs
//! #[async_trait]
//! pub trait InvoiceStore: DomainPort {
//!     async fn fetch(&self, owner: OwnerId, id: InvoiceId)
//!         -> Result<Option<Invoice>, PortError>;
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Error type for port operations
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found in the caller's scope
    #[error("Not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    /// A validation error occurred
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// The operation conflicts with existing data (unique keys)
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// A version-guarded update lost the race to a concurrent writer
    #[error("Stale write: {entity_type} {id} was modified concurrently")]
    Stale { entity_type: String, id: String },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// An internal adapter error occurred
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Creates a Validation error with field information
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    /// Creates a Stale error for a version-guarded update
    pub fn stale(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::Stale {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
        }
    }

    /// Returns true if the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }

    /// Returns true if a version-guarded update should be retried
    pub fn is_stale(&self) -> bool {
        matches!(self, PortError::Stale { .. })
    }

    /// Returns true if the operation conflicts with existing data
    pub fn is_conflict(&self) -> bool {
        matches!(self, PortError::Conflict { .. })
    }
}

/// Marker trait for all domain ports
///
/// Port traits extend this marker so implementations are thread-safe and
/// usable as shared trait objects in async contexts.
pub trait DomainPort: Send + Sync + 'static {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = PortError::not_found("Invoice", "INV-123");
        assert!(err.is_not_found());
        assert!(err.to_string().contains("Invoice"));
        assert!(err.to_string().contains("INV-123"));
    }

    #[test]
    fn test_stale_is_retryable_marker() {
        let err = PortError::stale("Invoice", "INV-123");
        assert!(err.is_stale());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_validation_with_field() {
        let err = PortError::validation_field("must be positive", "amount");
        match err {
            PortError::Validation { field, .. } => assert_eq!(field.as_deref(), Some("amount")),
            _ => panic!("expected validation error"),
        }
    }
}
