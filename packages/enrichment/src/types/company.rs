//! The persisted target entity, read through the persistence boundary.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A target company as stored by the (external) persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    /// Entity id
    pub id: Uuid,

    /// Owning user
    pub owner_id: Uuid,

    /// Company name
    pub name: String,

    /// Primary web domain, with or without scheme
    pub domain: String,
}

impl Company {
    /// Create a company owned by `owner_id`.
    pub fn new(owner_id: Uuid, name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into(),
            domain: domain.into(),
        }
    }
}
