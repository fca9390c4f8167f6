//! Persistence boundary for target entities.
//!
//! The relational layer, its schema and migrations are external
//! collaborators; the pipeline only reads target identity before
//! enrichment and writes results back after. `MemoryCompanyStore` in
//! [`crate::testing`] stands in for it in tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::types::Company;

/// Repository-style access to target companies.
#[async_trait]
pub trait CompanyStore: Send + Sync {
    /// Fetch a company by id. `None` when the id does not exist.
    async fn get_company(&self, id: Uuid) -> Result<Option<Company>>;

    /// Write a company back.
    async fn update_company(&self, company: &Company) -> Result<()>;
}
