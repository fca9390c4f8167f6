//! Data types for the enrichment pipeline.

pub mod batch;
pub mod company;
pub mod discovery;
pub mod knowledge;
pub mod page;
pub mod prospect;
pub mod report;

pub use batch::BatchOperationResult;
pub use company::Company;
pub use discovery::DiscoveryItem;
pub use knowledge::{ExtractedCaseStudy, KnowledgeSnippet, PageType};
pub use page::WebPageContent;
pub use prospect::ProspectCandidate;
pub use report::{CompanyChallenges, CompanyEnrichmentResult};
