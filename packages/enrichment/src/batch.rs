//! Batch orchestrator.
//!
//! Drives a single-entity operation over a list of entity ids with an
//! upfront ownership gate, bounded concurrency per operation type, and
//! per-item failure isolation. Per-item outcomes are `Result` values
//! pattern-matched into the aggregate; one item's failure never cancels
//! its siblings.
//!
//! The concurrency bounds live in [`BatchRunner`], constructed once at
//! startup. Every batch of a given kind acquires from the same semaphore,
//! so the bound holds across concurrent batch calls, not just within one.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::EnrichmentConfig;
use crate::error::{EnrichmentError, Result};
use crate::traits::store::CompanyStore;
use crate::types::{BatchOperationResult, Company};

/// Which class of single-entity operation a batch drives.
///
/// Each kind has its own process-wide concurrency bound so unrelated
/// operation classes don't starve each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    /// Full enrichment runs (crawl + LLM heavy)
    Enrichment,

    /// Lighter soft-data lookups
    SoftData,

    /// Email generation over already-enriched data
    EmailGeneration,
}

impl BatchKind {
    /// The configured bound for this kind.
    pub fn concurrency(self, config: &EnrichmentConfig) -> usize {
        let bound = match self {
            BatchKind::Enrichment => config.enrich_concurrency,
            BatchKind::SoftData => config.soft_data_concurrency,
            BatchKind::EmailGeneration => config.email_concurrency,
        };
        bound.max(1)
    }
}

/// Shared batch executor holding one semaphore per [`BatchKind`].
///
/// Construct one per process and hand it to every caller that issues
/// batches: the per-kind bound then caps simultaneous work across all
/// concurrent batch calls of that kind.
pub struct BatchRunner {
    enrich: Arc<Semaphore>,
    soft_data: Arc<Semaphore>,
    email: Arc<Semaphore>,
}

impl BatchRunner {
    /// Create a runner with the configured per-kind bounds.
    pub fn new(config: &EnrichmentConfig) -> Self {
        Self {
            enrich: Arc::new(Semaphore::new(BatchKind::Enrichment.concurrency(config))),
            soft_data: Arc::new(Semaphore::new(BatchKind::SoftData.concurrency(config))),
            email: Arc::new(Semaphore::new(BatchKind::EmailGeneration.concurrency(config))),
        }
    }

    fn semaphore(&self, kind: BatchKind) -> &Arc<Semaphore> {
        match kind {
            BatchKind::Enrichment => &self.enrich,
            BatchKind::SoftData => &self.soft_data,
            BatchKind::EmailGeneration => &self.email,
        }
    }

    /// Run `op` over every entity in `ids` on behalf of `owner_id`.
    ///
    /// 1. Resolves all entities and validates ownership of every one before
    ///    any per-item work; a single foreign entity aborts the whole batch
    ///    with [`EnrichmentError::Unauthorized`].
    /// 2. Missing ids become failure entries without processing.
    /// 3. Remaining entities run under the kind's shared semaphore; items
    ///    queue for a permit, so the bound caps simultaneous external work
    ///    rather than total batch size.
    /// 4. Every processed entity lands in exactly one of successes/failures.
    ///    Cancellation stops issuing new items; items not yet started are
    ///    recorded as cancelled failures.
    pub async fn run_batch<S, T, F, Fut>(
        &self,
        store: &S,
        ids: &[Uuid],
        owner_id: Uuid,
        kind: BatchKind,
        cancel: CancellationToken,
        op: F,
    ) -> Result<BatchOperationResult<T>>
    where
        S: CompanyStore,
        F: Fn(Company, CancellationToken) -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        // Phase 1: resolve everything up front. Partial processing before
        // an ownership violation is detected is considered unsafe.
        let mut resolved: Vec<(Uuid, Option<Company>)> = Vec::with_capacity(ids.len());
        for &id in ids {
            resolved.push((id, store.get_company(id).await?));
        }

        for (id, company) in &resolved {
            if let Some(company) = company {
                if company.owner_id != owner_id {
                    warn!(entity_id = %id, owner_id = %owner_id, "ownership violation, batch aborted");
                    return Err(EnrichmentError::Unauthorized {
                        owner_id,
                        entity_id: *id,
                    });
                }
            }
        }

        let mut result = BatchOperationResult::new();
        let mut to_process: Vec<Company> = Vec::new();

        for (id, company) in resolved {
            match company {
                Some(company) => to_process.push(company),
                None => {
                    result.push_failure(id, EnrichmentError::NotFound { entity_id: id }.to_string())
                }
            }
        }

        info!(
            kind = ?kind,
            total = ids.len(),
            processing = to_process.len(),
            not_found = result.failures.len(),
            "batch starting"
        );

        // Phase 2: bounded fan-out on the kind's process-wide semaphore.
        let semaphore = self.semaphore(kind);
        let op = &op;
        let cancel = &cancel;

        let futures = to_process.into_iter().map(|company| {
            let semaphore = Arc::clone(semaphore);
            async move {
                let id = company.id;

                // Queue for a slot; a cancelled batch issues no new items.
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return (id, Err(EnrichmentError::Cancelled)),
                };
                if cancel.is_cancelled() {
                    return (id, Err(EnrichmentError::Cancelled));
                }

                (id, op(company, cancel.child_token()).await)
            }
        });

        for (id, outcome) in futures::future::join_all(futures).await {
            match outcome {
                Ok(data) => result.push_success(id, data),
                Err(e) => {
                    warn!(entity_id = %id, error = %e, "batch unit failed");
                    result.push_failure(id, e.to_string());
                }
            }
        }

        info!(
            kind = ?kind,
            successes = result.successes.len(),
            failures = result.failures.len(),
            "batch complete"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryCompanyStore, MockLanguageModel};
    use crate::traits::llm::LanguageModel;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn seeded_store(owner: Uuid, count: usize) -> (MemoryCompanyStore, Vec<Uuid>) {
        let store = MemoryCompanyStore::new();
        let mut ids = Vec::new();
        for i in 0..count {
            let company = Company::new(owner, format!("Company {i}"), format!("c{i}.se"));
            ids.push(company.id);
            store.insert(company);
        }
        (store, ids)
    }

    #[tokio::test]
    async fn test_every_item_yields_exactly_one_outcome() {
        let owner = Uuid::new_v4();
        let (store, ids) = seeded_store(owner, 5);
        let failing_id = ids[2];

        let runner = BatchRunner::new(&EnrichmentConfig::default());
        let result = runner
            .run_batch(
                &store,
                &ids,
                owner,
                BatchKind::Enrichment,
                CancellationToken::new(),
                |company, _cancel| async move {
                    if company.id == failing_id {
                        Err(EnrichmentError::Cancelled)
                    } else {
                        Ok(company.name)
                    }
                },
            )
            .await
            .unwrap();

        assert_eq!(result.len(), 5);
        assert_eq!(result.successes.len(), 4);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].0, failing_id);
    }

    #[tokio::test]
    async fn test_ownership_violation_aborts_before_any_work() {
        let owner = Uuid::new_v4();
        let (store, mut ids) = seeded_store(owner, 3);

        let foreign = Company::new(Uuid::new_v4(), "Foreign", "foreign.se");
        ids.push(foreign.id);
        store.insert(foreign);

        let llm = MockLanguageModel::new().with_response("snapshot of", "a report");

        let runner = BatchRunner::new(&EnrichmentConfig::default());
        let err = runner
            .run_batch(
                &store,
                &ids,
                owner,
                BatchKind::Enrichment,
                CancellationToken::new(),
                |company, _cancel| {
                    let llm = &llm;
                    async move {
                        llm.generate(llm_client::TextRequest::new(
                            "gpt-4o",
                            format!("snapshot of {}", company.name),
                        ))
                        .await
                    }
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, EnrichmentError::Unauthorized { .. }));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_id_is_a_per_item_failure() {
        let owner = Uuid::new_v4();
        let (store, mut ids) = seeded_store(owner, 2);
        let ghost = Uuid::new_v4();
        ids.push(ghost);

        let runner = BatchRunner::new(&EnrichmentConfig::default());
        let result = runner
            .run_batch(
                &store,
                &ids,
                owner,
                BatchKind::SoftData,
                CancellationToken::new(),
                |company, _cancel| async move { Ok(company.name) },
            )
            .await
            .unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result.successes.len(), 2);
        assert_eq!(result.failures[0].0, ghost);
        assert!(result.failures[0].1.contains("not found"));
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_bound() {
        let owner = Uuid::new_v4();
        let (store, ids) = seeded_store(owner, 10);

        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));
        let in_flight_gauge = Arc::clone(&in_flight);
        let max_seen_gauge = Arc::clone(&max_seen);

        let config = EnrichmentConfig::new().with_enrich_concurrency(3);
        let runner = BatchRunner::new(&config);
        let result = runner
            .run_batch(
                &store,
                &ids,
                owner,
                BatchKind::Enrichment,
                CancellationToken::new(),
                move |company, _cancel| {
                    let in_flight = Arc::clone(&in_flight_gauge);
                    let max_seen = Arc::clone(&max_seen_gauge);
                    async move {
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(25)).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        Ok(company.id)
                    }
                },
            )
            .await
            .unwrap();

        assert!(result.is_all_success());
        assert_eq!(result.successes.len(), 10);
        assert!(max_seen.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_bound_holds_across_concurrent_batches() {
        // Two batches of the same kind on one runner share its semaphore,
        // so the bound caps their combined in-flight work.
        let owner = Uuid::new_v4();
        let (store, ids_a) = seeded_store(owner, 6);
        let mut ids_b = Vec::new();
        for i in 0..6 {
            let company = Company::new(owner, format!("Other {i}"), format!("o{i}.se"));
            ids_b.push(company.id);
            store.insert(company);
        }

        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let config = EnrichmentConfig::new().with_enrich_concurrency(3);
        let runner = BatchRunner::new(&config);

        let op = |company: Company, _cancel: CancellationToken| {
            let in_flight = Arc::clone(&in_flight);
            let max_seen = Arc::clone(&max_seen);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(25)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(company.id)
            }
        };

        let (first, second) = tokio::join!(
            runner.run_batch(
                &store,
                &ids_a,
                owner,
                BatchKind::Enrichment,
                CancellationToken::new(),
                op,
            ),
            runner.run_batch(
                &store,
                &ids_b,
                owner,
                BatchKind::Enrichment,
                CancellationToken::new(),
                op,
            ),
        );

        assert_eq!(first.unwrap().successes.len(), 6);
        assert_eq!(second.unwrap().successes.len(), 6);
        assert!(max_seen.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_cancelled_batch_records_cancelled_outcomes() {
        let owner = Uuid::new_v4();
        let (store, ids) = seeded_store(owner, 4);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let runner = BatchRunner::new(&EnrichmentConfig::default());
        let result = runner
            .run_batch(
                &store,
                &ids,
                owner,
                BatchKind::Enrichment,
                cancel,
                |company, _cancel| async move { Ok(company.name) },
            )
            .await
            .unwrap();

        assert_eq!(result.len(), 4);
        assert!(result.successes.is_empty());
        assert!(result
            .failures
            .iter()
            .all(|(_, message)| message.contains("cancelled")));
    }
}
