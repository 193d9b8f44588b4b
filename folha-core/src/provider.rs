//! Read-through retrieval of reference data.
//!
//! [`ReferenceDataProvider`] resolves "the bracket tables and parameters
//! effective as of date D" through a [`PayrollRepository`] and keeps the
//! resolved snapshots in a [`ReferenceCache`] keyed by reference date.
//! Reference data changes a few times a year, so a short TTL plus explicit
//! invalidation (for when an administrator edits the tables) is enough to
//! keep batch runs from hammering storage.

use std::sync::Mutex;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::debug;

use crate::cache::ReferenceCache;
use crate::db::repository::{PayrollRepository, RepositoryError};
use crate::models::{InssBracket, IrrfBracket, PayrollParameters};

/// Everything the calculators need for one reference date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceDataSnapshot {
    pub inss_brackets: Vec<InssBracket>,
    pub irrf_brackets: Vec<IrrfBracket>,
    pub parameters: PayrollParameters,
}

/// Caching retrieval layer over a [`PayrollRepository`].
pub struct ReferenceDataProvider<R> {
    repository: R,
    cache: Mutex<ReferenceCache<NaiveDate, ReferenceDataSnapshot>>,
}

impl<R: PayrollRepository> ReferenceDataProvider<R> {
    pub fn new(
        repository: R,
        ttl: Duration,
    ) -> Self {
        Self {
            repository,
            cache: Mutex::new(ReferenceCache::new(ttl)),
        }
    }

    /// Returns the snapshot effective as of `as_of`, fetching from the
    /// repository only on a cache miss or after expiry.
    ///
    /// # Errors
    ///
    /// Any [`RepositoryError`] from the underlying repository; failed
    /// fetches are not cached.
    pub async fn snapshot(
        &self,
        as_of: NaiveDate,
    ) -> Result<ReferenceDataSnapshot, RepositoryError> {
        if let Some(snapshot) = self.cache.lock().unwrap().get(&as_of) {
            return Ok(snapshot.clone());
        }

        debug!(%as_of, "reference data cache miss, fetching from repository");
        let snapshot = ReferenceDataSnapshot {
            inss_brackets: self.repository.get_inss_brackets(as_of).await?,
            irrf_brackets: self.repository.get_irrf_brackets(as_of).await?,
            parameters: self.repository.get_parameters(as_of).await?,
        };

        self.cache
            .lock()
            .unwrap()
            .put(as_of, snapshot.clone());
        Ok(snapshot)
    }

    /// Drops the cached snapshot for one reference date.
    pub fn invalidate(
        &self,
        as_of: NaiveDate,
    ) {
        self.cache.lock().unwrap().invalidate(&as_of);
    }

    /// Drops every cached snapshot. Call after editing reference tables.
    pub fn invalidate_all(&self) {
        self.cache.lock().unwrap().clear();
    }
}
