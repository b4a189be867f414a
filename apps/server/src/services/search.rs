//! Installer search service
//!
//! Runs the COUNT and the page SELECT built from the same filter list, then
//! attaches each installer's offerings and cities. Enrichment runs
//! concurrently across rows and across the two kinds.

use std::sync::Arc;

use futures::future::try_join_all;
use serde::Serialize;

use crate::{
    db::{
        search::{installer_search_query, InstallerSearchParams, PageRequest, Pagination},
        InstallerStore,
    },
    metrics::{SEARCH_RESULTS, SEARCH_TOTAL},
    models::{InstallerRow, InstallerSummary},
    Result,
};

/// A page of installer summaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstallerPage {
    pub data: Vec<InstallerSummary>,
    pub pagination: Pagination,
}

impl InstallerPage {
    fn empty(page: &PageRequest) -> Self {
        Self {
            data: Vec::new(),
            pagination: Pagination::empty(page),
        }
    }
}

#[derive(Clone)]
pub struct SearchService {
    store: Arc<dyn InstallerStore>,
}

impl SearchService {
    pub fn new(store: Arc<dyn InstallerStore>) -> Self {
        Self { store }
    }

    /// Search completed installer profiles.
    ///
    /// Store failures are logged and produce an empty, well-formed page with
    /// zeroed totals instead of an error.
    #[tracing::instrument(skip(self, params), fields(page = params.page.page, limit = params.page.limit))]
    pub async fn search(&self, params: &InstallerSearchParams) -> InstallerPage {
        match self.try_search(params).await {
            Ok(page) => {
                SEARCH_TOTAL.with_label_values(&["ok"]).inc();
                SEARCH_RESULTS.observe(page.pagination.total as f64);
                tracing::debug!(
                    total = page.pagination.total,
                    returned = page.data.len(),
                    "Installer search completed"
                );
                page
            }
            Err(e) => {
                SEARCH_TOTAL.with_label_values(&["degraded"]).inc();
                tracing::error!(error = %e, "Installer search failed, returning empty page");
                InstallerPage::empty(&params.page)
            }
        }
    }

    async fn try_search(&self, params: &InstallerSearchParams) -> Result<InstallerPage> {
        let query = installer_search_query(params);

        let total = self.store.count_installers(&query).await?;
        let pagination = Pagination::new(&params.page, total);

        if total == 0 {
            return Ok(InstallerPage {
                data: Vec::new(),
                pagination,
            });
        }

        let rows = self.store.fetch_installers(&query, &params.page).await?;
        let data = try_join_all(rows.into_iter().map(|row| self.enrich(row))).await?;

        Ok(InstallerPage { data, pagination })
    }

    async fn enrich(&self, installer: InstallerRow) -> Result<InstallerSummary> {
        let (services, cities) = futures::try_join!(
            self.store.services_for(installer.id),
            self.store.service_areas_for(installer.id)
        )?;

        Ok(InstallerSummary {
            installer,
            services,
            cities,
        })
    }
}
