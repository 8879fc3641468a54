//! Port for site reference data.

use async_trait::async_trait;

use crate::domain::{Site, SiteCode, SiteId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by site repository adapters.
    pub enum SiteRepositoryError for "site repository" {}
}

/// Read and seed sites.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SiteRepository: Send + Sync {
    /// All sites ordered by id.
    async fn list_sites(&self) -> Result<Vec<Site>, SiteRepositoryError>;

    /// Site by identifier.
    async fn find_site(&self, id: SiteId) -> Result<Option<Site>, SiteRepositoryError>;

    /// Site by external code.
    async fn find_site_by_code(&self, code: &SiteCode)
    -> Result<Option<Site>, SiteRepositoryError>;

    /// Insert a site unless one with the same id or code exists. Returns
    /// whether a row was written.
    async fn insert_site_if_absent(&self, site: &Site) -> Result<bool, SiteRepositoryError>;
}

/// Fixture with no sites that accepts inserts.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSiteRepository;

#[async_trait]
impl SiteRepository for FixtureSiteRepository {
    async fn list_sites(&self) -> Result<Vec<Site>, SiteRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_site(&self, _id: SiteId) -> Result<Option<Site>, SiteRepositoryError> {
        Ok(None)
    }

    async fn find_site_by_code(
        &self,
        _code: &SiteCode,
    ) -> Result<Option<Site>, SiteRepositoryError> {
        Ok(None)
    }

    async fn insert_site_if_absent(&self, _site: &Site) -> Result<bool, SiteRepositoryError> {
        Ok(true)
    }
}
