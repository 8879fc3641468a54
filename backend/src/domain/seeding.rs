//! Idempotent startup seeding of sites and the first admin.

use std::sync::Arc;

use tracing::info;

use crate::domain::ports::{AuthRepository, SiteRepository};
use crate::domain::{Error, PhoneNumber, Site, SiteCode, SiteId};

/// The two receiving sites a fresh install starts with.
#[must_use]
pub fn default_sites() -> Vec<Site> {
    [
        (100, "CIF", "Cargill Iowa Falls", 5),
        (101, "CCR", "Cargill Cedar Rapids", 6),
    ]
    .into_iter()
    .filter_map(|(id, code, name, min_interval_minutes)| {
        SiteCode::new(code).ok().map(|code| Site {
            id: SiteId::new(id),
            code,
            name: name.to_owned(),
            min_interval_minutes,
        })
    })
    .collect()
}

/// What a seeding run changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Sites newly inserted.
    pub sites_inserted: usize,
    /// Whether the admin grant was newly created.
    pub admin_granted: bool,
}

/// Inserts reference data that must exist before the service accepts traffic.
pub struct YardSeeder<S, A> {
    site_repo: Arc<S>,
    auth_repo: Arc<A>,
}

impl<S, A> YardSeeder<S, A>
where
    S: SiteRepository,
    A: AuthRepository,
{
    pub fn new(site_repo: Arc<S>, auth_repo: Arc<A>) -> Self {
        Self {
            site_repo,
            auth_repo,
        }
    }

    /// Insert any of `sites` not yet present and grant `admin` if given.
    /// Running twice changes nothing the second time.
    pub async fn seed(
        &self,
        sites: &[Site],
        admin: Option<&PhoneNumber>,
    ) -> Result<SeedReport, Error> {
        let mut report = SeedReport::default();
        for site in sites {
            let inserted = self
                .site_repo
                .insert_site_if_absent(site)
                .await
                .map_err(Error::from)?;
            if inserted {
                info!(site = %site.code, "site seeded");
                report.sites_inserted += 1;
            }
        }
        if let Some(phone) = admin {
            report.admin_granted = self
                .auth_repo
                .ensure_admin(phone)
                .await
                .map_err(Error::from)?;
            if report.admin_granted {
                info!(phone = %phone.masked(), "admin seeded");
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockAuthRepository, MockSiteRepository, SiteRepositoryError};
    use rstest::rstest;

    #[rstest]
    fn default_sites_carry_their_own_intervals() {
        let sites = default_sites();
        let summary: Vec<_> = sites
            .iter()
            .map(|s| (s.id.get(), s.code.as_str(), s.min_interval_minutes))
            .collect();
        assert_eq!(summary, vec![(100, "CIF", 5), (101, "CCR", 6)]);
    }

    #[rstest]
    #[tokio::test]
    async fn counts_only_new_rows() {
        let mut sites = MockSiteRepository::new();
        sites
            .expect_insert_site_if_absent()
            .returning(|site| Ok(site.code.as_str() == "CCR"));
        let mut auth = MockAuthRepository::new();
        auth.expect_ensure_admin().times(1).returning(|_| Ok(false));

        let seeder = YardSeeder::new(Arc::new(sites), Arc::new(auth));
        let admin = PhoneNumber::from_stored("+15155550100");
        let report = seeder
            .seed(&default_sites(), Some(&admin))
            .await
            .expect("seed succeeds");
        assert_eq!(
            report,
            SeedReport {
                sites_inserted: 1,
                admin_granted: false,
            }
        );
    }

    #[rstest]
    #[tokio::test]
    async fn skips_admin_when_unset() {
        let mut sites = MockSiteRepository::new();
        sites.expect_insert_site_if_absent().returning(|_| Ok(true));
        let mut auth = MockAuthRepository::new();
        auth.expect_ensure_admin().never();

        let seeder = YardSeeder::new(Arc::new(sites), Arc::new(auth));
        let report = seeder.seed(&default_sites(), None).await.expect("seed");
        assert_eq!(report.sites_inserted, 2);
    }

    #[rstest]
    #[tokio::test]
    async fn connection_failure_is_unavailable() {
        let mut sites = MockSiteRepository::new();
        sites
            .expect_insert_site_if_absent()
            .returning(|_| Err(SiteRepositoryError::connection("refused")));

        let seeder = YardSeeder::new(Arc::new(sites), Arc::new(MockAuthRepository::new()));
        let err = seeder
            .seed(&default_sites(), None)
            .await
            .expect_err("seed fails");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
