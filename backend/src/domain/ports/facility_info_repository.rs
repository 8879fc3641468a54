//! Port for the facility contact record.

use async_trait::async_trait;

use crate::domain::FacilityInfo;

use super::define_port_error;

define_port_error! {
    /// Errors raised by facility info adapters.
    pub enum FacilityInfoRepositoryError for "facility repository" {}
}

/// Single-record storage of facility contact numbers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FacilityInfoRepository: Send + Sync {
    /// Current record; empty when never set.
    async fn get(&self) -> Result<FacilityInfo, FacilityInfoRepositoryError>;

    /// Replace the record.
    async fn update(&self, info: &FacilityInfo) -> Result<(), FacilityInfoRepositoryError>;
}

/// Fixture returning fixed demo numbers.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureFacilityInfoRepository;

#[async_trait]
impl FacilityInfoRepository for FixtureFacilityInfoRepository {
    async fn get(&self) -> Result<FacilityInfo, FacilityInfoRepositoryError> {
        Ok(FacilityInfo {
            facility_phone: Some("+15155550100".to_owned()),
            support_phone: Some("+15155550199".to_owned()),
        })
    }

    async fn update(&self, _info: &FacilityInfo) -> Result<(), FacilityInfoRepositoryError> {
        Ok(())
    }
}
