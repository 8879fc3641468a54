//! Sites, login accounts, facility contacts, and the digest ledger.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::ports::{
    AuthRepository, AuthRepositoryError, DigestLedger, DigestLedgerError, FacilityInfoRepository,
    FacilityInfoRepositoryError, SiteRepository, SiteRepositoryError,
};
use crate::domain::{ActiveOtpCode, FacilityInfo, NewOtpCode, PhoneNumber, Site, SiteCode, SiteId};

use super::{InMemoryYardStore, OtpRecord};

#[async_trait]
impl SiteRepository for InMemoryYardStore {
    async fn list_sites(&self) -> Result<Vec<Site>, SiteRepositoryError> {
        Ok(self.lock().sites.values().cloned().collect())
    }

    async fn find_site(&self, id: SiteId) -> Result<Option<Site>, SiteRepositoryError> {
        Ok(self.lock().sites.get(&id).cloned())
    }

    async fn find_site_by_code(
        &self,
        code: &SiteCode,
    ) -> Result<Option<Site>, SiteRepositoryError> {
        Ok(self
            .lock()
            .sites
            .values()
            .find(|site| site.code == *code)
            .cloned())
    }

    async fn insert_site_if_absent(&self, site: &Site) -> Result<bool, SiteRepositoryError> {
        let mut state = self.lock();
        let taken = state
            .sites
            .values()
            .any(|existing| existing.id == site.id || existing.code == site.code);
        if taken {
            return Ok(false);
        }
        state.sites.insert(site.id, site.clone());
        Ok(true)
    }
}

#[async_trait]
impl AuthRepository for InMemoryYardStore {
    async fn is_banned(&self, phone: &PhoneNumber) -> Result<bool, AuthRepositoryError> {
        Ok(self
            .lock()
            .users
            .get(phone)
            .is_some_and(|user| user.is_banned))
    }

    async fn is_admin(&self, phone: &PhoneNumber) -> Result<bool, AuthRepositoryError> {
        Ok(self.lock().admins.contains(phone))
    }

    async fn ensure_admin(&self, phone: &PhoneNumber) -> Result<bool, AuthRepositoryError> {
        Ok(self.lock().admins.insert(phone.clone()))
    }

    async fn store_code(&self, code: &NewOtpCode) -> Result<(), AuthRepositoryError> {
        let mut state = self.lock();
        state.last_otp_id += 1;
        let id = state.last_otp_id;
        state.otp_codes.push(OtpRecord {
            id,
            phone: code.phone.clone(),
            code_hash: code.code_hash.clone(),
            expires_at: code.expires_at,
            attempts_left: code.attempts_left,
            consumed_at: None,
        });
        Ok(())
    }

    async fn latest_active_code(
        &self,
        phone: &PhoneNumber,
        now: DateTime<Utc>,
    ) -> Result<Option<ActiveOtpCode>, AuthRepositoryError> {
        Ok(self
            .lock()
            .otp_codes
            .iter()
            .filter(|c| c.phone == *phone && c.consumed_at.is_none() && c.expires_at > now)
            .max_by_key(|c| c.id)
            .map(|c| ActiveOtpCode {
                id: c.id,
                code_hash: c.code_hash.clone(),
                attempts_left: c.attempts_left,
            }))
    }

    async fn decrement_attempts(&self, code_id: i64) -> Result<(), AuthRepositoryError> {
        if let Some(code) = self.lock().otp_codes.iter_mut().find(|c| c.id == code_id) {
            code.attempts_left = code.attempts_left.saturating_sub(1);
        }
        Ok(())
    }

    async fn complete_login(
        &self,
        code_id: i64,
        phone: &PhoneNumber,
        now: DateTime<Utc>,
    ) -> Result<(), AuthRepositoryError> {
        let mut state = self.lock();
        if let Some(code) = state.otp_codes.iter_mut().find(|c| c.id == code_id) {
            code.consumed_at = Some(now);
        }
        state.users.entry(phone.clone()).or_default().last_login_at = Some(now);
        Ok(())
    }
}

#[async_trait]
impl FacilityInfoRepository for InMemoryYardStore {
    async fn get(&self) -> Result<FacilityInfo, FacilityInfoRepositoryError> {
        Ok(self.lock().facility.clone())
    }

    async fn update(&self, info: &FacilityInfo) -> Result<(), FacilityInfoRepositoryError> {
        self.lock().facility = info.clone();
        Ok(())
    }
}

#[async_trait]
impl DigestLedger for InMemoryYardStore {
    async fn claim(&self, date: NaiveDate, _now: DateTime<Utc>) -> Result<bool, DigestLedgerError> {
        Ok(self.lock().digest_dates.insert(date))
    }
}
