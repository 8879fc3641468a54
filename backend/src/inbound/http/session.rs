//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations such as persisting the logged-in phone or
//! requiring staff access.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::ports::PhoneLogin;
use crate::domain::{Error, PhoneNumber};

pub(crate) const PHONE_KEY: &str = "phone";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated phone in the session cookie.
    pub fn persist_phone(&self, phone: &PhoneNumber) -> Result<(), Error> {
        self.0
            .insert(PHONE_KEY, phone.as_str())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the logged-in phone, if any.
    pub fn phone(&self) -> Result<Option<PhoneNumber>, Error> {
        let raw = self
            .0
            .get::<String>(PHONE_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match raw {
            Some(raw) => match PhoneNumber::normalize(&raw) {
                Some(phone) => Ok(Some(phone)),
                None => {
                    tracing::warn!("invalid phone in session cookie");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Require a logged-in phone or return `401 Unauthorized`.
    pub fn require_phone(&self) -> Result<PhoneNumber, Error> {
        self.phone()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Require a logged-in admin: `401` without a session, `403` otherwise.
    pub async fn require_admin(&self, login: &dyn PhoneLogin) -> Result<PhoneNumber, Error> {
        let phone = self.require_phone()?;
        login.require_admin(&phone).await?;
        Ok(phone)
    }

    /// Drop every session value.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
