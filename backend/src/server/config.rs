//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use yardline::config::AppSettings;
use yardline::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) settings: AppSettings,
    pub(crate) check_period: Duration,
}

impl ServerConfig {
    /// Construct a server configuration from loaded settings.
    #[must_use]
    pub fn new(key: Key, same_site: SameSite, bind_addr: SocketAddr, settings: AppSettings) -> Self {
        Self {
            key,
            cookie_secure: settings.cookie_secure(),
            same_site,
            bind_addr,
            db_pool: None,
            check_period: settings.check_period(),
            settings,
        }
    }

    /// Attach a database connection pool.
    ///
    /// When provided, the server uses the Diesel repositories; otherwise the
    /// in-memory yard store backs every port.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
