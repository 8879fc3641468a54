//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the yard repository
//! ports backed by PostgreSQL via Diesel with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations translate between Diesel
//!   rows and domain types. Slot transitions are computed by the domain's
//!   `SlotState`; adapters only lock, load, and write back.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) never leave this module.
//! - **Async-safe pooling**: Connections are managed via `bb8` pools through
//!   `diesel-async`.
//! - **Strongly typed errors**: Pool and Diesel failures map onto each port's
//!   `Connection` and `Query` variants.
//!
//! # Example
//!
//! ```ignore
//! use yardline::outbound::persistence::{DbPool, DieselScheduleRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/yard")).await?;
//! let schedule = DieselScheduleRepository::new(pool);
//! ```

mod diesel_auth_repository;
mod diesel_digest_ledger;
mod diesel_error_mapping;
mod diesel_facility_info_repository;
mod diesel_schedule_repository;
mod diesel_site_repository;
mod diesel_truck_repository;
mod migrations;
mod models;
mod pool;
mod row_mapping;
mod schema;

pub use diesel_auth_repository::DieselAuthRepository;
pub use diesel_digest_ledger::DieselDigestLedger;
pub use diesel_facility_info_repository::DieselFacilityInfoRepository;
pub use diesel_schedule_repository::DieselScheduleRepository;
pub use diesel_site_repository::DieselSiteRepository;
pub use diesel_truck_repository::DieselTruckRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
