//! Shared Diesel error mapping for the yard repositories.
//!
//! Every repository port exposes `Connection` and `Query` variants; these
//! helpers route pool and Diesel failures into them through the port's own
//! constructors so each adapter only names its error type once.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error.
pub fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map Diesel errors into query or connection errors.
///
/// Closed connections and serialisation failures are reported as connection
/// problems so callers surface them as temporary outages.
pub fn map_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: FnOnce(String) -> E,
    C: FnOnce(String) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => query("record not found".to_owned()),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error".to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            connection("database serialisation conflict".to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            query(format!("duplicate record: {}", info.message()))
        }
        DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, info) => {
            query(format!("constraint violated: {}", info.message()))
        }
        DieselError::QueryBuilderError(_) => query("database query error".to_owned()),
        _ => query("database error".to_owned()),
    }
}
