//! `PostgreSQL` connection pool construction.

use crate::config::ProjectIqConfig;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};

/// Shared r2d2 pool of `PostgreSQL` connections.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Builds a connection pool from configuration.
///
/// The reposition wait budget doubles as the default checkout timeout so
/// ordinary reads never wait longer than a reorder would.
///
/// # Errors
///
/// Returns [`PoolError`] when the pool cannot open its initial connection.
pub fn build_pool(config: &ProjectIqConfig) -> Result<PgPool, PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
    Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(config.reposition_budget.max_wait)
        .build(manager)
}
