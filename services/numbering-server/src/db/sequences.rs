//! Postgres-backed counter store.
//!
//! One allocation is one transaction: take (or create) the counter row under
//! a `FOR UPDATE` lock, bump `last_number`, commit. Exclusivity is per row,
//! so scopes never queue behind each other; concurrent allocators for the
//! same scope serialize on the row lock exactly like the rest of the
//! platform's hot rows.

use std::time::Duration;

use async_trait::async_trait;
use backoffice_numbering::{ScopeKey, SequenceIncrement, SequenceStore, StoreError};
use sqlx::postgres::PgPool;
use sqlx::Postgres;

// Postgres SQLSTATE for "lock_not_available", raised when lock_timeout fires.
const LOCK_NOT_AVAILABLE: &str = "55P03";

const SELECT_FOR_UPDATE: &str = r#"
    SELECT last_number
    FROM document_sequences
    WHERE tenant_code = $1
      AND document_type = $2
      AND sub_scope IS NOT DISTINCT FROM $3
      AND period_year = $4
      AND period_month = $5
    FOR UPDATE
"#;

const INSERT_FRESH: &str = r#"
    INSERT INTO document_sequences
        (tenant_code, document_type, sub_scope, period_year, period_month, last_number)
    VALUES ($1, $2, $3, $4, $5, 0)
    ON CONFLICT DO NOTHING
"#;

const UPDATE_LAST_NUMBER: &str = r#"
    UPDATE document_sequences
    SET last_number = $6
    WHERE tenant_code = $1
      AND document_type = $2
      AND sub_scope IS NOT DISTINCT FROM $3
      AND period_year = $4
      AND period_month = $5
"#;

/// A [`SequenceStore`] over a shared Postgres pool.
#[derive(Clone)]
pub struct PgSequenceStore {
    pool: PgPool,
    lock_wait: Duration,
}

impl PgSequenceStore {
    pub fn new(pool: PgPool, lock_wait: Duration) -> Self {
        Self { pool, lock_wait }
    }

    fn map_query_error(&self, err: sqlx::Error) -> StoreError {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(LOCK_NOT_AVAILABLE) {
                return StoreError::LockTimeout {
                    waited: self.lock_wait,
                };
            }
        }
        StoreError::unavailable(err)
    }
}

fn bind_key<'q>(
    query: sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments>,
    key: &'q ScopeKey,
) -> sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments> {
    query
        .bind(key.tenant_code())
        .bind(key.document_type())
        .bind(key.sub_scope())
        .bind(key.period().year())
        .bind(key.period().month() as i32)
}

#[async_trait]
impl SequenceStore for PgSequenceStore {
    async fn lock_and_increment(&self, key: &ScopeKey) -> Result<SequenceIncrement, StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::unavailable)?;

        // Bound the row-lock wait for this transaction only. A caller that
        // gives up waiting gets a clean rollback instead of holding the
        // connection indefinitely.
        let set_timeout = format!("SET LOCAL lock_timeout = '{}ms'", self.lock_wait.as_millis());
        sqlx::query(&set_timeout)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::unavailable)?;

        let existing: Option<i64> = bind_key(sqlx::query(SELECT_FOR_UPDATE), key)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| self.map_query_error(e))?
            .map(|row| sqlx::Row::try_get(&row, 0))
            .transpose()
            .map_err(StoreError::unavailable)?;

        let (last_number, freshly_created) = match existing {
            Some(n) => (n, false),
            None => {
                // Another allocator may insert the row between our select and
                // this insert; ON CONFLICT DO NOTHING plus a re-select under
                // FOR UPDATE converges both outcomes onto a locked row.
                bind_key(sqlx::query(INSERT_FRESH), key)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| self.map_query_error(e))?;

                let row = bind_key(sqlx::query(SELECT_FOR_UPDATE), key)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| self.map_query_error(e))?;
                let n: i64 = sqlx::Row::try_get(&row, 0).map_err(StoreError::unavailable)?;

                // A committed row is always >= 1, so observing 0 here means
                // this transaction created it.
                (n, n == 0)
            }
        };

        let next = last_number + 1;
        bind_key(sqlx::query(UPDATE_LAST_NUMBER), key)
            .bind(next)
            .execute(&mut *tx)
            .await
            .map_err(|e| self.map_query_error(e))?;

        tx.commit().await.map_err(StoreError::unavailable)?;

        Ok(SequenceIncrement {
            value: next as u64,
            freshly_created,
        })
    }
}
