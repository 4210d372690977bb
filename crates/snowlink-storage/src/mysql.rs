use async_trait::async_trait;
use jiff::Timestamp;
use snowlink_core::repository::{ReadRepository, Repository, Result};
use snowlink_core::{Mapping, ShortCode, StorageError};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use tracing::debug;

/// Name of the unique index guarding one live mapping per original URL.
const URL_DIGEST_KEY: &str = "uk_short_urls_url_digest";

/// MySQL implementation of the repository contract.
///
/// Rows are never updated except for `url_digest`, which a row gives up once
/// it has expired and a new mapping for the same URL is inserted. The unique
/// index on `url_digest` makes deduplication atomic with the insert.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the `short_urls` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(include_str!("../ddl/mysql/short_urls.sql"))
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}

fn parse_expire_at(milliseconds: i64) -> Result<Timestamp> {
    Timestamp::from_millisecond(milliseconds).map_err(|e| {
        StorageError::InvalidData(format!(
            "invalid expire_at timestamp '{}': {e}",
            milliseconds
        ))
    })
}

fn row_to_mapping(row: &MySqlRow) -> Result<Mapping> {
    let code: String = row.try_get("short_code").map_err(map_sqlx_error)?;
    let original_url: String = row.try_get("original_url").map_err(map_sqlx_error)?;
    let expire_at: i64 = row.try_get("expire_at").map_err(map_sqlx_error)?;

    Ok(Mapping {
        code: ShortCode::new_unchecked(code),
        original_url,
        expire_at: parse_expire_at(expire_at)?,
    })
}

fn map_insert_error(err: sqlx::Error, mapping: &Mapping) -> StorageError {
    let duplicate_url = err
        .as_database_error()
        .filter(|db_err| db_err.is_unique_violation())
        .map(|db_err| db_err.message().contains(URL_DIGEST_KEY));

    match duplicate_url {
        Some(true) => StorageError::DuplicateUrl(mapping.original_url.clone()),
        Some(false) => StorageError::DuplicateCode(mapping.code.to_string()),
        None => map_sqlx_error(err),
    }
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl ReadRepository for MySqlRepository {
    async fn get(&self, code: &ShortCode) -> Result<Option<Mapping>> {
        let row = sqlx::query(
            r#"
            SELECT short_code, original_url, expire_at
            FROM short_urls
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_mapping).transpose()
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn find_by_url(&self, original_url: &str) -> Result<Option<Mapping>> {
        let row = sqlx::query(
            r#"
            SELECT short_code, original_url, expire_at
            FROM short_urls
            WHERE url_digest = UNHEX(SHA2(?, 256))
              AND original_url = ?
            LIMIT 1
            "#,
        )
        .bind(original_url)
        .bind(original_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_mapping).transpose()
    }

    async fn insert(&self, mapping: &Mapping) -> Result<()> {
        // An expired holder gives up the url so the unique index admits the new row.
        let released = sqlx::query(
            r#"
            UPDATE short_urls
            SET url_digest = NULL
            WHERE url_digest = UNHEX(SHA2(?, 256))
              AND expire_at < ?
            "#,
        )
        .bind(mapping.original_url.as_str())
        .bind(Timestamp::now().as_millisecond())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if released.rows_affected() > 0 {
            debug!(url = %mapping.original_url, "released url held by an expired mapping");
        }

        let result = sqlx::query(
            r#"
            INSERT INTO short_urls (short_code, original_url, url_digest, expire_at)
            VALUES (?, ?, UNHEX(SHA2(?, 256)), ?)
            "#,
        )
        .bind(mapping.code.as_str())
        .bind(mapping.original_url.as_str())
        .bind(mapping.original_url.as_str())
        .bind(mapping.expire_at.as_millisecond())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => Err(map_insert_error(err, mapping)),
        }
    }
}
