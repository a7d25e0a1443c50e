//! SQLite 读数写入实现

use crate::error::StorageError;
use crate::models::{ReadingQuery, ReadingRecord};
use crate::traits::ReadingStore;
use crate::validation::ensure_record;
use sqlx::{Row, SqlitePool};

const CREATE_TABLE: &str = "create table if not exists reading_record ( \
     id integer primary key autoincrement, \
     ts_ms integer not null, \
     channel text not null check (length(channel) > 0), \
     address text not null, \
     value real \
 )";

const CREATE_INDEX: &str =
    "create index if not exists idx_reading_record_channel_ts on reading_record (channel, ts_ms)";

pub struct SqliteReadingStore {
    pub pool: SqlitePool,
}

impl SqliteReadingStore {
    /// 使用已有连接池创建存储并确保表结构存在
    pub async fn new(pool: SqlitePool) -> Result<Self, StorageError> {
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Self::new(pool).await
    }

    async fn ensure_schema(&self) -> Result<(), StorageError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_INDEX).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ReadingStore for SqliteReadingStore {
    async fn append_records(&self, records: &[ReadingRecord]) -> Result<usize, StorageError> {
        if records.is_empty() {
            return Ok(0);
        }
        // 提交前任何错误都会丢弃事务并回滚
        let mut tx = self.pool.begin().await?;
        for record in records {
            ensure_record(record)?;
            sqlx::query(
                "insert into reading_record (ts_ms, channel, address, value) \
                 values (?1, ?2, ?3, ?4)",
            )
            .bind(record.ts_ms)
            .bind(&record.channel)
            .bind(&record.address)
            .bind(record.value)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(records.len())
    }

    async fn list_records(&self, query: ReadingQuery) -> Result<Vec<ReadingRecord>, StorageError> {
        let limit = if query.limit == 0 {
            -1
        } else {
            i64::try_from(query.limit).unwrap_or(i64::MAX)
        };
        let rows = sqlx::query(
            "select ts_ms, channel, address, value \
             from reading_record \
             where (?1 is null or channel = ?1) \
             and (?2 is null or ts_ms >= ?2) \
             and (?3 is null or ts_ms <= ?3) \
             order by ts_ms asc, id asc \
             limit ?4",
        )
        .bind(query.channel)
        .bind(query.from_ms)
        .bind(query.to_ms)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(ReadingRecord {
                ts_ms: row.try_get("ts_ms")?,
                channel: row.try_get("channel")?,
                address: row.try_get("address")?,
                value: row.try_get("value")?,
            });
        }
        Ok(items)
    }

    async fn count_records(&self) -> Result<u64, StorageError> {
        let row = sqlx::query("select count(*) as count from reading_record")
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.try_get("count")?;
        Ok(count.max(0) as u64)
    }
}
