use std::str::FromStr;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

/// String key-value store standing in for browser local storage.
#[derive(Debug, Clone)]
pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid database url {database_url}"))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open local store at {database_url}"))?;
        Ok(Self { pool })
    }

    pub async fn init_db(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM local_storage WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| row.get("value")))
    }

    pub async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM local_storage WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn keys(&self) -> anyhow::Result<Vec<String>> {
        let rows = sqlx::query("SELECT key FROM local_storage ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|row| row.get("key")).collect())
    }
}

#[cfg(test)]
pub(crate) async fn memory_store() -> LocalStore {
    let store = LocalStore::connect("sqlite::memory:")
        .await
        .expect("open in-memory store");
    store.init_db().await.expect("migrate in-memory store");
    store
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_overwrites_and_remove_reports() {
        let store = memory_store().await;
        assert_eq!(store.get("userType").await.expect("get"), None);

        store.set("userType", "student").await.expect("set");
        store.set("userType", "mentor").await.expect("overwrite");
        assert_eq!(store.get("userType").await.expect("get").as_deref(), Some("mentor"));

        assert!(store.remove("userType").await.expect("remove"));
        assert!(!store.remove("userType").await.expect("remove again"));
        assert!(store.keys().await.expect("keys").is_empty());
    }

    #[tokio::test]
    async fn keys_are_sorted() {
        let store = memory_store().await;
        store.set("studentId", "205631").await.expect("set");
        store.set("sessionId", "abc").await.expect("set");
        assert_eq!(store.keys().await.expect("keys"), vec!["sessionId", "studentId"]);
    }
}
