// SqliteStore — rusqlite backend implementing the ProfileStore trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Send.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.
// The lock is never held across .await points — Rust enforces this because
// MutexGuard is !Send.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::{watch, Mutex};

use super::models::UserProfile;
use super::traits::ProfileStore;

pub struct SqliteStore {
    conn: Mutex<Connection>,
    revision: watch::Sender<u64>,
}

impl SqliteStore {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            conn: Mutex::new(conn),
            revision,
        }
    }
}

#[async_trait]
impl ProfileStore for SqliteStore {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn get_session_state(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().await;
        super::queries::get_session_state(&conn, key)
    }

    async fn set_session_state(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::set_session_state(&conn, key, value)
    }

    async fn clear_session_state(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::clear_session_state(&conn, key)
    }

    async fn load_profile(&self, token: &str) -> Result<Option<UserProfile>> {
        let conn = self.conn.lock().await;
        super::queries::load_profile(&conn, token)
    }

    async fn save_profile(&self, token: &str, profile: &UserProfile) -> Result<()> {
        {
            let conn = self.conn.lock().await;
            super::queries::save_profile(&conn, token, profile)?;
        }
        // Notify other open instances after the write lands
        self.revision.send_modify(|rev| *rev += 1);
        Ok(())
    }

    async fn delete_profile(&self, token: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::delete_profile(&conn, token)
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}
