// Profile store trait — the persistence collaborator.
//
// The store holds one JSON-serializable user aggregate per opaque session
// token, plus a small session key/value table. All methods are async so a
// sync backend (rusqlite via Mutex) and any future async backend fit behind
// a single interface.
//
// `subscribe` is the cross-instance change notification: the revision
// counter bumps on every save, so other open instances can reload.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::watch;

use super::models::UserProfile;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    // --- Session state ---

    async fn get_session_state(&self, key: &str) -> Result<Option<String>>;
    async fn set_session_state(&self, key: &str, value: &str) -> Result<()>;
    async fn clear_session_state(&self, key: &str) -> Result<()>;

    // --- Profile aggregate ---

    async fn load_profile(&self, token: &str) -> Result<Option<UserProfile>>;

    /// Persist the whole aggregate and bump the change revision.
    async fn save_profile(&self, token: &str, profile: &UserProfile) -> Result<()>;

    async fn delete_profile(&self, token: &str) -> Result<()>;

    /// Watch channel carrying a revision counter; receivers see a new value
    /// after every `save_profile`.
    fn subscribe(&self) -> watch::Receiver<u64>;
}
