// Database queries — CRUD for profiles and session state.
//
// Every database interaction goes through this module. This keeps SQL
// contained in one place and gives the rest of the app clean Rust interfaces.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::UserProfile;

// --- Session state ---

pub fn get_session_state(conn: &Connection, key: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT value FROM session_state WHERE key = ?1")?;
    let result = stmt.query_row(params![key], |row| row.get(0)).optional()?;
    Ok(result)
}

pub fn set_session_state(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO session_state (key, value, updated_at)
         VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
        params![key, value],
    )?;
    Ok(())
}

pub fn clear_session_state(conn: &Connection, key: &str) -> Result<()> {
    conn.execute("DELETE FROM session_state WHERE key = ?1", params![key])?;
    Ok(())
}

// --- Profiles ---

/// Load and deserialize a profile by session token.
pub fn load_profile(conn: &Connection, token: &str) -> Result<Option<UserProfile>> {
    let mut stmt = conn.prepare("SELECT data FROM profiles WHERE token = ?1")?;
    let json: Option<String> = stmt.query_row(params![token], |row| row.get(0)).optional()?;
    match json {
        Some(json) => {
            let profile =
                serde_json::from_str(&json).context("Stored profile is not valid JSON")?;
            Ok(Some(profile))
        }
        None => Ok(None),
    }
}

/// Persist the whole aggregate (upsert, last writer wins).
pub fn save_profile(conn: &Connection, token: &str, profile: &UserProfile) -> Result<()> {
    let json = serde_json::to_string(profile)?;
    conn.execute(
        "INSERT INTO profiles (token, data, updated_at)
         VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(token) DO UPDATE SET data = ?2, updated_at = datetime('now')",
        params![token, json],
    )?;
    Ok(())
}

pub fn delete_profile(conn: &Connection, token: &str) -> Result<()> {
    conn.execute("DELETE FROM profiles WHERE token = ?1", params![token])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::create_tables;
    use chrono::NaiveDate;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    #[test]
    fn session_state_round_trip() {
        let conn = test_conn();
        assert_eq!(get_session_state(&conn, "token").unwrap(), None);
        set_session_state(&conn, "token", "tok-0901234567").unwrap();
        assert_eq!(
            get_session_state(&conn, "token").unwrap(),
            Some("tok-0901234567".to_string())
        );
        clear_session_state(&conn, "token").unwrap();
        assert_eq!(get_session_state(&conn, "token").unwrap(), None);
    }

    #[test]
    fn profile_round_trip() {
        let conn = test_conn();
        let today = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let profile = UserProfile::new("0901234567", today);

        assert!(load_profile(&conn, "tok").unwrap().is_none());
        save_profile(&conn, "tok", &profile).unwrap();
        let loaded = load_profile(&conn, "tok").unwrap().unwrap();
        assert_eq!(loaded.phone, "0901234567");
    }

    #[test]
    fn save_profile_overwrites() {
        let conn = test_conn();
        let today = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let mut profile = UserProfile::new("0901234567", today);
        save_profile(&conn, "tok", &profile).unwrap();

        profile.usage.message_scans = 2;
        save_profile(&conn, "tok", &profile).unwrap();
        let loaded = load_profile(&conn, "tok").unwrap().unwrap();
        assert_eq!(loaded.usage.message_scans, 2);
    }

    #[test]
    fn delete_profile_removes_row() {
        let conn = test_conn();
        let today = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        save_profile(&conn, "tok", &UserProfile::new("0901234567", today)).unwrap();
        delete_profile(&conn, "tok").unwrap();
        assert!(load_profile(&conn, "tok").unwrap().is_none());
    }
}
