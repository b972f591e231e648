// System status display — DB stats, login state, usage counters.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;

use crate::account::Account;
use crate::db::ProfileStore;
use crate::output::terminal;

/// Display system status to the terminal.
pub async fn show(store: &Arc<dyn ProfileStore>, db_path: &str, today: NaiveDate) -> Result<()> {
    if !Path::new(db_path).exists() {
        println!("Database: not initialized");
        println!("\nRun `truthshield init` to set up the database.");
        return Ok(());
    }

    let file_size = std::fs::metadata(db_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", db_path, file_size);

    match Account::resume(store.clone(), today).await? {
        Some(account) => {
            terminal::display_profile(&account.profile);
            println!(
                "  Lịch sử: {} cuộc gọi, {} tin nhắn, {} lượt quét deepfake",
                account.profile.call_history.len(),
                account.profile.message_history.len(),
                account.profile.deepfake_history.len(),
            );
        }
        None => {
            println!("Chưa đăng nhập.");
            println!("  Run `truthshield login <phone>` first.");
        }
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
