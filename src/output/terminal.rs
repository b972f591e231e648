// Colored terminal output — the call overlay frames, history listings, and
// verdict displays. All terminal-specific formatting lives here; main.rs and
// the call driver delegate to these functions.

use colored::Colorize;

use crate::ai::traits::MediaForensics;
use crate::call::{CallSession, CallState};
use crate::classifier::fallback::MessageVerdict;
use crate::classifier::RiskTier;
use crate::db::models::{CallRecord, MessageRecord, PhoneLookupResult, RiskStatus, UserProfile};
use crate::gate::{self, Feature};

fn format_duration(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// The ringing frame: tier banner, caller identity, community context.
pub fn display_incoming(session: &CallSession) {
    println!();
    match session.tier() {
        RiskTier::Dangerous => println!(
            "  {}",
            "⚠ CẢNH BÁO LỪA ĐẢO".white().on_red().bold()
        ),
        RiskTier::Suspicious => println!(
            "  {}",
            "⚠ SỐ LẠ - CẢNH GIÁC".black().on_yellow().bold()
        ),
        RiskTier::Safe => println!("  {}", "✓ NGƯỜI QUEN".white().on_green().bold()),
    }

    let display_name = session
        .contact_name()
        .unwrap_or_else(|| session.phone_number());
    println!("  {}", display_name.bold());
    if session.contact_name().is_some() {
        println!("  {}", session.phone_number().dimmed());
    }

    match session.community() {
        Some(info) => {
            println!("  {}", info.carrier.dimmed());
            if info.report_count > 0 {
                println!(
                    "  {}",
                    format!("{} lượt báo cáo xấu", info.report_count).red()
                );
            }
        }
        None => println!("  {}", "Đang kết nối...".dimmed()),
    }
    println!("  {}", "Đang đổ chuông...".dimmed());
}

/// One line per state change after the ringing frame.
pub fn display_transition(session: &CallSession) {
    match session.state() {
        CallState::Ringing => {}
        CallState::Connected => println!("  {}", "Đã kết nối — đang nghe máy.".green()),
        CallState::Ended => println!(
            "  {} ({})",
            "Cuộc gọi đã kết thúc.".bold(),
            format_duration(session.connected_secs())
        ),
        CallState::AutoEnded => println!(
            "  {}\n  {}",
            "🚫 AI ĐÃ CHẶN".white().on_red().bold(),
            "Hệ thống đã tự động ngắt kết nối.".red()
        ),
        CallState::Blocked => println!("  {}", "🚫 Đã chặn và từ chối cuộc gọi.".red().bold()),
    }
}

/// Call history, newest first.
pub fn display_call_history(records: &[CallRecord]) {
    if records.is_empty() {
        println!("Chưa có cuộc gọi nào trong lịch sử.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Lịch sử cuộc gọi ({} cuộc) ===", records.len()).bold()
    );
    println!();
    println!(
        "  {:<14} {:<22} {:<12} {:>8}  {}",
        "ID".dimmed(),
        "Số / Tên".dimmed(),
        "Nhãn".dimmed(),
        "Gọi".dimmed(),
        "Phân tích".dimmed(),
    );
    println!("  {}", "-".repeat(78).dimmed());

    for record in records.iter().rev() {
        let who = record
            .contact_name
            .clone()
            .unwrap_or_else(|| record.phone_number.clone());
        let status = record
            .risk_status
            .map_or_else(|| "-".normal(), |s| colorize_status(s));
        let analysis = record.ai_analysis.as_ref().map_or_else(
            || "-".to_string(),
            |a| format!("[{}] {}", a.risk_score, super::truncate_chars(&a.explanation, 40)),
        );
        println!(
            "  {:<14} {:<22} {:<12} {:>8}  {}",
            record.id,
            super::truncate_chars(&who, 20),
            status,
            format_duration(record.duration_secs),
            analysis.dimmed(),
        );
    }
}

/// A phone number's community reputation.
pub fn display_lookup(phone: &str, result: Option<&PhoneLookupResult>) {
    println!("\n{}", format!("=== Tra cứu {} ===", phone).bold());
    match result {
        Some(info) => {
            println!("  Nhà mạng: {}", info.carrier);
            println!("  Cộng đồng: {}", info.community_label);
            println!("  Lượt báo cáo: {}", info.report_count);
            let score = info.reputation_score;
            let colored_score = if score >= 70 {
                score.to_string().green()
            } else if score >= 40 {
                score.to_string().yellow()
            } else {
                score.to_string().red().bold()
            };
            println!("  Điểm tin cậy: {colored_score}/100");
        }
        None => println!("  Chưa có dữ liệu cộng đồng cho số này."),
    }
}

/// Message analysis verdict.
pub fn display_message_verdict(verdict: &MessageVerdict) {
    let label = match verdict.result {
        RiskStatus::Safe => "AN TOÀN".green().bold(),
        RiskStatus::Suspicious => "ĐÁNG NGỜ".yellow().bold(),
        RiskStatus::Scam => "LỪA ĐẢO".red().bold(),
    };
    println!("\n  Kết quả: {label}");
    println!("  {}", verdict.explanation);
}

/// Recent analyzed messages.
pub fn display_message_history(records: &[MessageRecord]) {
    if records.is_empty() {
        println!("Chưa phân tích tin nhắn nào.");
        return;
    }
    println!(
        "\n{}",
        format!("=== Tin nhắn đã phân tích ({}) ===", records.len()).bold()
    );
    for record in records.iter().rev() {
        println!(
            "  {} \"{}\"",
            colorize_status(record.result),
            super::truncate_chars(&record.content, 60).dimmed(),
        );
    }
}

/// Deepfake forensic verdict.
pub fn display_forensics(file_name: &str, result: &MediaForensics) {
    println!("\n{}", format!("=== Phân tích pháp y: {} ===", file_name).bold());
    if result.is_deepfake {
        println!(
            "  {} (độ tin cậy {}%)",
            "PHÁT HIỆN DEEPFAKE".red().bold(),
            result.confidence_score
        );
    } else {
        println!(
            "  {} (độ tin cậy giả mạo {}%)",
            "Không phát hiện giả mạo".green(),
            result.confidence_score
        );
    }
    println!("  {}", result.explanation);
    println!(
        "  Sinh trắc học: {}/100  |  Toàn vẹn hình ảnh/phổ âm: {}/100",
        result.details.biological_score, result.details.visual_integrity_score
    );
    if let Some(sync) = result.details.audio_sync_score {
        println!("  Đồng bộ âm thanh/môi trường: {sync}/100");
    }
    for artifact in &result.artifacts {
        println!("    - {}", artifact.dimmed());
    }
}

/// The upgrade prompt shown when a free-tier quota is exhausted.
pub fn display_upgrade_prompt(feature: Feature) {
    println!(
        "\n  {}",
        format!(
            "Bạn đã dùng hết lượt {} miễn phí hôm nay.",
            feature.label()
        )
        .yellow()
        .bold()
    );
    println!("  Nâng cấp gói Premium để không giới hạn: truthshield upgrade monthly");
}

/// Profile summary for `status`.
pub fn display_profile(profile: &UserProfile) {
    println!("  Tài khoản: {} ({})", profile.name, profile.phone);
    println!("  Gói: {}", profile.plan.as_str());
    println!(
        "  Tự động ngắt cuộc gọi nguy hiểm: {}",
        if profile.auto_hangup_high_risk {
            "bật".green()
        } else {
            "tắt".dimmed()
        }
    );
    println!("  Ngưỡng rủi ro: {}", profile.risk_threshold);
    println!("  Số đã chặn: {}", profile.blocked_numbers.len());
    println!("  Danh bạ: {} liên hệ", profile.contacts.len());

    println!("  Lượt dùng hôm nay:");
    for feature in [
        Feature::MessageScan,
        Feature::DeepfakeScan,
        Feature::CallLookup,
    ] {
        let used = match gate::remaining(profile, feature) {
            Some(left) => format!("còn {left}/{}", feature.quota()),
            None => "không giới hạn".to_string(),
        };
        println!("    {}: {}", feature.label(), used);
    }
}

fn colorize_status(status: RiskStatus) -> colored::ColoredString {
    match status {
        RiskStatus::Safe => "an toàn".green(),
        RiskStatus::Suspicious => "đáng ngờ".yellow(),
        RiskStatus::Scam => "lừa đảo".red().bold(),
    }
}
