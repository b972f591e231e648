// Offline fallback classification — deterministic rules used whenever the
// AI collaborator is unreachable, times out, or isn't configured.
//
// The message rules are deliberately coarser than the AI path: they can say
// "suspicious" but never "scam", because a keyword hit can't assess nuance.
// Both entry points are pure and infallible so callers can invoke them
// unconditionally from any error path.

use crate::db::models::{CallAnalysis, RiskStatus};

/// Verdict for an analyzed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageVerdict {
    pub result: RiskStatus,
    pub explanation: String,
}

/// Ordered keyword rules: first match wins. Keywords are matched against the
/// lowercased input.
const MESSAGE_KEYWORD_RULES: &[(&str, &str)] = &[
    (
        "công an",
        "Tin nhắn nhắc đến cơ quan công an — thủ đoạn giả danh điều tra rất phổ biến.",
    ),
    (
        "điều tra",
        "Đề cập đến việc điều tra — cảnh giác với chiêu giả danh cơ quan chức năng.",
    ),
    (
        "chuyển tiền",
        "Yêu cầu chuyển tiền gấp là dấu hiệu lừa đảo thường gặp.",
    ),
    (
        "chuyển khoản",
        "Yêu cầu chuyển khoản gấp là dấu hiệu lừa đảo thường gặp.",
    ),
    (
        "mật khẩu",
        "Không tổ chức nào được phép hỏi mật khẩu của bạn — tuyệt đối không cung cấp.",
    ),
    (
        "otp",
        "Mã OTP là bí mật — ngân hàng không bao giờ yêu cầu mã này qua tin nhắn.",
    ),
    (
        "trúng thưởng",
        "Thông báo trúng thưởng bất ngờ thường là mồi nhử lừa đảo.",
    ),
    (
        "việc nhẹ lương cao",
        "Mời chào thu nhập cao bất thường là dấu hiệu tuyển dụng lừa đảo.",
    ),
    (
        "nâng cấp sim",
        "Yêu cầu nâng cấp SIM qua tin nhắn là chiêu chiếm đoạt số điện thoại.",
    ),
    (
        "khóa tài khoản",
        "Dọa khóa tài khoản để thúc ép hành động ngay là thủ đoạn gây hoảng loạn.",
    ),
    (
        "cấp cứu",
        "Báo tin người thân cấp cứu để thúc ép chuyển tiền là kịch bản lừa đảo quen thuộc.",
    ),
];

const NO_KEYWORD_EXPLANATION: &str = "Không phát hiện từ khóa nguy hiểm (Chế độ Offline).";

/// Classify a message with keyword rules only.
///
/// Returns `suspicious` with the first matching rule's explanation, or
/// `safe` with a generic offline notice. Never returns `scam`.
pub fn classify_message(text: &str) -> MessageVerdict {
    let lowered = text.to_lowercase();
    for (keyword, explanation) in MESSAGE_KEYWORD_RULES {
        if lowered.contains(keyword) {
            return MessageVerdict {
                result: RiskStatus::Suspicious,
                explanation: format!("Hệ thống ngoại tuyến: phát hiện \"{keyword}\". {explanation}"),
            };
        }
    }
    MessageVerdict {
        result: RiskStatus::Safe,
        explanation: NO_KEYWORD_EXPLANATION.to_string(),
    }
}

/// Duration below which an unknown call is scored as a ping/flash call.
const FLASH_CALL_SECS: u32 = 10;
/// Duration at or above which an unknown call is scored as a staged scam.
const STAGED_CALL_SECS: u32 = 300;

/// Score a finished call with contact-presence and duration heuristics.
///
/// Runs after the call has a terminal duration, unlike the ringing-time tier
/// classifier. The score lands in the record's `ai_analysis` for display.
pub fn classify_call(
    contact_name: Option<&str>,
    duration_secs: u32,
    timestamp_ms: i64,
) -> CallAnalysis {
    let (risk_score, explanation) = if contact_name.is_some_and(|name| !name.is_empty()) {
        (5, "Người quen trong danh bạ.")
    } else if duration_secs < FLASH_CALL_SECS {
        (75, "Số lạ, gọi quá ngắn (Nháy máy).")
    } else if duration_secs >= STAGED_CALL_SECS {
        (65, "Số lạ, gọi rất lâu. Cần cảnh giác lừa đảo dàn dựng.")
    } else {
        (40, "Số lạ, cần xác minh.")
    };

    CallAnalysis {
        risk_score,
        explanation: explanation.to_string(),
        timestamp_ms,
    }
}
