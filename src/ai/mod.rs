// AI analysis entry points — timeout-guarded wrappers over the analyzer.
//
// The analyzer is an external collaborator and is never trusted to answer:
// every call races a hard timeout, and any error, timeout, or parse failure
// drops to the deterministic offline rules. These wrappers are therefore
// infallible — the UI layer never sees an AI error.

pub mod gemini;
pub mod traits;

use std::sync::OnceLock;

use regex_lite::Regex;
use tokio::time::Duration;
use tracing::warn;

use crate::classifier::fallback::{self, MessageVerdict};
use crate::db::models::{CallAnalysis, CallRecord};
use traits::{ForensicDetails, MediaForensics, MediaSample, ScamAnalyzer};

/// Hard budget for message classification.
pub const MESSAGE_TIMEOUT: Duration = Duration::from_secs(8);
/// Hard budget for call scoring.
pub const CALL_TIMEOUT: Duration = Duration::from_secs(8);
/// Hard budget for forensic media analysis.
pub const MEDIA_TIMEOUT: Duration = Duration::from_secs(60);

/// Strip HTML tags before the text reaches a prompt.
pub fn sanitize_input(input: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let tag = TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid pattern"));
    tag.replace_all(input, "").into_owned()
}

/// Classify a message, falling back to keyword rules on any failure.
pub async fn analyze_message(analyzer: &dyn ScamAnalyzer, text: &str) -> MessageVerdict {
    let clean = sanitize_input(text);
    match tokio::time::timeout(MESSAGE_TIMEOUT, analyzer.classify_message(&clean)).await {
        Ok(Ok(verdict)) => verdict,
        Ok(Err(e)) => {
            warn!(error = %e, "message analysis failed, using offline rules");
            fallback::classify_message(&clean)
        }
        Err(_) => {
            warn!("message analysis timed out, using offline rules");
            fallback::classify_message(&clean)
        }
    }
}

/// Score a finished call, falling back to duration heuristics on any failure.
pub async fn analyze_call(analyzer: &dyn ScamAnalyzer, call: &CallRecord) -> CallAnalysis {
    match tokio::time::timeout(CALL_TIMEOUT, analyzer.classify_call(call)).await {
        Ok(Ok(analysis)) => analysis,
        Ok(Err(e)) => {
            warn!(error = %e, "call analysis failed, using offline rules");
            fallback::classify_call(call.contact_name.as_deref(), call.duration_secs, call.timestamp_ms)
        }
        Err(_) => {
            warn!("call analysis timed out, using offline rules");
            fallback::classify_call(call.contact_name.as_deref(), call.duration_secs, call.timestamp_ms)
        }
    }
}

/// Forensic media analysis. There is no local forensic capability, so the
/// fallback is an explicit "cannot analyze" verdict with neutral sub-scores
/// rather than a guess.
pub async fn analyze_media(analyzer: &dyn ScamAnalyzer, media: &MediaSample) -> MediaForensics {
    match tokio::time::timeout(MEDIA_TIMEOUT, analyzer.classify_media(media)).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            warn!(error = %e, "media analysis failed");
            unavailable_forensics()
        }
        Err(_) => {
            warn!("media analysis timed out");
            unavailable_forensics()
        }
    }
}

fn unavailable_forensics() -> MediaForensics {
    MediaForensics {
        is_deepfake: false,
        confidence_score: 0,
        explanation:
            "Không thể thực hiện phân tích pháp y do lỗi kết nối hoặc định dạng file không hỗ trợ."
                .to_string(),
        details: ForensicDetails {
            biological_score: 50,
            visual_integrity_score: 50,
            audio_sync_score: None,
        },
        artifacts: vec!["Lỗi kết nối máy chủ AI".to_string()],
    }
}
