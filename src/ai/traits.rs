// Scam analyzer trait — the swap-ready abstraction over the generative-AI
// collaborator.
//
// The default implementation calls the Gemini API. When no key is configured
// the NoopAnalyzer is used instead: it always errors, which routes every
// request through the offline fallback rules.

use anyhow::Result;
use async_trait::async_trait;

use crate::classifier::fallback::MessageVerdict;
use crate::db::models::{CallAnalysis, CallRecord};

/// A media file handed to forensic analysis.
#[derive(Debug, Clone)]
pub struct MediaSample {
    pub file_name: String,
    pub kind: MediaKind,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
    Video,
}

impl MediaKind {
    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaKind::Image => "image/jpeg",
            MediaKind::Audio => "audio/mpeg",
            MediaKind::Video => "video/mp4",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }
}

/// Per-signal sub-scores from forensic media analysis (0–100 each).
#[derive(Debug, Clone, Default)]
pub struct ForensicDetails {
    /// Visual: blood-flow signal. Audio: breathing consistency.
    pub biological_score: u8,
    /// Visual: CNN artifacts. Audio: spectral/mic EQ variance.
    pub visual_integrity_score: u8,
    /// Visual: lip sync. Audio: ambient noise floor. None for images.
    pub audio_sync_score: Option<u8>,
}

/// Verdict from forensic media analysis.
#[derive(Debug, Clone)]
pub struct MediaForensics {
    pub is_deepfake: bool,
    /// 0–100, 100 = definitely fake
    pub confidence_score: u8,
    pub explanation: String,
    pub details: ForensicDetails,
    pub artifacts: Vec<String>,
}

/// Trait for AI-backed scam analysis. Implementations are async because the
/// provider is an HTTP API; callers must wrap every call in a timeout and
/// fall back on error (see ai::analyze_*).
#[async_trait]
pub trait ScamAnalyzer: Send + Sync {
    /// Classify a message as safe / suspicious / scam.
    async fn classify_message(&self, text: &str) -> Result<MessageVerdict>;

    /// Score a finished call 0–100.
    async fn classify_call(&self, call: &CallRecord) -> Result<CallAnalysis>;

    /// Forensic deepfake analysis of a media file.
    async fn classify_media(&self, media: &MediaSample) -> Result<MediaForensics>;
}

/// Analyzer used when no API key is configured. Always errors so the guarded
/// wrappers drop to the offline fallback — never silently fabricates an AI
/// verdict.
pub struct NoopAnalyzer;

#[async_trait]
impl ScamAnalyzer for NoopAnalyzer {
    async fn classify_message(&self, _text: &str) -> Result<MessageVerdict> {
        anyhow::bail!("no analyzer configured")
    }

    async fn classify_call(&self, _call: &CallRecord) -> Result<CallAnalysis> {
        anyhow::bail!("no analyzer configured")
    }

    async fn classify_media(&self, _media: &MediaSample) -> Result<MediaForensics> {
        anyhow::bail!("no analyzer configured")
    }
}
