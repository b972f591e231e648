use std::env;

use anyhow::Result;

/// Which analyzer backend to use.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzerBackend {
    /// Gemini API (default) — requires GEMINI_API_KEY
    Gemini,
    /// No AI — every request goes through the offline fallback rules
    Offline,
}

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy.
pub struct Config {
    pub gemini_api_key: String,
    /// Gemini API base URL (defaults to the public endpoint).
    pub gemini_api_url: String,
    /// Model name used for every analysis request.
    pub gemini_model: String,
    pub db_path: String,
    /// Which analyzer to use (default: Gemini when a key is set).
    pub analyzer_backend: AnalyzerBackend,
}

pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Only db_path has an unconditional default — without an API key the
    /// analyzer drops to offline mode rather than failing.
    pub fn load() -> Result<Self> {
        let gemini_api_key = env::var("GEMINI_API_KEY").unwrap_or_default();

        let analyzer_backend = match env::var("TRUTHSHIELD_ANALYZER").as_deref() {
            Ok("offline") => AnalyzerBackend::Offline,
            // "gemini" or unset: use Gemini if a key is available
            _ if gemini_api_key.is_empty() => AnalyzerBackend::Offline,
            _ => AnalyzerBackend::Gemini,
        };

        Ok(Self {
            gemini_api_key,
            gemini_api_url: env::var("GEMINI_API_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_API_URL.to_string()),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            db_path: env::var("TRUTHSHIELD_DB_PATH")
                .unwrap_or_else(|_| "./truthshield.db".to_string()),
            analyzer_backend,
        })
    }

    /// Check that the Gemini key is configured.
    /// Call this before any operation that insists on the AI path.
    pub fn require_gemini(&self) -> Result<()> {
        if self.gemini_api_key.is_empty() {
            anyhow::bail!(
                "GEMINI_API_KEY not set. Add it to your .env file,\n\
                 or set TRUTHSHIELD_ANALYZER=offline to use local rules only."
            );
        }
        Ok(())
    }
}
