// Gemini API implementation of the scam analyzer.
//
// All three operations go through generateContent. Message and call verdicts
// come back as pipe-delimited text ("CLASSIFICATION | explanation"); media
// forensics requests strict JSON and substitutes defaults field-by-field
// when the model returns partial data.
//
// API docs: https://ai.google.dev/api/generate-content

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{
    ForensicDetails, MediaForensics, MediaKind, MediaSample, ScamAnalyzer,
};
use crate::classifier::fallback::MessageVerdict;
use crate::db::models::{CallAnalysis, CallRecord, RiskStatus};

/// Gemini-backed analyzer.
pub struct GeminiAnalyzer {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiAnalyzer {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
            model,
        }
    }

    async fn generate(&self, request: &GenerateContentRequest) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .context("Failed to call Gemini API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API returned {}: {}", status, body);
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse Gemini API response")?;

        let text = result
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .and_then(|p| p.text)
            .unwrap_or_default();

        debug!(
            preview = crate::output::truncate_chars(&text, 80),
            "Gemini response"
        );
        Ok(text)
    }
}

const MESSAGE_PROMPT: &str = "\
System: You are a cybersecurity expert analyzing Vietnamese text messages for scams.
Task: Analyze the content inside <user_content> tags. Keep explanation under 20 words, in Vietnamese, for an elderly reader.
Classify as: SCAM, SUSPICIOUS, or SAFE.
Output Format: \"CLASSIFICATION | Short explanation\"";

const CALL_PROMPT: &str = "\
System: You are a cybersecurity expert assessing a finished phone call for scam risk.
Task: Given the call facts below, rate the scam risk 0-100 and explain in one short Vietnamese sentence.
Output Format: \"SCORE | explanation\"";

#[async_trait]
impl ScamAnalyzer for GeminiAnalyzer {
    async fn classify_message(&self, text: &str) -> Result<MessageVerdict> {
        let prompt = format!("{MESSAGE_PROMPT}\n\n<user_content>\n{text}\n</user_content>");
        let request = GenerateContentRequest::text(&prompt);
        let reply = self.generate(&request).await?;

        let (classification, explanation) = split_verdict(&reply);
        let result = if classification.contains("SCAM") {
            RiskStatus::Scam
        } else if classification.contains("SUSPICIOUS") {
            RiskStatus::Suspicious
        } else {
            RiskStatus::Safe
        };

        Ok(MessageVerdict {
            result,
            explanation: if explanation.is_empty() {
                "Cần cảnh giác.".to_string()
            } else {
                explanation.to_string()
            },
        })
    }

    async fn classify_call(&self, call: &CallRecord) -> Result<CallAnalysis> {
        let facts = format!(
            "Caller: {}\nKnown contact: {}\nDuration: {} seconds\nCommunity label: {}",
            call.phone_number,
            call.contact_name.as_deref().unwrap_or("no"),
            call.duration_secs,
            call.community
                .as_ref()
                .map_or("none", |c| c.community_label.as_str()),
        );
        let prompt = format!("{CALL_PROMPT}\n\n{facts}");
        let request = GenerateContentRequest::text(&prompt);
        let reply = self.generate(&request).await?;

        let (score_text, explanation) = split_verdict(&reply);
        let risk_score: u8 = score_text
            .trim()
            .parse::<u16>()
            .map(|s| s.min(100) as u8)
            .context("Gemini call score was not a number")?;

        Ok(CallAnalysis {
            risk_score,
            explanation: if explanation.is_empty() {
                "Cần cảnh giác.".to_string()
            } else {
                explanation.to_string()
            },
            timestamp_ms: call.timestamp_ms,
        })
    }

    async fn classify_media(&self, media: &MediaSample) -> Result<MediaForensics> {
        let system_instruction = match media.kind {
            MediaKind::Audio => AUDIO_FORENSIC_INSTRUCTION,
            _ => VISUAL_FORENSIC_INSTRUCTION,
        };
        let prompt = match media.kind {
            MediaKind::Image => "Analyze this IMAGE.",
            MediaKind::Audio => "Analyze this AUDIO file for generative-AI signatures.",
            MediaKind::Video => "Analyze this VIDEO frame-by-frame.",
        };

        let encoded = base64::engine::general_purpose::STANDARD.encode(&media.bytes);
        let request = GenerateContentRequest::media(
            system_instruction,
            prompt,
            media.kind.mime_type(),
            encoded,
        );
        let reply = self.generate(&request).await?;
        let parsed: serde_json::Value =
            serde_json::from_str(&reply).context("Gemini forensic reply was not valid JSON")?;

        // Partial responses get neutral-leaning defaults per field
        Ok(MediaForensics {
            is_deepfake: parsed["isDeepfake"].as_bool().unwrap_or(false),
            confidence_score: parsed["confidenceScore"].as_u64().unwrap_or(0).min(100) as u8,
            explanation: parsed["explanation"]
                .as_str()
                .unwrap_or("Không tìm thấy dấu hiệu rõ ràng.")
                .to_string(),
            details: ForensicDetails {
                biological_score: parsed["details"]["biologicalScore"]
                    .as_u64()
                    .unwrap_or(80)
                    .min(100) as u8,
                visual_integrity_score: parsed["details"]["visualIntegrityScore"]
                    .as_u64()
                    .unwrap_or(80)
                    .min(100) as u8,
                audio_sync_score: parsed["details"]["audioSyncScore"]
                    .as_u64()
                    .map(|s| s.min(100) as u8),
            },
            artifacts: parsed["artifacts"]
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|a| a.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

/// Split a "HEAD | tail" reply. Missing pipe leaves the tail empty.
fn split_verdict(reply: &str) -> (&str, &str) {
    match reply.split_once('|') {
        Some((head, tail)) => (head.trim(), tail.trim()),
        None => (reply.trim(), ""),
    }
}

const VISUAL_FORENSIC_INSTRUCTION: &str = "\
You are a digital forensics expert specializing in deepfake detection. Perform a multi-stage analysis:
1. Biological signal analysis (PPG): scan facial skin for blood-flow color shifts. Score biologicalScore 0 (artificial) to 100 (natural).
2. Visual integrity (forensic CNN): detect waxy skin, blending boundaries, lighting inconsistencies. Score visualIntegrityScore 0 (many artifacts) to 100 (clean).
3. Audio-visual sync (phoneme-viseme): for video, check lip/phoneme alignment. Score audioSyncScore 0-100, null for images.
Return strictly valid JSON, explanation in Vietnamese:
{\"isDeepfake\": bool, \"confidenceScore\": 0-100, \"explanation\": \"...\", \"details\": {\"biologicalScore\": n, \"visualIntegrityScore\": n, \"audioSyncScore\": n or null}, \"artifacts\": [\"...\"]}";

const AUDIO_FORENSIC_INSTRUCTION: &str = "\
You are a psychoacoustics engineer specializing in detecting neural audio codecs. Perform a multi-stage analysis:
1. Generative prosody patterns: perfect turn-taking, predictive back-channeling. Real speech overlaps and hesitates.
2. Acoustic environment: digital-absolute silence vs chaotic room tone. Score audioSyncScore 0 (synthetic void) to 100 (natural ambience).
3. Breathing consistency: breath placement matching lung capacity. Score biologicalScore 0 (algorithmic) to 100 (biological).
4. Microphone/EQ consistency across speakers. Score visualIntegrityScore 0 (perfectly synthetic match) to 100 (natural variance).
Return strictly valid JSON, explanation in Vietnamese:
{\"isDeepfake\": bool, \"confidenceScore\": 0-100, \"explanation\": \"...\", \"details\": {\"biologicalScore\": n, \"visualIntegrityScore\": n, \"audioSyncScore\": n}, \"artifacts\": [\"...\"]}";

// --- Gemini request/response types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<RequestContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    fn text(prompt: &str) -> Self {
        Self {
            contents: vec![RequestContent {
                role: Some("user".to_string()),
                parts: vec![RequestPart {
                    text: Some(prompt.to_string()),
                    inline_data: None,
                }],
            }],
            system_instruction: None,
            generation_config: None,
        }
    }

    fn media(instruction: &str, prompt: &str, mime_type: &str, data: String) -> Self {
        Self {
            contents: vec![RequestContent {
                role: Some("user".to_string()),
                parts: vec![
                    RequestPart {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: mime_type.to_string(),
                            data,
                        }),
                    },
                    RequestPart {
                        text: Some(prompt.to_string()),
                        inline_data: None,
                    },
                ],
            }],
            system_instruction: Some(RequestContent {
                role: None,
                parts: vec![RequestPart {
                    text: Some(instruction.to_string()),
                    inline_data: None,
                }],
            }),
            // Low temperature for analytical precision; force JSON output
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                temperature: 0.2,
            }),
        }
    }
}

#[derive(Serialize)]
struct RequestContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    temperature: f64,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}
