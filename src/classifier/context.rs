// Weighted keyword scoring for live-call utterances.
//
// Each transcribed sentence contributes a score delta; the caller accumulates
// deltas into a running risk figure for the conversation. Risk words add,
// delivery/shopping words subtract, and a saved contact damps the whole
// signal to 20%.

/// Risk keywords with their weights.
const RISK_WORDS: &[(&str, i32)] = &[
    ("công an", 20),
    ("điều tra", 20),
    ("tài khoản", 15),
    ("chuyển tiền", 25),
    ("chuyển khoản", 25),
    ("rửa tiền", 30),
    ("bí mật", 15),
    ("tạm giữ", 20),
    ("nâng cấp sim", 25),
    ("khóa", 10),
    ("mã otp", 30),
    ("mật khẩu", 30),
];

/// Benign keywords that reduce the score (delivery, shopping).
const SAFE_WORDS: &[(&str, i32)] = &[
    ("shipper", -10),
    ("giao hàng", -10),
    ("đơn hàng", -5),
    ("shopee", -5),
    ("lazada", -5),
    ("tiki", -5),
    ("lấy hàng", -5),
];

/// Minimum delta a single utterance can contribute.
const UTTERANCE_FLOOR: i32 = -10;

/// The contribution of one utterance to the conversation risk score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtteranceScore {
    pub score_delta: i32,
    pub keywords_found: Vec<String>,
}

/// Score a single utterance. `is_known_contact` damps the signal to 20%,
/// since the same words from a family member rarely mean a scam script.
pub fn score_utterance(text: &str, is_known_contact: bool) -> UtteranceScore {
    let lowered = text.to_lowercase();
    let mut score = 0;
    let mut found = Vec::new();

    for (word, weight) in RISK_WORDS {
        if lowered.contains(word) {
            score += weight;
            found.push((*word).to_string());
        }
    }
    for (word, weight) in SAFE_WORDS {
        if lowered.contains(word) {
            score += weight;
        }
    }

    if is_known_contact {
        score = (score as f64 * 0.2).floor() as i32;
    }

    UtteranceScore {
        score_delta: score.max(UTTERANCE_FLOOR),
        keywords_found: found,
    }
}
