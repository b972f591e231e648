// Scam case library — curated real-world scam patterns with searchable
// keywords. Static data; the CLI lists and searches it.

use colored::Colorize;

/// Broad category of a scam case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScamKind {
    Deepfake,
    Impersonation,
    Investment,
    Romance,
    Malware,
}

impl ScamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScamKind::Deepfake => "Deepfake",
            ScamKind::Impersonation => "Giả danh",
            ScamKind::Investment => "Đầu tư",
            ScamKind::Romance => "Tình cảm",
            ScamKind::Malware => "Mã độc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "Cao",
            Severity::Medium => "Trung bình",
            Severity::Low => "Thấp",
        }
    }
}

pub struct ScamCase {
    pub id: u32,
    pub kind: ScamKind,
    pub title: &'static str,
    pub real_case: Option<&'static str>,
    pub damage: Option<&'static str>,
    pub severity: Severity,
    pub description: &'static str,
    pub keywords: &'static [&'static str],
}

pub const CASES: &[ScamCase] = &[
    ScamCase {
        id: 1,
        kind: ScamKind::Deepfake,
        title: "Video Call giả mạo người thân (Deepfake)",
        real_case: Some("Vụ án 2 tỷ đồng tại TP.HCM (3/2024)"),
        damage: Some("2.5 tỷ VNĐ"),
        severity: Severity::High,
        description: "Kẻ gian dùng AI để tái tạo khuôn mặt và giọng nói của người thân. Cuộc gọi thường rất ngắn, chất lượng kém, viện cớ 'mạng yếu' để tránh bị lộ, sau đó nhắn tin yêu cầu chuyển tiền gấp.",
        keywords: &["cấp cứu", "chuyển gấp", "mạng yếu", "không nghe rõ"],
    },
    ScamCase {
        id: 2,
        kind: ScamKind::Impersonation,
        title: "Mạo danh Công an/VKS điều tra án",
        real_case: Some("Bà P. tại Hà Nội mất 850tr"),
        damage: Some("850 triệu VNĐ"),
        severity: Severity::High,
        description: "Gọi điện thông báo nạn nhân dính líu đến đường dây rửa tiền/ma túy. Yêu cầu chuyển toàn bộ tiền vào 'tài khoản tạm giữ' của Bộ Công an để thẩm tra và chứng minh trong sạch.",
        keywords: &["lệnh bắt", "tài khoản tạm giữ", "bảo mật", "tuyệt mật"],
    },
    ScamCase {
        id: 3,
        kind: ScamKind::Malware,
        title: "Dịch vụ công giả mạo (VNeID/Thuế)",
        real_case: Some("Cảnh báo từ Bộ Công An (2024)"),
        damage: Some("Mất quyền kiểm soát điện thoại"),
        severity: Severity::High,
        description: "Kẻ gian dụ cài đặt ứng dụng VNeID hoặc Tổng cục Thuế giả mạo qua đường link lạ (.apk). Ứng dụng chứa mã độc chiếm quyền điều khiển điện thoại, đọc OTP và lấy trộm tiền.",
        keywords: &["định danh mức 2", "quyết toán thuế", "file apk", "nâng cấp"],
    },
    ScamCase {
        id: 4,
        kind: ScamKind::Investment,
        title: "Sàn chứng khoán/Tiền ảo lừa đảo",
        real_case: Some("Sập sàn Forex trái phép"),
        damage: Some("Hàng chục tỷ đồng"),
        severity: Severity::High,
        description: "Mời vào nhóm kín, chuyên gia đọc lệnh 'bao lỗ', 'lợi nhuận x10'. Cho rút tiền lãi nhỏ ban đầu để tạo niềm tin, sau đó yêu cầu nạp lớn và khóa tài khoản.",
        keywords: &["lợi nhuận x10", "chuyên gia", "đọc lệnh", "không rút được"],
    },
    ScamCase {
        id: 5,
        kind: ScamKind::Romance,
        title: "Bẫy tình cảm (Romance Scam)",
        real_case: Some("Quý bà bị 'trai Tây' lừa"),
        damage: Some("300 triệu VNĐ"),
        severity: Severity::Medium,
        description: "Kết bạn qua mạng, tự xưng là quân nhân/doanh nhân nước ngoài. Gửi quà đắt tiền về Việt Nam nhưng bị 'Hải quan' giữ lại, yêu cầu nạn nhân đóng phí phạt/thuế để nhận quà.",
        keywords: &["hải quan", "gửi quà", "đóng thuế", "người yêu nước ngoài"],
    },
    ScamCase {
        id: 6,
        kind: ScamKind::Impersonation,
        title: "Khóa SIM sau 2 tiếng",
        real_case: Some("Chiêu trò chuẩn hóa thông tin"),
        damage: Some("Mất SIM, mất OTP"),
        severity: Severity::Medium,
        description: "Tự xưng nhân viên nhà mạng, dọa khóa SIM nếu không chuẩn hóa thông tin ngay. Yêu cầu nhắn tin theo cú pháp lạ (thực chất là cú pháp chuyển hướng cuộc gọi hoặc đổi SIM).",
        keywords: &["khóa sim", "chuẩn hóa", "sau 2 giờ"],
    },
    ScamCase {
        id: 7,
        kind: ScamKind::Investment,
        title: "Tuyển CTV làm việc online nhẹ nhàng",
        real_case: Some("CTV sàn thương mại điện tử giả"),
        damage: Some("50 - 200 triệu VNĐ"),
        severity: Severity::Medium,
        description: "Tuyển làm nhiệm vụ like/share hoặc đặt đơn hàng ảo để nhận hoa hồng. Yêu cầu ứng tiền trước để làm nhiệm vụ, sau đó không hoàn lại.",
        keywords: &["nhiệm vụ", "hoa hồng cao", "việc nhẹ lương cao"],
    },
    ScamCase {
        id: 8,
        kind: ScamKind::Malware,
        title: "Link trúng thưởng/Phiếu giảm giá",
        real_case: None,
        damage: Some("Mất Facebook, Zalo"),
        severity: Severity::Low,
        description: "Gửi tin nhắn trúng thưởng xe máy/điện thoại hoặc phiếu siêu thị. Yêu cầu click vào link và đăng nhập mạng xã hội để nhận, từ đó đánh cắp tài khoản.",
        keywords: &["trúng thưởng", "nhận quà", "tri ân khách hàng"],
    },
    ScamCase {
        id: 9,
        kind: ScamKind::Impersonation,
        title: "Con đang cấp cứu ở bệnh viện",
        real_case: Some("Loạt phụ huynh TP.HCM bị lừa"),
        damage: Some("20 - 100 triệu VNĐ"),
        severity: Severity::High,
        description: "Gọi điện tự xưng giáo viên/bác sĩ báo con đang cấp cứu, cần chuyển viện phí gấp. Đánh vào tâm lý hoảng loạn để nạn nhân chuyển tiền không kịp xác minh.",
        keywords: &["cấp cứu", "viện phí", "chuyển gấp"],
    },
    ScamCase {
        id: 10,
        kind: ScamKind::Impersonation,
        title: "Tin nhắn giả mạo thương hiệu ngân hàng",
        real_case: None,
        damage: Some("Mất tài khoản ngân hàng"),
        severity: Severity::High,
        description: "Sử dụng thiết bị phát sóng giả để gửi tin nhắn hiển thị tên ngân hàng, chứa link đăng nhập giả nhằm chiếm đoạt tài khoản.",
        keywords: &["đổi mật khẩu", "xác thực", "trừ tiền"],
    },
];

/// Case-insensitive search over title, description, and keywords.
pub fn search(query: &str) -> Vec<&'static ScamCase> {
    let needle = query.to_lowercase();
    CASES
        .iter()
        .filter(|case| {
            case.title.to_lowercase().contains(&needle)
                || case.description.to_lowercase().contains(&needle)
                || case.keywords.iter().any(|k| k.contains(&needle))
        })
        .collect()
}

/// Print one case in full.
pub fn display_case(case: &ScamCase) {
    let severity = match case.severity {
        Severity::High => case.severity.as_str().red().bold(),
        Severity::Medium => case.severity.as_str().yellow(),
        Severity::Low => case.severity.as_str().green(),
    };
    println!(
        "\n  {} [{}] — mức độ {}",
        case.title.bold(),
        case.kind.as_str(),
        severity
    );
    if let Some(real_case) = case.real_case {
        println!("  Vụ việc: {}", real_case.dimmed());
    }
    if let Some(damage) = case.damage {
        println!("  Thiệt hại: {}", damage.dimmed());
    }
    println!("  {}", case.description);
    println!(
        "  Từ khóa: {}",
        case.keywords.join(", ").italic().dimmed()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_ids_are_unique() {
        let mut ids: Vec<_> = CASES.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), CASES.len());
    }

    #[test]
    fn search_matches_keywords() {
        let hits = search("cấp cứu");
        assert!(hits.iter().any(|c| c.id == 1));
        assert!(hits.iter().any(|c| c.id == 9));
    }

    #[test]
    fn search_matches_title_case_insensitively() {
        let hits = search("deepfake");
        assert!(hits.iter().any(|c| c.id == 1));
    }

    #[test]
    fn search_misses_return_empty() {
        assert!(search("zzz-không-tồn-tại").is_empty());
    }
}
