// Seed data for the community directory.
//
// A condensed version of the community-reported numbers the app ships with:
// verified scam lines, nuisance/spam callers, and trusted hotlines.

use crate::db::models::{NumberTag, PhoneLookupResult};

struct SeedEntry {
    phone: &'static str,
    carrier: &'static str,
    tags: &'static [NumberTag],
    report_count: u32,
    reputation_score: u8,
    label: &'static str,
}

const SEED: &[SeedEntry] = &[
    // Verified scam numbers
    SeedEntry {
        phone: "0888999000",
        carrier: "Vinaphone",
        tags: &[NumberTag::Scam],
        report_count: 1542,
        reputation_score: 5,
        label: "Giả danh Công an (Đã xác minh)",
    },
    SeedEntry {
        phone: "0977123456",
        carrier: "Viettel",
        tags: &[NumberTag::Scam],
        report_count: 890,
        reputation_score: 10,
        label: "Lừa đảo đầu tư Forex",
    },
    SeedEntry {
        phone: "0912349999",
        carrier: "Vinaphone",
        tags: &[NumberTag::Scam],
        report_count: 2300,
        reputation_score: 2,
        label: "Lừa đảo \"Con đang cấp cứu\"",
    },
    SeedEntry {
        phone: "0909000666",
        carrier: "Mobifone",
        tags: &[NumberTag::Scam],
        report_count: 3400,
        reputation_score: 1,
        label: "Deepfake Video Call",
    },
    SeedEntry {
        phone: "02499998888",
        carrier: "Cố định",
        tags: &[NumberTag::Scam],
        report_count: 5000,
        reputation_score: 0,
        label: "Tổng đài giả mạo Bộ Công an",
    },
    SeedEntry {
        phone: "0868112233",
        carrier: "Viettel",
        tags: &[NumberTag::Scam],
        report_count: 450,
        reputation_score: 15,
        label: "Tuyển cộng tác viên lừa đảo",
    },
    // Spam / nuisance
    SeedEntry {
        phone: "02477778888",
        carrier: "VNPT Cố định",
        tags: &[NumberTag::Spam, NumberTag::Business],
        report_count: 342,
        reputation_score: 40,
        label: "Quảng cáo Bất động sản",
    },
    SeedEntry {
        phone: "0933444555",
        carrier: "Mobifone",
        tags: &[NumberTag::Spam],
        report_count: 150,
        reputation_score: 45,
        label: "Mời vay tín dụng đen",
    },
    SeedEntry {
        phone: "0844555666",
        carrier: "Vinaphone",
        tags: &[NumberTag::Spam],
        report_count: 200,
        reputation_score: 48,
        label: "Tư vấn chứng khoán",
    },
    SeedEntry {
        phone: "0566777888",
        carrier: "Vietnamobile",
        tags: &[NumberTag::Spam],
        report_count: 50,
        reputation_score: 55,
        label: "Spam SIM số đẹp",
    },
    // Safe / trusted
    SeedEntry {
        phone: "0909112233",
        carrier: "Mobifone",
        tags: &[NumberTag::Delivery, NumberTag::Safe],
        report_count: 0,
        reputation_score: 95,
        label: "Shipper Giao Hàng Tiết Kiệm",
    },
    SeedEntry {
        phone: "1900545436",
        carrier: "Hotline",
        tags: &[NumberTag::Safe, NumberTag::Business],
        report_count: 0,
        reputation_score: 100,
        label: "Vietcombank Hotline",
    },
    SeedEntry {
        phone: "19001060",
        carrier: "Hotline",
        tags: &[NumberTag::Safe, NumberTag::Business],
        report_count: 0,
        reputation_score: 100,
        label: "Tổng đài Viettel",
    },
    SeedEntry {
        phone: "02854321123",
        carrier: "Cố định",
        tags: &[NumberTag::Safe, NumberTag::Business],
        report_count: 2,
        reputation_score: 90,
        label: "Bệnh viện Chợ Rẫy",
    },
    SeedEntry {
        phone: "0988777666",
        carrier: "Viettel",
        tags: &[NumberTag::Delivery, NumberTag::Safe],
        report_count: 0,
        reputation_score: 88,
        label: "Shipper Shopee Express",
    },
    SeedEntry {
        phone: "0911222333",
        carrier: "Vinaphone",
        tags: &[NumberTag::Safe],
        report_count: 0,
        reputation_score: 92,
        label: "Grab Driver",
    },
];

/// Materialize the seed table.
pub fn seed_entries() -> Vec<PhoneLookupResult> {
    SEED.iter()
        .map(|e| PhoneLookupResult {
            phone_number: e.phone.to_string(),
            carrier: e.carrier.to_string(),
            tags: e.tags.to_vec(),
            report_count: e.report_count,
            reputation_score: e.reputation_score,
            community_label: e.label.to_string(),
        })
        .collect()
}
