use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use truthshield::account::Account;
use truthshield::ai::gemini::GeminiAnalyzer;
use truthshield::ai::traits::{MediaKind, MediaSample, NoopAnalyzer, ScamAnalyzer};
use truthshield::alert::{TerminalNotifier, TerminalWarning};
use truthshield::call::driver::{run_call, CallScript};
use truthshield::call::{CallAction, IncomingCall};
use truthshield::config::{AnalyzerBackend, Config};
use truthshield::db::models::{
    CallDirection, DeepfakeRecord, MessageRecord, RiskStatus, SubscriptionPlan,
};
use truthshield::db::ProfileStore;
use truthshield::directory::{MemoryDirectory, ReportKind, ReputationDirectory};
use truthshield::gate::{self, Feature};
use truthshield::output::terminal;
use truthshield::{ai, library};

/// TruthShield: anti-scam protection for calls, messages, and media.
///
/// Screens incoming calls against community reputation data, analyzes
/// messages and media with an AI backend (with offline fallback rules),
/// and keeps everything in a local profile.
#[derive(Parser)]
#[command(name = "truthshield", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SimRisk {
    Safe,
    Suspicious,
    Scam,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportKindArg {
    Scam,
    Spam,
    Safe,
}

#[derive(Clone, Copy, ValueEnum)]
enum MediaKindArg {
    Image,
    Audio,
    Video,
}

#[derive(Clone, Copy, ValueEnum)]
enum PlanArg {
    Monthly,
    Yearly,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the local database
    Init,

    /// Log in with a phone number (creates a profile on first login)
    Login { phone: String },

    /// Log out and clear the cached profile
    Logout,

    /// Simulate an incoming call of a given risk level
    Simulate {
        /// Risk label injected into the call
        #[arg(value_enum)]
        risk: SimRisk,

        /// Caller number (defaults to a demo number per risk level)
        #[arg(long)]
        number: Option<String>,

        /// Answer the call instead of following the default script
        #[arg(long)]
        answer: bool,
    },

    /// Analyze a text message for scam signals
    Analyze { text: String },

    /// Forensic deepfake analysis of a media file
    ScanMedia {
        path: String,

        #[arg(long, value_enum)]
        kind: MediaKindArg,
    },

    /// Look up a phone number's community reputation
    Lookup { number: String },

    /// Report a phone number to the community database
    Report {
        number: String,

        #[arg(value_enum)]
        kind: ReportKindArg,

        /// Short description shown to other users
        label: String,
    },

    /// Show call history (newest first)
    History {
        /// Re-run AI analysis for one call by id
        #[arg(long)]
        reanalyze: Option<String>,

        /// Show analyzed messages instead of calls
        #[arg(long)]
        messages: bool,
    },

    /// Block a number
    Block { number: String },

    /// Unblock a number
    Unblock { number: String },

    /// Save a contact (unique by phone)
    AddContact { name: String, phone: String },

    /// Update protection settings
    Settings {
        /// Automatically hang up dangerous calls after the countdown
        #[arg(long)]
        auto_hangup: Option<bool>,

        /// Risk threshold shown in the profile (50-95)
        #[arg(long)]
        risk_threshold: Option<u8>,
    },

    /// Upgrade to a paid plan (unlimited scans)
    Upgrade {
        #[arg(value_enum)]
        plan: PlanArg,
    },

    /// Browse the scam case library
    Library {
        /// Filter cases by keyword
        query: Option<String>,
    },

    /// Show system status (login, usage counters, history sizes)
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("truthshield=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            info!("Initializing TruthShield database...");
            let config = Config::load()?;
            let store = truthshield::db::initialize_sqlite(&config.db_path)?;
            let table_count = store.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nNext step: truthshield login <phone>");
        }

        Commands::Login { phone } => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            let (account, created) = Account::login(store, &phone, today()).await?;
            if created {
                println!(
                    "Chào mừng! Đã tạo hồ sơ mới cho {} với {} liên hệ mẫu.",
                    phone,
                    account.profile.contacts.len()
                );
            } else {
                println!("Đăng nhập lại thành công: {phone}");
            }
        }

        Commands::Logout => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            Account::logout(&store).await?;
            println!("Đã đăng xuất.");
        }

        Commands::Simulate {
            risk,
            number,
            answer,
        } => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            let mut account = require_login(store).await?;
            let analyzer = create_analyzer(&config);

            let (default_number, contact_name, override_risk) = match risk {
                SimRisk::Safe => (
                    "0909112233",
                    Some("Shipper Giao Hàng".to_string()),
                    RiskStatus::Safe,
                ),
                SimRisk::Suspicious => ("0288889999", None, RiskStatus::Suspicious),
                SimRisk::Scam => ("0888999000", None, RiskStatus::Scam),
            };
            let number = number.unwrap_or_else(|| default_number.to_string());

            let timestamp_ms = now_ms();
            let call = IncomingCall {
                id: format!("call-{timestamp_ms}"),
                phone_number: number,
                contact_name,
                direction: CallDirection::Incoming,
                timestamp_ms,
                override_risk: Some(override_risk),
            };

            let script = if answer {
                CallScript {
                    actions: vec![
                        (Duration::from_secs(2), CallAction::Accept),
                        (Duration::from_secs(8), CallAction::Hangup),
                    ],
                }
            } else {
                match risk {
                    SimRisk::Safe => CallScript {
                        actions: vec![
                            (Duration::from_secs(2), CallAction::Accept),
                            (Duration::from_secs(7), CallAction::Hangup),
                        ],
                    },
                    SimRisk::Suspicious => CallScript {
                        actions: vec![(Duration::from_secs(3), CallAction::Decline)],
                    },
                    // Dangerous calls auto-hang-up when the user enabled it;
                    // otherwise the script blocks the number after a beat.
                    SimRisk::Scam if account.profile.auto_hangup_high_risk => {
                        CallScript::default()
                    }
                    SimRisk::Scam => CallScript {
                        actions: vec![(Duration::from_secs(4), CallAction::BlockAndDecline)],
                    },
                }
            };

            let directory: Arc<dyn ReputationDirectory> = Arc::new(MemoryDirectory::new());
            let outcome = run_call(
                call,
                &mut account,
                directory,
                analyzer.as_ref(),
                Arc::new(TerminalWarning),
                &TerminalNotifier,
                script,
            )
            .await?;

            if let Some(record) = outcome.record {
                if let Some(analysis) = &record.ai_analysis {
                    println!(
                        "\n  Phân tích sau cuộc gọi: [{}] {}",
                        analysis.risk_score, analysis.explanation
                    );
                }
            }
        }

        Commands::Analyze { text } => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            let mut account = require_login(store).await?;

            if !gate::check_limit(&account.profile, Feature::MessageScan) {
                terminal::display_upgrade_prompt(Feature::MessageScan);
                return Ok(());
            }

            let analyzer = create_analyzer(&config);
            let spinner = spinner("Đang phân tích tin nhắn...");
            let verdict = ai::analyze_message(analyzer.as_ref(), &text).await;
            spinner.finish_and_clear();

            terminal::display_message_verdict(&verdict);

            // Local keyword scan as supporting evidence next to the verdict
            let context = truthshield::classifier::context::score_utterance(&text, false);
            if !context.keywords_found.is_empty() {
                println!(
                    "  Từ khóa rủi ro: {} ({:+} điểm)",
                    context.keywords_found.join(", "),
                    context.score_delta
                );
            }

            let timestamp_ms = now_ms();
            account
                .record_message(MessageRecord {
                    id: format!("msg-{timestamp_ms}"),
                    content: text,
                    result: verdict.result,
                    explanation: verdict.explanation,
                    timestamp_ms,
                })
                .await?;
            account.consume(Feature::MessageScan).await?;
        }

        Commands::ScanMedia { path, kind } => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            let mut account = require_login(store).await?;

            if !gate::check_limit(&account.profile, Feature::DeepfakeScan) {
                terminal::display_upgrade_prompt(Feature::DeepfakeScan);
                return Ok(());
            }

            let bytes = std::fs::read(&path)
                .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
            let kind = match kind {
                MediaKindArg::Image => MediaKind::Image,
                MediaKindArg::Audio => MediaKind::Audio,
                MediaKindArg::Video => MediaKind::Video,
            };
            let file_name = path
                .rsplit('/')
                .next()
                .unwrap_or(path.as_str())
                .to_string();
            let media = MediaSample {
                file_name: file_name.clone(),
                kind,
                bytes,
            };

            let analyzer = create_analyzer(&config);
            let spinner = spinner("Đang phân tích pháp y (tối đa 60 giây)...");
            let result = ai::analyze_media(analyzer.as_ref(), &media).await;
            spinner.finish_and_clear();

            terminal::display_forensics(&file_name, &result);

            let timestamp_ms = now_ms();
            account
                .record_deepfake(DeepfakeRecord {
                    id: format!("df-{timestamp_ms}"),
                    file_name,
                    media_kind: kind.as_str().to_string(),
                    is_deepfake: result.is_deepfake,
                    confidence_score: result.confidence_score,
                    explanation: result.explanation.clone(),
                    timestamp_ms,
                })
                .await?;
            account.consume(Feature::DeepfakeScan).await?;
        }

        Commands::Lookup { number } => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            let mut account = require_login(store).await?;

            if !gate::check_limit(&account.profile, Feature::CallLookup) {
                terminal::display_upgrade_prompt(Feature::CallLookup);
                return Ok(());
            }

            let directory = MemoryDirectory::new();
            let result = directory.lookup(&number).await?;
            terminal::display_lookup(&number, result.as_ref());
            account.consume(Feature::CallLookup).await?;
        }

        Commands::Report {
            number,
            kind,
            label,
        } => {
            let kind = match kind {
                ReportKindArg::Scam => ReportKind::Scam,
                ReportKindArg::Spam => ReportKind::Spam,
                ReportKindArg::Safe => ReportKind::Safe,
            };
            let directory = MemoryDirectory::new();
            directory.report(&number, kind, &label).await?;
            let updated = directory.lookup(&number).await?;
            println!("Cảm ơn bạn đã báo cáo — cộng đồng sẽ được cảnh báo.");
            terminal::display_lookup(&number, updated.as_ref());
        }

        Commands::History {
            reanalyze,
            messages,
        } => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            let mut account = require_login(store).await?;

            if let Some(call_id) = reanalyze {
                let Some(record) = account
                    .profile
                    .call_history
                    .iter()
                    .find(|r| r.id == call_id)
                    .cloned()
                else {
                    anyhow::bail!("No call with id {call_id} in history");
                };
                let analyzer = create_analyzer(&config);
                let spinner = spinner("Đang phân tích lại cuộc gọi...");
                let mut analysis = ai::analyze_call(analyzer.as_ref(), &record).await;
                analysis.timestamp_ms = now_ms();
                spinner.finish_and_clear();
                account.reanalyze_call(&call_id, analysis).await?;
                println!("Đã cập nhật phân tích cho {call_id}.");
            }

            if messages {
                terminal::display_message_history(&account.profile.message_history);
            } else {
                terminal::display_call_history(&account.profile.call_history);
            }
        }

        Commands::Block { number } => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            let mut account = require_login(store).await?;
            account.block_number(&number).await?;
            println!("Đã chặn số {number}.");
        }

        Commands::Unblock { number } => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            let mut account = require_login(store).await?;
            account.unblock_number(&number).await?;
            println!("Đã bỏ chặn số {number}.");
        }

        Commands::AddContact { name, phone } => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            let mut account = require_login(store).await?;
            if account.add_contact(&name, &phone).await? {
                println!("Đã lưu liên hệ {name} ({phone}).");
            } else {
                println!("Số {phone} đã có trong danh bạ.");
            }
        }

        Commands::Settings {
            auto_hangup,
            risk_threshold,
        } => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            let mut account = require_login(store).await?;

            if let Some(enabled) = auto_hangup {
                account.set_auto_hangup(enabled).await?;
                println!(
                    "Tự động ngắt cuộc gọi nguy hiểm: {}",
                    if enabled { "bật" } else { "tắt" }
                );
            }
            if let Some(threshold) = risk_threshold {
                account.set_risk_threshold(threshold).await?;
                println!("Ngưỡng rủi ro: {}", account.profile.risk_threshold);
            }
            if auto_hangup.is_none() && risk_threshold.is_none() {
                terminal::display_profile(&account.profile);
            }
        }

        Commands::Upgrade { plan } => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            let mut account = require_login(store).await?;
            let plan = match plan {
                PlanArg::Monthly => SubscriptionPlan::Monthly,
                PlanArg::Yearly => SubscriptionPlan::Yearly,
            };
            account.upgrade(plan).await?;
            println!(
                "{}",
                format!("Đã nâng cấp gói {} — không còn giới hạn lượt dùng.", plan.as_str())
                    .green()
                    .bold()
            );
        }

        Commands::Library { query } => match query {
            Some(query) => {
                let hits = library::search(&query);
                if hits.is_empty() {
                    println!("Không tìm thấy kịch bản lừa đảo nào khớp \"{query}\".");
                } else {
                    for case in hits {
                        library::display_case(case);
                    }
                }
            }
            None => {
                println!(
                    "{}",
                    format!("=== Thư viện lừa đảo ({} kịch bản) ===", library::CASES.len()).bold()
                );
                for case in library::CASES {
                    library::display_case(case);
                }
            }
        },

        Commands::Status => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            truthshield::status::show(&store, &config.db_path, today()).await?;
        }
    }

    Ok(())
}

/// Open the existing database (run `init` first).
fn open_store(config: &Config) -> Result<Arc<dyn ProfileStore>> {
    truthshield::db::open_sqlite(&config.db_path)
}

/// Resume the logged-in account or explain how to log in.
async fn require_login(store: Arc<dyn ProfileStore>) -> Result<Account> {
    match Account::resume(store, today()).await? {
        Some(account) => Ok(account),
        None => anyhow::bail!("Chưa đăng nhập. Chạy `truthshield login <phone>` trước."),
    }
}

/// Create an analyzer based on the configured backend.
fn create_analyzer(config: &Config) -> Box<dyn ScamAnalyzer> {
    match config.analyzer_backend {
        AnalyzerBackend::Gemini => {
            info!("Using Gemini analyzer");
            Box::new(GeminiAnalyzer::new(
                config.gemini_api_url.clone(),
                config.gemini_api_key.clone(),
                config.gemini_model.clone(),
            ))
        }
        AnalyzerBackend::Offline => {
            info!("No API key configured — offline fallback rules only");
            Box::new(NoopAnalyzer)
        }
    }
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// Device-local calendar date, the reference for daily quota resets.
fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
