// Warning tone and notification collaborators.
//
// The tone is started asynchronously, so a stop can race an in-flight start.
// WarningGuard serializes the pair: stop always waits for a pending start to
// resolve before silencing, so a delayed start can never override a stop.

use std::sync::Arc;

use async_trait::async_trait;
use colored::Colorize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

/// A looping warning tone. Implementations must be infallible — a platform
/// without audio support just does nothing.
#[async_trait]
pub trait WarningSound: Send + Sync {
    /// Begin playing the looping tone.
    async fn play(&self);
    /// Silence the tone.
    async fn stop(&self);
}

/// Sequencing wrapper around a [`WarningSound`].
///
/// `start` spawns the play request and remembers its handle; `stop` awaits
/// any pending start before issuing the stop.
pub struct WarningGuard {
    sound: Arc<dyn WarningSound>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl WarningGuard {
    pub fn new(sound: Arc<dyn WarningSound>) -> Self {
        Self {
            sound,
            pending: Mutex::new(None),
        }
    }

    /// Fire-and-forget start. The session's one-shot flag ensures this is
    /// called at most once per call.
    pub async fn start(&self) {
        let sound = self.sound.clone();
        let handle = tokio::spawn(async move { sound.play().await });
        *self.pending.lock().await = Some(handle);
    }

    /// Stop the tone, waiting out an in-flight start first.
    pub async fn stop(&self) {
        let pending = self.pending.lock().await.take();
        if let Some(handle) = pending {
            let _ = handle.await;
        }
        self.sound.stop().await;
    }
}

/// Terminal-bell rendition of the warning tone.
pub struct TerminalWarning;

#[async_trait]
impl WarningSound for TerminalWarning {
    async fn play(&self) {
        // \x07 rings the terminal bell where supported
        println!(
            "\x07  {}",
            "🔊 CẢNH BÁO LỪA ĐẢO — chuông cảnh báo đang phát".red().bold()
        );
    }

    async fn stop(&self) {
        debug!("warning tone stopped");
    }
}

/// Fire-and-forget user notification (banner/haptic/speech on a device;
/// a printed line here). Must never block or fail.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &str) {
        println!("  {}", message.yellow());
    }
}
