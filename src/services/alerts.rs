//! Desktop notifications and the audio cue played on completion

use std::path::PathBuf;

use tokio::process::Command;
use tracing::{debug, info, warn};

/// Default sound played as the completion cue
pub const DEFAULT_SOUND_FILE: &str = "/usr/share/sounds/freedesktop/stereo/complete.oga";

/// User-facing alerts. Both calls are fire-and-forget and never fail the caller.
pub trait Alerts: Send + Sync {
    /// Show a dismissible notification
    fn notify(&self, title: &str, message: &str);

    /// Play the short completion cue
    fn play_cue(&self);
}

/// Alerts delivered through `notify-send` and a sound player command
#[derive(Debug, Clone)]
pub struct DesktopAlerts {
    pub notifications: bool,
    pub sound: bool,
    pub sound_file: PathBuf,
}

impl DesktopAlerts {
    pub fn new(notifications: bool, sound: bool, sound_file: PathBuf) -> Self {
        Self {
            notifications,
            sound,
            sound_file,
        }
    }
}

impl Alerts for DesktopAlerts {
    fn notify(&self, title: &str, message: &str) {
        if !self.notifications {
            debug!("Notifications disabled, skipping: {}", title);
            return;
        }
        let args = vec![
            "--app-name=focus-timer".to_string(),
            title.to_string(),
            message.to_string(),
        ];
        spawn_detached("notify-send", args);
    }

    fn play_cue(&self) {
        if !self.sound {
            return;
        }
        let args = vec![self.sound_file.to_string_lossy().into_owned()];
        spawn_detached("paplay", args);
    }
}

/// Run a command in the background, logging any failure
fn spawn_detached(program: &'static str, args: Vec<String>) {
    tokio::spawn(async move {
        match Command::new(program).args(&args).output().await {
            Ok(output) if output.status.success() => {
                debug!("{} completed", program);
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                warn!("{} failed: {}", program, stderr.trim());
            }
            Err(e) => {
                warn!("Failed to execute {}: {}", program, e);
            }
        }
    });
}

/// Check whether `notify-send` is installed; alerts degrade to logs otherwise
pub async fn check_notifier_available() -> bool {
    match Command::new("notify-send").arg("--version").output().await {
        Ok(_) => {
            info!("notify-send is available");
            true
        }
        Err(_) => {
            warn!("notify-send is not available, completion notifications will only be logged");
            false
        }
    }
}
