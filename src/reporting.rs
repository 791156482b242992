// ============================================================================
// Segmentator Cloud - Collaborateurs de l'hôte (statut + affichage d'erreurs)
// ============================================================================
// L'application hôte fournit le label de statut et la boîte de dialogue
// d'erreur. Ils sont injectés sous forme de traits pour que le client cloud
// et le contrôleur ne dépendent d'aucune interface graphique.
// ============================================================================

use log::{error, info};
use serde::Serialize;
use std::fmt;
use std::sync::Mutex;

/// Affichage d'une erreur à l'opérateur
pub trait ErrorReporter: Send + Sync {
    fn report(&self, message: &str);
}

/// Label de statut de l'hôte
pub trait StatusIndicator: Send + Sync {
    fn set_status(&self, status: CloudStatus);
}

/// Valeurs possibles du label de statut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CloudStatus {
    NotConnected,
    Uploading,
    UploadSuccessful,
    UploadFailed,
    ErrorOccurred,
}

impl CloudStatus {
    /// Texte affiché par l'hôte
    pub fn as_str(&self) -> &'static str {
        match self {
            CloudStatus::NotConnected => "Not connected to cloud",
            CloudStatus::Uploading => "Uploading to cloud...",
            CloudStatus::UploadSuccessful => "Upload successful",
            CloudStatus::UploadFailed => "Upload failed",
            CloudStatus::ErrorOccurred => "Error occurred",
        }
    }
}

impl fmt::Display for CloudStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Implémentations fournies
// ============================================================================

/// Rapporteur pour hôte sans interface: les erreurs partent dans les logs
#[derive(Debug, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, message: &str) {
        error!("❌ {}", message);
    }
}

/// Conserve les messages rapportés (hôtes qui affichent les erreurs en différé)
#[derive(Debug, Default)]
pub struct CollectingReporter {
    messages: Mutex<Vec<String>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copie des messages reçus, dans l'ordre
    pub fn messages(&self) -> Vec<String> {
        match self.messages.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, message: &str) {
        let mut messages = match self.messages.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        messages.push(message.to_string());
    }
}

/// Label de statut partagé; garde l'historique des transitions
#[derive(Debug)]
pub struct SharedStatus {
    history: Mutex<Vec<CloudStatus>>,
}

impl SharedStatus {
    pub fn new() -> Self {
        Self {
            history: Mutex::new(Vec::new()),
        }
    }

    /// Statut courant (`None` si jamais positionné)
    pub fn current(&self) -> Option<CloudStatus> {
        self.history().last().copied()
    }

    pub fn history(&self) -> Vec<CloudStatus> {
        match self.history.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Default for SharedStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusIndicator for SharedStatus {
    fn set_status(&self, status: CloudStatus) {
        info!("🏷️ [Status] {}", status);
        let mut history = match self.history.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                eprintln!("Mutex poisoned in set_status, recovering...");
                poisoned.into_inner()
            }
        };
        history.push(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_literals() {
        assert_eq!(CloudStatus::NotConnected.to_string(), "Not connected to cloud");
        assert_eq!(CloudStatus::Uploading.to_string(), "Uploading to cloud...");
        assert_eq!(CloudStatus::UploadSuccessful.to_string(), "Upload successful");
        assert_eq!(CloudStatus::UploadFailed.to_string(), "Upload failed");
        assert_eq!(CloudStatus::ErrorOccurred.to_string(), "Error occurred");
    }

    #[test]
    fn test_shared_status_tracks_history() {
        let status = SharedStatus::new();
        assert_eq!(status.current(), None);

        status.set_status(CloudStatus::Uploading);
        status.set_status(CloudStatus::UploadFailed);

        assert_eq!(status.current(), Some(CloudStatus::UploadFailed));
        assert_eq!(status.history(), vec![CloudStatus::Uploading, CloudStatus::UploadFailed]);
    }

    #[test]
    fn test_collecting_reporter_keeps_order() {
        let reporter = CollectingReporter::new();
        reporter.report("first");
        reporter.report("second");
        assert_eq!(reporter.messages(), vec!["first", "second"]);
    }
}
