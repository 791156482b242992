// ============================================================================
// Segmentator Cloud - Erreurs Client Cloud
// ============================================================================

use std::fmt;

/// Erreurs possibles du client cloud
#[derive(Debug, Clone, PartialEq)]
pub enum CloudClientError {
    /// Appel invalide (segmentation absente): jamais absorbé par le client
    InvalidArgument(String),

    /// Export de la segmentation vers le fichier temporaire impossible
    ExportError(String),

    /// Erreur réseau (connexion refusée, timeout, etc.)
    NetworkError(String),

    /// Réponse HTTP hors 2xx, avec code et corps
    HttpError(u16, String),

    /// Corps de réponse qui n'est pas du JSON
    ParseError(String),

    /// Erreur de création du client HTTP ou d'URL
    ClientError(String),
}

impl CloudClientError {
    /// Catégorie de l'erreur (logs et tests)
    pub fn kind(&self) -> &'static str {
        match self {
            CloudClientError::InvalidArgument(_) => "invalid_argument",
            CloudClientError::ExportError(_) => "export",
            CloudClientError::NetworkError(_) => "network",
            CloudClientError::HttpError(_, _) => "http",
            CloudClientError::ParseError(_) => "parse",
            CloudClientError::ClientError(_) => "client",
        }
    }
}

impl fmt::Display for CloudClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloudClientError::InvalidArgument(msg) => write!(f, "{}", msg),
            CloudClientError::ExportError(msg) => write!(f, "Export error: {}", msg),
            CloudClientError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            CloudClientError::HttpError(code, body) if body.is_empty() => write!(f, "HTTP error {}", code),
            CloudClientError::HttpError(code, body) => write!(f, "HTTP error {}: {}", code, body),
            CloudClientError::ParseError(msg) => write!(f, "Invalid JSON response: {}", msg),
            CloudClientError::ClientError(msg) => write!(f, "Client error: {}", msg),
        }
    }
}

impl std::error::Error for CloudClientError {}

impl From<CloudClientError> for String {
    fn from(err: CloudClientError) -> String {
        err.to_string()
    }
}

/// Résultat typé pour les opérations du client cloud
pub type CloudResult<T> = Result<T, CloudClientError>;
