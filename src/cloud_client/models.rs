// ============================================================================
// Segmentator Cloud - Modèles du service distant
// ============================================================================

use serde::{Deserialize, Serialize};

/// Format du champ `timestamp` de l'upload (heure locale)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Champ `metadata` de l'upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadMetadata {
    pub software: String,
    pub version: String,
}

/// Champs texte accompagnant le fichier de segmentation
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFields {
    pub patient_id: String,
    pub family_id: String,
    pub timestamp: String,
    pub metadata: UploadMetadata,
}

impl UploadFields {
    /// Champs horodatés au moment de l'appel
    pub fn now(patient_id: &str, family_id: &str, metadata: &UploadMetadata) -> Self {
        Self {
            patient_id: patient_id.to_string(),
            family_id: family_id.to_string(),
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
            metadata: metadata.clone(),
        }
    }
}
