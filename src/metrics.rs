// ============================================================================
// Segmentator Cloud - Métriques de santé
// ============================================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::segmentation::Segmentation;

/// Métriques envoyées à `POST /patient/{patientId}/metrics`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthMetrics {
    /// Volume par segment (mm³)
    pub organ_volumes: BTreeMap<String, f64>,

    /// Réservé, toujours vide pour l'instant
    pub symmetry_scores: BTreeMap<String, f64>,

    /// Réservé, toujours vide pour l'instant
    pub density_metrics: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetricsError {
    /// Segment sans statistique de volume
    MissingVolume(String),
}

impl fmt::Display for MetricsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricsError::MissingVolume(id) => write!(f, "No volume statistic for segment '{}'", id),
        }
    }
}

impl std::error::Error for MetricsError {}

/// Calcule les métriques d'une segmentation: un volume par segment, sans
/// filtrage ni conversion d'unité
pub fn calculate_health_metrics(segmentation: &dyn Segmentation) -> Result<HealthMetrics, MetricsError> {
    let mut metrics = HealthMetrics::default();

    for segment_id in segmentation.segment_ids() {
        let volume = segmentation
            .volume_mm3(&segment_id)
            .ok_or_else(|| MetricsError::MissingVolume(segment_id.clone()))?;
        metrics.organ_volumes.insert(segment_id, volume);
    }

    Ok(metrics)
}
