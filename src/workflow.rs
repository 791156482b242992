// ============================================================================
// Segmentator Cloud - Contrôleur du workflow "Apply"
// ============================================================================
// Segmentation -> upload de l'artefact -> calcul et envoi des métriques.
// Les métriques ne partent qu'après un upload réussi. Aucune erreur ne
// remonte à l'appelant: elle est rapportée et le statut passe à
// "Error occurred".
// ============================================================================

use log::{error, info, warn};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::cloud_client::errors::CloudClientError;
use crate::cloud_client::{mask_pii, CloudApi};
use crate::engine::{EngineError, SegmentationEngine};
use crate::metrics::{calculate_health_metrics, MetricsError};
use crate::reporting::{CloudStatus, ErrorReporter, StatusIndicator};
use crate::segmentation::Segmentation;

/// Issue d'une exécution du workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkflowOutcome {
    /// Artefact envoyé, métriques envoyées (ou tentées)
    Published,
    /// L'upload de l'artefact a échoué, métriques non envoyées
    UploadFailed,
    /// Identifiants incomplets: résultat conservé localement
    LocalOnly,
    /// Erreur rapportée à l'opérateur
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowError {
    /// Volume d'entrée ou segmentation de sortie non sélectionné
    MissingSelection,
    Engine(EngineError),
    Cloud(CloudClientError),
    Metrics(MetricsError),
}

impl fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowError::MissingSelection => write!(f, "Input volume or output segmentation is not selected"),
            WorkflowError::Engine(e) => write!(f, "{}", e),
            WorkflowError::Cloud(e) => write!(f, "{}", e),
            WorkflowError::Metrics(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for WorkflowError {}

impl From<EngineError> for WorkflowError {
    fn from(err: EngineError) -> Self {
        WorkflowError::Engine(err)
    }
}

impl From<CloudClientError> for WorkflowError {
    fn from(err: CloudClientError) -> Self {
        WorkflowError::Cloud(err)
    }
}

impl From<MetricsError> for WorkflowError {
    fn from(err: MetricsError) -> Self {
        WorkflowError::Metrics(err)
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Orchestration d'un cycle de publication. Non réentrant: un seul
/// workflow à la fois par contrôleur.
pub struct WorkflowController<E, C> {
    engine: E,
    cloud: C,
    reporter: Arc<dyn ErrorReporter>,
    status: Arc<dyn StatusIndicator>,
}

impl<E, C> WorkflowController<E, C>
where
    E: SegmentationEngine,
    C: CloudApi,
{
    pub fn new(engine: E, cloud: C, reporter: Arc<dyn ErrorReporter>, status: Arc<dyn StatusIndicator>) -> Self {
        status.set_status(CloudStatus::NotConnected);
        Self {
            engine,
            cloud,
            reporter,
            status,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn cloud(&self) -> &C {
        &self.cloud
    }

    /// Exécute le workflow complet. Ne renvoie jamais d'erreur: tout échec
    /// est rapporté et se traduit par `WorkflowOutcome::Failed`.
    pub fn run_apply_workflow(
        &self,
        input_volume: Option<&E::Volume>,
        output_segmentation: Option<&mut E::Output>,
        patient_id: &str,
        family_id: &str,
    ) -> WorkflowOutcome {
        match self.process(input_volume, output_segmentation, patient_id, family_id) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("❌ [Workflow] {}", e);
                self.reporter.report(&format!("Failed to compute results: {}", e));
                self.status.set_status(CloudStatus::ErrorOccurred);
                WorkflowOutcome::Failed
            }
        }
    }

    fn process(
        &self,
        input_volume: Option<&E::Volume>,
        output_segmentation: Option<&mut E::Output>,
        patient_id: &str,
        family_id: &str,
    ) -> WorkflowResult<WorkflowOutcome> {
        let (input, output) = match (input_volume, output_segmentation) {
            (Some(input), Some(output)) => (input, output),
            _ => return Err(WorkflowError::MissingSelection),
        };

        self.engine.segment(input, output)?;
        info!("✅ [Workflow] Segmentation terminée");

        if patient_id.is_empty() || family_id.is_empty() {
            info!("[Workflow] Identifiants patient/famille absents, résultat conservé localement");
            return Ok(WorkflowOutcome::LocalOnly);
        }

        self.status.set_status(CloudStatus::Uploading);
        let segmentation: &dyn Segmentation = &*output;

        match self.cloud.upload_segmentation_result(Some(segmentation), patient_id, family_id)? {
            Some(_) => {
                let metrics = calculate_health_metrics(segmentation)?;
                if self.cloud.update_health_metrics(patient_id, &metrics).is_none() {
                    warn!("⚠️ [Workflow] Métriques non publiées: patient_id={}", mask_pii(patient_id));
                }
                self.status.set_status(CloudStatus::UploadSuccessful);
                Ok(WorkflowOutcome::Published)
            }
            None => {
                self.status.set_status(CloudStatus::UploadFailed);
                Ok(WorkflowOutcome::UploadFailed)
            }
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
