// ============================================================================
// Segmentator Cloud - Client HTTP du service de suivi familial
// ============================================================================
// POST /segmentation/upload           - Envoyer une segmentation (multipart)
// GET  /family/{familyId}/history     - Historique familial
// POST /patient/{patientId}/metrics   - Métriques de santé du patient
// GET  /analysis/genetic-risk         - Facteurs de risque génétique
// ============================================================================
// Toute erreur distante est rapportée une fois à l'opérateur et l'appel
// renvoie `None`. Les variantes `try_*` exposent l'erreur typée.
// ============================================================================

pub mod errors;
pub mod export;
pub mod models;

#[cfg(test)]
pub(crate) mod test_server;

use log::{debug, info, warn};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Url;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::CloudConfig;
use crate::metrics::HealthMetrics;
use crate::reporting::ErrorReporter;
use crate::segmentation::Segmentation;
use errors::{CloudClientError, CloudResult};
use export::ExportFile;
use models::{UploadFields, UploadMetadata};

const UPLOAD_FAILED: &str = "Failed to upload segmentation";
const FAMILY_HISTORY_FAILED: &str = "Failed to get family history";
const METRICS_FAILED: &str = "Failed to update metrics";
const GENETIC_RISK_FAILED: &str = "Failed to get genetic risk factors";

/// Opérations distantes utilisées par le contrôleur et l'hôte
pub trait CloudApi {
    /// Exporte et envoie la segmentation. `Err` uniquement si la
    /// segmentation est absente; toute autre erreur donne `Ok(None)`.
    fn upload_segmentation_result(
        &self,
        segmentation: Option<&dyn Segmentation>,
        patient_id: &str,
        family_id: &str,
    ) -> CloudResult<Option<Value>>;

    fn get_family_history(&self, family_id: &str) -> Option<Value>;

    fn update_health_metrics(&self, patient_id: &str, metrics: &HealthMetrics) -> Option<Value>;

    fn get_genetic_risk_factors(&self, family_id: &str, patient_id: &str) -> Option<Value>;
}

/// Masque les PII dans les logs (patient_id: 1234****)
pub fn mask_pii(id: &str) -> String {
    if id.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", id.chars().take(4).collect::<String>())
    }
}

/// Client du service distant
pub struct CloudClient {
    http: Client,
    base_url: Url,
    export_dir: PathBuf,
    metadata: UploadMetadata,
    reporter: Arc<dyn ErrorReporter>,
}

impl CloudClient {
    pub fn new(config: &CloudConfig, reporter: Arc<dyn ErrorReporter>) -> CloudResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| CloudClientError::ClientError(format!("Invalid base URL '{}': {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CloudClientError::ClientError(format!("Invalid base URL '{}'", config.base_url)));
        }

        // Pas de timeout sauf configuration explicite: reqwest en impose un par défaut
        let timeout = config.timeout_secs.map(Duration::from_secs);
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CloudClientError::ClientError(format!("HTTP client: {}", e)))?;

        debug!("[Cloud Client] Base URL: {} (timeout: {:?})", base_url, timeout);

        Ok(Self {
            http,
            base_url,
            export_dir: config.export_dir(),
            metadata: UploadMetadata {
                software: config.software_name.clone(),
                version: config.host_version.clone(),
            },
            reporter,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL d'une route; chaque segment est encodé
    fn endpoint(&self, segments: &[&str]) -> CloudResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CloudClientError::ClientError(format!("Invalid base URL '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send_json(&self, request: RequestBuilder) -> CloudResult<Value> {
        let response = request
            .send()
            .map_err(|e| CloudClientError::NetworkError(e.to_string()))?;
        read_json(response)
    }

    /// Rapporte l'erreur à l'opérateur et la réduit à `None`
    fn collapse(&self, context: &str, result: CloudResult<Value>) -> Option<Value> {
        match result {
            Ok(body) => Some(body),
            Err(e) => {
                warn!("⚠️ [Cloud Client] {} ({}): {}", context, e.kind(), e);
                self.reporter.report(&format!("{}: {}", context, e));
                None
            }
        }
    }

    // ========================================================================
    // Variantes typées
    // ========================================================================

    pub fn try_upload_segmentation_result(
        &self,
        segmentation: &dyn Segmentation,
        patient_id: &str,
        family_id: &str,
    ) -> CloudResult<Value> {
        let url = self.endpoint(&["segmentation", "upload"])?;

        let export = ExportFile::create(&self.export_dir, &segmentation.export_extension())?;
        segmentation
            .export_to(export.path())
            .map_err(|e| CloudClientError::ExportError(e.to_string()))?;

        let fields = UploadFields::now(patient_id, family_id, &self.metadata);
        let form = build_upload_form(export.path(), &fields)?;

        debug!(
            "[Cloud Client] Upload segmentation: {} (patient_id={}, family_id={})",
            url,
            mask_pii(patient_id),
            mask_pii(family_id)
        );

        let body = self.send_json(self.http.post(url).multipart(form))?;

        info!(
            "✅ [Cloud Client] Segmentation envoyée: patient_id={}, family_id={}",
            mask_pii(patient_id),
            mask_pii(family_id)
        );
        Ok(body)
    }

    pub fn try_get_family_history(&self, family_id: &str) -> CloudResult<Value> {
        let url = self.endpoint(&["family", family_id, "history"])?;
        debug!("[Cloud Client] Family history: family_id={}", mask_pii(family_id));

        let body = self.send_json(self.http.get(url))?;
        info!("✅ [Cloud Client] Historique familial récupéré: family_id={}", mask_pii(family_id));
        Ok(body)
    }

    pub fn try_update_health_metrics(&self, patient_id: &str, metrics: &HealthMetrics) -> CloudResult<Value> {
        let url = self.endpoint(&["patient", patient_id, "metrics"])?;
        debug!(
            "[Cloud Client] Update metrics: patient_id={} ({} volumes)",
            mask_pii(patient_id),
            metrics.organ_volumes.len()
        );

        let body = self.send_json(self.http.post(url).json(metrics))?;
        info!("✅ [Cloud Client] Métriques mises à jour: patient_id={}", mask_pii(patient_id));
        Ok(body)
    }

    pub fn try_get_genetic_risk_factors(&self, family_id: &str, patient_id: &str) -> CloudResult<Value> {
        let url = self.endpoint(&["analysis", "genetic-risk"])?;
        debug!(
            "[Cloud Client] Genetic risk: family_id={}, patient_id={}",
            mask_pii(family_id),
            mask_pii(patient_id)
        );

        let request = self
            .http
            .get(url)
            .query(&[("familyId", family_id), ("patientId", patient_id)]);
        let body = self.send_json(request)?;
        info!("✅ [Cloud Client] Risque génétique récupéré: family_id={}", mask_pii(family_id));
        Ok(body)
    }
}

// ============================================================================
// API PUBLIQUE
// ============================================================================

impl CloudApi for CloudClient {
    fn upload_segmentation_result(
        &self,
        segmentation: Option<&dyn Segmentation>,
        patient_id: &str,
        family_id: &str,
    ) -> CloudResult<Option<Value>> {
        let segmentation = segmentation
            .ok_or_else(|| CloudClientError::InvalidArgument("No segmentation node provided".to_string()))?;

        let result = self.try_upload_segmentation_result(segmentation, patient_id, family_id);
        Ok(self.collapse(UPLOAD_FAILED, result))
    }

    fn get_family_history(&self, family_id: &str) -> Option<Value> {
        let result = self.try_get_family_history(family_id);
        self.collapse(FAMILY_HISTORY_FAILED, result)
    }

    fn update_health_metrics(&self, patient_id: &str, metrics: &HealthMetrics) -> Option<Value> {
        let result = self.try_update_health_metrics(patient_id, metrics);
        self.collapse(METRICS_FAILED, result)
    }

    fn get_genetic_risk_factors(&self, family_id: &str, patient_id: &str) -> Option<Value> {
        let result = self.try_get_genetic_risk_factors(family_id, patient_id);
        self.collapse(GENETIC_RISK_FAILED, result)
    }
}

/// Corps multipart: fichier + champs texte, `metadata` en JSON
fn build_upload_form(path: &Path, fields: &UploadFields) -> CloudResult<Form> {
    let metadata = serde_json::to_string(&fields.metadata)
        .map_err(|e| CloudClientError::ClientError(format!("Metadata serialization: {}", e)))?;
    let metadata_part = Part::text(metadata)
        .mime_str("application/json")
        .map_err(|e| CloudClientError::ClientError(e.to_string()))?;

    Form::new()
        .text("patientId", fields.patient_id.clone())
        .text("familyId", fields.family_id.clone())
        .text("timestamp", fields.timestamp.clone())
        .part("metadata", metadata_part)
        .file("segmentation", path)
        .map_err(|e| CloudClientError::ExportError(format!("Reading {}: {}", path.display(), e)))
}

/// Toute réponse hors 2xx est une erreur; sinon le corps doit être du JSON
fn read_json(response: Response) -> CloudResult<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(CloudClientError::HttpError(status.as_u16(), body));
    }

    response
        .json::<Value>()
        .map_err(|e| CloudClientError::ParseError(e.to_string()))
}

// ============================================================================
// Tests unitaires
// ============================================================================
