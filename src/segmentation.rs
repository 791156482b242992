// ============================================================================
// Segmentator Cloud - Résultat de segmentation
// ============================================================================
// Le résultat appartient à l'hôte (ou au moteur). Ce module ne fait que le
// lire: liste des segments, volume par segment, export vers un fichier.
// ============================================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Segmentation terminée, lue pour l'export et le calcul des métriques
pub trait Segmentation {
    /// Identifiants des segments, dans l'ordre exposé par la segmentation
    fn segment_ids(&self) -> Vec<String>;

    /// Volume du segment en mm³, `None` si la statistique est absente
    fn volume_mm3(&self, segment_id: &str) -> Option<f64>;

    /// Extension du fichier produit par `export_to`
    fn export_extension(&self) -> String {
        "nrrd".to_string()
    }

    /// Sérialise la segmentation dans `path`
    fn export_to(&self, path: &Path) -> Result<(), SegmentationError>;
}

/// Erreurs de lecture ou d'export d'une segmentation
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentationError {
    /// Fichier de segmentation introuvable
    MissingArtifact(PathBuf),

    /// Manifeste ou statistiques illisibles
    Manifest(String),

    /// Erreur d'entrée/sortie
    Io(String),
}

impl fmt::Display for SegmentationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentationError::MissingArtifact(path) => write!(f, "Segmentation file not found: {}", path.display()),
            SegmentationError::Manifest(msg) => write!(f, "Invalid segmentation manifest: {}", msg),
            SegmentationError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for SegmentationError {}

/// Statistiques d'un segment (format `statistics.json` de TotalSegmentator)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentStatistics {
    /// Volume en mm³
    #[serde(default)]
    pub volume: Option<f64>,

    /// Intensité moyenne (HU)
    #[serde(default)]
    pub intensity: Option<f64>,
}

/// Segmentation décrite par un fichier image et une table de statistiques
///
/// Manifeste JSON:
/// ```json
/// { "artifact": "seg.nii.gz", "segments": { "liver": { "volume": 1523.0 } } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestSegmentation {
    pub artifact: PathBuf,
    #[serde(default)]
    pub segments: BTreeMap<String, SegmentStatistics>,
}

impl ManifestSegmentation {
    pub fn new(artifact: impl Into<PathBuf>) -> Self {
        Self {
            artifact: artifact.into(),
            segments: BTreeMap::new(),
        }
    }

    /// Charge un manifeste; un chemin d'artefact relatif est résolu
    /// par rapport au répertoire du manifeste
    pub fn from_manifest_file(path: &Path) -> Result<Self, SegmentationError> {
        let content = fs::read_to_string(path)
            .map_err(|e| SegmentationError::Io(format!("{}: {}", path.display(), e)))?;
        let mut manifest: ManifestSegmentation = serde_json::from_str(&content)
            .map_err(|e| SegmentationError::Manifest(e.to_string()))?;

        if manifest.artifact.is_relative() {
            if let Some(dir) = path.parent() {
                manifest.artifact = dir.join(&manifest.artifact);
            }
        }
        Ok(manifest)
    }

    /// Remplace les statistiques par celles d'un `statistics.json`
    pub fn load_statistics(&mut self, path: &Path) -> Result<(), SegmentationError> {
        let content = fs::read_to_string(path)
            .map_err(|e| SegmentationError::Io(format!("{}: {}", path.display(), e)))?;
        self.segments = serde_json::from_str(&content)
            .map_err(|e| SegmentationError::Manifest(e.to_string()))?;
        Ok(())
    }
}

impl Segmentation for ManifestSegmentation {
    fn segment_ids(&self) -> Vec<String> {
        self.segments.keys().cloned().collect()
    }

    fn volume_mm3(&self, segment_id: &str) -> Option<f64> {
        self.segments.get(segment_id).and_then(|s| s.volume)
    }

    fn export_extension(&self) -> String {
        let name = self
            .artifact
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if name.ends_with(".nii.gz") {
            "nii.gz".to_string()
        } else {
            self.artifact
                .extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_else(|| "nrrd".to_string())
        }
    }

    fn export_to(&self, path: &Path) -> Result<(), SegmentationError> {
        if !self.artifact.exists() {
            return Err(SegmentationError::MissingArtifact(self.artifact.clone()));
        }
        fs::copy(&self.artifact, path)
            .map(|_| ())
            .map_err(|e| SegmentationError::Io(e.to_string()))
    }
}
