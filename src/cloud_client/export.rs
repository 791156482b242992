// ============================================================================
// Segmentator Cloud - Fichier d'export temporaire
// ============================================================================
// Un fichier par upload, supprimé à la destruction du guard, quel que soit
// le chemin de sortie (succès, erreur HTTP, erreur réseau, panic).
// ============================================================================

use log::{debug, warn};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::errors::{CloudClientError, CloudResult};

pub struct ExportFile {
    file: Option<NamedTempFile>,
    path: PathBuf,
}

impl ExportFile {
    /// Crée un fichier au nom unique dans `dir`
    pub fn create(dir: &Path, extension: &str) -> CloudResult<Self> {
        let suffix = format!(".{}", extension.trim_start_matches('.'));
        let file = tempfile::Builder::new()
            .prefix("segmentation_export_")
            .suffix(&suffix)
            .tempfile_in(dir)
            .map_err(|e| CloudClientError::ExportError(format!("Temporary file in {}: {}", dir.display(), e)))?;

        let path = file.path().to_path_buf();
        debug!("📄 [Export] Fichier temporaire: {:?}", path);

        Ok(Self {
            file: Some(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ExportFile {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            // L'exporteur peut avoir remplacé ou supprimé le fichier
            if let Err(e) = file.close() {
                if self.path.exists() {
                    warn!("⚠️ [Export] Suppression impossible {:?}: {}", self.path, e);
                }
            } else {
                debug!("🗑️ [Export] Fichier temporaire supprimé: {:?}", self.path);
            }
        }
    }
}
