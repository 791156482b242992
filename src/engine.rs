// ============================================================================
// Segmentator Cloud - Moteur de segmentation
// ============================================================================
// Le moteur est externe. `CommandEngine` lance l'exécutable configuré
// (TotalSegmentator par défaut), attend sa fin puis charge `statistics.json`
// produit à côté du fichier de sortie.
// ============================================================================

use log::{debug, info};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::EngineConfig;
use crate::segmentation::{ManifestSegmentation, Segmentation, SegmentationError};

/// Moteur produisant une segmentation à partir d'un volume d'entrée
pub trait SegmentationEngine {
    type Volume;
    type Output: Segmentation;

    fn segment(&self, input: &Self::Volume, output: &mut Self::Output) -> Result<(), EngineError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Volume d'entrée introuvable
    InputNotFound(PathBuf),

    /// Lancement de l'exécutable impossible
    Launch(String),

    /// Fin en erreur (code de sortie si disponible)
    Failed(Option<i32>),

    /// Aucune segmentation écrite à l'emplacement attendu
    MissingOutput(PathBuf),

    /// Statistiques illisibles
    Statistics(SegmentationError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InputNotFound(path) => write!(f, "Input volume not found: {}", path.display()),
            EngineError::Launch(msg) => write!(f, "Failed to start segmentation engine: {}", msg),
            EngineError::Failed(Some(code)) => write!(f, "Segmentation engine exited with code {}", code),
            EngineError::Failed(None) => write!(f, "Segmentation engine terminated by signal"),
            EngineError::MissingOutput(path) => write!(f, "Segmentation engine wrote no output at {}", path.display()),
            EngineError::Statistics(e) => write!(f, "Segment statistics unavailable: {}", e),
        }
    }
}

impl std::error::Error for EngineError {}

/// Volume d'entrée (fichier image sur disque)
#[derive(Debug, Clone, PartialEq)]
pub struct InputVolume {
    pub path: PathBuf,
}

impl InputVolume {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Moteur lancé en ligne de commande
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
}

impl CommandEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }

    fn render_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let input = input.to_string_lossy();
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace("{input}", &input).replace("{output}", &output))
            .collect()
    }

    /// Emplacement de `statistics.json` pour une sortie multi-label
    pub fn statistics_path(output: &Path) -> PathBuf {
        output
            .parent()
            .map(|dir| dir.join("statistics.json"))
            .unwrap_or_else(|| PathBuf::from("statistics.json"))
    }
}

impl SegmentationEngine for CommandEngine {
    type Volume = InputVolume;
    type Output = ManifestSegmentation;

    fn segment(&self, input: &InputVolume, output: &mut ManifestSegmentation) -> Result<(), EngineError> {
        if !input.path.exists() {
            return Err(EngineError::InputNotFound(input.path.clone()));
        }

        let args = self.render_args(&input.path, &output.artifact);
        info!("🧠 [Engine] {} sur {:?}", self.program, input.path);
        debug!("[Engine] Arguments: {:?}", args);

        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .map_err(|e| EngineError::Launch(format!("{}: {}", self.program, e)))?;

        if !status.success() {
            return Err(EngineError::Failed(status.code()));
        }
        if !output.artifact.exists() {
            return Err(EngineError::MissingOutput(output.artifact.clone()));
        }

        output
            .load_statistics(&Self::statistics_path(&output.artifact))
            .map_err(EngineError::Statistics)?;

        info!("✅ [Engine] Segmentation terminée: {} segments", output.segments.len());
        Ok(())
    }
}

/// Moteur déjà exécuté: charge le manifeste de sa sortie
#[derive(Debug, Clone, Default)]
pub struct ManifestEngine;

impl SegmentationEngine for ManifestEngine {
    type Volume = PathBuf;
    type Output = ManifestSegmentation;

    fn segment(&self, manifest: &PathBuf, output: &mut ManifestSegmentation) -> Result<(), EngineError> {
        *output = ManifestSegmentation::from_manifest_file(manifest).map_err(EngineError::Statistics)?;
        if !output.artifact.exists() {
            return Err(EngineError::MissingOutput(output.artifact.clone()));
        }
        info!("📂 [Engine] Manifeste chargé: {:?} ({} segments)", manifest, output.segments.len());
        Ok(())
    }
}
