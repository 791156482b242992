// ============================================================================
// Segmentator Cloud - Configuration Externalisée
// ============================================================================
// Gère les paramètres configurables via fichier TOML et variables d'environnement
// ============================================================================

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Variable d'environnement surchargeant l'URL de base du service distant
pub const ENV_BASE_URL: &str = "SEGMENTATOR_CLOUD_BASE_URL";

/// Variable d'environnement surchargeant le répertoire d'export temporaire
pub const ENV_TEMP_DIR: &str = "SEGMENTATOR_CLOUD_TEMP_DIR";

/// Configuration de l'application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Niveau de log (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Service distant de suivi familial
    #[serde(default)]
    pub cloud: CloudConfig,

    /// Moteur de segmentation externe
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Paramètres du client cloud
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudConfig {
    /// Racine de toutes les routes de l'API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Délai maximal d'une requête. Absent = aucun délai (l'appel bloque
    /// jusqu'à la réponse du service).
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Nom du logiciel envoyé dans les métadonnées d'upload
    #[serde(default = "default_software_name")]
    pub software_name: String,

    /// Version de l'application hôte envoyée dans les métadonnées d'upload
    #[serde(default = "default_host_version")]
    pub host_version: String,

    /// Répertoire des exports temporaires (défaut: répertoire temporaire système)
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

/// Paramètres du moteur de segmentation lancé en ligne de commande
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Exécutable du moteur
    #[serde(default = "default_engine_program")]
    pub program: String,

    /// Arguments; `{input}` et `{output}` sont substitués
    #[serde(default = "default_engine_args")]
    pub args: Vec<String>,
}

fn default_log_level() -> String { "info".to_string() }
fn default_base_url() -> String { "https://marvelous-medovik-cc3fec.netlify.app/api".to_string() }
fn default_software_name() -> String { "SlicerTotalSegmentator".to_string() }
fn default_host_version() -> String { env!("CARGO_PKG_VERSION").to_string() }
fn default_engine_program() -> String { "TotalSegmentator".to_string() }
fn default_engine_args() -> Vec<String> {
    ["-i", "{input}", "-o", "{output}", "--ml", "--statistics"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            cloud: CloudConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
            software_name: default_software_name(),
            host_version: default_host_version(),
            temp_dir: None,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: default_engine_program(),
            args: default_engine_args(),
        }
    }
}

impl CloudConfig {
    /// Configuration pointant vers une autre racine d'API (serveur local, tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Répertoire effectif des exports temporaires
    pub fn export_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

impl AppConfig {
    /// Chemin du fichier de configuration
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("segmentator-cloud").join("config.toml"))
    }

    /// Charge la configuration depuis le fichier TOML ou utilise les valeurs par défaut,
    /// puis applique les surcharges d'environnement
    pub fn load() -> Self {
        let mut config = Self::load_file().unwrap_or_else(|| {
            info!("📁 [Config] Utilisation de la configuration par défaut");
            Self::default()
        });
        config.apply_env_overrides();
        config
    }

    fn load_file() -> Option<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return None;
        }

        let content = fs::read_to_string(&path).ok()?;
        match Self::from_toml(&content) {
            Ok(config) => {
                info!("📁 [Config] Chargé depuis {:?}", path);
                Some(config)
            }
            Err(e) => {
                warn!("⚠️ [Config] Erreur parsing {:?} ({}), utilisation des valeurs par défaut", path, e);
                None
            }
        }
    }

    /// Parse une configuration TOML
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str::<AppConfig>(content).map_err(|e| e.to_string())
    }

    /// Sérialise la configuration en TOML
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Erreur sérialisation: {}", e))
    }

    /// Applique les variables d'environnement reconnues
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            if !url.is_empty() {
                self.cloud.base_url = url;
            }
        }
        if let Ok(dir) = std::env::var(ENV_TEMP_DIR) {
            if !dir.is_empty() {
                self.cloud.temp_dir = Some(PathBuf::from(dir));
            }
        }
    }

    /// Sauvegarde la configuration dans le fichier TOML
    pub fn save(&self) -> Result<PathBuf, String> {
        let path = Self::config_path()
            .ok_or_else(|| "Impossible de déterminer le chemin de configuration".to_string())?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Erreur création répertoire: {}", e))?;
        }

        fs::write(&path, self.to_toml()?)
            .map_err(|e| format!("Erreur écriture: {}", e))?;

        info!("💾 [Config] Sauvegardé dans {:?}", path);
        Ok(path)
    }

    /// Crée un fichier de configuration par défaut s'il n'existe pas
    pub fn ensure_config_file() -> Result<Option<PathBuf>, String> {
        match Self::config_path() {
            Some(path) if path.exists() => Ok(None),
            Some(_) => Self::default().save().map(Some),
            None => Err("Impossible de déterminer le chemin de configuration".to_string()),
        }
    }
}

/// Obtient la configuration globale (thread-safe)
pub fn get_config() -> &'static AppConfig {
    CONFIG.get_or_init(AppConfig::load)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.cloud.base_url, "https://marvelous-medovik-cc3fec.netlify.app/api");
        assert_eq!(config.cloud.timeout_secs, None);
        assert_eq!(config.cloud.software_name, "SlicerTotalSegmentator");
        assert_eq!(config.engine.program, "TotalSegmentator");
        assert!(config.engine.args.contains(&"{input}".to_string()));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
            log_level = "debug"

            [cloud]
            base_url = "http://127.0.0.1:9000/api"
            timeout_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.cloud.base_url, "http://127.0.0.1:9000/api");
        assert_eq!(config.cloud.timeout_secs, Some(30));
        assert_eq!(config.cloud.software_name, "SlicerTotalSegmentator");
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = AppConfig::default();
        config.cloud.temp_dir = Some(PathBuf::from("/var/tmp/exports"));

        let parsed = AppConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed.cloud, config.cloud);
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(AppConfig::from_toml("cloud = 12").is_err());
    }

    #[test]
    fn test_export_dir_falls_back_to_system_temp() {
        let config = CloudConfig::default();
        assert_eq!(config.export_dir(), std::env::temp_dir());

        let config = CloudConfig {
            temp_dir: Some(PathBuf::from("/data/exports")),
            ..CloudConfig::default()
        };
        assert_eq!(config.export_dir(), PathBuf::from("/data/exports"));
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var(ENV_BASE_URL, "http://localhost:4000/api");
        std::env::set_var(ENV_TEMP_DIR, "/tmp/segmentator");

        let mut config = AppConfig::default();
        config.apply_env_overrides();

        std::env::remove_var(ENV_BASE_URL);
        std::env::remove_var(ENV_TEMP_DIR);

        assert_eq!(config.cloud.base_url, "http://localhost:4000/api");
        assert_eq!(config.cloud.temp_dir, Some(PathBuf::from("/tmp/segmentator")));
    }
}
