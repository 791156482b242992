// ============================================================================
// Segmentator Cloud - Hôte en ligne de commande
// ============================================================================
// Remplace le module graphique: lance le workflow "Apply" ou interroge le
// service distant, puis affiche les réponses JSON.
// ============================================================================

use clap::{Parser, Subcommand};
use log::{error, info};
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use segmentator_cloud::config::{get_config, AppConfig};
use segmentator_cloud::{
    CloudApi, CloudClient, CommandEngine, ErrorReporter, InputVolume, LogReporter, ManifestEngine,
    ManifestSegmentation, SegmentationEngine, SharedStatus, StatusIndicator, WorkflowController, WorkflowOutcome,
};

#[derive(Parser)]
#[command(name = "segmentator-cloud", version, about = "TotalSegmentator -> service de suivi familial")]
struct Cli {
    /// Racine de l'API (remplace la configuration)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segmente un volume puis publie le résultat et les métriques
    Apply {
        #[arg(long)]
        input: PathBuf,
        /// Fichier de segmentation à produire
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value = "")]
        patient_id: String,
        #[arg(long, default_value = "")]
        family_id: String,
    },
    /// Publie une segmentation existante décrite par un manifeste JSON
    Upload {
        #[arg(long)]
        manifest: PathBuf,
        #[arg(long)]
        patient_id: String,
        #[arg(long)]
        family_id: String,
    },
    /// Historique médical familial
    FamilyHistory {
        #[arg(long)]
        family_id: String,
    },
    /// Facteurs de risque génétique
    GeneticRisk {
        #[arg(long)]
        family_id: String,
        #[arg(long)]
        patient_id: String,
    },
    /// Configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Affiche la configuration effective
    Show,
    /// Crée le fichier de configuration par défaut
    Init,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config: AppConfig = get_config().clone();
    if let Some(base_url) = cli.base_url {
        config.cloud.base_url = base_url;
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_str())).init();

    match run(cli.command, &config) {
        Ok(code) => code,
        Err(e) => {
            error!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, config: &AppConfig) -> Result<ExitCode, String> {
    let reporter: Arc<dyn ErrorReporter> = Arc::new(LogReporter);

    match command {
        Commands::Apply {
            input,
            output,
            patient_id,
            family_id,
        } => {
            let cloud = CloudClient::new(&config.cloud, reporter.clone())?;
            let engine = CommandEngine::new(&config.engine);
            let mut segmentation = ManifestSegmentation::new(output);
            let outcome = apply(
                engine,
                cloud,
                reporter,
                &InputVolume::new(input),
                &mut segmentation,
                &patient_id,
                &family_id,
            );
            Ok(exit_code(outcome))
        }
        Commands::Upload {
            manifest,
            patient_id,
            family_id,
        } => {
            let cloud = CloudClient::new(&config.cloud, reporter.clone())?;
            let mut segmentation = ManifestSegmentation::default();
            let outcome = apply(
                ManifestEngine,
                cloud,
                reporter,
                &manifest,
                &mut segmentation,
                &patient_id,
                &family_id,
            );
            Ok(exit_code(outcome))
        }
        Commands::FamilyHistory { family_id } => {
            let cloud = CloudClient::new(&config.cloud, reporter)?;
            print_response(cloud.get_family_history(&family_id))
        }
        Commands::GeneticRisk { family_id, patient_id } => {
            let cloud = CloudClient::new(&config.cloud, reporter)?;
            print_response(cloud.get_genetic_risk_factors(&family_id, &patient_id))
        }
        Commands::Config { action: ConfigAction::Show } => {
            println!("{}", config.to_toml()?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config { action: ConfigAction::Init } => {
            match AppConfig::ensure_config_file()? {
                Some(path) => info!("✅ [Config] Fichier de configuration créé: {:?}", path),
                None => info!("[Config] Fichier de configuration déjà présent"),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn apply<E>(
    engine: E,
    cloud: CloudClient,
    reporter: Arc<dyn ErrorReporter>,
    input: &E::Volume,
    output: &mut E::Output,
    patient_id: &str,
    family_id: &str,
) -> WorkflowOutcome
where
    E: SegmentationEngine,
{
    let status = Arc::new(SharedStatus::new());
    let indicator: Arc<dyn StatusIndicator> = status.clone();
    let controller = WorkflowController::new(engine, cloud, reporter, indicator);

    let outcome = controller.run_apply_workflow(Some(input), Some(output), patient_id, family_id);
    if let Some(last) = status.current() {
        println!("{}", last);
    }
    outcome
}

fn exit_code(outcome: WorkflowOutcome) -> ExitCode {
    match outcome {
        WorkflowOutcome::Published | WorkflowOutcome::LocalOnly => ExitCode::SUCCESS,
        WorkflowOutcome::UploadFailed | WorkflowOutcome::Failed => ExitCode::FAILURE,
    }
}

fn print_response(response: Option<Value>) -> Result<ExitCode, String> {
    match response {
        Some(body) => {
            let text = serde_json::to_string_pretty(&body).map_err(|e| e.to_string())?;
            println!("{}", text);
            Ok(ExitCode::SUCCESS)
        }
        None => Ok(ExitCode::FAILURE),
    }
}
