// ============================================================================
// Segmentator Cloud
// ============================================================================
// Publication d'une segmentation TotalSegmentator et des métriques de santé
// dérivées vers le service de suivi familial.
// ============================================================================

pub mod cloud_client;
pub mod config;
pub mod engine;
pub mod metrics;
pub mod reporting;
pub mod segmentation;
pub mod workflow;

pub use cloud_client::errors::{CloudClientError, CloudResult};
pub use cloud_client::{CloudApi, CloudClient};
pub use config::{AppConfig, CloudConfig, EngineConfig};
pub use engine::{CommandEngine, EngineError, InputVolume, ManifestEngine, SegmentationEngine};
pub use metrics::{calculate_health_metrics, HealthMetrics, MetricsError};
pub use reporting::{CloudStatus, CollectingReporter, ErrorReporter, LogReporter, SharedStatus, StatusIndicator};
pub use segmentation::{ManifestSegmentation, SegmentStatistics, Segmentation, SegmentationError};
pub use workflow::{WorkflowController, WorkflowError, WorkflowOutcome};
