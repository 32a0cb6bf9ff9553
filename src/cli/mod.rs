//! Top-level CLI parsing and command execution.

use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{debug, warn};

use crate::config::ExplanationConfig;
use crate::entities::assessment::{self, Assessment};
use crate::entities::explanation::{Explanation, ExplanationService};
use crate::entities::patient::{BodyMetrics, Gender, PatientInput, SmokingStatus};
use crate::error::AdvisorError;
use crate::sources::openrouter::OpenRouterClient;

pub mod health;

#[derive(Parser, Debug)]
#[command(
    name = "clopidogrel-advisor",
    about = "Estimate clopidogrel response from CYP2C19 genotype and clinical risk factors",
    version,
    after_help = "Advisory only. The assessment is not a substitute for medical tests or professional consultation."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON instead of plain text
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a patient and print the clopidogrel report
    #[command(after_help = "\
EXAMPLES:
  clopidogrel-advisor assess --age 70 --gender male --genotype 'CYP2C19*2/*2' --smoker yes
  clopidogrel-advisor assess --genotype 'CYP2C19*1/*1' --gender female --no-explain")]
    Assess {
        /// Age in years
        #[arg(long, default_value = "45", allow_hyphen_values = true)]
        age: f64,
        /// Gender (display only)
        #[arg(long, value_enum, ignore_case = true)]
        gender: Gender,
        /// Ethnicity (display only)
        #[arg(long, default_value = "")]
        ethnicity: String,
        /// CYP2C19 genotype, e.g. CYP2C19*2/*2
        #[arg(long, default_value = "")]
        genotype: String,
        /// Smoker? (Yes/No)
        #[arg(long, default_value = "No")]
        smoker: String,
        /// Short medical history summary
        #[arg(long, default_value = "")]
        history: String,
        /// Height in cm
        #[arg(long, default_value = "170", allow_hyphen_values = true)]
        height: f64,
        /// Weight in kg
        #[arg(long, default_value = "70", allow_hyphen_values = true)]
        weight: f64,
        /// Skip the hosted-model explanation section
        #[arg(long)]
        no_explain: bool,
        /// Model identifier for the explanation (overrides CLOPIDOGREL_ADVISOR_MODEL)
        #[arg(long)]
        model: Option<String>,
        /// Explanation request timeout in seconds (overrides CLOPIDOGREL_ADVISOR_TIMEOUT_SECS)
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Compute BMI from height and weight
    Bmi {
        /// Height in cm
        #[arg(long, allow_hyphen_values = true)]
        height: f64,
        /// Weight in kg
        #[arg(long, allow_hyphen_values = true)]
        weight: f64,
    },
    /// Check the explanation service configuration and connectivity
    Health,
    /// Show version
    Version,
}

fn version_output() -> String {
    format!(
        "clopidogrel-advisor {} (git {}, built {})",
        env!("CARGO_PKG_VERSION"),
        option_env!("CLOPIDOGREL_ADVISOR_BUILD_GIT_SHA").unwrap_or("unknown"),
        option_env!("CLOPIDOGREL_ADVISOR_BUILD_DATE").unwrap_or("unknown"),
    )
}

fn apply_overrides(
    mut config: ExplanationConfig,
    model: Option<String>,
    timeout_secs: Option<u64>,
) -> Result<ExplanationConfig, AdvisorError> {
    if let Some(model) = model.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        config.model = model;
    }
    if let Some(secs) = timeout_secs {
        if secs == 0 {
            return Err(AdvisorError::InvalidArgument(
                "--timeout-secs must be greater than 0".into(),
            ));
        }
        config.timeout = Duration::from_secs(secs);
    }
    Ok(config)
}

async fn assess_with_explanation(
    patient: PatientInput,
    config: Result<ExplanationConfig, AdvisorError>,
) -> Assessment {
    match config.and_then(OpenRouterClient::new) {
        Ok(client) => {
            debug!(config = ?client.config(), "Explanation client ready");
            assessment::assess(patient, Some(&client as &dyn ExplanationService)).await
        }
        Err(err) => {
            warn!("Explanation client unavailable: {err}");
            let mut out = assessment::assess(patient, None).await;
            out.explanation = Some(Explanation::Failed(err.to_string()));
            out
        }
    }
}

/// Executes a parsed command with an already-resolved explanation configuration.
pub async fn run_with_config(
    cli: Cli,
    config: Result<ExplanationConfig, AdvisorError>,
) -> anyhow::Result<String> {
    match cli.command {
        Commands::Assess {
            age,
            gender,
            ethnicity,
            genotype,
            smoker,
            history,
            height,
            weight,
            no_explain,
            model,
            timeout_secs,
        } => {
            let patient = PatientInput {
                age,
                gender,
                ethnicity,
                genotype,
                smoker: SmokingStatus::from_flag(&smoker),
                history,
                metrics: BodyMetrics {
                    height_cm: height,
                    weight_kg: weight,
                },
            };
            patient.validate()?;

            let assessment = if no_explain {
                assessment::assess(patient, None).await
            } else {
                let config = config.and_then(|c| apply_overrides(c, model, timeout_secs));
                assess_with_explanation(patient, config).await
            };

            if cli.json {
                Ok(crate::render::json::to_pretty(&assessment)?)
            } else {
                Ok(assessment.full_report())
            }
        }
        Commands::Bmi { height, weight } => {
            crate::entities::patient::validate_positive("--height", height)?;
            crate::entities::patient::validate_positive("--weight", weight)?;
            let bmi = crate::entities::patient::bmi(height, weight);
            if cli.json {
                Ok(crate::render::json::to_pretty(&serde_json::json!({
                    "height_cm": height,
                    "weight_kg": weight,
                    "bmi": bmi,
                }))?)
            } else {
                Ok(format!("{bmi:.1}"))
            }
        }
        Commands::Health => {
            let report = health::check(&config?).await?;
            if !report.all_healthy() {
                warn!(
                    healthy = report.healthy,
                    total = report.total,
                    "Explanation service checks failed"
                );
            }
            if cli.json {
                Ok(crate::render::json::to_pretty(&report)?)
            } else {
                Ok(report.to_markdown())
            }
        }
        Commands::Version => Ok(version_output()),
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<String> {
    run_with_config(cli, ExplanationConfig::from_env()).await
}

/// Parses `args` and runs the resulting command.
///
/// # Errors
///
/// Returns an error when CLI args cannot be parsed or when command execution fails.
pub async fn execute(mut args: Vec<String>) -> anyhow::Result<String> {
    if args.is_empty() {
        args.push("clopidogrel-advisor".to_string());
    }
    let cli = Cli::try_parse_from(args)?;
    run(cli).await
}
