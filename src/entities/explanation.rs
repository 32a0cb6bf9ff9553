use async_trait::async_trait;
use minijinja::{Environment, context};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::entities::patient::PatientInput;
use crate::error::AdvisorError;

const PROMPT_TEMPLATE: &str = "\
Given the following patient information:
- Age: {{ age }}
- Gender: {{ gender }}
- Ethnicity: {{ ethnicity }}
- Genotype: {{ genotype }}
- Smoker: {{ smoker }}
- Medical History: {{ history }}
- Height: {{ height_cm }} cm
- Weight: {{ weight_kg }} kg
- BMI: {{ bmi }}

Please provide a concise and clear clinical summary on the likelihood of Clopidogrel effectiveness.
Focus on key points only, such as genotype impact, risk factors, and recommendations,
using bullet points suitable for a healthcare professional.
Only output clean English text without any strange or non-English characters.
";

/// A hosted model that turns a prompt into free-text commentary.
#[async_trait]
pub trait ExplanationService: Send + Sync {
    async fn explain(&self, prompt: &str) -> Result<String, AdvisorError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum Explanation {
    Text(String),
    Failed(String),
}

impl Explanation {
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text(text) | Self::Failed(text) => text,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

pub fn build_prompt(patient: &PatientInput) -> Result<String, AdvisorError> {
    let mut env = Environment::new();
    env.add_template("explanation_prompt", PROMPT_TEMPLATE)?;
    let template = env.get_template("explanation_prompt")?;
    let prompt = template.render(context! {
        age => format!("{:?}", patient.age),
        gender => patient.gender.to_string(),
        ethnicity => patient.ethnicity.as_str(),
        genotype => patient.genotype.as_str(),
        smoker => patient.smoker.to_string(),
        history => patient.history.as_str(),
        height_cm => format!("{:?}", patient.metrics.height_cm),
        weight_kg => format!("{:?}", patient.metrics.weight_kg),
        bmi => format!("{:.1}", patient.bmi()),
    })?;
    Ok(prompt)
}

/// Asks the service for commentary. Never fails: any error becomes `Explanation::Failed`.
pub async fn explain(service: &dyn ExplanationService, patient: &PatientInput) -> Explanation {
    let prompt = match build_prompt(patient) {
        Ok(prompt) => prompt,
        Err(err) => {
            warn!("Explanation prompt could not be built: {err}");
            return Explanation::Failed(err.to_string());
        }
    };

    debug!(prompt_len = prompt.len(), "Requesting explanation");
    match service.explain(&prompt).await {
        Ok(text) => Explanation::Text(text),
        Err(err) => {
            warn!("Explanation service unavailable: {err}");
            Explanation::Failed(err.to_string())
        }
    }
}
