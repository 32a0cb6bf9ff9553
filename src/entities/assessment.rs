use serde::Serialize;

use crate::entities::explanation::{self, Explanation, ExplanationService};
use crate::entities::metabolizer::{self, MetabolizerCategory};
use crate::entities::patient::PatientInput;
use crate::render::report;

#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub patient: PatientInput,
    pub bmi: f64,
    pub metabolizer: MetabolizerCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diplotype: Option<String>,
    pub suitability: String,
    pub alerts: Vec<String>,
    pub report: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Explanation>,
}

impl Assessment {
    /// The local report, followed by the explanation section when one was requested.
    pub fn full_report(&self) -> String {
        match &self.explanation {
            Some(explanation) => report::with_explanation(&self.report, explanation),
            None => self.report.clone(),
        }
    }
}

/// Classifies and renders locally first; the explanation service, if any, only appends.
pub async fn assess(
    patient: PatientInput,
    service: Option<&dyn ExplanationService>,
) -> Assessment {
    let classification = metabolizer::classify_patient(&patient);
    let local_report = report::render(&patient, &classification);

    let explanation = match service {
        Some(service) => Some(explanation::explain(service, &patient).await),
        None => None,
    };

    Assessment {
        bmi: patient.bmi(),
        diplotype: metabolizer::diplotype(&patient.genotype),
        metabolizer: classification.category,
        suitability: classification.suitability,
        alerts: classification.alerts,
        report: local_report,
        explanation,
        patient,
    }
}
