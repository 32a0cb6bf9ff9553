use crate::entities::explanation::Explanation;
use crate::entities::metabolizer::Classification;
use crate::entities::patient::PatientInput;

const DISCLAIMER: &str =
    "⚠️ This assessment is not a substitute for medical tests or professional consultation.";
pub const EXPLANATION_HEADING: &str = "[AI Model Explanation]";

pub fn render(patient: &PatientInput, classification: &Classification) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Patient metabolizer status: {}\n",
        classification.category
    ));
    out.push_str(&format!(
        "Clopidogrel suitability: {}\n",
        classification.suitability
    ));

    out.push_str("\nAlerts:");
    if classification.alerts.is_empty() {
        out.push_str("\n- None");
    } else {
        for alert in &classification.alerts {
            out.push_str(&format!("\n- {alert}"));
        }
    }

    out.push_str(&format!(
        "\n\nPatient metrics: Height {:?} cm, Weight {:?} kg, BMI {:.1}",
        patient.metrics.height_cm,
        patient.metrics.weight_kg,
        patient.bmi()
    ));
    out.push_str("\n\n");
    out.push_str(DISCLAIMER);

    out.trim().to_string()
}

pub fn with_explanation(report: &str, explanation: &Explanation) -> String {
    format!(
        "{report}\n\n{EXPLANATION_HEADING}\n{}",
        explanation.as_text()
    )
}
