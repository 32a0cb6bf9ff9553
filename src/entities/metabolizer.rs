use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::entities::patient::{PatientInput, SmokingStatus};

const POOR_PATTERNS: &[&str] = &["*2/*2", "*2/*3", "*3/*3"];
const INTERMEDIATE_PATTERNS: &[&str] = &["*1/*2", "*1/*3"];
const EXTENSIVE_PATTERNS: &[&str] = &["*1/*1"];

const ADVANCED_AGE_YEARS: f64 = 65.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetabolizerCategory {
    Poor,
    Intermediate,
    Extensive,
    Unknown,
}

impl MetabolizerCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Poor => "Poor metabolizer",
            Self::Intermediate => "Intermediate metabolizer",
            Self::Extensive => "Extensive metabolizer",
            Self::Unknown => "Unknown metabolizer status",
        }
    }
}

impl fmt::Display for MetabolizerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskFactor {
    Smoking,
    AdvancedAge,
    Diabetes,
    HeartDisease,
}

impl RiskFactor {
    pub fn label(self) -> &'static str {
        match self {
            Self::Smoking => "smoking",
            Self::AdvancedAge => "advanced age",
            Self::Diabetes => "diabetes",
            Self::HeartDisease => "heart disease",
        }
    }

    pub fn alert(self) -> &'static str {
        match self {
            Self::Smoking => "Patient is a smoker.",
            Self::AdvancedAge => "Patient is older than 65.",
            Self::Diabetes => "Patient has diabetes.",
            Self::HeartDisease => "Patient has heart disease.",
        }
    }
}

/// Risk factors present in the input, always in smoker, age, diabetes, heart disease order.
pub fn risk_factors(age: f64, smoker: SmokingStatus, history: &str) -> Vec<RiskFactor> {
    let history = history.to_lowercase();
    let mut out = Vec::new();
    if smoker.is_smoker() {
        out.push(RiskFactor::Smoking);
    }
    if age > ADVANCED_AGE_YEARS {
        out.push(RiskFactor::AdvancedAge);
    }
    if history.contains("diabetes") {
        out.push(RiskFactor::Diabetes);
    }
    if history.contains("heart disease") {
        out.push(RiskFactor::HeartDisease);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: MetabolizerCategory,
    pub suitability: String,
    pub alerts: Vec<String>,
}

pub fn normalize_genotype(genotype: &str) -> String {
    genotype
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

fn contains_any(haystack: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|pattern| haystack.contains(pattern))
}

/// Category by substring match on the normalized genotype; first match wins.
pub fn category_for(genotype: &str) -> MetabolizerCategory {
    let normalized = normalize_genotype(genotype);
    if contains_any(&normalized, POOR_PATTERNS) {
        MetabolizerCategory::Poor
    } else if contains_any(&normalized, INTERMEDIATE_PATTERNS) {
        MetabolizerCategory::Intermediate
    } else if contains_any(&normalized, EXTENSIVE_PATTERNS) {
        MetabolizerCategory::Extensive
    } else {
        MetabolizerCategory::Unknown
    }
}

fn unknown_genotype_suitability(risks: &[RiskFactor]) -> String {
    if risks.is_empty() {
        return "Genotype unknown; standard treatment may be considered.".to_string();
    }
    let labels = risks
        .iter()
        .map(|risk| risk.label())
        .collect::<Vec<_>>()
        .join(", ");
    format!("Genotype unknown; risk factors present ({labels}), use cautiously.")
}

pub fn classify(
    genotype: &str,
    age: f64,
    smoker: SmokingStatus,
    history: &str,
) -> Classification {
    let category = category_for(genotype);
    let risks = risk_factors(age, smoker, history);

    // Risk factors only shape the wording when the genotype is not recognized.
    let suitability = match category {
        MetabolizerCategory::Poor => {
            "Clopidogrel may be less effective; consider alternatives.".to_string()
        }
        MetabolizerCategory::Intermediate => {
            "Effectiveness may be reduced; monitor closely.".to_string()
        }
        MetabolizerCategory::Extensive => "Clopidogrel likely effective.".to_string(),
        MetabolizerCategory::Unknown => unknown_genotype_suitability(&risks),
    };

    Classification {
        category,
        suitability,
        alerts: risks.iter().map(|risk| risk.alert().to_string()).collect(),
    }
}

pub fn classify_patient(patient: &PatientInput) -> Classification {
    classify(
        &patient.genotype,
        patient.age,
        patient.smoker,
        &patient.history,
    )
}

fn diplotype_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\d+[a-z]?/\*\d+[a-z]?").expect("valid regex"))
}

/// First star-allele pair in the genotype, e.g. `*1/*2`. Display only.
pub fn diplotype(genotype: &str) -> Option<String> {
    let normalized = normalize_genotype(genotype);
    diplotype_re()
        .find(&normalized)
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poor_patterns_match_any_casing_and_whitespace() {
        for genotype in [
            "CYP2C19*2/*2",
            "cyp2c19 *2 / *3",
            "*3/*3",
            " CYP2C19 * 2/*2 ",
        ] {
            assert_eq!(
                category_for(genotype),
                MetabolizerCategory::Poor,
                "{genotype}"
            );
        }
    }

    #[test]
    fn intermediate_and_extensive_patterns() {
        assert_eq!(
            category_for("CYP2C19*1/*2"),
            MetabolizerCategory::Intermediate
        );
        assert_eq!(
            category_for("CYP2C19*1/*3"),
            MetabolizerCategory::Intermediate
        );
        assert_eq!(category_for("CYP2C19*1/*1"), MetabolizerCategory::Extensive);
    }

    #[test]
    fn first_matching_rule_wins() {
        // Contains both `*1/*2` and `*2/*3`; the poor rule is checked first.
        assert_eq!(category_for("*1/*2/*3"), MetabolizerCategory::Poor);
        assert_eq!(category_for("*1/*1 *1/*3"), MetabolizerCategory::Intermediate);
    }

    #[test]
    fn unrecognized_or_empty_genotype_is_unknown() {
        assert_eq!(category_for(""), MetabolizerCategory::Unknown);
        assert_eq!(category_for("CYP2C19*17/*17"), MetabolizerCategory::Unknown);
        assert_eq!(category_for("not tested"), MetabolizerCategory::Unknown);
    }

    #[test]
    fn extensive_suitability_ignores_risk_factors() {
        let low_risk = classify("CYP2C19*1/*1", 30.0, SmokingStatus::NonSmoker, "none");
        let high_risk = classify(
            "cyp2c19*1/*1",
            80.0,
            SmokingStatus::Smoker,
            "diabetes, heart disease",
        );
        assert_eq!(low_risk.category, MetabolizerCategory::Extensive);
        assert_eq!(low_risk.suitability, "Clopidogrel likely effective.");
        assert_eq!(high_risk.suitability, low_risk.suitability);
        assert_eq!(high_risk.alerts.len(), 4);
    }

    #[test]
    fn unknown_suitability_names_risk_factors() {
        let result = classify("", 70.0, SmokingStatus::Smoker, "");
        assert_eq!(result.category, MetabolizerCategory::Unknown);
        assert!(result.suitability.contains("smoking"));
        assert!(result.suitability.contains("advanced age"));
        assert_eq!(
            result.suitability,
            "Genotype unknown; risk factors present (smoking, advanced age), use cautiously."
        );
    }

    #[test]
    fn unknown_suitability_without_risk_factors() {
        let result = classify("unknown", 30.0, SmokingStatus::NonSmoker, "none");
        assert_eq!(
            result.suitability,
            "Genotype unknown; standard treatment may be considered."
        );
        assert!(result.alerts.is_empty());
    }

    #[test]
    fn alerts_keep_fixed_order() {
        let result = classify(
            "CYP2C19*2/*2",
            70.0,
            SmokingStatus::Smoker,
            "Diabetes and Heart Disease",
        );
        assert_eq!(
            result.alerts,
            vec![
                "Patient is a smoker.",
                "Patient is older than 65.",
                "Patient has diabetes.",
                "Patient has heart disease.",
            ]
        );
    }

    #[test]
    fn age_threshold_is_strictly_greater_than_65() {
        assert!(risk_factors(65.0, SmokingStatus::NonSmoker, "").is_empty());
        assert_eq!(
            risk_factors(65.5, SmokingStatus::NonSmoker, ""),
            vec![RiskFactor::AdvancedAge]
        );
    }

    #[test]
    fn classification_is_repeatable() {
        let first = classify("*1/*3", 67.0, SmokingStatus::Smoker, "diabetes");
        let second = classify("*1/*3", 67.0, SmokingStatus::Smoker, "diabetes");
        assert_eq!(first, second);
    }

    #[test]
    fn diplotype_extracts_first_star_pair() {
        assert_eq!(diplotype("CYP2C19 *1/*2").as_deref(), Some("*1/*2"));
        assert_eq!(diplotype("CYP2C19*17/*17").as_deref(), Some("*17/*17"));
        assert_eq!(diplotype("not tested"), None);
    }
}
