use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AdvisorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmokingStatus {
    Smoker,
    NonSmoker,
}

impl SmokingStatus {
    /// Interprets the form's "Yes"/"No" flag. Anything other than "yes" is a non-smoker.
    pub fn from_flag(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("yes") {
            Self::Smoker
        } else {
            Self::NonSmoker
        }
    }

    pub fn is_smoker(self) -> bool {
        matches!(self, Self::Smoker)
    }
}

impl fmt::Display for SmokingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_smoker() { "Yes" } else { "No" })
    }
}

/// Weight in kg over height in m squared, rounded to one decimal place (ties to even).
///
/// Both values are always the current ones; nothing is cached between calls.
pub fn bmi(height_cm: f64, weight_kg: f64) -> f64 {
    if !height_cm.is_finite() || height_cm <= 0.0 {
        return 0.0;
    }
    let height_m = height_cm / 100.0;
    let value = weight_kg / (height_m * height_m);
    if !value.is_finite() {
        return 0.0;
    }
    (value * 10.0).round_ties_even() / 10.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyMetrics {
    pub height_cm: f64,
    pub weight_kg: f64,
}

impl BodyMetrics {
    pub fn bmi(&self) -> f64 {
        bmi(self.height_cm, self.weight_kg)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientInput {
    pub age: f64,
    pub gender: Gender,
    pub ethnicity: String,
    pub genotype: String,
    pub smoker: SmokingStatus,
    pub history: String,
    #[serde(flatten)]
    pub metrics: BodyMetrics,
}

impl PatientInput {
    pub fn bmi(&self) -> f64 {
        self.metrics.bmi()
    }

    /// Boundary checks for form input; the classifier itself accepts anything.
    pub fn validate(&self) -> Result<(), AdvisorError> {
        if !self.age.is_finite() || self.age < 0.0 {
            return Err(AdvisorError::InvalidArgument(
                "--age must be a number >= 0".into(),
            ));
        }
        validate_positive("--height", self.metrics.height_cm)?;
        validate_positive("--weight", self.metrics.weight_kg)?;
        Ok(())
    }
}

pub(crate) fn validate_positive(flag: &str, value: f64) -> Result<(), AdvisorError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AdvisorError::InvalidArgument(format!(
            "{flag} must be a number > 0"
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn sample_patient() -> PatientInput {
    PatientInput {
        age: 45.0,
        gender: Gender::Female,
        ethnicity: "Asian".into(),
        genotype: "CYP2C19*1/*1".into(),
        smoker: SmokingStatus::NonSmoker,
        history: "none".into(),
        metrics: BodyMetrics {
            height_cm: 170.0,
            weight_kg: 70.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmi_rounds_to_one_decimal() {
        assert_eq!(bmi(170.0, 70.0), 24.2);
        assert_eq!(bmi(180.0, 81.0), 25.0);
    }

    #[test]
    fn bmi_rounds_half_way_values_to_even() {
        // 97 / 2.0^2 is exactly 24.25.
        assert_eq!(bmi(200.0, 97.0), 24.2);
        assert_eq!(format!("{:.1}", bmi(200.0, 97.0)), "24.2");
        // 99 / 2.0^2 is exactly 24.75.
        assert_eq!(bmi(200.0, 99.0), 24.8);
    }

    #[test]
    fn bmi_uses_both_current_values() {
        let mut metrics = BodyMetrics {
            height_cm: 170.0,
            weight_kg: 70.0,
        };
        assert_eq!(metrics.bmi(), 24.2);
        metrics.height_cm = 160.0;
        assert_eq!(metrics.bmi(), 27.3);
        metrics.weight_kg = 60.0;
        assert_eq!(metrics.bmi(), 23.4);
    }

    #[test]
    fn bmi_falls_back_to_zero_for_unusable_height() {
        assert_eq!(bmi(0.0, 70.0), 0.0);
        assert_eq!(bmi(-10.0, 70.0), 0.0);
        assert_eq!(bmi(f64::NAN, 70.0), 0.0);
    }

    #[test]
    fn smoker_flag_is_case_insensitive() {
        assert_eq!(SmokingStatus::from_flag("Yes"), SmokingStatus::Smoker);
        assert_eq!(SmokingStatus::from_flag(" YES "), SmokingStatus::Smoker);
        assert_eq!(SmokingStatus::from_flag("No"), SmokingStatus::NonSmoker);
        assert_eq!(SmokingStatus::from_flag(""), SmokingStatus::NonSmoker);
        assert_eq!(SmokingStatus::from_flag("sometimes"), SmokingStatus::NonSmoker);
        assert_eq!(SmokingStatus::Smoker.to_string(), "Yes");
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut patient = sample_patient();
        assert!(patient.validate().is_ok());

        patient.age = -1.0;
        let err = patient.validate().expect_err("negative age");
        assert!(err.to_string().contains("--age"));

        patient.age = 0.0;
        patient.metrics.height_cm = 0.0;
        let err = patient.validate().expect_err("zero height");
        assert!(err.to_string().contains("--height"));

        patient.metrics.height_cm = 170.0;
        patient.metrics.weight_kg = f64::INFINITY;
        let err = patient.validate().expect_err("infinite weight");
        assert!(err.to_string().contains("--weight"));
    }
}
