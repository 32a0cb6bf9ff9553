use std::time::Instant;

use reqwest::header::{ACCEPT, AUTHORIZATION};

use crate::config::{API_KEY_ENV, ExplanationConfig};
use crate::error::AdvisorError;

#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthRow {
    pub check: String,
    pub status: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affects: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthReport {
    pub healthy: usize,
    pub total: usize,
    pub rows: Vec<HealthRow>,
}

const AFFECTS_EXPLANATION: &str = "[AI Model Explanation] section (local report unaffected)";

impl HealthReport {
    pub fn all_healthy(&self) -> bool {
        self.healthy == self.total
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let show_affects = self.rows.iter().any(|row| row.affects.is_some());
        out.push_str("# Clopidogrel Advisor Health Check\n\n");
        if show_affects {
            out.push_str("| Check | Status | Detail | Affects |\n");
            out.push_str("|-------|--------|--------|---------|\n");
            for row in &self.rows {
                let affects = row.affects.as_deref().unwrap_or("-");
                out.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    row.check, row.status, row.detail, affects
                ));
            }
        } else {
            out.push_str("| Check | Status | Detail |\n");
            out.push_str("|-------|--------|--------|\n");
            for row in &self.rows {
                out.push_str(&format!(
                    "| {} | {} | {} |\n",
                    row.check, row.status, row.detail
                ));
            }
        }
        out.push_str(&format!(
            "\nStatus: {}/{} checks healthy\n",
            self.healthy, self.total
        ));
        out
    }
}

fn check_credential(config: &ExplanationConfig) -> HealthRow {
    if config.api_key.is_some() {
        HealthRow {
            check: "API key".into(),
            status: "ok".into(),
            detail: format!("{API_KEY_ENV} set"),
            affects: None,
        }
    } else {
        HealthRow {
            check: "API key".into(),
            status: "error".into(),
            detail: format!("{API_KEY_ENV} not set"),
            affects: Some(AFFECTS_EXPLANATION.into()),
        }
    }
}

async fn check_endpoint(client: &reqwest::Client, config: &ExplanationConfig) -> HealthRow {
    let url = config.endpoint("models");
    let start = Instant::now();
    let mut request = client.get(&url).header(ACCEPT, "application/json");
    if let Some(key) = config.api_key.as_deref() {
        request = request.header(AUTHORIZATION, format!("Bearer {key}"));
    }
    let check = format!("Model endpoint ({})", config.base_url);

    match request.send().await {
        Ok(resp) => {
            let status = resp.status();
            let elapsed = start.elapsed().as_millis();
            if status.is_success() {
                HealthRow {
                    check,
                    status: "ok".into(),
                    detail: format!("{elapsed}ms"),
                    affects: None,
                }
            } else {
                HealthRow {
                    check,
                    status: "error".into(),
                    detail: format!("{elapsed}ms (HTTP {})", status.as_u16()),
                    affects: Some(AFFECTS_EXPLANATION.into()),
                }
            }
        }
        Err(err) => {
            let reason = if err.is_timeout() {
                "timeout"
            } else if err.is_connect() {
                "connect"
            } else {
                "error"
            };
            HealthRow {
                check,
                status: "error".into(),
                detail: reason.into(),
                affects: Some(AFFECTS_EXPLANATION.into()),
            }
        }
    }
}

/// Checks the credential and the reachability of the configured model endpoint.
///
/// # Errors
///
/// Returns an error when the HTTP client cannot be created.
pub async fn check(config: &ExplanationConfig) -> Result<HealthReport, AdvisorError> {
    let client = crate::sources::http_client(config.timeout)?;
    let rows = vec![
        check_credential(config),
        check_endpoint(&client, config).await,
    ];
    let healthy = rows.iter().filter(|r| r.status == "ok").count();
    Ok(HealthReport {
        healthy,
        total: rows.len(),
        rows,
    })
}
