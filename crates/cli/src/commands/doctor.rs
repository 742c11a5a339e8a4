use std::path::PathBuf;

use serde::Serialize;

use itinera_core::config::{AppConfig, LoadOptions};

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: &'static str,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    status: &'static str,
    checks: Vec<DoctorCheck>,
}

/// Offline readiness checks: configuration loads, endpoints look like
/// URLs, credentials present where the deployment expects them.
pub fn run(config_path: Option<PathBuf>, json: bool) -> CommandResult {
    let (report, exit_code) = build_report(config_path);

    let output = if json {
        serde_json::to_string_pretty(&report)
            .unwrap_or_else(|error| format!("{{\"status\":\"error\",\"detail\":\"{error}\"}}"))
    } else {
        render_text(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(config_path: Option<PathBuf>) -> (DoctorReport, u8) {
    let config = match AppConfig::load(LoadOptions { config_path, ..LoadOptions::default() }) {
        Ok(config) => config,
        Err(error) => {
            let report = DoctorReport {
                status: "error",
                checks: vec![DoctorCheck {
                    name: "config_load",
                    status: "error",
                    detail: error.to_string(),
                }],
            };
            return (report, 2);
        }
    };

    let mut checks = vec![DoctorCheck {
        name: "config_load",
        status: "ok",
        detail: "configuration loaded and validated".to_string(),
    }];

    checks.push(url_check("llm_base_url", &config.llm.base_url));
    checks.push(url_check("retrieval_base_url", &config.retrieval.base_url));
    checks.push(DoctorCheck {
        name: "retrieval_index",
        status: "ok",
        detail: format!("index `{}` with top_k {}", config.retrieval.index_name, config.retrieval.top_k),
    });
    checks.push(DoctorCheck {
        name: "retrieval_api_key",
        status: "ok",
        detail: if config.retrieval.api_key.is_some() {
            "api key configured".to_string()
        } else {
            "no api key configured (fine for local indexes)".to_string()
        },
    });

    let failed = checks.iter().any(|check| check.status != "ok");
    let report =
        DoctorReport { status: if failed { "error" } else { "ok" }, checks };
    (report, u8::from(failed))
}

fn url_check(name: &'static str, value: &str) -> DoctorCheck {
    if value.starts_with("http://") || value.starts_with("https://") {
        DoctorCheck { name, status: "ok", detail: value.to_string() }
    } else {
        DoctorCheck {
            name,
            status: "error",
            detail: format!("`{value}` does not look like an http(s) URL"),
        }
    }
}

fn render_text(report: &DoctorReport) -> String {
    let mut lines = vec![format!("doctor: {}", report.status)];
    for check in &report.checks {
        lines.push(format!("  [{}] {}: {}", check.status, check.name, check.detail));
    }
    lines.join("\n")
}
