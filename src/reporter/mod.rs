// file: src/reporter/mod.rs
// version: 1.0.0
// guid: b47e1d28-6c93-4a0f-85d7-3e9a2c6f1b84

//! Deployment run reporting

use crate::deploy::DeployStep;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// Status of a step execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Step completed successfully
    Completed,

    /// Step failed
    Failed,

    /// Step was not run because an earlier step failed
    Skipped,
}

/// Outcome of a single deploy step
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub step: DeployStep,
    pub description: String,
    pub status: StepStatus,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Summary of one deployment run
#[derive(Debug, Clone, Serialize)]
pub struct DeployReport {
    pub session_id: Uuid,
    pub tool: String,
    pub port: String,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub steps: Vec<StepRecord>,
}

impl DeployReport {
    pub fn new(tool: impl Into<String>, port: impl Into<String>, dry_run: bool) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            tool: tool.into(),
            port: port.into(),
            dry_run,
            started_at: Utc::now(),
            finished_at: None,
            steps: Vec::new(),
        }
    }

    pub fn record(
        &mut self,
        step: &DeployStep,
        status: StepStatus,
        duration: Duration,
        message: Option<String>,
    ) {
        self.steps.push(StepRecord {
            description: step.describe(),
            step: step.clone(),
            status,
            duration_ms: duration.as_millis() as u64,
            message,
        });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn count(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Failed)
    }

    /// True when no step failed or was skipped
    pub fn succeeded(&self) -> bool {
        self.steps
            .iter()
            .all(|s| s.status == StepStatus::Completed)
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable summary
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        let elapsed = self
            .finished_at
            .map(|end| (end - self.started_at).num_milliseconds() as f64 / 1000.0)
            .unwrap_or_default();

        out.push_str(&format!(
            "{} {} via {} on {}\n",
            if self.dry_run { "Dry run" } else { "Deploy" },
            self.session_id.to_string().dimmed(),
            self.tool,
            self.port.bold()
        ));

        for record in &self.steps {
            let mark = match record.status {
                StepStatus::Completed => "ok".green(),
                StepStatus::Failed => "FAILED".red().bold(),
                StepStatus::Skipped => "skipped".yellow(),
            };
            out.push_str(&format!("  [{}] {}", mark, record.description));
            if let Some(ref msg) = record.message {
                out.push_str(&format!(" ({})", msg));
            }
            out.push('\n');
        }

        let line = format!(
            "{} completed, {} failed, {} skipped in {:.1}s",
            self.count(StepStatus::Completed),
            self.count(StepStatus::Failed),
            self.count(StepStatus::Skipped),
            elapsed
        );
        if self.succeeded() {
            out.push_str(&line.green().to_string());
        } else {
            out.push_str(&line.red().to_string());
        }
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DeployReport {
        let mut report = DeployReport::new("mpremote", "/dev/ttyACM0", false);
        report.record(
            &DeployStep::MakeDir {
                remote: "lib".to_string(),
            },
            StepStatus::Completed,
            Duration::from_millis(120),
            Some("already exists".to_string()),
        );
        report.record(
            &DeployStep::Reset,
            StepStatus::Failed,
            Duration::from_millis(30),
            Some("no device".to_string()),
        );
        report.finish();
        report
    }

    #[test]
    fn test_counts_and_success() {
        let report = sample();
        assert_eq!(report.count(StepStatus::Completed), 1);
        assert_eq!(report.count(StepStatus::Failed), 1);
        assert_eq!(report.failures().count(), 1);
        assert!(!report.succeeded());
    }

    #[test]
    fn test_empty_report_succeeds() {
        let report = DeployReport::new("mpremote", "/dev/ttyACM0", true);
        assert!(report.succeeded());
    }

    #[test]
    fn test_json_shape() {
        let report = sample();
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["port"], "/dev/ttyACM0");
        assert_eq!(json["steps"][0]["status"], "completed");
        assert_eq!(json["steps"][0]["step"]["kind"], "make_dir");
        assert_eq!(json["steps"][1]["status"], "failed");
        assert_eq!(json["steps"][1]["duration_ms"], 30);
    }

    #[test]
    fn test_summary_mentions_failures() {
        colored::control::set_override(false);
        let summary = sample().render_summary();
        assert!(summary.contains("[FAILED] reset device"));
        assert!(summary.contains("1 completed, 1 failed, 0 skipped"));
    }
}
