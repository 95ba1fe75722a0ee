//! Requirement reconciliation engine
//!
//! Compares the desired requirement list against what the environment can
//! already import and installs the difference, one attempt per requirement.

use std::path::Path;
use thiserror::Error;
use tracing::{error, info, warn};

use super::PackageRequirement;
use crate::env::RuntimeEnvironment;
use crate::exec::{CommandRunner, CommandSpec, ExecError, StdioMode};

/// What happened to a single requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementOutcome {
    /// Import probe succeeded, no install attempted
    Satisfied,
    /// Missing and installed successfully
    Installed,
    /// Missing, install failed, requirement was optional
    FailedOptional,
    /// Missing, install failed, requirement was required
    FailedRequired,
}

#[derive(Debug, Clone)]
pub struct RequirementReport {
    pub requirement: PackageRequirement,
    pub outcome: RequirementOutcome,
}

/// Aggregate result of a reconciliation pass
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub entries: Vec<RequirementReport>,
}

impl ReconcileReport {
    /// The required requirement that failed, if any
    pub fn fatal(&self) -> Option<&RequirementReport> {
        self.entries
            .iter()
            .find(|entry| entry.outcome == RequirementOutcome::FailedRequired)
    }

    /// True when optional requirements failed and the run continues degraded
    pub fn degraded(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.outcome == RequirementOutcome::FailedOptional)
    }

    fn count(&self, outcome: RequirementOutcome) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.outcome == outcome)
            .count()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} satisfied, {} installed, {} optional failures",
            self.count(RequirementOutcome::Satisfied),
            self.count(RequirementOutcome::Installed),
            self.count(RequirementOutcome::FailedOptional),
        )
    }
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Failed to install required package '{name}'")]
    InstallFailed { name: String },
    #[error(transparent)]
    Exec(#[from] ExecError),
}

/// Check whether the environment can import a requirement's module
pub fn probe(
    interpreter: &Path,
    requirement: &PackageRequirement,
    runner: &mut dyn CommandRunner,
) -> Result<bool, ExecError> {
    let import = format!("import {}", requirement.module);
    let outcome = runner.run(CommandSpec::new(
        interpreter.to_string_lossy().to_string(),
        ["-c", import.as_str()],
    ))?;
    Ok(outcome.success())
}

/// Reconcile the requirement list against the environment, in order
///
/// Stops at the first required-package install failure; the caller decides
/// what the aggregate report means for the run.
pub fn reconcile(
    env: &RuntimeEnvironment,
    requirements: &[PackageRequirement],
    runner: &mut dyn CommandRunner,
) -> Result<ReconcileReport, ReconcileError> {
    let mut report = ReconcileReport::default();
    let total = requirements.len();

    for (index, requirement) in requirements.iter().enumerate() {
        let position = index + 1;

        if probe(&env.interpreter, requirement, runner)? {
            info!("✅ [{}/{}] {} available", position, total, requirement.name);
            report.entries.push(RequirementReport {
                requirement: requirement.clone(),
                outcome: RequirementOutcome::Satisfied,
            });
            continue;
        }

        info!(
            "📦 [{}/{}] {} missing, installing...",
            position, total, requirement.name
        );

        let outcome = runner.run(
            CommandSpec::new(
                env.interpreter.to_string_lossy().to_string(),
                ["-m", "pip", "install", requirement.name.as_str()],
            )
            .stdio(StdioMode::Inherit),
        )?;

        if outcome.success() {
            info!("✅ [{}/{}] {} installed", position, total, requirement.name);
            report.entries.push(RequirementReport {
                requirement: requirement.clone(),
                outcome: RequirementOutcome::Installed,
            });
        } else if requirement.optional {
            warn!(
                "⚠️  [{}/{}] optional package {} failed to install, continuing without it",
                position, total, requirement.name
            );
            report.entries.push(RequirementReport {
                requirement: requirement.clone(),
                outcome: RequirementOutcome::FailedOptional,
            });
        } else {
            error!(
                "❌ [{}/{}] required package {} failed to install",
                position, total, requirement.name
            );
            report.entries.push(RequirementReport {
                requirement: requirement.clone(),
                outcome: RequirementOutcome::FailedRequired,
            });
            // Later requirements may assume this one; stop here
            break;
        }
    }

    Ok(report)
}
