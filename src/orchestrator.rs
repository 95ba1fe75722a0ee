//! Stage sequencing for the launch pipeline
//!
//! Control flows strictly forward: locate the environment, compute platform
//! adjustments, reconcile requirements, launch. Failures in the first three
//! stages abort before the application is ever spawned.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::env;
use crate::exec::CommandRunner;
use crate::packages::{self, ReconcileError};
use crate::platform;
use crate::profile::LaunchProfile;
use crate::prompt::Confirm;
use crate::supervisor::{self, LaunchResult};

pub struct Orchestrator<'a> {
    profile: &'a LaunchProfile,
    confirm: &'a mut dyn Confirm,
    runner: &'a mut dyn CommandRunner,
    active_env: Option<PathBuf>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        profile: &'a LaunchProfile,
        confirm: &'a mut dyn Confirm,
        runner: &'a mut dyn CommandRunner,
    ) -> Self {
        Self {
            profile,
            confirm,
            runner,
            active_env: env::active_environment(),
        }
    }

    /// Override active-environment detection
    pub fn with_active(mut self, active: Option<PathBuf>) -> Self {
        self.active_env = active;
        self
    }

    /// Run all four stages, returning the application's terminal result
    pub fn run(&mut self) -> Result<LaunchResult> {
        // Stage 1: environment
        let env = env::locate_with_active(
            self.active_env.clone(),
            &self.profile.env_dir,
            &self.profile.interpreters,
            &mut *self.confirm,
            &mut *self.runner,
        )
        .context("Environment setup failed")?;
        info!("🐍 Using interpreter {}", env.interpreter.display());

        // Stage 2: platform adjustments (cannot fail)
        let adjustments = platform::adjustments();
        for adjustment in &adjustments {
            info!(
                "🔧 Passing {}={} to the application",
                adjustment.key, adjustment.value
            );
        }

        // Stage 3: requirements
        let report = packages::reconcile(&env, &self.profile.requirements, &mut *self.runner)
            .context("Dependency reconciliation failed")?;
        if let Some(fatal) = report.fatal() {
            let name = fatal.requirement.name.clone();
            return Err(ReconcileError::InstallFailed { name })
                .context("Dependency reconciliation failed");
        }
        if report.degraded() {
            warn!(
                "⚠️  Continuing with optional packages missing ({})",
                report.summary()
            );
        } else {
            info!("📊 Requirements: {}", report.summary());
        }

        // Stage 4: launch
        let result = supervisor::launch(
            &env,
            &self.profile.app_dir,
            &self.profile.entry,
            &adjustments,
            &mut *self.runner,
        )?;

        Ok(result)
    }
}
