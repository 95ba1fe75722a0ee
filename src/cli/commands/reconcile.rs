//! Reconcile command verifying and installing required packages

use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;

use crate::env;
use crate::exec::SystemRunner;
use crate::packages::{self, ReconcileError};
use crate::profile::LaunchProfile;
use crate::prompt::Confirm;

#[derive(Args, Clone)]
pub struct ReconcileArgs {}

pub struct ReconcileCommand {
    _args: ReconcileArgs,
}

impl ReconcileCommand {
    pub fn new(args: ReconcileArgs) -> Self {
        Self { _args: args }
    }

    pub async fn execute(
        &self,
        profile: LaunchProfile,
        mut confirm: Box<dyn Confirm>,
    ) -> Result<i32> {
        println!("{}", "📦 Package Reconciliation".bright_blue().bold());
        println!("═══════════════════════════════════════");

        let mut runner = SystemRunner;
        let env = env::locate(
            &profile.env_dir,
            &profile.interpreters,
            confirm.as_mut(),
            &mut runner,
        )?;

        let report = packages::reconcile(&env, &profile.requirements, &mut runner)?;
        if let Some(fatal) = report.fatal() {
            let name = fatal.requirement.name.clone();
            return Err(ReconcileError::InstallFailed { name }.into());
        }

        println!();
        if report.degraded() {
            println!(
                "{}",
                format!("⚠️  Completed with optional packages missing ({})", report.summary())
                    .yellow()
            );
        } else {
            println!(
                "{}",
                format!("✅ All requirements satisfied ({})", report.summary())
                    .bright_green()
                    .bold()
            );
        }

        Ok(0)
    }
}
