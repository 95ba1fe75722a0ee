//! Setup command creating or repairing the runtime environment

use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;

use crate::env;
use crate::exec::SystemRunner;
use crate::packages::{self, ReconcileError};
use crate::profile::LaunchProfile;
use crate::prompt::Confirm;

#[derive(Args, Clone)]
pub struct SetupArgs {
    /// Skip the offer to install packages after setup
    #[arg(long)]
    pub no_reconcile: bool,
}

pub struct SetupCommand {
    args: SetupArgs,
}

impl SetupCommand {
    pub fn new(args: SetupArgs) -> Self {
        Self { args }
    }

    pub async fn execute(
        &self,
        profile: LaunchProfile,
        mut confirm: Box<dyn Confirm>,
    ) -> Result<i32> {
        println!("{}", "🔧 Environment Setup".bright_blue().bold());
        println!("═══════════════════════════════════════");

        let mut runner = SystemRunner;
        let env = env::locate(
            &profile.env_dir,
            &profile.interpreters,
            confirm.as_mut(),
            &mut runner,
        )?;

        if env.created {
            println!("✅ Environment created at {}", env.root.display());
        } else {
            println!("✅ Environment ready at {}", env.root.display());
        }

        if self.args.no_reconcile {
            return Ok(0);
        }

        if confirm.confirm("Install the application's packages now?")? {
            let report = packages::reconcile(&env, &profile.requirements, &mut runner)?;
            if let Some(fatal) = report.fatal() {
                let name = fatal.requirement.name.clone();
                return Err(ReconcileError::InstallFailed { name }.into());
            }
            println!("📊 {}", report.summary());
        }

        Ok(0)
    }
}
