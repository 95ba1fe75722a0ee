//! Launch command running the full bootstrap pipeline

use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;

use crate::exec::SystemRunner;
use crate::orchestrator::Orchestrator;
use crate::profile::LaunchProfile;
use crate::prompt::Confirm;

#[derive(Args, Clone)]
pub struct LaunchArgs {}

pub struct LaunchCommand {
    _args: LaunchArgs,
}

impl LaunchCommand {
    pub fn new(args: LaunchArgs) -> Self {
        Self { _args: args }
    }

    pub async fn execute(
        &self,
        profile: LaunchProfile,
        mut confirm: Box<dyn Confirm>,
    ) -> Result<i32> {
        println!(
            "{}",
            format!("🚀 {} Launcher", profile.name).bright_blue().bold()
        );
        println!("═══════════════════════════════════════");

        let mut runner = SystemRunner;
        let result = Orchestrator::new(&profile, confirm.as_mut(), &mut runner).run()?;

        println!();
        if result.succeeded {
            println!(
                "{}",
                format!("✅ {} exited cleanly", profile.name)
                    .bright_green()
                    .bold()
            );
        } else {
            println!(
                "{}",
                format!("❌ {} exited with code {}", profile.name, result.exit_code)
                    .red()
                    .bold()
            );
            println!("   Check the application output above for details");
        }

        // The child's exit code becomes the launcher's exit code
        Ok(result.exit_code)
    }
}
