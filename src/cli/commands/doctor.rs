//! Doctor command reporting launcher status without changing anything

use anyhow::Result;
use clap::Args;
use comfy_table::Table;
use owo_colors::OwoColorize;

use crate::env;
use crate::exec::{CommandRunner, CommandSpec, SystemRunner};
use crate::packages;
use crate::platform;
use crate::profile::LaunchProfile;

#[derive(Args, Clone)]
pub struct DoctorArgs {}

pub struct DoctorCommand {
    _args: DoctorArgs,
}

impl DoctorCommand {
    pub fn new(args: DoctorArgs) -> Self {
        Self { _args: args }
    }

    pub async fn execute(&self, profile: LaunchProfile) -> Result<i32> {
        println!("{}", "🩺 Launcher Status".bright_blue().bold());
        println!("═══════════════════════════════════════");

        let mut runner = SystemRunner;
        let mut healthy = true;

        if let Some(active) = env::active_environment() {
            println!("🐍 Active environment: {}", active.display());
        }

        let interpreter = env::interpreter_path(&profile.env_dir);
        if interpreter.is_file() {
            let version = interpreter_version(&interpreter, &mut runner);
            println!(
                "🐍 Environment {} ({})",
                profile.env_dir.display(),
                version
            );
        } else {
            println!(
                "{}",
                format!(
                    "⚠️  Environment missing at {} (run 'vnlaunch setup')",
                    profile.env_dir.display()
                )
                .yellow()
            );
            healthy = false;
        }

        let mut table = Table::new();
        table.set_header(vec!["Package", "Module", "Kind", "Status"]);

        for requirement in &profile.requirements {
            let status = if !interpreter.is_file() {
                "unknown".to_string()
            } else {
                match packages::probe(&interpreter, requirement, &mut runner) {
                    Ok(true) => "ok".to_string(),
                    Ok(false) => {
                        if !requirement.optional {
                            healthy = false;
                        }
                        "missing".to_string()
                    }
                    Err(_) => {
                        healthy = false;
                        "probe failed".to_string()
                    }
                }
            };

            table.add_row(vec![
                requirement.name.clone(),
                requirement.module.clone(),
                if requirement.optional {
                    "optional".to_string()
                } else {
                    "required".to_string()
                },
                status,
            ]);
        }

        println!("{table}");

        for adjustment in platform::adjustments() {
            println!("🔧 Would pass {}={}", adjustment.key, adjustment.value);
        }

        if healthy {
            println!("{}", "✅ Ready to launch".bright_green().bold());
            Ok(0)
        } else {
            println!("{}", "⚠️  Not ready to launch".yellow().bold());
            Ok(1)
        }
    }
}

fn interpreter_version(interpreter: &std::path::Path, runner: &mut SystemRunner) -> String {
    runner
        .run(CommandSpec::new(
            interpreter.to_string_lossy().to_string(),
            ["--version"],
        ))
        .ok()
        .filter(|outcome| outcome.success())
        .map(|outcome| {
            // Older interpreters print the version on stderr
            if outcome.stdout.trim().is_empty() {
                outcome.stderr.trim().to_string()
            } else {
                outcome.stdout.trim().to_string()
            }
        })
        .unwrap_or_else(|| "version unknown".to_string())
}
