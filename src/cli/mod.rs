//! CLI module for vnlaunch
//!
//! This module provides the command-line interface for the launcher. It uses
//! clap for argument parsing and provides a structured command pattern for
//! all launcher operations.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

use crate::data_paths::{DataPaths, DEFAULT_DATA_DIR};
use crate::logging::{self, LoggingConfig};
use crate::profile::LaunchProfile;
use crate::prompt::{AssumeYes, Confirm, StdinConfirm};

use commands::doctor::{DoctorArgs, DoctorCommand};
use commands::launch::{LaunchArgs, LaunchCommand};
use commands::reconcile::{ReconcileArgs, ReconcileCommand};
use commands::setup::{SetupArgs, SetupCommand};
use commands::version::{VersionArgs, VersionCommand};

#[derive(Parser)]
#[command(name = "vnlaunch")]
#[command(version)]
#[command(about = "Environment bootstrap and launcher for VeighNa Trader", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Launch profile YAML path (default: <data-dir>/profiles/default.yaml)
    #[arg(long, global = true)]
    pub profile: Option<PathBuf>,

    /// Data directory path (default: ./data)
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Answer yes to every confirmation (unattended runs)
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bootstrap the environment, reconcile packages and launch the application
    Launch(LaunchArgs),

    /// Create or repair the runtime environment
    Setup(SetupArgs),

    /// Reconcile required packages against the environment
    Reconcile(ReconcileArgs),

    /// Report environment and requirement status without changing anything
    Doctor(DoctorArgs),

    /// Show version information
    Version(VersionArgs),
}

impl Cli {
    /// The confirmation provider the operator asked for
    fn confirmer(&self) -> Box<dyn Confirm> {
        if self.yes {
            Box::new(AssumeYes)
        } else {
            Box::new(StdinConfirm)
        }
    }

    fn load_profile(&self, data_paths: &DataPaths) -> Result<LaunchProfile> {
        if let Some(path) = &self.profile {
            return LaunchProfile::from_file(path);
        }

        let default_path = data_paths.profiles().join("default.yaml");
        if default_path.is_file() {
            return LaunchProfile::from_file(default_path);
        }

        Ok(LaunchProfile::default())
    }

    /// Execute the CLI command, returning the process exit code
    pub async fn execute(self) -> Result<i32> {
        let data_paths = DataPaths::new(&self.data_dir);

        // Ensure all directories exist
        data_paths.ensure_directories()?;

        logging::init_logging(LoggingConfig::new(data_paths.clone()), self.verbose)?;

        let profile = self.load_profile(&data_paths)?;
        let confirm = self.confirmer();

        match self.command {
            Commands::Launch(args) => LaunchCommand::new(args).execute(profile, confirm).await,
            Commands::Setup(args) => SetupCommand::new(args).execute(profile, confirm).await,
            Commands::Reconcile(args) => {
                ReconcileCommand::new(args).execute(profile, confirm).await
            }
            Commands::Doctor(args) => DoctorCommand::new(args).execute(profile).await,
            Commands::Version(args) => VersionCommand::new(args).execute(profile).await,
        }
    }
}
