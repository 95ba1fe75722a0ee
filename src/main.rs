use anyhow::Result;
use clap::Parser;

use vnlaunch::cli::Cli;
use vnlaunch::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI and execute (CLI handles logging initialization)
    let cli = Cli::parse();

    // Execute with error handling
    match cli.execute().await {
        Ok(exit_code) => {
            logging::log_session_end();
            if exit_code != 0 {
                // The launched application's exit code is passed through
                // unchanged so wrappers can observe it.
                std::process::exit(exit_code);
            }
            Ok(())
        }
        Err(e) => {
            // Log the error using tracing (will respect logging configuration)
            tracing::error!("Launcher error: {}", e);

            // Log error chain if available
            let mut source = e.source();
            while let Some(err) = source {
                tracing::error!("   Caused by: {}", err);
                source = err.source();
            }

            logging::log_session_end();
            Err(e)
        }
    }
}
