//! Child process supervision for the launched application

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::env::RuntimeEnvironment;
use crate::exec::{CommandRunner, CommandSpec, ExecError, StdioMode};
use crate::platform::EnvAdjustment;

/// Terminal outcome of a supervised launch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchResult {
    pub exit_code: i32,
    pub succeeded: bool,
}

impl LaunchResult {
    pub fn from_exit_code(exit_code: i32) -> Self {
        Self {
            exit_code,
            succeeded: exit_code == 0,
        }
    }
}

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("Working directory unavailable: {0}")]
    WorkingDirectoryUnavailable(PathBuf),
    #[error(transparent)]
    Exec(#[from] ExecError),
}

/// Launch the application and wait for it to finish
///
/// The child inherits all three standard streams; its own output is the
/// operator's visibility into what it does. The exit code is captured, not
/// interpreted.
pub fn launch(
    env: &RuntimeEnvironment,
    app_dir: &Path,
    entry: &str,
    adjustments: &[EnvAdjustment],
    runner: &mut dyn CommandRunner,
) -> Result<LaunchResult, SupervisorError> {
    if !app_dir.is_dir() {
        return Err(SupervisorError::WorkingDirectoryUnavailable(
            app_dir.to_path_buf(),
        ));
    }

    let mut spec = CommandSpec::new(env.interpreter.to_string_lossy().to_string(), [entry])
        .current_dir(app_dir)
        .stdio(StdioMode::Inherit);
    for adjustment in adjustments {
        spec = spec.env(adjustment.key.clone(), adjustment.value.clone());
    }

    info!("🚀 Launching {} from {}", entry, app_dir.display());

    let outcome = runner.run(spec)?;

    Ok(LaunchResult::from_exit_code(outcome.exit_code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::testing::ScriptedRunner;

    fn test_env() -> RuntimeEnvironment {
        RuntimeEnvironment {
            root: PathBuf::from("/venv"),
            interpreter: PathBuf::from("/venv/bin/python"),
            created: false,
        }
    }

    #[test]
    fn test_missing_working_directory_is_fatal() {
        let mut runner = ScriptedRunner::new([]);

        let result = launch(
            &test_env(),
            Path::new("/nonexistent/app"),
            "run.py",
            &[],
            &mut runner,
        );

        assert!(matches!(
            result,
            Err(SupervisorError::WorkingDirectoryUnavailable(_))
        ));
        assert!(runner.calls.is_empty());
    }

    #[test]
    fn test_launch_inherits_streams_and_sets_cwd() {
        let app_dir = tempfile::tempdir().unwrap();
        let adjustments = vec![EnvAdjustment {
            key: "QT_MAC_WANTS_LAYER".to_string(),
            value: "1".to_string(),
        }];
        let mut runner = ScriptedRunner::new([ScriptedRunner::exit(0)]);

        let result = launch(
            &test_env(),
            app_dir.path(),
            "run.py",
            &adjustments,
            &mut runner,
        )
        .unwrap();

        assert!(result.succeeded);
        let spec = &runner.calls[0];
        assert_eq!(spec.program, "/venv/bin/python");
        assert_eq!(spec.args, vec!["run.py"]);
        assert_eq!(spec.cwd.as_deref(), Some(app_dir.path()));
        assert_eq!(spec.stdio, StdioMode::Inherit);
        assert!(spec
            .env
            .contains(&("QT_MAC_WANTS_LAYER".to_string(), "1".to_string())));
    }

    #[test]
    fn test_child_exit_code_is_captured_not_interpreted() {
        let app_dir = tempfile::tempdir().unwrap();
        let mut runner = ScriptedRunner::new([ScriptedRunner::exit(3)]);

        let result = launch(&test_env(), app_dir.path(), "run.py", &[], &mut runner).unwrap();

        assert!(!result.succeeded);
        assert_eq!(result.exit_code, 3);
    }
}
