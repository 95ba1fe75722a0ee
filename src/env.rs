//! Runtime environment location, creation and interpreter resolution
//!
//! An environment is "activated" by resolving its interpreter path and
//! threading it through the later stages; nothing process-wide is mutated.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::exec::{CommandRunner, CommandSpec, StdioMode};
use crate::prompt::Confirm;

/// Variable set by Python virtual environments for their own children
pub const ACTIVE_ENV_VAR: &str = "VIRTUAL_ENV";

/// An isolated Python runtime rooted at a directory
#[derive(Debug, Clone)]
pub struct RuntimeEnvironment {
    pub root: PathBuf,
    /// Interpreter binary inside the environment
    pub interpreter: PathBuf,
    /// True when this run created the environment
    pub created: bool,
}

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("Environment at {0} does not exist and creation was declined")]
    Missing(PathBuf),
    #[error("Failed to create environment at {root}: {reason}")]
    CreateFailed { root: PathBuf, reason: String },
    #[error("Failed to activate environment at {root}: {reason}")]
    ActivateFailed { root: PathBuf, reason: String },
    #[error("No usable interpreter found, tried: {0}")]
    NoInterpreter(String),
    #[error("Environment at {0} is being created by another launcher instance")]
    Locked(PathBuf),
    #[error("Failed to read confirmation: {0}")]
    Prompt(#[source] std::io::Error),
}

/// Environment the calling process is already running inside, if any
pub fn active_environment() -> Option<PathBuf> {
    std::env::var_os(ACTIVE_ENV_VAR).map(PathBuf::from)
}

/// Interpreter location inside an environment root
pub fn interpreter_path(root: &Path) -> PathBuf {
    if cfg!(windows) {
        root.join("Scripts").join("python.exe")
    } else {
        root.join("bin").join("python")
    }
}

/// Locate the runtime environment, creating it if the operator agrees
pub fn locate(
    root: &Path,
    interpreters: &[String],
    confirm: &mut dyn Confirm,
    runner: &mut dyn CommandRunner,
) -> Result<RuntimeEnvironment, EnvError> {
    locate_with_active(active_environment(), root, interpreters, confirm, runner)
}

/// Locate with an explicit "already active" override
pub fn locate_with_active(
    active: Option<PathBuf>,
    root: &Path,
    interpreters: &[String],
    confirm: &mut dyn Confirm,
    runner: &mut dyn CommandRunner,
) -> Result<RuntimeEnvironment, EnvError> {
    // Already inside an environment: use it as-is, no filesystem interaction
    if let Some(active) = active {
        info!(
            "Already running inside environment {}, reusing it",
            active.display()
        );
        return Ok(RuntimeEnvironment {
            interpreter: interpreter_path(&active),
            root: active,
            created: false,
        });
    }

    if root.is_dir() {
        return activate(root, false);
    }

    let question = format!(
        "Runtime environment {} does not exist. Create it?",
        root.display()
    );
    if !confirm.confirm(&question).map_err(EnvError::Prompt)? {
        return Err(EnvError::Missing(root.to_path_buf()));
    }

    if let Some(parent) = root.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| EnvError::CreateFailed {
                root: root.to_path_buf(),
                reason: format!("could not create parent directory: {}", e),
            })?;
        }
    }

    let _lock = CreateLock::acquire(root)?;

    // Another invocation may have finished the create while we prompted
    if root.is_dir() {
        return activate(root, false);
    }

    let base = select_interpreter(interpreters, runner)?;
    info!(
        "Creating environment at {} with {}",
        root.display(),
        base
    );

    let root_arg = root.to_string_lossy().to_string();
    let outcome = runner
        .run(
            CommandSpec::new(base.as_str(), ["-m", "venv", root_arg.as_str()])
                .stdio(StdioMode::Inherit),
        )
        .map_err(|e| EnvError::CreateFailed {
            root: root.to_path_buf(),
            reason: e.to_string(),
        })?;

    if !outcome.success() {
        return Err(EnvError::CreateFailed {
            root: root.to_path_buf(),
            reason: format!("{} exited with code {}", base, outcome.exit_code),
        });
    }

    activate(root, true)
}

/// Resolve the environment's interpreter; its absence means the directory is
/// not a usable environment
fn activate(root: &Path, created: bool) -> Result<RuntimeEnvironment, EnvError> {
    let interpreter = interpreter_path(root);
    if !interpreter.is_file() {
        return Err(EnvError::ActivateFailed {
            root: root.to_path_buf(),
            reason: format!("interpreter {} not found", interpreter.display()),
        });
    }

    Ok(RuntimeEnvironment {
        root: root.to_path_buf(),
        interpreter,
        created,
    })
}

/// Pick the first interpreter candidate that answers a version probe
fn select_interpreter(
    candidates: &[String],
    runner: &mut dyn CommandRunner,
) -> Result<String, EnvError> {
    for (index, candidate) in candidates.iter().enumerate() {
        match runner.run(CommandSpec::new(candidate.as_str(), ["--version"])) {
            Ok(outcome) if outcome.success() => {
                if index > 0 {
                    warn!(
                        "Preferred interpreter {} not found, falling back to {}",
                        candidates[..index].join(", "),
                        candidate
                    );
                }
                return Ok(candidate.clone());
            }
            _ => continue,
        }
    }

    Err(EnvError::NoInterpreter(candidates.join(", ")))
}

/// Exclusive guard against two invocations racing the environment create
struct CreateLock {
    path: PathBuf,
}

impl CreateLock {
    fn acquire(root: &Path) -> Result<Self, EnvError> {
        let mut name = root
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "env".into());
        name.push(".lock");
        let path = root.with_file_name(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(Self { path }),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(EnvError::Locked(root.to_path_buf()))
            }
            Err(e) => Err(EnvError::CreateFailed {
                root: root.to_path_buf(),
                reason: format!("could not take create lock: {}", e),
            }),
        }
    }
}

impl Drop for CreateLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::testing::ScriptedRunner;
    use crate::prompt::testing::ScriptedConfirm;

    fn interpreters() -> Vec<String> {
        vec!["python3.10".to_string(), "python3".to_string()]
    }

    fn materialize_interpreter(root: &Path) {
        fs::create_dir_all(root.join("bin")).unwrap();
        fs::write(interpreter_path(root), "").unwrap();
    }

    #[test]
    #[cfg(unix)]
    fn test_interpreter_path_layout() {
        let path = interpreter_path(Path::new("/opt/venv"));
        assert_eq!(path, PathBuf::from("/opt/venv/bin/python"));
    }

    #[test]
    fn test_active_environment_short_circuits() {
        let active = PathBuf::from("/nonexistent/active-venv");
        let mut confirm = ScriptedConfirm::new([]);
        let mut runner = ScriptedRunner::new([]);

        let env = locate_with_active(
            Some(active.clone()),
            Path::new("/nonexistent/other-venv"),
            &interpreters(),
            &mut confirm,
            &mut runner,
        )
        .unwrap();

        // No prompt, no process spawn, no filesystem interaction
        assert!(confirm.questions.is_empty());
        assert!(runner.calls.is_empty());
        assert_eq!(env.root, active);
        assert!(!env.created);
    }

    #[test]
    fn test_locate_is_idempotent_when_active() {
        let active = PathBuf::from("/nonexistent/active-venv");
        let mut confirm = ScriptedConfirm::new([]);
        let mut runner = ScriptedRunner::new([]);

        for _ in 0..2 {
            let env = locate_with_active(
                Some(active.clone()),
                &active,
                &interpreters(),
                &mut confirm,
                &mut runner,
            )
            .unwrap();
            assert_eq!(env.root, active);
        }

        assert!(runner.calls.is_empty());
    }

    #[test]
    fn test_existing_environment_activates() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join(".venv");
        materialize_interpreter(&root);

        let mut confirm = ScriptedConfirm::new([]);
        let mut runner = ScriptedRunner::new([]);

        let env = locate_with_active(None, &root, &interpreters(), &mut confirm, &mut runner)
            .unwrap();

        assert_eq!(env.interpreter, interpreter_path(&root));
        assert!(!env.created);
        assert!(runner.calls.is_empty());
    }

    #[test]
    fn test_existing_directory_without_interpreter_fails_activation() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join(".venv");
        fs::create_dir_all(&root).unwrap();

        let mut confirm = ScriptedConfirm::new([]);
        let mut runner = ScriptedRunner::new([]);

        let result =
            locate_with_active(None, &root, &interpreters(), &mut confirm, &mut runner);

        assert!(matches!(result, Err(EnvError::ActivateFailed { .. })));
    }

    #[test]
    fn test_declined_creation_fails_without_touching_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join(".venv");

        let mut confirm = ScriptedConfirm::new([false]);
        let mut runner = ScriptedRunner::new([]);

        let result =
            locate_with_active(None, &root, &interpreters(), &mut confirm, &mut runner);

        assert!(matches!(result, Err(EnvError::Missing(_))));
        assert!(!root.exists());
        assert!(runner.calls.is_empty());
    }

    #[test]
    fn test_accepted_creation_builds_and_activates() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join(".venv");

        let mut confirm = ScriptedConfirm::new([true]);
        let effect_root = root.clone();
        let mut runner = ScriptedRunner::new([
            ScriptedRunner::exit(0), // python3.10 --version
            ScriptedRunner::exit(0), // python3.10 -m venv <root>
        ])
        .with_effect(move |spec| {
            if spec.args.iter().any(|a| a == "venv") {
                materialize_interpreter(&effect_root);
            }
        });

        let env = locate_with_active(None, &root, &interpreters(), &mut confirm, &mut runner)
            .unwrap();

        assert!(env.created);
        assert!(env.interpreter.is_file());
        assert_eq!(runner.calls[0].program, "python3.10");
        assert_eq!(runner.calls[0].args, vec!["--version"]);
        assert_eq!(runner.calls[1].args[..2], ["-m".to_string(), "venv".to_string()]);
        // Create lock is released once the environment exists
        assert!(!tmp.path().join(".venv.lock").exists());
    }

    #[test]
    fn test_interpreter_fallback_order() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join(".venv");

        let mut confirm = ScriptedConfirm::new([true]);
        let effect_root = root.clone();
        let mut runner = ScriptedRunner::new([
            ScriptedRunner::exit(1), // python3.10 --version: absent
            ScriptedRunner::exit(0), // python3 --version
            ScriptedRunner::exit(0), // python3 -m venv <root>
        ])
        .with_effect(move |spec| {
            if spec.args.iter().any(|a| a == "venv") {
                materialize_interpreter(&effect_root);
            }
        });

        let env = locate_with_active(None, &root, &interpreters(), &mut confirm, &mut runner)
            .unwrap();

        assert!(env.created);
        assert_eq!(runner.calls[2].program, "python3");
    }

    #[test]
    fn test_failed_create_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join(".venv");

        let mut confirm = ScriptedConfirm::new([true]);
        let mut runner = ScriptedRunner::new([
            ScriptedRunner::exit(0), // version probe
            ScriptedRunner::exit(1), // venv create fails
        ]);

        let result =
            locate_with_active(None, &root, &interpreters(), &mut confirm, &mut runner);

        assert!(matches!(result, Err(EnvError::CreateFailed { .. })));
    }

    #[test]
    fn test_create_lock_blocks_concurrent_creation() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join(".venv");
        fs::write(tmp.path().join(".venv.lock"), "").unwrap();

        let mut confirm = ScriptedConfirm::new([true]);
        let mut runner = ScriptedRunner::new([]);

        let result =
            locate_with_active(None, &root, &interpreters(), &mut confirm, &mut runner);

        assert!(matches!(result, Err(EnvError::Locked(_))));
    }
}
