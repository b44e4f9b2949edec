//! Drives embedded `PostgreSQL` lifecycle steps on behalf of the integration
//! tests when they run as root.
//!
//! Usage:
//!
//! ```text
//! pg_worker <setup|start|stop> <config-path>
//! ```
//!
//! `config-path` names a JSON-serialized `WorkerPayload` holding the cluster
//! settings and environment overrides. `PostgreSQL` refuses to run under a
//! superuser account, so a worker started as root switches to `nobody`
//! before it touches the cluster.

#[cfg(unix)]
mod worker {
    use camino::{Utf8Path, Utf8PathBuf};
    use nix::unistd::{Uid, User, initgroups, setgid, setuid};
    use pg_embedded_setup_unpriv::ambient_dir_and_path;
    use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
    use postgresql_embedded::{PostgreSQL, Status};
    use std::env;
    use std::ffi::{CString, OsString};
    use std::io::Read;
    use std::mem::ManuallyDrop;
    use thiserror::Error;

    const UNPRIVILEGED_USER: &str = "nobody";

    /// Failures reported by the worker.
    #[derive(Debug, Error)]
    pub enum WorkerError {
        #[error("invalid arguments: {0}")]
        Usage(String),
        #[error("failed to read {path}: {reason}")]
        ReadPayload { path: Utf8PathBuf, reason: String },
        #[error("failed to parse worker payload: {0}")]
        ParsePayload(#[from] serde_json::Error),
        #[error("invalid cluster settings: {0}")]
        Settings(String),
        #[error("failed to drop privileges: {0}")]
        PrivilegeDrop(String),
        #[error("failed to build runtime: {0}")]
        Runtime(#[source] std::io::Error),
        #[error("postgres {operation} failed: {reason}")]
        Postgres {
            operation: &'static str,
            reason: String,
        },
    }

    #[derive(Debug, Clone, Copy)]
    enum Operation {
        Setup,
        Start,
        Stop,
    }

    impl Operation {
        fn parse(raw: &str) -> Result<Self, WorkerError> {
            match raw {
                "setup" => Ok(Self::Setup),
                "start" => Ok(Self::Start),
                "stop" => Ok(Self::Stop),
                other => Err(WorkerError::Usage(format!(
                    "unknown operation '{other}'; expected setup, start or stop"
                ))),
            }
        }

        const fn name(self) -> &'static str {
            match self {
                Self::Setup => "setup",
                Self::Start => "start",
                Self::Stop => "stop",
            }
        }
    }

    /// Runs one lifecycle operation for the payload named in `args`.
    pub fn run(args: impl IntoIterator<Item = OsString>) -> Result<(), WorkerError> {
        let (operation, config_path) = parse_args(args)?;
        let payload = load_payload(&config_path)?;
        drop_privileges(UNPRIVILEGED_USER)?;
        let settings = payload
            .settings
            .into_settings()
            .map_err(|err| WorkerError::Settings(err.to_string()))?;
        apply_environment(&payload.environment);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(WorkerError::Runtime)?;
        let mut postgres = PostgreSQL::new(settings);
        runtime.block_on(async {
            match operation {
                Operation::Setup => postgres
                    .setup()
                    .await
                    .map_err(|err| failed(operation, &err)),
                Operation::Start => ensure_started(&mut postgres, operation).await,
                Operation::Stop => postgres.stop().await.map_err(|err| failed(operation, &err)),
            }
        })?;

        if matches!(operation, Operation::Start) {
            // Dropping the handle would stop the server this worker started.
            let _running = ManuallyDrop::new(postgres);
        }
        Ok(())
    }

    fn parse_args(
        args: impl IntoIterator<Item = OsString>,
    ) -> Result<(Operation, Utf8PathBuf), WorkerError> {
        let mut values = args.into_iter().skip(1).map(|arg| {
            arg.into_string()
                .map_err(|_| WorkerError::Usage("arguments must be valid UTF-8".to_owned()))
        });
        let operation = values
            .next()
            .transpose()?
            .ok_or_else(|| WorkerError::Usage("missing operation argument".to_owned()))?;
        let config_path = values
            .next()
            .transpose()?
            .ok_or_else(|| WorkerError::Usage("missing config path argument".to_owned()))?;
        if values.next().is_some() {
            return Err(WorkerError::Usage("unexpected extra argument".to_owned()));
        }
        Ok((Operation::parse(&operation)?, Utf8PathBuf::from(config_path)))
    }

    fn load_payload(path: &Utf8Path) -> Result<WorkerPayload, WorkerError> {
        let unreadable = |reason: String| WorkerError::ReadPayload {
            path: path.to_owned(),
            reason,
        };
        let (dir, relative) =
            ambient_dir_and_path(path).map_err(|err| unreadable(err.to_string()))?;
        let mut file = dir
            .open(relative.as_std_path())
            .map_err(|err| unreadable(err.to_string()))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|err| unreadable(err.to_string()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn drop_privileges(username: &str) -> Result<(), WorkerError> {
        if !Uid::effective().is_root() {
            return Ok(());
        }

        let refused = |err: nix::Error| WorkerError::PrivilegeDrop(err.to_string());
        let user = User::from_name(username)
            .map_err(refused)?
            .ok_or_else(|| WorkerError::PrivilegeDrop(format!("user '{username}' not found")))?;
        let name = CString::new(user.name.clone())
            .map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))?;
        initgroups(&name, user.gid).map_err(refused)?;
        setgid(user.gid).map_err(refused)?;
        setuid(user.uid).map_err(refused)?;

        // SAFETY: no other thread exists yet; the runtime is built afterwards.
        unsafe {
            env::set_var("HOME", &user.dir);
            env::set_var("USER", &user.name);
            env::set_var("LOGNAME", &user.name);
        }
        Ok(())
    }

    fn apply_environment(environment: &[(String, Option<PlainSecret>)]) {
        for (key, value) in environment {
            // SAFETY: no other thread exists yet; the runtime is built afterwards.
            unsafe {
                match value {
                    Some(secret) => env::set_var(key, secret.expose()),
                    None => env::remove_var(key),
                }
            }
        }
    }

    async fn ensure_started(
        postgres: &mut PostgreSQL,
        operation: Operation,
    ) -> Result<(), WorkerError> {
        if matches!(postgres.status(), Status::Started) {
            return Ok(());
        }
        postgres
            .start()
            .await
            .map_err(|err| failed(operation, &err))
    }

    fn failed(operation: Operation, err: &impl std::fmt::Display) -> WorkerError {
        WorkerError::Postgres {
            operation: operation.name(),
            reason: err.to_string(),
        }
    }
}

#[cfg(unix)]
fn main() -> Result<(), worker::WorkerError> {
    worker::run(std::env::args_os())
}

#[cfg(not(unix))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    Err("pg_worker requires a Unix host".into())
}
