//! Worker staging and on-disk settings sync for the test cluster.

use super::BoxError;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use pg_embedded_setup_unpriv::{ExecutionPrivileges, detect_execution_privileges};
use postgresql_embedded::Settings;
use std::ffi::OsString;
use std::net::TcpListener;

/// Variables applied while the cluster is bootstrapped.
///
/// Picks a free port unless `PG_PORT` is set. Root runners also get a copy
/// of `pg_worker` that `nobody` can execute.
pub(super) fn environment() -> Result<Vec<(OsString, Option<OsString>)>, BoxError> {
    let mut changes = Vec::new();
    if std::env::var_os("PG_PORT").is_none() {
        changes.push((OsString::from("PG_PORT"), Some(free_port()?)));
    }

    if matches!(detect_execution_privileges(), ExecutionPrivileges::Root)
        && std::env::var_os("PG_EMBEDDED_WORKER").is_none()
    {
        let staged = stage_worker(Utf8Path::new(env!("CARGO_BIN_EXE_pg_worker")))?;
        changes.push((
            OsString::from("PG_EMBEDDED_WORKER"),
            Some(OsString::from(staged.as_str())),
        ));
    }
    Ok(changes)
}

fn free_port() -> Result<OsString, BoxError> {
    let listener = TcpListener::bind(("127.0.0.1", 0))?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(OsString::from(port.to_string()))
}

/// Copies the worker into the temp directory, out of a build tree that
/// `nobody` may not be able to traverse.
fn stage_worker(worker: &Utf8Path) -> Result<Utf8PathBuf, BoxError> {
    let temp_dir = Utf8PathBuf::try_from(std::env::temp_dir())?;
    let staged = temp_dir.join(format!("taskboard_pg_worker_{}", std::process::id()));
    let (source_dir, source_name) = open_parent_dir(worker)?;
    let (target_dir, target_name) = open_parent_dir(&staged)?;

    match target_dir.remove_file(target_name) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(err.into()),
    }
    source_dir.copy(source_name, &target_dir, target_name)?;

    #[cfg(unix)]
    {
        use cap_std::fs::{Permissions, PermissionsExt};
        target_dir.set_permissions(target_name, Permissions::from_mode(0o755))?;
    }
    Ok(staged)
}

/// Picks up the password the bootstrap wrote, when there is one.
pub(super) fn sync_password_from_file(settings: &mut Settings) -> Result<(), BoxError> {
    let password_path = settings.password_file.to_string_lossy();
    let (dir, file_name) = open_parent_dir(Utf8Path::new(password_path.as_ref()))?;
    match dir.read_to_string(file_name) {
        Ok(contents) => {
            let password = contents.trim_end();
            if !password.is_empty() {
                password.clone_into(&mut settings.password);
            }
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Reads the port the server actually bound from `postmaster.pid`.
///
/// The fourth line of the file holds the port.
pub(super) fn sync_port_from_pid(settings: &mut Settings) -> Result<(), BoxError> {
    let data_dir = settings.data_dir.to_string_lossy();
    let dir = Dir::open_ambient_dir(Utf8Path::new(data_dir.as_ref()), ambient_authority())?;
    let contents = match dir.read_to_string("postmaster.pid") {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err.into()),
    };

    if let Some(port) = contents
        .lines()
        .nth(3)
        .and_then(|line| line.trim().parse::<u16>().ok())
    {
        settings.port = port;
    }
    Ok(())
}

fn open_parent_dir(path: &Utf8Path) -> Result<(Dir, &str), BoxError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| std::io::Error::other("path must include a file name"))?;
    let parent = path.parent().unwrap_or_else(|| Utf8Path::new("."));
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}
