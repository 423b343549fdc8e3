//! Session persistence
//!
//! The auth session is kept in `session.json` in the app directory so a login
//! survives between CLI invocations. Logging out deletes the file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::result::Result;
use crate::domain::Session;

const SESSION_FILE: &str = "session.json";

fn session_path(app_dir: &Path) -> PathBuf {
    app_dir.join(SESSION_FILE)
}

/// Load the stored session. A missing or unreadable file means no session.
pub fn load_session(app_dir: &Path) -> Option<Session> {
    let content = std::fs::read_to_string(session_path(app_dir)).ok()?;
    serde_json::from_str(&content).ok()
}

/// Store a session, readable only by the current user on Unix
pub fn save_session(app_dir: &Path, session: &Session) -> Result<()> {
    let path = session_path(app_dir);
    let content = serde_json::to_string_pretty(session)?;

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(&path)?;

    // An older file keeps its mode on open; tighten it before writing
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Remove the stored session, if any
pub fn clear_session(app_dir: &Path) -> Result<()> {
    let path = session_path(app_dir);
    if path.exists() {
        std::fs::remove_file(&path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_load_clear() {
        let dir = tempdir().unwrap();
        assert!(load_session(dir.path()).is_none());

        let mut session = Session::new("access");
        session.refresh_token = Some("refresh".to_string());
        save_session(dir.path(), &session).unwrap();
        assert_eq!(load_session(dir.path()), Some(session));

        clear_session(dir.path()).unwrap();
        assert!(load_session(dir.path()).is_none());
        // Clearing twice is fine
        clear_session(dir.path()).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join(SESSION_FILE);
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        save_session(dir.path(), &Session::new("access")).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        std::fs::remove_file(&path).unwrap();
        save_session(dir.path(), &Session::new("access")).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(load_session(dir.path()), Some(Session::new("access")));
    }

    #[test]
    fn test_corrupt_file_is_no_session() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), "{not json").unwrap();
        assert!(load_session(dir.path()).is_none());
    }
}
