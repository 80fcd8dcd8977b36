/*
 * Resolves the platform-specific directories the calendar uses: the local
 * configuration directory (settings) and the local data directory (events
 * file, default backups, log file). Both are derived from
 * `directories::ProjectDirs` without an organization qualifier and are
 * created on first use.
 */
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

fn ensure_dir_exists(path: &Path, what: &str) -> Option<PathBuf> {
    if !path.exists() {
        if let Err(e) = fs::create_dir_all(path) {
            log::error!("PathUtils: Failed to create {what} directory {path:?}: {e}");
            return None;
        }
        log::debug!("PathUtils: Created {what} directory: {path:?}");
    } else {
        log::trace!("PathUtils: {what} directory already exists: {path:?}");
    }
    Some(path.to_path_buf())
}

/*
 * Retrieves the application's local (non-roaming) configuration directory,
 * creating it if necessary. Returns `None` if no home directory can be
 * determined or the directory cannot be created.
 */
pub fn get_base_app_config_local_dir(app_name: &str) -> Option<PathBuf> {
    log::trace!("PathUtils: Getting config dir for '{app_name}'");
    ProjectDirs::from("", "", app_name)
        .and_then(|proj_dirs| ensure_dir_exists(proj_dirs.config_local_dir(), "config"))
}

/// Local data directory holding `events.txt`; created on demand.
pub fn get_app_data_local_dir(app_name: &str) -> Option<PathBuf> {
    log::trace!("PathUtils: Getting data dir for '{app_name}'");
    ProjectDirs::from("", "", app_name)
        .and_then(|proj_dirs| ensure_dir_exists(proj_dirs.data_local_dir(), "data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleanup(path: &Path) {
        if path.exists() {
            if let Err(e) = fs::remove_dir_all(path) {
                eprintln!("Test cleanup failed for {}: {e}", path.display());
            }
        }
    }

    #[test]
    fn test_get_base_app_config_local_dir_creates_if_not_exists() {
        let unique_app_name = format!("TestApp_PathUtils_Create_{}", rand::random::<u128>());

        let path = get_base_app_config_local_dir(&unique_app_name)
            .expect("Should return a path for a new app name");
        assert!(path.is_dir(), "Directory should have been created at {path:?}");
        assert!(
            path.to_string_lossy()
                .to_lowercase()
                .contains(&unique_app_name.to_lowercase())
        );

        cleanup(&path);
    }

    #[test]
    fn test_get_base_app_config_local_dir_returns_existing() {
        let unique_app_name = format!("TestApp_PathUtils_Existing_{}", rand::random::<u128>());

        let first_path = get_base_app_config_local_dir(&unique_app_name)
            .expect("First creation of base app config dir failed");
        let second_path = get_base_app_config_local_dir(&unique_app_name);
        assert_eq!(second_path, Some(first_path.clone()));

        cleanup(&first_path);
    }

    #[test]
    fn test_get_app_data_local_dir_creates_directory() {
        let unique_app_name = format!("TestApp_PathUtils_Data_{}", rand::random::<u128>());

        let path = get_app_data_local_dir(&unique_app_name).expect("Data dir should resolve");
        assert!(path.is_dir());

        cleanup(&path);
    }
}
