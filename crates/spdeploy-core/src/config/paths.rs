//! Profile file path resolution helpers.

use std::path::{Path, PathBuf};

pub const PROFILE_FILE_NAME: &str = "spdeploy.toml";

pub fn global_profile_path(global_dir: &Path) -> PathBuf {
    global_dir.join(PROFILE_FILE_NAME)
}

/// Project file wins over the global one; `None` when neither exists.
pub fn discover_profile_path(project_root: &Path, global_dir: &Path) -> Option<PathBuf> {
    [
        project_root.join(PROFILE_FILE_NAME),
        global_profile_path(global_dir),
    ]
    .into_iter()
    .find(|candidate| candidate.is_file())
}
