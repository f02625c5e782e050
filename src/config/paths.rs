//! Platform directories for configuration and state.

use directories::ProjectDirs;
use std::path::PathBuf;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "netlogo-mcp", "netlogo-mcp")
}

/// Per-user config file, e.g. `~/.config/netlogo-mcp/config.toml` on Linux.
pub fn user_config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Directory for the default log file. Falls back to the data directory on
/// platforms without a state directory.
pub fn state_dir() -> Option<PathBuf> {
    let dirs = project_dirs()?;
    Some(
        dirs.state_dir()
            .map(|dir| dir.to_path_buf())
            .unwrap_or_else(|| dirs.data_local_dir().to_path_buf()),
    )
}
