use std::path::{Path, PathBuf};

#[cfg(target_family = "unix")]
pub fn get_config_folder() -> PathBuf {
    let config_home = std::env::var("XDG_CONFIG_HOME");
    let home = std::env::var("HOME");
    match (config_home, home) {
        (Ok(p), _) => Path::new(&p).join("gridart"),
        (Err(_), Ok(home)) => Path::new(&home).join(".config").join("gridart"),
        _ => Path::new("").to_path_buf(),
    }
}

#[cfg(windows)]
pub fn get_config_folder() -> PathBuf {
    let config_home = std::env::var("APPDATA");
    match config_home {
        Ok(p) => Path::new(&p).join("gridart"),
        Err(_) => Path::new("").to_path_buf(),
    }
}

pub fn get_config_file() -> PathBuf {
    get_config_folder().join("config.toml")
}

pub fn get_log_file_path() -> PathBuf {
    get_config_folder().join("gridart.log")
}

/// Where artwork goes when no grid folder is configured.
pub fn get_default_grid_folder() -> PathBuf {
    get_config_folder().join("grid")
}

/// Where hand picked images named after the game are looked up.
pub fn get_default_overrides_folder() -> PathBuf {
    get_config_folder().join("games")
}
