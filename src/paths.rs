use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Name of the per-user data folder (downloaded tessdata lives here).
const APP_DIR_NAME: &str = "neckdeep-tools";

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Returns the logs directory: `<exe_dir>/logs/`
pub fn get_logs_dir() -> PathBuf {
    get_exe_dir().join("logs")
}

/// Returns the config file path: `<exe_dir>/config.json`
pub fn get_config_path() -> PathBuf {
    get_exe_dir().join("config.json")
}

/// Returns the per-user data directory for downloaded OCR models.
pub fn get_app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Returns the local tessdata directory: `<data_local_dir>/neckdeep-tools/tessdata/`
pub fn get_local_tessdata_dir() -> PathBuf {
    get_app_data_dir().join("tessdata")
}

/// Places the gameplay video is looked for when no path is given.
///
/// Order: next to the exe's parent, next to the exe, current directory.
pub fn default_video_candidates(file_name: &str) -> Vec<PathBuf> {
    let exe_dir = get_exe_dir();
    let mut candidates = Vec::new();
    if let Some(parent) = exe_dir.parent() {
        candidates.push(parent.join(file_name));
    }
    candidates.push(exe_dir.join(file_name));
    candidates.push(Path::new(file_name).to_path_buf());
    candidates
}

/// Returns the first candidate that exists on disk.
pub fn first_existing(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|p| p.exists()).cloned()
}

/// Ensures all output directories exist. Call at startup.
pub fn ensure_directories() -> std::io::Result<()> {
    std::fs::create_dir_all(get_logs_dir())?;
    Ok(())
}
