//! NeckDeep dataset tools
//!
//! Offline helpers for building the NeckDeep object-detection dataset:
//! sampling frames from gameplay footage, reading the health/score HUD with
//! Tesseract, and remapping YOLO class indices to the current class order.

pub mod config;
pub mod labels;
pub mod ocr;
pub mod paths;
pub mod preview;
pub mod sampler;
pub mod scan;
pub mod video;

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;

const LOG_FILE_NAME: &str = "neckdeep_tools.log";

/// Logs a message to both console and log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    print!("{}", line);
    let log_path = paths::get_logs_dir().join(LOG_FILE_NAME);
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}

/// Installs a panic hook that writes the panic message to the log file.
///
/// Call first thing in `main`, before anything that might panic.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = if let Some(loc) = panic_info.location() {
            format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column())
        } else {
            String::new()
        };
        let log_msg = format!("[PANIC]{} {}\n", location, msg);
        eprintln!("{}", log_msg);
        let log_path = paths::get_logs_dir().join(LOG_FILE_NAME);
        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
        {
            let _ = file.write_all(log_msg.as_bytes());
        }
    }));
}
