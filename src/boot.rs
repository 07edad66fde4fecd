use log::{error, info, warn};
use std::fs;
use std::path::Path;
use std::process;

use crate::config::AppConfig;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BootReport {
    pub warnings: u32,
    pub errors: u32,
}

/// Run all boot checks. Call this before Rocket launches.
/// Aborts the process if the data directory cannot be used.
pub fn run(config: &AppConfig) {
    info!("Vanguardista boot check starting...");

    let report = check(config);

    if report.errors > 0 {
        error!(
            "Boot check FAILED: {} error(s), {} warning(s). Aborting.",
            report.errors, report.warnings
        );
        process::exit(1);
    }

    if report.warnings > 0 {
        warn!(
            "Boot check passed with {} warning(s). Some features may not work correctly.",
            report.warnings
        );
    } else {
        info!("Boot check passed. All systems go.");
    }
}

/// Create missing directories and count what is wrong without exiting.
pub fn check(config: &AppConfig) -> BootReport {
    let mut report = BootReport::default();

    // ── 1. Directories ─────────────────────────────────
    for dir in [config.data_dir().to_path_buf(), config.local_dir()] {
        if !dir.exists() {
            match fs::create_dir_all(&dir) {
                Ok(_) => info!("  Created directory: {}", dir.display()),
                Err(e) => {
                    error!("  FAILED to create directory {}: {}", dir.display(), e);
                    report.errors += 1;
                }
            }
        }
    }

    // ── 2. Data directory writable ─────────────────────
    if config.data_dir().exists() {
        let test_file = config.data_dir().join(".write_test");
        match fs::write(&test_file, "test") {
            Ok(_) => {
                let _ = fs::remove_file(&test_file);
            }
            Err(e) => {
                error!("  Data directory not writable: {}", e);
                report.errors += 1;
            }
        }
    }

    // ── 3. Keyword store readable ──────────────────────
    let keywords = config.keywords_file();
    if keywords.exists() {
        let parses = fs::read_to_string(&keywords)
            .ok()
            .map(|t| serde_json::from_str::<serde_json::Value>(&t).map(|v| v.is_array()).unwrap_or(false))
            .unwrap_or(false);
        if !parses {
            warn!(
                "  {} is not a JSON array; it will be treated as empty and replaced on next save",
                keywords.display()
            );
            report.warnings += 1;
        }
    }

    // ── 4. AI credentials ──────────────────────────────
    if config.ai.openai_api_key.is_none() {
        warn!("  OPENAI_API_KEY not set; OpenAI requests will fail");
        report.warnings += 1;
    }
    if config.ai.deepseek_api_key.is_none() {
        warn!("  DEEPSEEK_API_KEY not set; DeepSeek requests will fail");
        report.warnings += 1;
    }

    // ── 5. Rocket.toml exists ──────────────────────────
    if !Path::new("Rocket.toml").exists() {
        info!("  Rocket.toml not found, using default server config");
    }

    report
}
