//! Rewrites MPE emulator settings files in the current format.
//!
//! Usage: `mpe-upgrade-settings <settings_file.mpe>...`

use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let paths: Vec<String> = env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("Usage: mpe-upgrade-settings <settings_file.mpe>...");
        return ExitCode::FAILURE;
    }

    let mut status = ExitCode::SUCCESS;
    for path in &paths {
        tracing::info!(path = %path, "upgrading");
        if let Err(err) = mpe_presets::upgrade_settings_file(path) {
            tracing::error!(path = %path, error = %err, "upgrade failed");
            status = ExitCode::FAILURE;
        }
    }
    status
}
