//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `grievance_core` linkage.
//! - Open the configured database once so schema problems surface early.

use grievance_core::db::{migrations, open_db};
use grievance_core::CoreConfig;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("grievance_core ping={}", grievance_core::ping());
    println!("grievance_core version={}", grievance_core::core_version());

    let config = CoreConfig::from_env();
    if let Some(log_dir) = &config.log_dir {
        let log_dir = log_dir.to_string_lossy();
        if let Err(err) = grievance_core::init_logging(&config.log_level, &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    println!("db_path={}", config.db_path.display());
    match open_db(&config.db_path) {
        Ok(_) => {
            println!("schema_version={}", migrations::latest_version());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("db open failed: {err}");
            ExitCode::FAILURE
        }
    }
}
