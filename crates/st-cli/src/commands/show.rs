use std::path::Path;

use colored::Colorize;

use st_session::{Reconciliation, SessionConfig, SessionEngine};

pub fn run(file: &Path) -> Result<(), String> {
    let text = std::fs::read_to_string(file)
        .map_err(|e| format!("failed to read {}: {e}", file.display()))?;

    let mut engine = SessionEngine::new(&SessionConfig::default());
    if engine.override_session_json(&text) == Reconciliation::Ignored {
        eprintln!(
            "{} {} is not a session snapshot; showing an empty session",
            "warning:".yellow().bold(),
            file.display()
        );
    }

    super::print_session(engine.session());
    Ok(())
}
