use std::path::Path;
use std::process::Command;

use tracing::info;

use dbmend_core::error::{MendError, Result};

/// Run the framework's migration generator (e.g. `python manage.py
/// makemigrations`) in the project root.
///
/// Whether the regenerated migrations should be fake-applied is left to the
/// operator; this only surfaces the command's exit status.
pub fn regenerate(project_root: &Path, command: &[String]) -> Result<()> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| MendError::InvalidArgument("Empty regenerate command".to_string()))?;

    info!("Running {} in {}", command.join(" "), project_root.display());

    let status = Command::new(program)
        .args(args)
        .current_dir(project_root)
        .status()
        .map_err(|e| MendError::Process(format!("Failed to run {}: {}", program, e)))?;

    if !status.success() {
        return Err(MendError::Process(format!(
            "{} exited with {}",
            command.join(" "),
            status
        )));
    }

    Ok(())
}
