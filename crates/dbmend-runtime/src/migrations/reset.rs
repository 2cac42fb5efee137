//! Migration file reset.
//!
//! Scans a Django project tree for generated migration files
//! (`*/migrations/*.py`), keeps protected apps and every `__init__.py`,
//! and deletes the rest. Scanning and deletion are split so the CLI can
//! show the plan and ask for confirmation first.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use dbmend_core::error::{MendError, Result};

/// A migration file discovered under the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// Path to the file.
    pub path: PathBuf,
    /// Name of the app directory owning the `migrations` package.
    pub app: String,
    /// True when the owning app is protected from deletion.
    pub protected: bool,
}

/// The files a reset would delete and the files it keeps.
#[derive(Debug, Clone, Default)]
pub struct MigrationResetPlan {
    /// Files to delete, sorted by path.
    pub delete: Vec<MigrationFile>,
    /// Files kept because their app is protected.
    pub keep: Vec<MigrationFile>,
}

impl MigrationResetPlan {
    /// True when there is nothing to delete.
    pub fn is_empty(&self) -> bool {
        self.delete.is_empty()
    }
}

/// Deletes generated migration files, protecting designated apps.
pub struct MigrationReset {
    project_root: PathBuf,
    protected_apps: Vec<String>,
}

impl MigrationReset {
    pub fn new(project_root: impl Into<PathBuf>, protected_apps: Vec<String>) -> Self {
        Self {
            project_root: project_root.into(),
            protected_apps,
        }
    }

    /// Walk the project tree and build the deletion plan.
    ///
    /// `__init__.py` files are never part of the plan; they keep the
    /// migrations package importable after the reset.
    pub fn scan(&self) -> Result<MigrationResetPlan> {
        if !self.project_root.is_dir() {
            return Err(MendError::Reset(format!(
                "Project root not found: {}",
                self.project_root.display()
            )));
        }

        let mut plan = MigrationResetPlan::default();
        self.walk(&self.project_root, &mut plan)?;

        plan.delete.sort_by(|a, b| a.path.cmp(&b.path));
        plan.keep.sort_by(|a, b| a.path.cmp(&b.path));

        debug!(
            "Scanned {}: {} to delete, {} protected",
            self.project_root.display(),
            plan.delete.len(),
            plan.keep.len()
        );
        Ok(plan)
    }

    /// Delete every file in the plan, returning the deleted paths.
    pub fn apply(&self, plan: &MigrationResetPlan) -> Result<Vec<PathBuf>> {
        let mut deleted = Vec::with_capacity(plan.delete.len());

        for file in &plan.delete {
            fs::remove_file(&file.path)?;
            info!("Deleted {}", file.path.display());
            deleted.push(file.path.clone());
        }

        Ok(deleted)
    }

    fn walk(&self, dir: &Path, plan: &mut MigrationResetPlan) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;

            // A symlink can point outside the project root; following it
            // would put files the operator never selected into the plan.
            if entry.file_type()?.is_symlink() {
                continue;
            }

            let path = entry.path();

            if !path.is_dir() {
                continue;
            }

            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => continue,
            };

            if name.starts_with('.') {
                continue;
            }

            if name == "migrations" {
                let app = dir
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or_default()
                    .to_string();
                self.collect(&app, &path, plan)?;
            } else {
                self.walk(&path, plan)?;
            }
        }

        Ok(())
    }

    fn collect(&self, app: &str, migrations_dir: &Path, plan: &mut MigrationResetPlan) -> Result<()> {
        let protected = self.protected_apps.iter().any(|p| p == app);

        for entry in fs::read_dir(migrations_dir)? {
            let entry = entry?;
            let path = entry.path();

            if !path.is_file() || path.extension().map(|e| e != "py").unwrap_or(true) {
                continue;
            }

            // The package initializer always survives a reset.
            if path.file_name().and_then(|n| n.to_str()) == Some("__init__.py") {
                continue;
            }

            let file = MigrationFile {
                path,
                app: app.to_string(),
                protected,
            };

            if protected {
                plan.keep.push(file);
            } else {
                plan.delete.push(file);
            }
        }

        Ok(())
    }
}
