use serde::{Deserialize, Serialize};

/// Migration reset configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetConfig {
    /// Apps whose migration files are never deleted.
    #[serde(default = "default_protected_apps")]
    pub protected_apps: Vec<String>,

    /// Command run after deletion to regenerate migrations, as argv.
    #[serde(default = "default_regenerate_command")]
    pub regenerate_command: Vec<String>,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            protected_apps: default_protected_apps(),
            regenerate_command: default_regenerate_command(),
        }
    }
}

fn default_protected_apps() -> Vec<String> {
    vec!["users".to_string(), "files".to_string()]
}

fn default_regenerate_command() -> Vec<String> {
    vec![
        "python".to_string(),
        "manage.py".to_string(),
        "makemigrations".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reset_config() {
        let config = ResetConfig::default();
        assert_eq!(config.protected_apps, vec!["users", "files"]);
        assert_eq!(
            config.regenerate_command,
            vec!["python", "manage.py", "makemigrations"]
        );
    }

    #[test]
    fn test_parse_reset_config() {
        let toml = r#"
            protected_apps = ["users"]
        "#;

        let config: ResetConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.protected_apps, vec!["users"]);
        // Unset fields fall back to defaults.
        assert_eq!(config.regenerate_command[1], "manage.py");
    }
}
