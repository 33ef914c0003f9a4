//! Settings file loading and saving
//!
//! Settings live in `<project>/.tabshell/config.toml`. A missing or broken
//! file never prevents the engine from starting; defaults are used instead.

use std::path::Path;

use tabshell_core::prelude::*;

use super::types::ShellSettings;

pub const TABSHELL_DIR: &str = ".tabshell";
pub const CONFIG_FILENAME: &str = "config.toml";

/// Load settings from `.tabshell/config.toml`, falling back to defaults
pub fn load_settings(project_path: &Path) -> ShellSettings {
    let config_path = project_path.join(TABSHELL_DIR).join(CONFIG_FILENAME);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return ShellSettings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str::<ShellSettings>(&content) {
            Ok(settings) => match settings.validate() {
                Ok(()) => {
                    debug!("Loaded settings from {:?}", config_path);
                    settings
                }
                Err(e) => {
                    warn!("Ignoring {:?}: {}", config_path, e);
                    ShellSettings::default()
                }
            },
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                ShellSettings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            ShellSettings::default()
        }
    }
}

/// Save settings to `.tabshell/config.toml` atomically
pub fn save_settings(project_path: &Path, settings: &ShellSettings) -> Result<()> {
    settings.validate()?;

    let tabshell_dir = project_path.join(TABSHELL_DIR);

    if !tabshell_dir.exists() {
        std::fs::create_dir_all(&tabshell_dir)
            .map_err(|e| Error::config(format!("Failed to create .tabshell dir: {}", e)))?;
    }

    let config_path = tabshell_dir.join(CONFIG_FILENAME);
    let temp_path = tabshell_dir.join(".config.toml.tmp");

    let content = toml::to_string_pretty(settings)
        .map_err(|e| Error::config(format!("Failed to serialize settings: {}", e)))?;

    let full_content = format!("{}{}", generate_config_header(), content);

    // Atomic write: write to temp, then rename
    std::fs::write(&temp_path, &full_content)
        .map_err(|e| Error::config(format!("Failed to write temp file: {}", e)))?;

    std::fs::rename(&temp_path, &config_path)
        .map_err(|e| Error::config(format!("Failed to rename temp file: {}", e)))?;

    info!("Saved settings to {:?}", config_path);
    Ok(())
}

fn generate_config_header() -> String {
    r#"# tabshell configuration
# loading_screen accepts true, false or a delay in milliseconds

"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoadingScreen;
    use tempfile::tempdir;

    fn write_config(root: &Path, content: &str) {
        let dir = root.join(TABSHELL_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(CONFIG_FILENAME), content).unwrap();
    }

    #[test]
    fn test_load_settings_defaults() {
        let temp = tempdir().unwrap();
        let settings = load_settings(temp.path());
        assert_eq!(settings, ShellSettings::default());
    }

    #[test]
    fn test_load_settings_custom() {
        let temp = tempdir().unwrap();
        write_config(
            temp.path(),
            r#"
allow_duplicates = true
loading_screen = 500
scroll_offset = 120
scroll_behavior_swap = true
"#,
        );

        let settings = load_settings(temp.path());

        assert!(settings.allow_duplicates);
        assert_eq!(settings.loading_screen, LoadingScreen::Delay(500));
        assert_eq!(settings.scroll_offset, 120);
        assert!(settings.scroll_behavior_swap);
        // untouched keys keep their defaults
        assert!(settings.allow_reload);
    }

    #[test]
    fn test_load_settings_invalid_toml() {
        let temp = tempdir().unwrap();
        write_config(temp.path(), "not valid toml {{{{");

        let settings = load_settings(temp.path());
        assert_eq!(settings, ShellSettings::default());
    }

    #[test]
    fn test_load_settings_rejected_values_fall_back() {
        let temp = tempdir().unwrap();
        write_config(temp.path(), "scroll_offset = 0\nallow_duplicates = true");

        let settings = load_settings(temp.path());
        assert!(!settings.allow_duplicates);
        assert_eq!(settings.scroll_offset, 40);
    }

    #[test]
    fn test_save_settings_round_trip() {
        let temp = tempdir().unwrap();
        let settings = ShellSettings {
            auto_dark_mode: true,
            loading_screen: LoadingScreen::Off,
            header_active_class: "bg-primary".to_string(),
            ..Default::default()
        };

        save_settings(temp.path(), &settings).unwrap();

        let path = temp.path().join(TABSHELL_DIR).join(CONFIG_FILENAME);
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# tabshell configuration"));
        assert!(!temp.path().join(TABSHELL_DIR).join(".config.toml.tmp").exists());

        assert_eq!(load_settings(temp.path()), settings);
    }

    #[test]
    fn test_save_settings_rejects_invalid() {
        let temp = tempdir().unwrap();
        let settings = ShellSettings {
            scroll_offset: 0,
            ..Default::default()
        };
        assert!(save_settings(temp.path(), &settings).is_err());
        assert!(!temp.path().join(TABSHELL_DIR).exists());
    }
}
