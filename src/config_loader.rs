use crate::config::{RenderConfig, ValidationError};
use log::info;
use std::fs::File;
use std::path::Path;

/// Errors raised while loading a render configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to open render config {path}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse render config {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Load and validate a render configuration from a YAML file
pub fn load_render_config(config_path: &Path) -> Result<RenderConfig, ConfigError> {
    info!("Loading render configuration from: {:?}", config_path);

    let file = File::open(config_path).map_err(|source| ConfigError::Open {
        path: config_path.display().to_string(),
        source,
    })?;

    let config: RenderConfig = serde_yaml::from_reader(file).map_err(|source| ConfigError::Parse {
        path: config_path.display().to_string(),
        source,
    })?;

    config.validate()?;

    Ok(config)
}

/// Use the YAML file when one is given, the default style otherwise
pub fn load_or_default(config_path: Option<&Path>) -> Result<RenderConfig, ConfigError> {
    match config_path {
        Some(path) => load_render_config(path),
        None => Ok(RenderConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_render_config() {
        let yaml = r#"
width: 1200
axis_height: 250
semilog_headroom: 2.0
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        let config = load_render_config(temp_file.path()).unwrap();
        assert_eq!(config.width, 1200);
        assert_eq!(config.axis_height, 250);
        assert_eq!(config.semilog_headroom, 2.0);
        assert_eq!(config.y_padding, 0.25);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "marker_scale: -1.0\n").unwrap();

        let err = load_render_config(temp_file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_missing_config_file() {
        let err = load_render_config(Path::new("/nonexistent/style.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Open { .. }));
    }

    #[test]
    fn test_load_or_default() {
        assert_eq!(load_or_default(None).unwrap(), RenderConfig::default());
    }
}
