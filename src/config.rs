use serde::{Deserialize, Serialize};

/// Figure style handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Figure width in pixels
    pub width: u32,
    /// Height of each stacked sub-plot in pixels
    pub axis_height: u32,
    /// Fraction of the mean debt ratio added below the minimum and above the maximum
    pub y_padding: f64,
    /// Marker diameter in pixels per unit of normalized transfer volume
    pub marker_scale: f64,
    /// Semi-log top limit as a multiple of the maximum debt ratio
    pub semilog_headroom: f64,
    /// Half-width of the linear region around zero on the semi-log axis
    pub symlog_linthresh: f64,
    /// Curve stroke width in pixels
    pub line_width: u32,
    pub title_font_size: u32,
    pub label_font_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            axis_height: 320,
            y_padding: 0.25,
            marker_scale: 3.0,
            semilog_headroom: 1.5,
            symlog_linthresh: 1.0,
            line_width: 2,
            title_font_size: 22,
            label_font_size: 14,
        }
    }
}

impl RenderConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.width < 200 || self.axis_height < 100 {
            return Err(ValidationError::InvalidSize(format!(
                "figure must be at least 200x100 pixels per axis, got {}x{}",
                self.width, self.axis_height
            )));
        }
        if self.line_width == 0 || self.title_font_size == 0 || self.label_font_size == 0 {
            return Err(ValidationError::InvalidSize(
                "line width and font sizes must be positive".to_string(),
            ));
        }
        if !(self.y_padding >= 0.0) {
            return Err(ValidationError::InvalidScale(format!(
                "y_padding must be non-negative, got {}",
                self.y_padding
            )));
        }
        for (name, value) in [
            ("marker_scale", self.marker_scale),
            ("semilog_headroom", self.semilog_headroom),
            ("symlog_linthresh", self.symlog_linthresh),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(ValidationError::InvalidScale(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid figure size: {0}")]
    InvalidSize(String),
    #[error("Invalid scale setting: {0}")]
    InvalidScale(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RenderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
width: 800
y_padding: 0.1
"#;
        let config: RenderConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.width, 800);
        assert_eq!(config.y_padding, 0.1);
        assert_eq!(config.marker_scale, 3.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_values() {
        let config = RenderConfig {
            marker_scale: 0.0,
            ..RenderConfig::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidScale(_))));

        let config = RenderConfig {
            y_padding: -0.5,
            ..RenderConfig::default()
        };
        assert!(config.validate().is_err());

        let config = RenderConfig {
            width: 10,
            ..RenderConfig::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidSize(_))));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(serde_yaml::from_str::<RenderConfig>("colour: red\n").is_err());
    }
}
