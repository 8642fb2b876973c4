// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_FONT_SIZE, DEFAULT_JPEG_QUALITY, DEFAULT_NAMESPACE, DEFAULT_VERTICAL_PADDING,
    DEFAULT_WATERMARK_ALPHA, DEFAULT_WATERMARK_COLOR,
};
use crate::watermark::parse_hex_color;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub watermark: WatermarkConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_handle() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE
}

fn default_color() -> String {
    DEFAULT_WATERMARK_COLOR.to_string()
}

fn default_alpha() -> u8 {
    DEFAULT_WATERMARK_ALPHA
}

fn default_bold() -> bool {
    true
}

fn default_vertical_padding() -> u32 {
    DEFAULT_VERTICAL_PADDING
}

/// Watermark appearance configuration.
///
/// The stamped text itself is not configurable: it is always
/// `"@<handle> - <currentYear>"`, derived per invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatermarkConfig {
    /// Account handle embedded in the watermark text (default: "photostamp")
    #[serde(default = "default_handle")]
    pub handle: String,

    /// Font size in pixels (default: 128)
    #[serde(default = "default_font_size")]
    pub font_size: f32,

    /// Text color as hex string, #RGB or #RRGGBB (default: "#FFFFFF")
    #[serde(default = "default_color")]
    pub color: String,

    /// Text alpha from 0 (transparent) to 255 (opaque) (default: 150)
    #[serde(default = "default_alpha")]
    pub alpha: u8,

    /// Render with the bold font face (default: true)
    #[serde(default = "default_bold")]
    pub bold: bool,

    /// Padding between the text baseline and the bottom edge in pixels
    /// (default: 20)
    #[serde(default = "default_vertical_padding")]
    pub vertical_padding: u32,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            handle: default_handle(),
            font_size: default_font_size(),
            color: default_color(),
            alpha: default_alpha(),
            bold: default_bold(),
            vertical_padding: default_vertical_padding(),
        }
    }
}

fn default_pictures_dir() -> String {
    match std::env::var("HOME") {
        Ok(home) => format!("{}/Pictures", home),
        Err(_) => "Pictures".to_string(),
    }
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

/// Output location and encoding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root pictures directory (default: $HOME/Pictures)
    #[serde(default = "default_pictures_dir")]
    pub pictures_dir: String,

    /// Namespace for the watermark directory and artifact names
    /// (default: "photostamp")
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// JPEG quality from 1 to 100 (default: 100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pictures_dir: default_pictures_dir(),
            namespace: default_namespace(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

impl OutputConfig {
    /// The directory published artifacts live in:
    /// `<pictures_dir>/<namespace> watermark`.
    pub fn watermark_dir(&self) -> PathBuf {
        Path::new(&self.pictures_dir).join(format!("{} watermark", self.namespace))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watermark: WatermarkConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        // First, check that all referenced environment variables exist
        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            std::env::var(var_name).map_err(|_| {
                format!(
                    "Environment variable '{}' is referenced but not set",
                    var_name
                )
            })?;
        }

        // Now perform the substitution (we know all vars exist)
        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap() // Safe because we checked above
        });

        let config: Config = serde_yaml::from_str(&substituted).map_err(|e| e.to_string())?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.watermark.handle.trim().is_empty() {
            return Err("watermark.handle cannot be empty".to_string());
        }

        if !self.watermark.font_size.is_finite() || self.watermark.font_size <= 0.0 {
            return Err(format!(
                "watermark.font_size must be a positive number, got {}",
                self.watermark.font_size
            ));
        }

        if let Err(e) = parse_hex_color(&self.watermark.color) {
            return Err(format!(
                "watermark.color '{}' is invalid: {}",
                self.watermark.color, e
            ));
        }

        if self.output.namespace.trim().is_empty() {
            return Err("output.namespace cannot be empty".to_string());
        }

        // A path separator in the namespace would move artifacts out of the
        // watermark directory.
        if self.output.namespace.contains(['/', '\\']) {
            return Err(format!(
                "output.namespace '{}' must not contain path separators",
                self.output.namespace
            ));
        }

        if self.output.pictures_dir.is_empty() {
            return Err("output.pictures_dir cannot be empty".to_string());
        }

        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(format!(
                "output.jpeg_quality must be between 1 and 100, got {}",
                self.output.jpeg_quality
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.watermark.handle, "photostamp");
        assert_eq!(config.watermark.font_size, 128.0);
        assert_eq!(config.watermark.color, "#FFFFFF");
        assert_eq!(config.watermark.alpha, 150);
        assert!(config.watermark.bold);
        assert_eq!(config.watermark.vertical_padding, 20);
        assert_eq!(config.output.jpeg_quality, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = Config::from_yaml_with_env("{}").unwrap();
        assert_eq!(config.watermark.handle, "photostamp");
        assert_eq!(config.output.namespace, "photostamp");
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r##"
watermark:
  handle: demo
  font_size: 64.0
  color: "#FFCC00"
  alpha: 60
  bold: false
  vertical_padding: 10
output:
  pictures_dir: /tmp/pics
  namespace: demoapp
  jpeg_quality: 90
"##;
        let config = Config::from_yaml_with_env(yaml).unwrap();
        assert_eq!(config.watermark.handle, "demo");
        assert_eq!(config.watermark.font_size, 64.0);
        assert_eq!(config.watermark.alpha, 60);
        assert!(!config.watermark.bold);
        assert_eq!(config.output.namespace, "demoapp");
        assert_eq!(
            config.output.watermark_dir(),
            PathBuf::from("/tmp/pics/demoapp watermark")
        );
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("PHOTOSTAMP_TEST_PICS", "/tmp/envpics");
        let yaml = "output:\n  pictures_dir: ${PHOTOSTAMP_TEST_PICS}\n";
        let config = Config::from_yaml_with_env(yaml).unwrap();
        assert_eq!(config.output.pictures_dir, "/tmp/envpics");
    }

    #[test]
    fn test_env_substitution_missing_var() {
        let yaml = "output:\n  pictures_dir: ${PHOTOSTAMP_TEST_UNSET_VAR}\n";
        let err = Config::from_yaml_with_env(yaml).unwrap_err();
        assert!(err.contains("PHOTOSTAMP_TEST_UNSET_VAR"));
    }

    #[test]
    fn test_validate_empty_handle() {
        let mut config = Config::default();
        config.watermark.handle = "  ".to_string();
        assert!(config.validate().unwrap_err().contains("handle"));
    }

    #[test]
    fn test_validate_bad_font_size() {
        let mut config = Config::default();
        config.watermark.font_size = 0.0;
        assert!(config.validate().unwrap_err().contains("font_size"));

        config.watermark.font_size = f32::NAN;
        assert!(config.validate().unwrap_err().contains("font_size"));
    }

    #[test]
    fn test_validate_bad_color() {
        let mut config = Config::default();
        config.watermark.color = "FFFFFF".to_string();
        assert!(config.validate().unwrap_err().contains("color"));
    }

    #[test]
    fn test_validate_bad_quality() {
        let mut config = Config::default();
        config.output.jpeg_quality = 0;
        assert!(config.validate().unwrap_err().contains("jpeg_quality"));
    }

    #[test]
    fn test_validate_namespace_with_separator() {
        let mut config = Config::default();
        config.output.namespace = "a/b".to_string();
        assert!(config.validate().unwrap_err().contains("namespace"));
    }

    #[test]
    fn test_from_file_missing() {
        let err = Config::from_file("/nonexistent/config.yaml").unwrap_err();
        assert!(err.contains("Failed to read config file"));
    }
}
