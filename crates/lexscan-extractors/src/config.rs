//! Extraction configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, ExtractResult};

/// Default OCR recognition language.
pub const DEFAULT_LANGUAGE: &str = "eng";

/// Default upscale factor for rendering text-less PDF pages before OCR.
pub const DEFAULT_RENDER_SCALE: f32 = 2.0;

/// Largest accepted render scale. A US Letter page at this scale is already
/// 6120x7920 pixels.
pub const MAX_RENDER_SCALE: f32 = 10.0;

/// Options recognized by the extraction engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// OCR language code, used for images and rendered pages (default: "eng").
    pub recognition_language: String,
    /// Scale applied when rendering a PDF page for OCR (default: 2.0).
    pub render_scale: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            recognition_language: DEFAULT_LANGUAGE.to_string(),
            render_scale: DEFAULT_RENDER_SCALE,
        }
    }
}

impl ExtractionConfig {
    /// Set the OCR recognition language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.recognition_language = language.into();
        self
    }

    /// Set the page render scale.
    pub fn with_render_scale(mut self, scale: f32) -> Self {
        self.render_scale = scale;
        self
    }

    /// Check that the configuration can drive an extraction.
    pub fn validate(&self) -> ExtractResult<()> {
        if self.recognition_language.trim().is_empty() {
            return Err(ExtractError::Configuration(
                "recognition_language must not be empty".to_string(),
            ));
        }
        if !self.render_scale.is_finite()
            || self.render_scale <= 0.0
            || self.render_scale > MAX_RENDER_SCALE
        {
            return Err(ExtractError::Configuration(format!(
                "render_scale must be in (0, {}], got {}",
                MAX_RENDER_SCALE, self.render_scale
            )));
        }
        Ok(())
    }

    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> ExtractResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExtractError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        let ext = path.extension().and_then(|e| e.to_str());

        let config: Self = match ext {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| ExtractError::Configuration(e.to_string()))?,
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| ExtractError::Configuration(e.to_string()))?,
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| ExtractError::Configuration(e.to_string()))?,
            _ => {
                return Err(ExtractError::Configuration(
                    "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
                ))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides on top of this configuration.
    ///
    /// Reads `LEXSCAN_OCR_LANGUAGE` and `LEXSCAN_RENDER_SCALE`. Unparseable
    /// values are logged and ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(language) = std::env::var("LEXSCAN_OCR_LANGUAGE") {
            if !language.trim().is_empty() {
                self.recognition_language = language;
            }
        }

        if let Ok(scale) = std::env::var("LEXSCAN_RENDER_SCALE") {
            match scale.parse() {
                Ok(scale) => self.render_scale = scale,
                Err(_) => tracing::warn!("Ignoring invalid LEXSCAN_RENDER_SCALE '{}'", scale),
            }
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = ExtractionConfig::default();
        assert_eq!(config.recognition_language, "eng");
        assert_eq!(config.render_scale, 2.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builders() {
        let config = ExtractionConfig::default()
            .with_language("deu")
            .with_render_scale(3.0);
        assert_eq!(config.recognition_language, "deu");
        assert_eq!(config.render_scale, 3.0);
    }

    #[test]
    fn test_config_validation() {
        assert!(ExtractionConfig::default().with_language("  ").validate().is_err());
        assert!(ExtractionConfig::default().with_render_scale(0.0).validate().is_err());
        assert!(ExtractionConfig::default().with_render_scale(-1.5).validate().is_err());
        assert!(ExtractionConfig::default()
            .with_render_scale(f32::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_config_rejects_oversized_scale() {
        assert!(ExtractionConfig::default()
            .with_render_scale(MAX_RENDER_SCALE)
            .validate()
            .is_ok());
        assert!(matches!(
            ExtractionConfig::default().with_render_scale(1e9).validate(),
            Err(ExtractError::Configuration(_))
        ));
        assert!(ExtractionConfig::default()
            .with_render_scale(f32::INFINITY)
            .validate()
            .is_err());
    }

    // The only test in this crate touching these variables, so no lock is needed.
    #[test]
    fn test_config_env_overrides() {
        std::env::set_var("LEXSCAN_OCR_LANGUAGE", "ita");
        std::env::set_var("LEXSCAN_RENDER_SCALE", "3.5");
        let config = ExtractionConfig::default().with_env_overrides();
        assert_eq!(config.recognition_language, "ita");
        assert_eq!(config.render_scale, 3.5);

        std::env::set_var("LEXSCAN_OCR_LANGUAGE", "   ");
        std::env::set_var("LEXSCAN_RENDER_SCALE", "three");
        let config = ExtractionConfig::default()
            .with_render_scale(1.5)
            .with_env_overrides();
        assert_eq!(config.recognition_language, DEFAULT_LANGUAGE);
        assert_eq!(config.render_scale, 1.5);

        std::env::remove_var("LEXSCAN_OCR_LANGUAGE");
        std::env::remove_var("LEXSCAN_RENDER_SCALE");
        let config = ExtractionConfig::default().with_env_overrides();
        assert_eq!(config, ExtractionConfig::default());
    }

    #[test]
    fn test_config_from_toml_partial() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "recognition_language = \"fra\"").unwrap();

        let config = ExtractionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.recognition_language, "fra");
        assert_eq!(config.render_scale, DEFAULT_RENDER_SCALE);
    }

    #[test]
    fn test_config_from_json_and_yaml() {
        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(json, r#"{{"render_scale": 1.5}}"#).unwrap();
        let config = ExtractionConfig::from_file(json.path()).unwrap();
        assert_eq!(config.render_scale, 1.5);
        assert_eq!(config.recognition_language, DEFAULT_LANGUAGE);

        let mut yaml = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(yaml, "recognition_language: spa\nrender_scale: 4.0").unwrap();
        let config = ExtractionConfig::from_file(yaml.path()).unwrap();
        assert_eq!(config.recognition_language, "spa");
        assert_eq!(config.render_scale, 4.0);
    }

    #[test]
    fn test_config_from_file_rejects_invalid() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "render_scale = 0.0").unwrap();
        assert!(matches!(
            ExtractionConfig::from_file(file.path()),
            Err(ExtractError::Configuration(_))
        ));

        let ini = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        assert!(ExtractionConfig::from_file(ini.path()).is_err());
    }
}
