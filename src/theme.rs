use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const CLASSIC_BOX_FILL: &str = "azure";
const CLASSIC_STROKE: &str = "darkslategrey";
const CLASSIC_NAME: &str = "royalblue";
const CLASSIC_PROPERTY: &str = "seagreen";
const CLASSIC_LABEL: &str = "black";
const FONT_FAMILY: &str = "monospace";
const STROKE_WIDTH: f64 = 2.0;

const BUILTIN_THEMES: &[&str] = &["classic", "mono"];

/// Colours and fonts used by the SVG renderer. Every field is optional in a
/// theme file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_box_fill")]
    pub box_fill: String,
    #[serde(default = "default_stroke")]
    pub stroke: String,
    #[serde(default = "default_name")]
    pub name_color: String,
    #[serde(default = "default_property")]
    pub property_color: String,
    #[serde(default = "default_stroke")]
    pub connector_color: String,
    #[serde(default = "default_label")]
    pub label_color: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
}

fn default_box_fill() -> String {
    CLASSIC_BOX_FILL.to_string()
}
fn default_stroke() -> String {
    CLASSIC_STROKE.to_string()
}
fn default_name() -> String {
    CLASSIC_NAME.to_string()
}
fn default_property() -> String {
    CLASSIC_PROPERTY.to_string()
}
fn default_label() -> String {
    CLASSIC_LABEL.to_string()
}
fn default_font_family() -> String {
    FONT_FAMILY.to_string()
}
fn default_stroke_width() -> f64 {
    STROKE_WIDTH
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

impl Theme {
    pub fn classic() -> Self {
        Theme {
            box_fill: default_box_fill(),
            stroke: default_stroke(),
            name_color: default_name(),
            property_color: default_property(),
            connector_color: default_stroke(),
            label_color: default_label(),
            font_family: default_font_family(),
            stroke_width: STROKE_WIDTH,
        }
    }

    pub fn mono() -> Self {
        Theme {
            box_fill: "white".to_string(),
            stroke: "black".to_string(),
            name_color: "black".to_string(),
            property_color: "#333333".to_string(),
            connector_color: "black".to_string(),
            label_color: "black".to_string(),
            font_family: default_font_family(),
            stroke_width: 1.0,
        }
    }

    pub fn from_builtin(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "classic" => Ok(Self::classic()),
            "mono" => Ok(Self::mono()),
            _ => Err(Error::Theme(format!(
                "unknown built-in theme '{}'. Available: {}",
                name,
                Self::list_builtins().join(", ")
            ))),
        }
    }

    pub fn list_builtins() -> Vec<&'static str> {
        BUILTIN_THEMES.to_vec()
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Theme(format!("failed to parse TOML: {}", e)))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| Error::Theme(format!("failed to parse YAML: {}", e)))
    }

    /// A built-in name, or a TOML/YAML theme file (TOML tried first).
    pub fn load(spec: &str) -> Result<Self> {
        let path = std::path::Path::new(spec);
        if !path.is_file() {
            return Self::from_builtin(spec);
        }

        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).or_else(|_| Self::from_yaml(&content))
    }
}
