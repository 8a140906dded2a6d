//! Inbound design requests and their normalisation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DesignError, Result};
use crate::units::Unit;

/// The only command envelope action this service understands.
pub const GENERATE_TEMPLATE_ACTION: &str = "generate_template";

/// A dimension as sent by callers: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Number(f64),
    Text(String),
}

impl Dimension {
    fn value(&self) -> Option<f64> {
        match self {
            Dimension::Number(n) => Some(*n),
            Dimension::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Colour palette: a single string or a list of swatches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Palette {
    One(String),
    Many(Vec<String>),
}

impl Palette {
    fn describe(&self) -> Option<String> {
        let text = match self {
            Palette::One(s) => s.trim().to_string(),
            Palette::Many(items) => items
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        };
        (!text.is_empty()).then_some(text)
    }
}

/// Loosely-typed "create a design" request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignSpec {
    #[serde(default, alias = "title")]
    pub name: Option<String>,
    #[serde(default)]
    pub width: Option<Dimension>,
    #[serde(default)]
    pub height: Option<Dimension>,
    #[serde(default, alias = "units")]
    pub unit: Option<String>,
    #[serde(default)]
    pub sides: Option<Value>,
    #[serde(default, alias = "color_palette")]
    pub palette: Option<Palette>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A design request ready for the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedDesign {
    pub title: String,
    pub width_px: u32,
    pub height_px: u32,
    pub description: Option<String>,
}

impl DesignSpec {
    /// Shorthand for a pixel-sized request.
    pub fn pixels(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: Some(name.into()),
            width: Some(Dimension::Number(f64::from(width))),
            height: Some(Dimension::Number(f64::from(height))),
            ..Default::default()
        }
    }

    /// Validate and convert to pixel dimensions plus a folded description.
    pub fn normalize(&self) -> Result<NormalizedDesign> {
        let title = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());
        let width = self.width.as_ref().and_then(Dimension::value);
        let height = self.height.as_ref().and_then(Dimension::value);

        let (Some(title), Some(width), Some(height)) = (title, width, height) else {
            return Err(DesignError::InvalidRequest(
                "Missing required fields: name, width, height".to_string(),
            ));
        };

        let unit: Unit = self.unit.as_deref().unwrap_or_default().parse()?;

        Ok(NormalizedDesign {
            title: title.to_string(),
            width_px: unit.to_pixels(width)?,
            height_px: unit.to_pixels(height)?,
            description: self.describe(),
        })
    }

    /// Fold the free-text metadata into one description string.
    fn describe(&self) -> Option<String> {
        let sides = self.sides.as_ref().and_then(|v| match v {
            Value::Null => None,
            Value::String(s) => Some(s.trim().to_string()),
            other => Some(other.to_string()),
        });
        let palette = self.palette.as_ref().and_then(Palette::describe);
        let style = self.style.as_deref().map(|s| s.trim().to_string());
        let notes = self.notes.as_deref().map(|s| s.trim().to_string());

        let parts: Vec<String> = [
            ("sides", sides),
            ("palette", palette),
            ("style", style),
            ("notes", notes),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.filter(|v| !v.is_empty()).map(|v| format!("{key}: {v}")))
        .collect();

        (!parts.is_empty()).then(|| parts.join("; "))
    }
}

/// Legacy command envelope: `{ action, payload }`.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentCommand {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub payload: Option<DesignSpec>,
}

impl AgentCommand {
    /// Unwrap a `generate_template` command into its design request.
    pub fn into_design_spec(self) -> Result<DesignSpec> {
        match self.action.as_deref() {
            Some(GENERATE_TEMPLATE_ACTION) => Ok(self.payload.unwrap_or_default()),
            other => Err(DesignError::UnsupportedAction(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}
