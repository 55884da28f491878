//! Row styling keyed by category
//!
//! Styling is a pure function of a report row; it never touches the statistics.

use serde::{Deserialize, Serialize};

use crate::comparison::ReportRow;

/// Background colour assigned to one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStyle {
    pub category: String,
    pub background: String,
}

/// Category-to-colour mapping with a fallback colour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylePalette {
    #[serde(default = "default_background")]
    pub default_background: String,
    #[serde(default)]
    pub categories: Vec<CategoryStyle>,
}

fn default_background() -> String {
    "white".to_string()
}

impl Default for StylePalette {
    fn default() -> Self {
        Self {
            default_background: default_background(),
            categories: [
                ("deployment_name", "lightblue"),
                ("embedding_model", "lightgreen"),
                ("search_algorithm", "lightyellow"),
                ("agentic_rerank", "lightsalmon"),
            ]
            .into_iter()
            .map(|(category, background)| CategoryStyle {
                category: category.to_string(),
                background: background.to_string(),
            })
            .collect(),
        }
    }
}

impl StylePalette {
    /// Background colour for a category label
    pub fn background_for(&self, category: &str) -> &str {
        self.categories
            .iter()
            .find(|s| s.category == category)
            .map(|s| s.background.as_str())
            .unwrap_or(&self.default_background)
    }
}

/// Display style of one report row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowStyle {
    pub background: String,
}

impl RowStyle {
    /// CSS declaration, e.g. `background-color: lightblue`
    pub fn css(&self) -> String {
        format!("background-color: {}", self.background)
    }

    /// RGB triple of the background colour; unknown names fall back to white
    pub fn rgb(&self) -> (u8, u8, u8) {
        colour_rgb(&self.background).unwrap_or((255, 255, 255))
    }
}

/// Style of a report row, determined only by its category
pub fn row_style(row: &ReportRow, palette: &StylePalette) -> RowStyle {
    RowStyle {
        background: palette.background_for(&row.key.category).to_string(),
    }
}

/// Resolve a CSS colour name or `#rrggbb` value
pub fn colour_rgb(colour: &str) -> Option<(u8, u8, u8)> {
    let colour = colour.trim().to_ascii_lowercase();
    if let Some(hex) = colour.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some((channel(0)?, channel(2)?, channel(4)?));
    }
    let rgb = match colour.as_str() {
        "white" => (255, 255, 255),
        "lightblue" => (173, 216, 230),
        "lightgreen" => (144, 238, 144),
        "lightyellow" => (255, 255, 224),
        "lightsalmon" => (255, 160, 122),
        "lightgray" | "lightgrey" => (211, 211, 211),
        "lightpink" => (255, 182, 193),
        "lightcyan" => (224, 255, 255),
        "lavender" => (230, 230, 250),
        "wheat" => (245, 222, 179),
        _ => return None,
    };
    Some(rgb)
}
