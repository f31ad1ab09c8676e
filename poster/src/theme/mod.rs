//! A theme is a total mapping from every road category to how it's drawn, plus a few global
//! colors.

mod registry;

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use road_network::Category;

use crate::{Color, ThemeError};

pub use self::registry::{ThemeRegistry, DEFAULT_THEME};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StyleAttrs {
    pub color: Color,
    /// In points
    pub line_width: f64,
    /// Higher is drawn later, on top
    pub z_order: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    Normal,
    Bold,
}

impl FontWeight {
    pub fn as_svg(self) -> &'static str {
        match self {
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
        }
    }
}

fn bold() -> FontWeight {
    FontWeight::Bold
}

fn sans_serif() -> String {
    "sans-serif".to_string()
}

/// How the title and subtitles are drawn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub color: Color,
    /// For the title; subtitles are always normal weight
    #[serde(default = "bold")]
    pub weight: FontWeight,
    #[serde(default = "sans_serif")]
    pub font_family: String,
}

fn first_version() -> u32 {
    1
}

/// A theme as written in JSON. Nothing guarantees it's complete until `validate` passes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThemeDef {
    /// Shown to people, like "Terracotta"
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "first_version")]
    pub version: u32,
    pub background: Color,
    pub text: TextStyle,
    /// Fades the top and bottom of the poster into this color
    #[serde(default)]
    pub gradient: Option<Color>,
    #[serde(default)]
    pub water: Option<Color>,
    #[serde(default)]
    pub parks: Option<Color>,
    /// Keyed by category name, like "path_or_track"
    pub roads: BTreeMap<String, StyleAttrs>,
}

/// Checks that every category has a sane style and that no unknown categories are mentioned.
pub fn validate(def: &ThemeDef) -> Result<(), ThemeError> {
    parse_styles(&def.name, def).map(|_| ())
}

fn parse_styles(key: &str, def: &ThemeDef) -> Result<BTreeMap<Category, StyleAttrs>, ThemeError> {
    let mut styles = BTreeMap::new();
    for (name, attrs) in &def.roads {
        let category = Category::from_str(name).map_err(|reason| ThemeError::Parse {
            theme: key.to_string(),
            reason,
        })?;
        if !attrs.line_width.is_finite() || attrs.line_width < 0.0 {
            return Err(ThemeError::Parse {
                theme: key.to_string(),
                reason: format!("{} has line_width {}", name, attrs.line_width),
            });
        }
        styles.insert(category, attrs.clone());
    }

    let missing: Vec<String> = Category::ALL
        .iter()
        .filter(|c| !styles.contains_key(c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ThemeError::IncompleteTheme {
            theme: key.to_string(),
            missing,
        });
    }
    Ok(styles)
}

/// A validated theme. Every category has a style.
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    /// How the registry knows it, like "terracotta"
    pub key: String,
    pub display_name: String,
    pub description: String,
    pub version: u32,
    pub background: Color,
    pub text_style: TextStyle,
    pub gradient: Option<Color>,
    pub water: Option<Color>,
    pub parks: Option<Color>,
    category_style: BTreeMap<Category, StyleAttrs>,
}

impl Theme {
    pub fn from_def(key: &str, def: ThemeDef) -> Result<Theme, ThemeError> {
        let category_style = parse_styles(key, &def)?;
        Ok(Theme {
            key: key.to_string(),
            display_name: def.name,
            description: def.description,
            version: def.version,
            background: def.background,
            text_style: def.text,
            gradient: def.gradient,
            water: def.water,
            parks: def.parks,
            category_style,
        })
    }

    pub fn from_json(key: &str, raw: &str) -> Result<Theme, ThemeError> {
        let def: ThemeDef = serde_json::from_str(raw).map_err(|err| ThemeError::Parse {
            theme: key.to_string(),
            reason: err.to_string(),
        })?;
        Theme::from_def(key, def)
    }

    pub fn style(&self, category: Category) -> &StyleAttrs {
        // Construction guarantees every category is present
        &self.category_style[&category]
    }

    pub fn to_def(&self) -> ThemeDef {
        ThemeDef {
            name: self.display_name.clone(),
            description: self.description.clone(),
            version: self.version,
            background: self.background,
            text: self.text_style.clone(),
            gradient: self.gradient,
            water: self.water,
            parks: self.parks,
            roads: self
                .category_style
                .iter()
                .map(|(c, s)| (c.to_string(), s.clone()))
                .collect(),
        }
    }
}
