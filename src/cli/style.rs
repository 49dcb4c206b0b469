use crossterm::style::{Color, Stylize};

use crate::model::category::{CategoryRef, CategoryRegistry};

/// Parse a hex color like `#4a7db1` into an RGB color
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb { r, g, b })
}

/// Category styling derived from the registry for one render
pub struct Palette<'a> {
    categories: &'a CategoryRegistry,
    enabled: bool,
}

impl<'a> Palette<'a> {
    pub fn new(categories: &'a CategoryRegistry, enabled: bool) -> Self {
        Palette {
            categories,
            enabled,
        }
    }

    /// Display name for a category, falling back to the key
    pub fn name(&self, category: &CategoryRef) -> String {
        self.categories
            .config_for(category)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| category.key().to_string())
    }

    fn color(&self, category: &CategoryRef) -> Option<Color> {
        self.categories
            .config_for(category)
            .and_then(|c| parse_hex_color(&c.color))
    }

    /// `text` in the category's color, bold
    pub fn paint(&self, category: &CategoryRef, text: &str) -> String {
        match self.color(category) {
            Some(color) if self.enabled => text.with(color).bold().to_string(),
            _ => text.to_string(),
        }
    }

    /// Dim text for completed items
    pub fn dim(&self, text: &str) -> String {
        if self.enabled {
            text.dim().to_string()
        } else {
            text.to_string()
        }
    }
}
