use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::Srgb;

use crate::config::DashboardConfig;
use crate::data::model::RiskLabel;
use crate::view::Role;

// ---------------------------------------------------------------------------
// CSS colour names → Color32
// ---------------------------------------------------------------------------

/// Resolve a CSS colour name (`"red"`, `"orange"`, ...) through palette's
/// named-colour table.
pub fn named_color(name: &str) -> Option<Color32> {
    let rgb: Srgb<u8> = palette::named::from_str(&name.trim().to_ascii_lowercase())?;
    Some(Color32::from_rgb(rgb.red, rgb.green, rgb.blue))
}

fn named_or(name: &str, fallback: Color32) -> Color32 {
    named_color(name).unwrap_or_else(|| {
        log::warn!("Unknown colour name '{name}', using fallback");
        fallback
    })
}

// ---------------------------------------------------------------------------
// Colour tables
// ---------------------------------------------------------------------------

/// Fixed colour table for risk labels, plus the two forensic role colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<RiskLabel, Color32>,
    default_color: Color32,
    root_color: Color32,
    domino_color: Color32,
}

impl ColorMap {
    pub fn from_config(config: &DashboardConfig) -> Self {
        let default_color = named_or(&config.default_color, Color32::GRAY);
        let mapping = config
            .risk_colors
            .iter()
            .map(|(label, color)| (RiskLabel::parse(label), named_or(color, default_color)))
            .collect();

        ColorMap {
            mapping,
            default_color,
            root_color: named_or(&config.root_color, default_color),
            domino_color: named_or(&config.domino_color, default_color),
        }
    }

    /// Look up the colour for a risk label; unmapped labels get the default.
    pub fn color_for(&self, label: &RiskLabel) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }

    pub fn role_color(&self, role: Role) -> Color32 {
        match role {
            Role::RootCause => self.root_color,
            Role::DominoEffect => self.domino_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_css_names() {
        assert_eq!(named_color("red"), Some(Color32::from_rgb(255, 0, 0)));
        assert_eq!(named_color("Orange"), Some(Color32::from_rgb(255, 165, 0)));
        assert_eq!(named_color("not-a-colour"), None);
    }

    #[test]
    fn default_table_colours_each_label() {
        let map = ColorMap::from_config(&DashboardConfig::default());
        assert_eq!(map.color_for(&RiskLabel::High), Color32::from_rgb(255, 0, 0));
        assert_eq!(map.color_for(&RiskLabel::Low), Color32::from_rgb(0, 0, 255));
        assert_eq!(map.color_for(&RiskLabel::Safe), Color32::from_rgb(0, 128, 0));
        assert_eq!(map.role_color(Role::DominoEffect), Color32::from_rgb(255, 165, 0));
    }

    #[test]
    fn unknown_colour_name_falls_back_to_default() {
        let mut config = DashboardConfig::default();
        config
            .risk_colors
            .insert(RiskLabel::HIGH.to_string(), "notacolour".to_string());
        config.root_color = "alsonotacolour".to_string();

        let map = ColorMap::from_config(&config);
        let gray = Color32::from_rgb(128, 128, 128);
        assert_eq!(map.color_for(&RiskLabel::High), gray);
        assert_eq!(map.role_color(Role::RootCause), gray);
        assert_eq!(map.color_for(&RiskLabel::Low), Color32::from_rgb(0, 0, 255));
    }

    #[test]
    fn unknown_default_name_falls_back_to_egui_gray() {
        let config = DashboardConfig {
            default_color: "nope".to_string(),
            ..DashboardConfig::default()
        };
        let map = ColorMap::from_config(&config);
        assert_eq!(map.color_for(&RiskLabel::Other("X".into())), Color32::GRAY);
    }

    #[test]
    fn unknown_label_gets_default() {
        let map = ColorMap::from_config(&DashboardConfig::default());
        let gray = Color32::from_rgb(128, 128, 128);
        assert_eq!(map.color_for(&RiskLabel::Other("EXTREME".into())), gray);
    }
}
