use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

/// Sequential white → blue scale for heatmap cells, `t` in `0..=1`.
pub fn heat_color(t: f64) -> Color32 {
    let light: LinSrgb = Srgb::new(0.97_f32, 0.98, 1.0).into_linear();
    let dark: LinSrgb = Srgb::new(0.03_f32, 0.19, 0.42).into_linear();
    let mixed: Srgb = Srgb::from_linear(light.mix(dark, t.clamp(0.0, 1.0) as f32));
    to_color32(mixed)
}

// ---------------------------------------------------------------------------
// Color mapping: player / series name → Color32
// ---------------------------------------------------------------------------

/// Maps each player name to a stable, distinct colour.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    /// Build a colour map from the dataset's sorted player names, so a
    /// player keeps its colour while filters change.
    pub fn new<'a>(names: impl IntoIterator<Item = &'a String>) -> Self {
        let names: Vec<&String> = names.into_iter().collect();
        let palette = generate_palette(names.len());
        let mapping = names
            .into_iter()
            .zip(palette)
            .map(|(n, c)| (n.clone(), c))
            .collect();
        ColorMap { mapping }
    }

    /// Look up the colour for a name, falling back to a palette slot by
    /// position for names not seen at construction (e.g. metric series).
    pub fn color_for(&self, name: &str, fallback_index: usize) -> Color32 {
        self.mapping.get(name).copied().unwrap_or_else(|| {
            const FALLBACK: [Color32; 6] = [
                Color32::LIGHT_BLUE,
                Color32::from_rgb(255, 160, 60),
                Color32::LIGHT_GREEN,
                Color32::LIGHT_RED,
                Color32::from_rgb(190, 140, 255),
                Color32::GOLD,
            ];
            FALLBACK[fallback_index % FALLBACK.len()]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_distinct_colours() {
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        for (i, a) in p.iter().enumerate() {
            assert!(p[i + 1..].iter().all(|b| a != b));
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn color_map_is_stable_per_name() {
        let names = vec!["A".to_string(), "B".to_string()];
        let map = ColorMap::new(&names);
        assert_eq!(map.color_for("A", 7), map.color_for("A", 0));
        assert_ne!(map.color_for("A", 0), map.color_for("B", 0));
        assert_eq!(map.color_for("Runs_Scored", 0), Color32::LIGHT_BLUE);
    }

    #[test]
    fn heat_scale_runs_light_to_dark() {
        let lo = heat_color(0.0);
        let hi = heat_color(1.0);
        assert!(lo.r() > hi.r() && lo.g() > hi.g());
        assert_eq!(heat_color(-1.0), lo);
    }
}
