//! Marker colours per category.

use std::collections::HashMap;

use crate::record::Category;

/// Colour for categories the palette does not know.
pub const DEFAULT_COLOR: &str = "#2ea76b";

/// Colours cycled through for categories without an override.
pub const FALLBACK_COLORS: [&str; 15] = [
    "#1DB5C5", "#70BA7A", "#EE2528", "#F38331", "#5C368D", "#F9B832", "#2ea76b", "#00753B",
    "#1f8a70", "#6078ea", "#ffba49", "#ef476f", "#073b4c", "#ffd166", "#06d6a0",
];

/// Category to colour assignment.
#[derive(Debug, Clone, Default)]
pub struct CategoryPalette {
    colors: HashMap<Category, String>,
}

impl CategoryPalette {
    /// Assign colours in category order.
    ///
    /// A category takes its override when one exists, otherwise the fallback
    /// colour at its position modulo the fallback list length.
    pub fn new(categories: &[Category], overrides: &HashMap<String, String>) -> Self {
        let colors = categories
            .iter()
            .enumerate()
            .map(|(i, category)| {
                let color = overrides
                    .get(category.as_str())
                    .cloned()
                    .unwrap_or_else(|| FALLBACK_COLORS[i % FALLBACK_COLORS.len()].to_string());
                (category.clone(), color)
            })
            .collect();
        Self { colors }
    }

    /// Colour for a category.
    pub fn color(&self, category: &Category) -> &str {
        self.colors
            .get(category)
            .map(String::as_str)
            .unwrap_or(DEFAULT_COLOR)
    }
}

/// Parse `Name=#hex,Other=#hex` overrides. Malformed entries are skipped.
pub fn parse_overrides(raw: &str) -> HashMap<String, String> {
    raw.split(',')
        .filter_map(|entry| {
            let (name, color) = entry.split_once('=')?;
            let (name, color) = (name.trim(), color.trim());
            (!name.is_empty() && !color.is_empty()).then(|| (name.to_string(), color.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_win_and_fallback_uses_position() {
        let categories = vec![
            Category::from("Arwytec"),
            Category::from("Nouvelle"),
            Category::from("Autre"),
        ];
        let overrides = parse_overrides("Arwytec=#567e66");
        let palette = CategoryPalette::new(&categories, &overrides);

        assert_eq!(palette.color(&categories[0]), "#567e66");
        assert_eq!(palette.color(&categories[1]), FALLBACK_COLORS[1]);
        assert_eq!(palette.color(&categories[2]), FALLBACK_COLORS[2]);
        assert_eq!(palette.color(&Category::from("Inconnue")), DEFAULT_COLOR);
    }

    #[test]
    fn fallback_cycles() {
        let categories: Vec<_> = (0..20).map(|i| Category::new(format!("c{}", i))).collect();
        let palette = CategoryPalette::new(&categories, &HashMap::new());
        assert_eq!(palette.color(&categories[15]), FALLBACK_COLORS[0]);
        assert_eq!(palette.color(&categories[19]), FALLBACK_COLORS[4]);
    }

    #[test]
    fn parse_overrides_skips_malformed_entries() {
        let overrides = parse_overrides(" OCADIA = #555334 ,broken,=#fff, SG Conseils=#70ced0");
        assert_eq!(overrides.len(), 2);
        assert_eq!(overrides["OCADIA"], "#555334");
        assert_eq!(overrides["SG Conseils"], "#70ced0");
        assert!(parse_overrides("").is_empty());
    }
}
