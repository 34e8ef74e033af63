use indexmap::IndexMap;

use crate::render::{CATEGORY10, Color};

/// Ordinal key -> color mapping that hands out palette entries in first-use
/// order and wraps around when the palette runs out.
#[derive(Debug, Clone, PartialEq)]
pub struct OrdinalColorScale {
    palette: Vec<Color>,
    domain: IndexMap<String, Color>,
}

impl Default for OrdinalColorScale {
    fn default() -> Self {
        Self::new(CATEGORY10.to_vec())
    }
}

impl OrdinalColorScale {
    /// An empty palette falls back to the category-10 scheme.
    #[must_use]
    pub fn new(palette: Vec<Color>) -> Self {
        let palette = if palette.is_empty() {
            CATEGORY10.to_vec()
        } else {
            palette
        };
        Self {
            palette,
            domain: IndexMap::new(),
        }
    }

    /// Color for `key`, binding the next palette entry on first use.
    pub fn color(&mut self, key: &str) -> Color {
        if let Some(color) = self.domain.get(key) {
            return *color;
        }
        let color = self.palette[self.domain.len() % self.palette.len()];
        self.domain.insert(key.to_owned(), color);
        color
    }

    /// Color already bound to `key`, without binding.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Color> {
        self.domain.get(key).copied()
    }

    /// Bound keys in binding order.
    pub fn domain(&self) -> impl Iterator<Item = &str> {
        self.domain.keys().map(String::as_str)
    }

    /// Bound `(key, color)` pairs in binding order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Color)> {
        self.domain.iter().map(|(key, color)| (key.as_str(), *color))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.domain.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }

    pub fn reset(&mut self) {
        self.domain.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::OrdinalColorScale;
    use crate::render::CATEGORY10;

    #[test]
    fn keys_bind_in_first_use_order_and_reset_clears() {
        let mut scale = OrdinalColorScale::default();
        assert_eq!(scale.color("b"), CATEGORY10[0]);
        assert_eq!(scale.color("a"), CATEGORY10[1]);
        assert_eq!(scale.color("b"), CATEGORY10[0]);
        assert_eq!(scale.domain().collect::<Vec<_>>(), vec!["b", "a"]);

        scale.reset();
        assert!(scale.is_empty());
        assert_eq!(scale.color("a"), CATEGORY10[0]);
    }

    #[test]
    fn palette_wraps_around() {
        let mut scale = OrdinalColorScale::default();
        for index in 0..10 {
            scale.color(&format!("s{index}"));
        }
        assert_eq!(scale.color("s10"), CATEGORY10[0]);
    }
}
