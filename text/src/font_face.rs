use std::sync::Arc;

use anyhow::{Context, Result};
use cosmic_text::{Attrs, Family, FontSystem, Weight, fontdb::Source};

/// The font text is laid out with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFace {
    /// `None` selects the generic sans-serif family.
    family: Option<String>,
    weight: Weight,
}

impl Default for FontFace {
    fn default() -> Self {
        Self::sans_serif()
    }
}

impl FontFace {
    pub fn sans_serif() -> Self {
        Self {
            family: None,
            weight: Weight::NORMAL,
        }
    }

    pub fn named(family: impl Into<String>) -> Self {
        Self {
            family: Some(family.into()),
            weight: Weight::NORMAL,
        }
    }

    pub fn with_weight(mut self, weight: Weight) -> Self {
        self.weight = weight;
        self
    }

    /// Loads font data into the font system and returns its first face.
    pub fn load(
        font_system: &mut FontSystem,
        font_data: impl AsRef<[u8]> + Sync + Send + 'static,
    ) -> Result<Self> {
        let ids = font_system
            .db_mut()
            .load_font_source(Source::Binary(Arc::new(font_data)));
        let id = ids.first().copied().context("Font data contains no faces")?;

        let face = font_system
            .db()
            .face(id)
            .context("Loaded font face is missing")?;
        let (family, _) = face
            .families
            .first()
            .context("Font face has no family name")?;

        Ok(Self {
            family: Some(family.clone()),
            weight: face.weight,
        })
    }

    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    pub fn weight(&self) -> Weight {
        self.weight
    }

    pub(crate) fn to_attrs(&self) -> Attrs<'_> {
        let family = match &self.family {
            Some(name) => Family::Name(name),
            None => Family::SansSerif,
        };
        Attrs::new().family(family).weight(self.weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_face_is_normal_sans_serif() {
        let face = FontFace::default();
        assert_eq!(face.family(), None);
        assert_eq!(face.weight(), Weight::NORMAL);
        assert_eq!(face.to_attrs().family, Family::SansSerif);
    }

    #[test]
    fn named_faces_select_their_family() {
        let face = FontFace::named("Roboto").with_weight(Weight::BOLD);
        let attrs = face.to_attrs();
        assert_eq!(attrs.family, Family::Name("Roboto"));
        assert_eq!(attrs.weight, Weight::BOLD);
    }

    #[test]
    fn loading_garbage_fails() {
        let mut font_system =
            FontSystem::new_with_locale_and_db("en-US".into(), Default::default());
        assert!(FontFace::load(&mut font_system, vec![0u8; 16]).is_err());
    }
}
