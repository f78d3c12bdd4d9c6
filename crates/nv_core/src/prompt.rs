use rand::seq::SliceRandom;
use rand::Rng;

/// Appended to every prompt.
pub const QUALITY_GUIDANCE: &str =
    "High quality, detailed composition, no text, letters or logos in the image.";

/// A named prompt modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub name: &'static str,
    pub descriptor: &'static str,
}

pub const STYLES: &[Style] = &[
    Style {
        name: "photorealistic",
        descriptor: "a photorealistic press photograph with natural lighting",
    },
    Style {
        name: "watercolor",
        descriptor: "a soft watercolor painting with loose brush strokes",
    },
    Style {
        name: "editorial",
        descriptor: "a bold flat editorial illustration with a limited color palette",
    },
    Style {
        name: "comic",
        descriptor: "a comic book panel with ink outlines and halftone shading",
    },
    Style {
        name: "oil-painting",
        descriptor: "a classical oil painting with rich textures",
    },
];

#[derive(Debug, Clone)]
pub struct StyleCatalog {
    styles: &'static [Style],
}

impl Default for StyleCatalog {
    fn default() -> Self {
        Self { styles: STYLES }
    }
}

impl StyleCatalog {
    pub fn new(styles: &'static [Style]) -> Self {
        Self { styles }
    }

    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Style> {
        self.styles.choose(rng).copied()
    }

    pub fn get(&self, name: &str) -> Option<Style> {
        self.styles.iter().find(|s| s.name == name).copied()
    }

    pub fn styles(&self) -> &'static [Style] {
        self.styles
    }
}

pub fn build_prompt(title: &str, style: Option<&Style>) -> String {
    let mut prompt = format!("An illustration for this news article: \"{}\".", title.trim());
    if let Some(style) = style {
        prompt.push_str(&format!(" Render it as {}.", style.descriptor));
    }
    prompt.push(' ');
    prompt.push_str(QUALITY_GUIDANCE);
    prompt
}
