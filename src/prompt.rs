// src/prompt.rs
//! Turns an art direction into the technical suffix appended to the user's
//! prompt before it is sent to the image model.

use crate::models::{ArtDirection, Environment, LensGeometry, LightProfile, Optics};

pub const CLOSING_QUALIFIER: &str = "High-end production, professional photography.";

impl LensGeometry {
    pub fn clause(self) -> &'static str {
        match self {
            Self::Angular => "ultra-wide angle lens, 14mm, cinematic perspective, expansive view",
            Self::Medio => "standard 35mm lens, natural perspective, balanced composition",
            Self::Retrato => {
                "85mm prime lens, tight composition, portrait photography style, detailed features"
            }
        }
    }
}

impl LightProfile {
    pub fn clause(self) -> &'static str {
        match self {
            Self::Dawn => {
                "dawn lighting, soft blue and pink morning hues, ethereal atmosphere, low contrast"
            }
            Self::Noon => "high noon sunlight, bright clear shadows, vibrant colors, high clarity",
            Self::Golden => "golden hour, warm amber glow, long dramatic shadows, soft backlight",
            Self::Night => {
                "midnight atmosphere, deep shadows, subtle moonlight, nocturnal cinematic lighting"
            }
        }
    }
}

impl Environment {
    pub fn clause(self) -> &'static str {
        match self {
            Self::Interior => "indoor setting, architectural interior, controlled environment",
            Self::Exterior => "outdoor setting, natural environment, open air",
        }
    }
}

impl Optics {
    pub fn clause(self) -> &'static str {
        match self {
            Self::Bokeh => "creamy bokeh, shallow depth of field, blurred background",
            Self::Source => "sharp focus throughout, high frequency detail, technical precision",
        }
    }
}

pub fn technical_suffix(config: &ArtDirection) -> String {
    format!(
        "Lens: {}. Lighting: {}. Environment: {}. Optics: {}. {}",
        config.lens.clause(),
        config.light.clause(),
        config.environment.clause(),
        config.optics.clause(),
        CLOSING_QUALIFIER
    )
}

/// Builds the full request text. The user prompt is passed through verbatim.
pub fn compile(user_prompt: &str, config: &ArtDirection) -> String {
    format!("{}. {}", user_prompt, technical_suffix(config))
}
