// src/catalog.rs
use crate::models::{ArtDirection, Environment, LensGeometry, LightProfile, Optics, VisualStyle};

use Environment::*;
use LensGeometry::*;
use LightProfile::*;
use Optics::*;

const fn style(
    id: &'static str,
    name: &'static str,
    thumbnail: &'static str,
    config: ArtDirection,
) -> VisualStyle {
    VisualStyle {
        id,
        name,
        thumbnail,
        config,
    }
}

pub static VISUAL_STYLES: [VisualStyle; 12] = [
    style(
        "cyberpunk",
        "Cyberpunk Night",
        "https://images.unsplash.com/photo-1542831371-29b0f74f9713?auto=format&fit=crop&w=400&h=400&q=80",
        ArtDirection::new(Angular, Night, Exterior, Bokeh),
    ),
    style(
        "minimal",
        "Soft Minimal",
        "https://images.unsplash.com/photo-1494438639946-1ebd1d20bf85?auto=format&fit=crop&w=400&h=400&q=80",
        ArtDirection::new(Medio, Noon, Interior, Source),
    ),
    style(
        "editorial",
        "Vogue Editorial",
        "https://images.unsplash.com/photo-1509631179647-0177331693ae?auto=format&fit=crop&w=400&h=400&q=80",
        ArtDirection::new(Retrato, Golden, Exterior, Bokeh),
    ),
    style(
        "noir",
        "Film Noir",
        "https://images.unsplash.com/photo-1554126807-6b10f6f6692a?auto=format&fit=crop&w=400&h=400&q=80",
        ArtDirection::new(Retrato, Night, Interior, Source),
    ),
    style(
        "architecture",
        "Hyper Architecture",
        "https://images.unsplash.com/photo-1486406146926-c627a92ad1ab?auto=format&fit=crop&w=400&h=400&q=80",
        ArtDirection::new(Angular, Noon, Exterior, Source),
    ),
    style(
        "ethereal",
        "Dreamy Ethereal",
        "https://images.unsplash.com/photo-1519681393784-d120267933ba?auto=format&fit=crop&w=400&h=400&q=80",
        ArtDirection::new(Medio, Dawn, Exterior, Bokeh),
    ),
    style(
        "cinematic",
        "Moody Cinema",
        "https://images.unsplash.com/photo-1485846234645-a62644f84728?auto=format&fit=crop&w=400&h=400&q=80",
        ArtDirection::new(Angular, Golden, Exterior, Bokeh),
    ),
    style(
        "neon-street",
        "Neon Street",
        "https://images.unsplash.com/photo-1514565131-fce0801e5785?auto=format&fit=crop&w=400&h=400&q=80",
        ArtDirection::new(Medio, Night, Exterior, Bokeh),
    ),
    style(
        "golden-nature",
        "Golden Nature",
        "https://images.unsplash.com/photo-1441974231531-c6227db76b6e?auto=format&fit=crop&w=400&h=400&q=80",
        ArtDirection::new(Angular, Golden, Exterior, Source),
    ),
    style(
        "analog",
        "Analog Film",
        "https://images.unsplash.com/photo-1516035069371-29a1b244cc32?auto=format&fit=crop&w=400&h=400&q=80",
        ArtDirection::new(Medio, Golden, Exterior, Source),
    ),
    style(
        "macro",
        "Macro Detail",
        "https://images.unsplash.com/photo-1459411552884-841db9b3cc2a?auto=format&fit=crop&w=400&h=400&q=80",
        ArtDirection::new(Retrato, Noon, Interior, Bokeh),
    ),
    style(
        "synthwave",
        "Retro Synth",
        "https://images.unsplash.com/photo-1550684848-fac1c5b4e853?auto=format&fit=crop&w=400&h=400&q=80",
        ArtDirection::new(Angular, Night, Exterior, Bokeh),
    ),
];

pub fn all() -> &'static [VisualStyle] {
    &VISUAL_STYLES
}

pub fn find_by_id(id: &str) -> Option<&'static VisualStyle> {
    VISUAL_STYLES.iter().find(|style| style.id == id)
}

/// First preset whose direction equals `config`; catalog order breaks ties.
pub fn find_matching(config: &ArtDirection) -> Option<&'static VisualStyle> {
    find_matching_in(&VISUAL_STYLES, config)
}

fn find_matching_in<'a>(styles: &'a [VisualStyle], config: &ArtDirection) -> Option<&'a VisualStyle> {
    styles.iter().find(|style| style.config == *config)
}
