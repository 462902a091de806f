// src/models.rs
use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::StudioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LensGeometry {
    Angular,
    Medio,
    Retrato,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightProfile {
    Dawn,
    Noon,
    Golden,
    Night,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Interior,
    Exterior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Optics {
    Bokeh,
    Source,
}

impl LensGeometry {
    pub const ALL: [LensGeometry; 3] = [Self::Angular, Self::Medio, Self::Retrato];

    pub fn label(self) -> &'static str {
        match self {
            Self::Angular => "Angular",
            Self::Medio => "Medio",
            Self::Retrato => "Retrato",
        }
    }
}

impl LightProfile {
    pub const ALL: [LightProfile; 4] = [Self::Dawn, Self::Noon, Self::Golden, Self::Night];

    pub fn label(self) -> &'static str {
        match self {
            Self::Dawn => "Amanecer",
            Self::Noon => "Mediodía",
            Self::Golden => "Golden Hour",
            Self::Night => "Medianoche",
        }
    }
}

impl Environment {
    pub const ALL: [Environment; 2] = [Self::Interior, Self::Exterior];

    pub fn label(self) -> &'static str {
        match self {
            Self::Interior => "Interior",
            Self::Exterior => "Exterior",
        }
    }
}

impl Optics {
    pub const ALL: [Optics; 2] = [Self::Bokeh, Self::Source];

    pub fn label(self) -> &'static str {
        match self {
            Self::Bokeh => "Bokeh",
            Self::Source => "Source Asset",
        }
    }
}

/// The four-dimension art direction that parameterizes a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtDirection {
    pub lens: LensGeometry,
    pub light: LightProfile,
    pub environment: Environment,
    pub optics: Optics,
}

impl ArtDirection {
    pub const fn new(
        lens: LensGeometry,
        light: LightProfile,
        environment: Environment,
        optics: Optics,
    ) -> Self {
        Self {
            lens,
            light,
            environment,
            optics,
        }
    }

    /// Every valid configuration, lens-major.
    pub fn all() -> impl Iterator<Item = ArtDirection> {
        LensGeometry::ALL.into_iter().flat_map(|lens| {
            LightProfile::ALL.into_iter().flat_map(move |light| {
                Environment::ALL.into_iter().flat_map(move |environment| {
                    Optics::ALL
                        .into_iter()
                        .map(move |optics| ArtDirection::new(lens, light, environment, optics))
                })
            })
        })
    }
}

impl Default for ArtDirection {
    fn default() -> Self {
        Self::new(
            LensGeometry::Medio,
            LightProfile::Noon,
            Environment::Exterior,
            Optics::Source,
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VisualStyle {
    pub id: &'static str,
    pub name: &'static str,
    pub thumbnail: &'static str,
    pub config: ArtDirection,
}

/// Image bytes carried inline, together with their MIME type.
#[derive(Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl std::fmt::Debug for InlineImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.data.len())
            .finish()
    }
}

impl InlineImage {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.data)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    /// Parses a `data:<mime>;base64,<payload>` reference. A bare base64
    /// payload without the `data:` header is accepted as PNG.
    pub fn from_data_url(url: &str) -> Result<Self, StudioError> {
        let url = url.trim();
        let (mime_type, payload) = match url.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest.split_once(',').ok_or_else(|| {
                    StudioError::ImageProcessing("Malformed data URL".to_string())
                })?;
                let mime = header.strip_suffix(";base64").ok_or_else(|| {
                    StudioError::ImageProcessing("Data URL is not base64 encoded".to_string())
                })?;
                let mime = if mime.is_empty() { "image/png" } else { mime };
                (mime.to_string(), payload)
            }
            None => ("image/png".to_string(), url),
        };

        let data = general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| StudioError::ImageProcessing(format!("Invalid base64 payload: {}", e)))?;

        Ok(Self { mime_type, data })
    }

    /// File extension used for downloads.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

/// A committed generation or edit result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedImage {
    pub id: Uuid,
    #[serde(serialize_with = "serialize_data_url")]
    pub url: InlineImage,
    pub prompt: String,
    pub config: ArtDirection,
    pub timestamp: DateTime<Utc>,
}

impl GeneratedImage {
    pub fn new(image: InlineImage, prompt: String, config: ArtDirection) -> Self {
        Self {
            id: Uuid::now_v7(),
            url: image,
            prompt,
            config,
            timestamp: Utc::now(),
        }
    }

    pub fn download_filename(&self) -> String {
        format!("aura-{}.{}", self.id, self.url.extension())
    }
}

fn serialize_data_url<S>(image: &InlineImage, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&image.to_data_url())
}
