// src/session.rs
//! Single-session studio state.
//!
//! Submits are split into a `begin_*` step, which checks the guards, marks the
//! session as loading and hands back a ticket with everything the remote call
//! needs, and a `finish_*` step, which returns the session to idle and commits
//! the result only if the call succeeded. Nothing is borrowed across the
//! remote call, so the owner can release its lock while waiting.

use log::{debug, info};
use serde::Serialize;
use uuid::Uuid;

use crate::catalog;
use crate::errors::{Rejection, StudioError};
use crate::history::History;
use crate::models::{
    ArtDirection, Environment, GeneratedImage, InlineImage, LensGeometry, LightProfile, Optics,
    VisualStyle,
};

pub const EDIT_PREFIX: &str = "Edit: ";

#[derive(Debug)]
pub struct GenerateTicket {
    pub prompt: String,
    pub config: ArtDirection,
    pub reference: Option<InlineImage>,
}

#[derive(Debug)]
pub struct EditTicket {
    pub source: InlineImage,
    pub instruction: String,
    pub config: ArtDirection,
}

#[derive(Debug, Default)]
pub struct Session {
    prompt: String,
    config: ArtDirection,
    reference_image: Option<InlineImage>,
    current_image: Option<GeneratedImage>,
    history: History,
    edit_prompt: String,
    is_editing: bool,
    is_loading: bool,
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub prompt: String,
    pub config: ArtDirection,
    pub matching_style_id: Option<&'static str>,
    pub reference_image: Option<String>,
    pub current_image: Option<GeneratedImage>,
    pub history: History,
    pub edit_prompt: String,
    pub is_editing: bool,
    pub is_loading: bool,
    pub can_generate: bool,
    pub can_edit: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> ArtDirection {
        self.config
    }

    pub fn reference_image(&self) -> Option<&InlineImage> {
        self.reference_image.as_ref()
    }

    pub fn current_image(&self) -> Option<&GeneratedImage> {
        self.current_image.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn edit_prompt(&self) -> &str {
        &self.edit_prompt
    }

    pub fn is_editing(&self) -> bool {
        self.is_editing
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn can_generate(&self) -> bool {
        !self.is_loading && !self.prompt.trim().is_empty()
    }

    pub fn can_edit(&self) -> bool {
        !self.is_loading && !self.edit_prompt.trim().is_empty() && self.current_image.is_some()
    }

    pub fn matching_style(&self) -> Option<&'static VisualStyle> {
        catalog::find_matching(&self.config)
    }

    // Configuration edits are legal in any state and never touch results.

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn set_config(&mut self, config: ArtDirection) {
        self.config = config;
    }

    pub fn set_lens(&mut self, lens: LensGeometry) {
        self.config.lens = lens;
    }

    pub fn set_light(&mut self, light: LightProfile) {
        self.config.light = light;
    }

    pub fn set_environment(&mut self, environment: Environment) {
        self.config.environment = environment;
    }

    pub fn set_optics(&mut self, optics: Optics) {
        self.config.optics = optics;
    }

    pub fn apply_style(&mut self, style: &VisualStyle) {
        debug!("Applying style {}", style.id);
        self.config = style.config;
    }

    pub fn set_reference_image(&mut self, image: InlineImage) {
        if image.data.is_empty() {
            self.reference_image = None;
        } else {
            self.reference_image = Some(image);
        }
    }

    pub fn clear_reference_image(&mut self) {
        self.reference_image = None;
    }

    pub fn set_edit_prompt(&mut self, text: impl Into<String>) {
        self.edit_prompt = text.into();
    }

    pub fn set_editing(&mut self, editing: bool) {
        self.is_editing = editing;
    }

    pub fn toggle_editing(&mut self) -> bool {
        self.is_editing = !self.is_editing;
        self.is_editing
    }

    /// Pure selection: history order and loading state are left alone.
    pub fn select_from_history(&mut self, id: &Uuid) -> Result<&GeneratedImage, StudioError> {
        let image = self
            .history
            .get(id)
            .cloned()
            .ok_or_else(|| StudioError::NotFound(format!("history entry {}", id)))?;
        Ok(&*self.current_image.insert(image))
    }

    /// Looks up an image that can still be downloaded: the current one or
    /// anything left in history.
    pub fn find_image(&self, id: &Uuid) -> Option<&GeneratedImage> {
        self.current_image
            .as_ref()
            .filter(|image| image.id == *id)
            .or_else(|| self.history.get(id))
    }

    pub fn begin_generate(&mut self) -> Result<GenerateTicket, StudioError> {
        if self.is_loading {
            return Err(StudioError::InvalidSubmission(Rejection::Busy));
        }
        if self.prompt.trim().is_empty() {
            return Err(StudioError::InvalidSubmission(Rejection::EmptyPrompt));
        }

        self.is_loading = true;
        Ok(GenerateTicket {
            prompt: self.prompt.clone(),
            config: self.config,
            reference: self.reference_image.clone(),
        })
    }

    pub fn finish_generate(
        &mut self,
        ticket: GenerateTicket,
        outcome: Result<InlineImage, StudioError>,
    ) -> Result<GeneratedImage, StudioError> {
        self.is_loading = false;
        let image = outcome?;

        let generated = GeneratedImage::new(image, ticket.prompt, ticket.config);
        info!("Generated image {}", generated.id);
        self.commit(generated.clone());
        Ok(generated)
    }

    pub fn begin_edit(&mut self) -> Result<EditTicket, StudioError> {
        if self.is_loading {
            return Err(StudioError::InvalidSubmission(Rejection::Busy));
        }
        if self.edit_prompt.trim().is_empty() {
            return Err(StudioError::InvalidSubmission(Rejection::EmptyEditPrompt));
        }
        let current = self
            .current_image
            .as_ref()
            .ok_or(StudioError::InvalidSubmission(Rejection::NoCurrentImage))?;

        let ticket = EditTicket {
            source: current.url.clone(),
            instruction: self.edit_prompt.clone(),
            config: current.config,
        };
        self.is_loading = true;
        Ok(ticket)
    }

    pub fn finish_edit(
        &mut self,
        ticket: EditTicket,
        outcome: Result<InlineImage, StudioError>,
    ) -> Result<GeneratedImage, StudioError> {
        self.is_loading = false;
        let image = outcome?;

        let generated = GeneratedImage::new(
            image,
            format!("{}{}", EDIT_PREFIX, ticket.instruction),
            ticket.config,
        );
        info!("Edited image into {}", generated.id);
        self.commit(generated.clone());
        self.edit_prompt.clear();
        self.is_editing = false;
        Ok(generated)
    }

    /// Returns to idle when a submit ended without reaching `finish_*`.
    pub fn abandon_pending(&mut self) {
        self.is_loading = false;
    }

    fn commit(&mut self, image: GeneratedImage) {
        self.current_image = Some(image.clone());
        self.history.push(image);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            prompt: self.prompt.clone(),
            config: self.config(),
            matching_style_id: self.matching_style().map(|style| style.id),
            reference_image: self.reference_image().map(InlineImage::to_data_url),
            current_image: self.current_image().cloned(),
            history: self.history().clone(),
            edit_prompt: self.edit_prompt().to_string(),
            is_editing: self.is_editing(),
            is_loading: self.is_loading(),
            can_generate: self.can_generate(),
            can_edit: self.can_edit(),
        }
    }
}
