// src/services/mod.rs
pub mod gemini_service;
pub mod image_processor;

pub use gemini_service::{GeminiService, ImageGenerator};
pub use image_processor::ImageProcessor;
