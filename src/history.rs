// src/history.rs
use std::collections::VecDeque;

use serde::Serialize;
use uuid::Uuid;

use crate::models::GeneratedImage;

pub const HISTORY_LIMIT: usize = 10;

/// Most-recent-first list of results, bounded to [`HISTORY_LIMIT`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct History {
    items: VecDeque<GeneratedImage>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends `image`, evicting the oldest entry past the bound.
    pub fn push(&mut self, image: GeneratedImage) {
        self.items.push_front(image);
        self.items.truncate(HISTORY_LIMIT);
    }

    pub fn get(&self, id: &Uuid) -> Option<&GeneratedImage> {
        self.items.iter().find(|image| image.id == *id)
    }

    #[cfg(test)]
    pub fn latest(&self) -> Option<&GeneratedImage> {
        self.items.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratedImage> {
        self.items.iter()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArtDirection, InlineImage};

    fn image(n: u8) -> GeneratedImage {
        GeneratedImage::new(
            InlineImage::new("image/png", vec![n]),
            format!("shot {}", n),
            ArtDirection::default(),
        )
    }

    #[test]
    fn eleventh_push_evicts_exactly_the_oldest() {
        let mut history = History::new();
        let images: Vec<_> = (0..11).map(image).collect();
        for img in &images {
            history.push(img.clone());
        }

        assert_eq!(history.len(), HISTORY_LIMIT);
        let kept: Vec<_> = history.iter().map(|i| i.prompt.clone()).collect();
        let expected: Vec<_> = (1..11).rev().map(|n| format!("shot {}", n)).collect();
        assert_eq!(kept, expected);
        assert!(history.get(&images[0].id).is_none());
        assert_eq!(history.latest().map(|i| i.id), Some(images[10].id));
    }

    #[test]
    fn lookup_by_id() {
        let mut history = History::new();
        let first = image(1);
        let second = image(2);
        history.push(first.clone());
        history.push(second.clone());

        assert_eq!(history.get(&first.id), Some(&first));
        assert_eq!(history.get(&second.id), Some(&second));
        assert!(history.get(&Uuid::now_v7()).is_none());
    }

    #[test]
    fn empty_history() {
        let history = History::new();
        assert!(history.is_empty());
        assert!(history.latest().is_none());
    }
}
