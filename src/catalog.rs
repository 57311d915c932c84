//! Static chapter catalog, loaded once at startup.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::CatalogError;
use crate::models::Chapter;

/// Ordered, read-only list of chapters with an id index.
#[derive(Debug, Clone)]
pub struct Catalog {
    chapters: Vec<Chapter>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    pub fn from_chapters(chapters: Vec<Chapter>) -> Result<Self, CatalogError> {
        if chapters.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut by_id = HashMap::with_capacity(chapters.len());
        for (i, chapter) in chapters.iter().enumerate() {
            if by_id.insert(chapter.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateId(chapter.id.clone()));
            }
        }

        Ok(Self { chapters, by_id })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let chapters: Vec<Chapter> = serde_json::from_str(json)?;
        Self::from_chapters(chapters)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            chapters = catalog.len(),
            "loaded chapter catalog"
        );
        Ok(catalog)
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn get(&self, id: &str) -> Option<&Chapter> {
        self.by_id.get(id).map(|&i| &self.chapters[i])
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}
