//! Multi-page document: the system of record for page elements.

use crate::elements::{Element, ElementId, ElementPatch, PatchError};
use crate::entitlements::{CapacityError, Limit};
use crate::page::{ElementCounts, Page};
use crate::view::ViewTransform;
use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Document errors. A failed operation never leaves a partial mutation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DocumentError {
    #[error("Page index {index} out of range ({len} pages)")]
    PageOutOfRange { index: usize, len: usize },
    #[error("Element {id} not found on page {page}")]
    ElementNotFound { page: usize, id: ElementId },
    #[error(transparent)]
    Capacity(#[from] CapacityError),
    #[error(transparent)]
    Patch(#[from] PatchError),
}

/// Result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// An ordered sequence of pages. Position in `pages` is the navigation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique document identifier.
    pub id: String,
    pub name: String,
    pages: Vec<Page>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with no pages.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Untitled".to_string(),
            pages: Vec::new(),
        }
    }

    /// Set the document name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Pages in navigation order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Get a page by index.
    pub fn page(&self, index: usize) -> DocumentResult<&Page> {
        let len = self.pages.len();
        self.pages.get(index).ok_or(DocumentError::PageOutOfRange { index, len })
    }

    fn page_mut(&mut self, index: usize) -> DocumentResult<&mut Page> {
        let len = self.pages.len();
        self.pages.get_mut(index).ok_or(DocumentError::PageOutOfRange { index, len })
    }

    /// Per-kind element counts for one page.
    pub fn element_counts(&self, index: usize) -> DocumentResult<ElementCounts> {
        Ok(self.page(index)?.element_counts())
    }

    /// Add a default-sized empty page. See [`Document::add_page_with`].
    pub fn add_page(&mut self, after: Option<usize>, limit: Limit) -> DocumentResult<usize> {
        self.add_page_with(after, Page::default(), limit)
    }

    /// Add `page` at the end, or right after `after`. Returns its index.
    ///
    /// Fails without creating a page if `after` is out of range or the page
    /// ceiling would be exceeded.
    pub fn add_page_with(&mut self, after: Option<usize>, page: Page, limit: Limit) -> DocumentResult<usize> {
        let len = self.pages.len();
        if !limit.allows(len.saturating_add(1)) {
            log::warn!("add_page rejected: {len} pages, limit {limit}");
            return Err(CapacityError::PageLimit { limit }.into());
        }
        let index = match after {
            Some(after) if after >= len => return Err(DocumentError::PageOutOfRange { index: after, len }),
            Some(after) => after + 1,
            None => len,
        };
        self.pages.insert(index, page);
        log::info!("page added at index {index} ({} total)", self.pages.len());
        Ok(index)
    }

    /// Remove a page at the caller's explicit request.
    pub fn remove_page(&mut self, index: usize) -> DocumentResult<Page> {
        self.page(index)?;
        Ok(self.pages.remove(index))
    }

    /// Move a page to a new position in the navigation order.
    pub fn move_page(&mut self, from: usize, to: usize) -> DocumentResult<()> {
        let len = self.pages.len();
        if from >= len {
            return Err(DocumentError::PageOutOfRange { index: from, len });
        }
        if to >= len {
            return Err(DocumentError::PageOutOfRange { index: to, len });
        }
        let page = self.pages.remove(from);
        self.pages.insert(to, page);
        Ok(())
    }

    /// Append an element to the matching collection of a page.
    pub fn insert_element(&mut self, page_index: usize, element: Element) -> DocumentResult<ElementId> {
        let kind = element.kind();
        let id = self.page_mut(page_index)?.insert(element);
        log::debug!("inserted {kind} {id} on page {page_index}");
        Ok(id)
    }

    /// Remove an element from a page and return it.
    pub fn remove_element(&mut self, page_index: usize, id: ElementId) -> DocumentResult<Element> {
        self.page_mut(page_index)?
            .remove(id)
            .ok_or(DocumentError::ElementNotFound { page: page_index, id })
    }

    /// Apply a patch to an existing element. Never creates an element.
    pub fn update_element(&mut self, page_index: usize, id: ElementId, patch: ElementPatch) -> DocumentResult<()> {
        let mut element = self
            .page_mut(page_index)?
            .get_mut(id)
            .ok_or(DocumentError::ElementNotFound { page: page_index, id })?;
        element.apply(patch)?;
        Ok(())
    }

    /// Move an element by an on-screen drag delta, inverting the view zoom.
    pub fn drag_element(
        &mut self,
        page_index: usize,
        id: ElementId,
        screen_delta: Vec2,
        view: &ViewTransform,
    ) -> DocumentResult<()> {
        let delta = view.screen_delta_to_page(screen_delta);
        let mut element = self
            .page_mut(page_index)?
            .get_mut(id)
            .ok_or(DocumentError::ElementNotFound { page: page_index, id })?;
        element.translate(delta);
        Ok(())
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a document from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
