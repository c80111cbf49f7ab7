// src/services/row_enricher.rs
//
// Row Enrichment Processor
//
// Turns one host release row into its enriched form:
//
//   <td>
//     <div class="sp-img-wrapper">
//       <img class="sp-thumb" src="..." alt="...">
//       <div class="sp-text">
//         <div class="sp-title">
//           <a ... class="processed">Title</a>
//           <span class="sp-rating">…</span>
//           <span class="sp-fav">☆</span>
//         </div>
//         <span class="badge-wrapper sp-badges">...</span>
//       </div>
//     </div>
//   </td>
//
// CRITICAL RULES:
// - The processed marker is set before anything else happens to the row,
//   and before any rating work is started
// - A processed row is never touched again, even if the host mutates it
// - Missing markup (no enclosing cell) skips the row silently
// - The badge region is moved, never copied or dropped

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use log::{debug, warn};
use tokio::task::JoinHandle;

use crate::document::{lock_document, Document, NodeId, SharedDocument, BADGE_CLASS};
use crate::domain::preference::{DEFAULT_IMAGE_SIZE, IMAGE_SIZE, PADDING};
use crate::domain::{normalize_image_size, normalize_title, RatingOutcome};
use crate::repositories::{FavoritesStore, PreferenceStore};
use crate::services::rating_presenter::{RatingView, RATING_CLASS};
use crate::services::rating_service::RatingResolutionService;

/// Class marking a row link as enriched
pub const PROCESSED_CLASS: &str = "processed";

pub const ACTION_ATTRIBUTE: &str = "data-sp-action";
pub const KEY_ATTRIBUTE: &str = "data-sp-key";
pub const TITLE_ATTRIBUTE: &str = "data-sp-title";

pub const REFRESH_RATING_ACTION: &str = "refresh-rating";
pub const TOGGLE_FAVORITE_ACTION: &str = "toggle-favorite";

pub const FAVORITE_CLASS: &str = "sp-fav";
const FAVORITE_ON_CLASS: &str = "sp-fav--on";

pub const STYLE_ELEMENT_ID: &str = "sp-styles";
pub const THUMB_SIZE_VARIABLE: &str = "--sp-thumb-size";

const STYLESHEET: &str = "\
#releases-table td .sp-img-wrapper { display: flex; gap: 10px; align-items: flex-start; padding: 6px 0; }
.sp-thumb { width: var(--sp-thumb-size, 64px); height: auto; object-fit: cover; border-radius: 6px; flex-shrink: 0; }
.sp-text { display: flex; flex-direction: column; justify-content: flex-start; }
.sp-title { font-weight: 600; margin-bottom: 4px; }
.sp-rating { margin-left: 8px; cursor: pointer; }
.sp-fav { margin-left: 6px; cursor: pointer; color: #999; }
.sp-fav--on { color: #f5b301; }
.sp-badges { margin-top: 6px; }
";

/// Where rows live in the host page and how they are recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostLayout {
    pub table_id: String,
    pub marker_attribute: String,
}

impl Default for HostLayout {
    fn default() -> Self {
        Self {
            table_id: crate::document::RELEASES_TABLE_ID.to_string(),
            marker_attribute: crate::document::PREVIEW_ATTRIBUTE.to_string(),
        }
    }
}

impl HostLayout {
    /// An unprocessed row link: `a[<marker>]:not(.processed)`
    pub fn is_candidate(&self, document: &Document, node: NodeId) -> bool {
        document.tag(node) == Some("a")
            && document.has_attribute(node, &self.marker_attribute)
            && !document.has_class(node, PROCESSED_CLASS)
    }

    /// True when `node` or anything below it is a candidate row link
    pub fn contains_candidate(&self, document: &Document, node: NodeId) -> bool {
        self.is_candidate(document, node)
            || document
                .descendants(node)
                .into_iter()
                .any(|n| self.is_candidate(document, n))
    }
}

pub struct RowEnricher {
    document: SharedDocument,
    ratings: Arc<RatingResolutionService>,
    favorites: Arc<FavoritesStore>,
    preferences: Arc<dyn PreferenceStore>,
    layout: HostLayout,
    in_flight: Mutex<Vec<JoinHandle<RatingOutcome>>>,
}

impl RowEnricher {
    pub fn new(
        document: SharedDocument,
        ratings: Arc<RatingResolutionService>,
        favorites: Arc<FavoritesStore>,
        preferences: Arc<dyn PreferenceStore>,
        layout: HostLayout,
    ) -> Self {
        Self {
            document,
            ratings,
            favorites,
            preferences,
            layout,
            in_flight: Mutex::new(Vec::new()),
        }
    }

    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    pub fn layout(&self) -> &HostLayout {
        &self.layout
    }

    /// Enrich every unprocessed row link inside the releases table.
    ///
    /// Returns the number of rows enriched by this pass.
    pub fn rescan(&self) -> usize {
        let mut document = lock_document(&self.document);

        self.ensure_styles(&mut document);
        self.apply_thumb_size(&mut document);

        let Some(table) = document.element_by_id(&self.layout.table_id) else {
            debug!("No #{} in document; nothing to enrich", self.layout.table_id);
            return 0;
        };

        let candidates =
            document.find_all(table, |doc, node| self.layout.is_candidate(doc, node));

        let enriched = candidates
            .into_iter()
            .filter(|link| self.enrich(&mut document, *link))
            .count();

        debug!("Rescan enriched {} row(s)", enriched);
        enriched
    }

    /// Enrich a single row link; a no-op for processed or foreign nodes
    pub fn process_row(&self, link: NodeId) -> bool {
        let mut document = lock_document(&self.document);
        self.enrich(&mut document, link)
    }

    /// Dispatch a click on an enriched control
    pub fn activate(&self, node: NodeId) -> bool {
        let mut document = lock_document(&self.document);

        let action = document.attribute(node, ACTION_ATTRIBUTE).map(str::to_string);
        let title = document
            .attribute(node, TITLE_ATTRIBUTE)
            .unwrap_or_default()
            .to_string();

        match action.as_deref() {
            Some(REFRESH_RATING_ACTION) => {
                self.start_rating(&mut document, node, &title, true);
                true
            }
            Some(TOGGLE_FAVORITE_ACTION) => match self.favorites.toggle(&title) {
                Ok(is_favorite) => {
                    let key = normalize_title(&title);
                    let markers = document.find_all(document.root(), |doc, n| {
                        doc.has_class(n, FAVORITE_CLASS)
                            && doc.attribute(n, KEY_ATTRIBUTE) == Some(key.as_str())
                    });
                    for marker in markers {
                        paint_favorite(&mut document, marker, is_favorite);
                    }
                    true
                }
                Err(e) => {
                    warn!("Could not toggle favorite {:?}: {}", title, e);
                    false
                }
            },
            _ => false,
        }
    }

    /// Await every rating refresh started so far, including ones started
    /// while waiting
    pub async fn settle(&self) {
        loop {
            let pending: Vec<JoinHandle<RatingOutcome>> = {
                let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
                std::mem::take(&mut *in_flight)
            };
            if pending.is_empty() {
                return;
            }
            for handle in pending {
                if let Err(e) = handle.await {
                    warn!("Rating refresh task ended abnormally: {}", e);
                }
            }
        }
    }

    pub fn in_flight(&self) -> usize {
        let in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        in_flight.iter().filter(|h| !h.is_finished()).count()
    }

    // ========================================================================
    // INTERNAL
    // ========================================================================

    fn enrich(&self, document: &mut Document, link: NodeId) -> bool {
        if !self.layout.is_candidate(document, link) {
            return false;
        }
        document.add_class(link, PROCESSED_CLASS);

        let Some(cell) = document.closest(link, "td") else {
            debug!("Row link without enclosing cell; skipped");
            return false;
        };

        let image_url = document
            .attribute(link, &self.layout.marker_attribute)
            .unwrap_or_default()
            .to_string();
        let title = document.text_content(link).trim().to_string();
        let key = normalize_title(&title);

        let badge = document
            .descendants(cell)
            .into_iter()
            .find(|n| document.has_class(*n, BADGE_CLASS));

        let wrapper = document.create_element("div");
        document.set_attribute(wrapper, "class", "sp-img-wrapper");
        let padding = self.preferences.read_preference(PADDING, "");
        if !padding.trim().is_empty() {
            document.set_style_property(wrapper, "padding", padding.trim());
        }

        let img = document.create_element("img");
        document.set_attribute(img, "class", "sp-thumb");
        document.set_attribute(img, "src", &image_url);
        let alt = if title.is_empty() { "preview" } else { title.as_str() };
        document.set_attribute(img, "alt", alt);

        let text = document.create_element("div");
        document.set_attribute(text, "class", "sp-text");

        let title_div = document.create_element("div");
        document.set_attribute(title_div, "class", "sp-title");
        document.append_child(title_div, link);

        let rating = document.create_element("span");
        document.set_attribute(rating, "class", RATING_CLASS);
        document.set_attribute(rating, ACTION_ATTRIBUTE, REFRESH_RATING_ACTION);
        document.set_attribute(rating, KEY_ATTRIBUTE, &key);
        document.set_attribute(rating, TITLE_ATTRIBUTE, &title);
        document.append_child(title_div, rating);

        let favorite = document.create_element("span");
        document.set_attribute(favorite, "class", FAVORITE_CLASS);
        document.set_attribute(favorite, ACTION_ATTRIBUTE, TOGGLE_FAVORITE_ACTION);
        document.set_attribute(favorite, KEY_ATTRIBUTE, &key);
        document.set_attribute(favorite, TITLE_ATTRIBUTE, &title);
        document.append_child(title_div, favorite);

        document.append_child(text, title_div);
        if let Some(badge) = badge {
            document.add_class(badge, "sp-badges");
            document.append_child(text, badge);
        }

        document.append_child(wrapper, img);
        document.append_child(wrapper, text);

        document.clear_children(cell);
        document.append_child(cell, wrapper);

        paint_favorite(document, favorite, self.favorites.is_favorite(&title));
        self.start_rating(document, rating, &title, false);

        true
    }

    /// Paint the current rating now and track the refresh, if any
    fn start_rating(&self, document: &mut Document, rating: NodeId, title: &str, force: bool) {
        let shared = Arc::clone(&self.document);
        let resolution = self.ratings.resolve(title, force, move |outcome| {
            let view = RatingView::from_outcome(&outcome, Utc::now());
            let mut document = lock_document(&shared);
            view.apply(&mut document, rating);
        });

        RatingView::from_outcome(&resolution.current, Utc::now()).apply(document, rating);

        if let Some(handle) = resolution.refresh {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            in_flight.retain(|h| !h.is_finished());
            in_flight.push(handle);
        }
    }

    fn ensure_styles(&self, document: &mut Document) {
        if document.element_by_id(STYLE_ELEMENT_ID).is_some() {
            return;
        }
        let style = document.create_element("style");
        document.set_attribute(style, "id", STYLE_ELEMENT_ID);
        document.set_text(style, STYLESHEET);
        let head = document.head();
        document.append_child(head, style);
    }

    fn apply_thumb_size(&self, document: &mut Document) {
        let raw = self.preferences.read_preference(IMAGE_SIZE, DEFAULT_IMAGE_SIZE);
        let size = normalize_image_size(&raw);
        let root = document.root();
        if document.style_property(root, THUMB_SIZE_VARIABLE).as_deref() != Some(size.as_str()) {
            document.set_style_property(root, THUMB_SIZE_VARIABLE, &size);
        }
    }
}

fn paint_favorite(document: &mut Document, marker: NodeId, is_favorite: bool) {
    if is_favorite {
        document.set_text(marker, "★");
        document.add_class(marker, FAVORITE_ON_CLASS);
        document.set_attribute(marker, "title", "Remove from favorites");
    } else {
        document.set_text(marker, "☆");
        document.remove_class(marker, FAVORITE_ON_CLASS);
        document.set_attribute(marker, "title", "Add to favorites");
    }
}
