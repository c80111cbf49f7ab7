// src/document/host.rs
//
// Host Page Markup
//
// Builds the release-listing markup the enrichment pipeline expects to find:
//
//   <table id="releases-table">
//     <tr>
//       <td class="release-item">
//         <a href="..." data-preview-image="...">Title — 05</a>
//         <span class="badge-wrapper">...</span>
//       </td>
//       <td class="release-item-time">...</td>
//     </tr>
//   </table>
//
// Used by the binary to load a releases file and by tests to play the host
// page inserting rows asynchronously.

use serde::{Deserialize, Serialize};

use super::tree::{Document, NodeId};

pub const RELEASES_TABLE_ID: &str = "releases-table";
pub const PREVIEW_ATTRIBUTE: &str = "data-preview-image";
pub const BADGE_CLASS: &str = "badge-wrapper";

/// One release row as published by the host page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRelease {
    pub title: String,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default)]
    pub time: Option<String>,
}

impl HostRelease {
    pub fn new(title: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            page: None,
            image: Some(image.into()),
            badges: Vec::new(),
            time: None,
        }
    }

    pub fn with_badges(mut self, badges: &[&str]) -> Self {
        self.badges = badges.iter().map(|b| b.to_string()).collect();
        self
    }
}

/// Append an empty releases table to the body and return it
pub fn create_releases_table(document: &mut Document, table_id: &str) -> NodeId {
    let table = document.create_element("table");
    document.set_attribute(table, "id", table_id);
    let body = document.body();
    document.append_child(body, table);
    table
}

/// Build a detached row for `release`; returns (row, title link)
pub fn build_release_row(
    document: &mut Document,
    release: &HostRelease,
    marker_attribute: &str,
) -> (NodeId, NodeId) {
    let row = document.create_element("tr");

    let cell = document.create_element("td");
    document.set_attribute(cell, "class", "release-item");

    let link = document.create_element("a");
    if let Some(page) = &release.page {
        document.set_attribute(link, "href", page);
    }
    if let Some(image) = &release.image {
        document.set_attribute(link, marker_attribute, image);
    }
    document.set_text(link, &release.title);
    document.append_child(cell, link);

    if !release.badges.is_empty() {
        let wrapper = document.create_element("span");
        document.set_attribute(wrapper, "class", BADGE_CLASS);
        for badge in &release.badges {
            let label = document.create_element("span");
            document.set_attribute(label, "class", "badge");
            document.set_text(label, badge);
            document.append_child(wrapper, label);
        }
        document.append_child(cell, wrapper);
    }

    document.append_child(row, cell);

    let time_cell = document.create_element("td");
    document.set_attribute(time_cell, "class", "release-item-time");
    if let Some(time) = &release.time {
        document.set_text(time_cell, time);
    }
    document.append_child(row, time_cell);

    (row, link)
}

/// Build rows for `releases` and attach them to `table`, one mutation per row
pub fn append_release_rows(
    document: &mut Document,
    table: NodeId,
    releases: &[HostRelease],
    marker_attribute: &str,
) -> Vec<NodeId> {
    releases
        .iter()
        .map(|release| {
            let (row, link) = build_release_row(document, release, marker_attribute);
            document.append_child(table, row);
            link
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_markup_matches_host_page() {
        let mut doc = Document::new();
        let release = HostRelease::new("Frieren — 05", "https://img.example/frieren.jpg")
            .with_badges(&["1080p"]);
        let (row, link) = build_release_row(&mut doc, &release, PREVIEW_ATTRIBUTE);

        assert_eq!(
            doc.to_html(row),
            "<tr><td class=\"release-item\">\
             <a data-preview-image=\"https://img.example/frieren.jpg\">Frieren — 05</a>\
             <span class=\"badge-wrapper\"><span class=\"badge\">1080p</span></span></td>\
             <td class=\"release-item-time\"></td></tr>"
        );
        assert_eq!(doc.closest(link, "tr"), Some(row));
    }

    #[test]
    fn test_releases_deserialize_with_defaults() {
        let releases: Vec<HostRelease> =
            serde_json::from_str(r#"[{"title": "Frieren — 05"}]"#).unwrap();
        assert_eq!(releases[0].image, None);
        assert!(releases[0].badges.is_empty());
    }
}
