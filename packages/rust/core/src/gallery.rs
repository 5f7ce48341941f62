//! Portfolio gallery view models.
//!
//! Published artwork entries are mapped into flat [`Artwork`] records, and
//! the gallery's category filter is derived from them.

use serde::Serialize;
use tracing::instrument;

use folio_cms::{DeliveredEntry, DeliveryClient};
use folio_shared::Result;

/// Pseudo-category that selects every artwork.
pub const ALL_CATEGORIES: &str = "All";

/// Category word used in generated titles when an entry has none.
const FALLBACK_CATEGORY: &str = "Artwork";

/// One artwork as the gallery renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artwork {
    pub id: String,
    /// Stored title; may be empty (see [`display_title`]).
    pub title: String,
    pub category: String,
    /// Public image URL.
    pub src: String,
    /// Plain text of the description's first paragraph; may be empty.
    pub description: String,
    pub featured: bool,
}

impl From<DeliveredEntry> for Artwork {
    fn from(entry: DeliveredEntry) -> Self {
        Self {
            id: entry.id,
            title: entry.title.unwrap_or_default(),
            category: entry.category.unwrap_or_default(),
            src: entry.image_url,
            description: entry.description.unwrap_or_default(),
            featured: entry.featured,
        }
    }
}

/// Fetch published artworks of `content_type`.
#[instrument(skip(client))]
pub async fn load_gallery(client: &DeliveryClient, content_type: &str) -> Result<Vec<Artwork>> {
    let entries = client.list_entries(content_type).await?;
    Ok(entries.into_iter().map(Artwork::from).collect())
}

/// Title to show for the artwork at `index` (0-based) of its list.
///
/// Blank titles become `"<category> Artwork #<n>"`.
pub fn display_title(artwork: &Artwork, index: usize) -> String {
    if !artwork.title.trim().is_empty() {
        return artwork.title.clone();
    }
    let category = if artwork.category.is_empty() {
        FALLBACK_CATEGORY
    } else {
        artwork.category.as_str()
    };
    format!("{category} Artwork #{}", index + 1)
}

/// Filter choices: [`ALL_CATEGORIES`] followed by each category in order of
/// first appearance.
pub fn categories(artworks: &[Artwork]) -> Vec<String> {
    let mut out = vec![ALL_CATEGORIES.to_string()];
    for artwork in artworks {
        if !artwork.category.is_empty() && !out.contains(&artwork.category) {
            out.push(artwork.category.clone());
        }
    }
    out
}

/// Artworks matching `selected`; everything for [`ALL_CATEGORIES`].
pub fn filter_by_category<'a>(artworks: &'a [Artwork], selected: &str) -> Vec<&'a Artwork> {
    if selected == ALL_CATEGORIES {
        return artworks.iter().collect();
    }
    artworks.iter().filter(|a| a.category == selected).collect()
}

/// Artworks flagged for the home page.
pub fn featured<'a>(artworks: impl IntoIterator<Item = &'a Artwork>) -> Vec<&'a Artwork> {
    artworks.into_iter().filter(|a| a.featured).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn art(id: &str, title: &str, category: &str, featured: bool) -> Artwork {
        Artwork {
            id: id.into(),
            title: title.into(),
            category: category.into(),
            src: format!("https://images.example.com/{id}.png"),
            description: String::new(),
            featured,
        }
    }

    #[test]
    fn display_title_prefers_stored_title() {
        let a = art("1", "Pastel Dream", "Watercolor", false);
        assert_eq!(display_title(&a, 0), "Pastel Dream");
    }

    #[test]
    fn display_title_falls_back_to_category_and_position() {
        let a = art("1", "  ", "Digital", false);
        assert_eq!(display_title(&a, 2), "Digital Artwork #3");

        let b = art("2", "", "", false);
        assert_eq!(display_title(&b, 0), "Artwork Artwork #1");
    }

    #[test]
    fn categories_unique_in_first_seen_order() {
        let list = vec![
            art("1", "A", "Digital", false),
            art("2", "B", "Watercolor", false),
            art("3", "C", "Digital", false),
            art("4", "D", "", false),
        ];
        assert_eq!(categories(&list), vec!["All", "Digital", "Watercolor"]);
    }

    #[test]
    fn filter_all_and_exact() {
        let list = vec![
            art("1", "A", "Digital", false),
            art("2", "B", "Watercolor", false),
            art("3", "C", "Digital", false),
        ];
        assert_eq!(filter_by_category(&list, "All").len(), 3);

        let digital: Vec<&str> = filter_by_category(&list, "Digital")
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(digital, vec!["1", "3"]);
        assert!(filter_by_category(&list, "digital").is_empty());
    }

    #[test]
    fn featured_only() {
        let list = vec![
            art("1", "A", "Digital", true),
            art("2", "B", "Watercolor", false),
        ];
        let ids: Vec<&str> = featured(&list).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[test]
    fn featured_within_category() {
        let list = vec![
            art("1", "A", "Digital", true),
            art("2", "B", "Watercolor", true),
            art("3", "C", "Digital", false),
        ];
        let ids: Vec<&str> = featured(filter_by_category(&list, "Digital"))
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[test]
    fn delivered_entry_maps_missing_fields_to_empty() {
        let entry = DeliveredEntry {
            id: "e1".into(),
            title: None,
            category: None,
            image_url: String::new(),
            description: None,
            featured: false,
        };
        let artwork = Artwork::from(entry);
        assert_eq!(artwork.title, "");
        assert_eq!(artwork.category, "");
        assert_eq!(artwork.description, "");
    }
}
