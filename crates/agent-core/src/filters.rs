//! Facet filtering for the knowledge-base browser.

use std::collections::BTreeSet;

use crate::models::{DocStatus, KbIndexEntry};

/// Verification-status facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Verified,
    Unverified,
}

impl StatusFilter {
    pub fn matches(&self, status: DocStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Verified => status == DocStatus::Verified,
            StatusFilter::Unverified => status == DocStatus::Unverified,
        }
    }

    /// Next option in display order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Verified,
            StatusFilter::Verified => StatusFilter::Unverified,
            StatusFilter::Unverified => StatusFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All Status",
            StatusFilter::Verified => "✓ Verified",
            StatusFilter::Unverified => "⚠ Unverified",
        }
    }
}

/// Authorship facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OriginFilter {
    #[default]
    All,
    Ai,
    Manual,
}

impl OriginFilter {
    pub fn matches(&self, ai_created: bool) -> bool {
        match self {
            OriginFilter::All => true,
            OriginFilter::Ai => ai_created,
            OriginFilter::Manual => !ai_created,
        }
    }

    pub fn next(self) -> Self {
        match self {
            OriginFilter::All => OriginFilter::Ai,
            OriginFilter::Ai => OriginFilter::Manual,
            OriginFilter::Manual => OriginFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OriginFilter::All => "All Sources",
            OriginFilter::Ai => "AI Created",
            OriginFilter::Manual => "Manual",
        }
    }
}

/// The combined filter state of the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KbFilter {
    pub status: StatusFilter,
    pub origin: OriginFilter,
    /// Selected tags, in selection order.
    pub tags: Vec<String>,
    pub search: String,
}

impl KbFilter {
    /// `true` when `doc` passes every facet.
    pub fn matches(&self, doc: &KbIndexEntry) -> bool {
        let matches_tags =
            self.tags.is_empty() || self.tags.iter().any(|t| doc.tags.contains(t));

        let needle = self.search.to_lowercase();
        let matches_search = doc.title.to_lowercase().contains(&needle)
            || doc.tags.iter().any(|t| t.to_lowercase().contains(&needle));

        self.status.matches(doc.status)
            && self.origin.matches(doc.ai_created)
            && matches_tags
            && matches_search
    }

    /// Documents passing the filter, in their original order.
    pub fn apply<'a>(&self, docs: &'a [KbIndexEntry]) -> Vec<&'a KbIndexEntry> {
        docs.iter().filter(|d| self.matches(d)).collect()
    }

    /// Select `tag` if unselected, otherwise deselect it.
    pub fn toggle_tag(&mut self, tag: &str) {
        if let Some(pos) = self.tags.iter().position(|t| t == tag) {
            self.tags.remove(pos);
        } else {
            self.tags.push(tag.to_string());
        }
    }
}

/// Sorted, de-duplicated tags across `docs`.
pub fn tag_facets(docs: &[KbIndexEntry]) -> Vec<String> {
    docs.iter()
        .flat_map(|d| d.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, title: &str, tags: &[&str], status: DocStatus, ai: bool) -> KbIndexEntry {
        KbIndexEntry {
            id: id.into(),
            title: title.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            summary: String::new(),
            status,
            ai_created: ai,
        }
    }

    fn corpus() -> Vec<KbIndexEntry> {
        vec![
            doc("1", "Product FlexSearch", &["flexsearch", "product"], DocStatus::Verified, false),
            doc("2", "Groovy cleanup", &["groovy"], DocStatus::Unverified, true),
            doc("3", "Price Impex", &["impex", "Price"], DocStatus::Unverified, false),
        ]
    }

    fn ids(docs: Vec<&KbIndexEntry>) -> Vec<&str> {
        docs.into_iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn test_default_filter_matches_all() {
        let docs = corpus();
        assert_eq!(ids(KbFilter::default().apply(&docs)), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_status_filter() {
        let docs = corpus();
        let filter = KbFilter {
            status: StatusFilter::Unverified,
            ..Default::default()
        };
        assert_eq!(ids(filter.apply(&docs)), vec!["2", "3"]);
    }

    #[test]
    fn test_origin_filter() {
        let docs = corpus();
        let ai = KbFilter {
            origin: OriginFilter::Ai,
            ..Default::default()
        };
        assert_eq!(ids(ai.apply(&docs)), vec!["2"]);

        let manual = KbFilter {
            origin: OriginFilter::Manual,
            ..Default::default()
        };
        assert_eq!(ids(manual.apply(&docs)), vec!["1", "3"]);
    }

    #[test]
    fn test_tag_filter_matches_any_selected() {
        let docs = corpus();
        let mut filter = KbFilter::default();
        filter.toggle_tag("groovy");
        filter.toggle_tag("impex");
        assert_eq!(ids(filter.apply(&docs)), vec!["2", "3"]);

        filter.toggle_tag("groovy");
        assert_eq!(filter.tags, vec!["impex"]);
        assert_eq!(ids(filter.apply(&docs)), vec!["3"]);
    }

    #[test]
    fn test_search_is_case_insensitive_over_title_and_tags() {
        let docs = corpus();
        let by_title = KbFilter {
            search: "FLEX".into(),
            ..Default::default()
        };
        assert_eq!(ids(by_title.apply(&docs)), vec!["1"]);

        let by_tag = KbFilter {
            search: "price".into(),
            ..Default::default()
        };
        assert_eq!(ids(by_tag.apply(&docs)), vec!["3"]);
    }

    #[test]
    fn test_facets_combine() {
        let docs = corpus();
        let filter = KbFilter {
            status: StatusFilter::Unverified,
            origin: OriginFilter::Manual,
            search: "impex".into(),
            tags: vec![],
        };
        assert_eq!(ids(filter.apply(&docs)), vec!["3"]);
    }

    #[test]
    fn test_tag_facets_sorted_unique() {
        let mut docs = corpus();
        docs.push(doc("4", "More groovy", &["groovy"], DocStatus::Verified, false));
        assert_eq!(
            tag_facets(&docs),
            vec!["Price", "flexsearch", "groovy", "impex", "product"]
        );
    }

    #[test]
    fn test_filter_cycles() {
        assert_eq!(StatusFilter::Unverified.next(), StatusFilter::All);
        assert_eq!(OriginFilter::Ai.next(), OriginFilter::Manual);
    }
}
