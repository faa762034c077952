//! Journal entry model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A journal entry as returned by the backend.
///
/// `mood` is a server-computed score in `1..=5`; `None` means async scoring
/// has not finished yet (the poller reconciles it later).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Server-assigned unique identifier
    pub id: i64,
    /// Optional short title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Entry body text
    pub content: String,
    /// Server-computed mood score (1-5), `None` while scoring is pending
    #[serde(default)]
    pub mood: Option<u8>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// Whether the server has finished scoring this entry.
    #[must_use]
    pub const fn is_scored(&self) -> bool {
        self.mood.is_some()
    }
}

/// Payload for creating a new entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
}

impl NewEntry {
    #[must_use]
    pub fn new(title: Option<String>, content: impl Into<String>) -> Self {
        Self {
            title: crate::util::normalize_text_option(title),
            content: content.into(),
        }
    }
}

/// Raw entries listing shape.
///
/// The backend returns either a bare array or a paginated
/// `{items, total, count}` envelope depending on deployment; both
/// normalize into [`EntryPage`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EntriesResponse {
    List(Vec<Entry>),
    Page {
        items: Vec<Entry>,
        #[serde(default)]
        total: Option<u64>,
        #[serde(default)]
        count: Option<u64>,
    },
}

/// Normalized page of entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPage {
    pub items: Vec<Entry>,
    /// Total entries on the server, when the backend reports one
    pub total: Option<u64>,
    /// Items in this page as reported (falls back to `items.len()`)
    pub count: u64,
}

impl From<EntriesResponse> for EntryPage {
    fn from(value: EntriesResponse) -> Self {
        match value {
            EntriesResponse::List(items) => {
                let count = items.len() as u64;
                Self {
                    items,
                    total: None,
                    count,
                }
            }
            EntriesResponse::Page {
                items,
                total,
                count,
            } => {
                let count = count.unwrap_or(items.len() as u64);
                Self {
                    items,
                    total,
                    count,
                }
            }
        }
    }
}

impl EntryPage {
    /// Whether another page likely exists after fetching `fetched` items
    /// with the given page size.
    #[must_use]
    pub fn has_more(&self, fetched: u64, page_size: u64) -> bool {
        self.total.map_or(self.count == page_size, |total| {
            fetched < total
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample_entry(id: i64, mood: Option<u8>) -> Entry {
        Entry {
            id,
            title: None,
            content: format!("entry {id}"),
            mood,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn bare_array_normalizes_to_page() {
        let raw = r#"[{"id": 1, "content": "hi", "mood": 3, "created_at": "2025-06-01T10:00:00Z"}]"#;
        let page: EntryPage = serde_json::from_str::<EntriesResponse>(raw).unwrap().into();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, None);
        assert_eq!(page.count, 1);
    }

    #[test]
    fn envelope_normalizes_to_page() {
        let raw = r#"{"items": [{"id": 7, "content": "hi", "mood": null, "created_at": "2025-06-01T10:00:00Z"}], "total": 42, "count": 1}"#;
        let page: EntryPage = serde_json::from_str::<EntriesResponse>(raw).unwrap().into();
        assert_eq!(page.items[0].id, 7);
        assert_eq!(page.total, Some(42));
        assert_eq!(page.count, 1);
    }

    #[test]
    fn envelope_count_falls_back_to_items_len() {
        let raw = r#"{"items": [{"id": 1, "content": "a", "created_at": "2025-06-01T10:00:00Z"}, {"id": 2, "content": "b", "created_at": "2025-06-01T11:00:00Z"}]}"#;
        let page: EntryPage = serde_json::from_str::<EntriesResponse>(raw).unwrap().into();
        assert_eq!(page.count, 2);
    }

    #[test]
    fn has_more_prefers_reported_total() {
        let page = EntryPage {
            items: vec![sample_entry(1, Some(4))],
            total: Some(10),
            count: 1,
        };
        assert!(page.has_more(1, 20));
        assert!(!page.has_more(10, 20));
    }

    #[test]
    fn has_more_without_total_uses_full_page_heuristic() {
        let page = EntryPage {
            items: Vec::new(),
            total: None,
            count: 20,
        };
        assert!(page.has_more(20, 20));
        let short = EntryPage {
            items: Vec::new(),
            total: None,
            count: 5,
        };
        assert!(!short.has_more(5, 20));
    }

    #[test]
    fn new_entry_drops_blank_title() {
        let draft = NewEntry::new(Some("   ".to_string()), "content");
        assert_eq!(draft.title, None);
        let serialized = serde_json::to_string(&draft).unwrap();
        assert!(!serialized.contains("title"));
    }

    #[test]
    fn unscored_entry_reports_pending() {
        assert!(!sample_entry(1, None).is_scored());
        assert!(sample_entry(1, Some(5)).is_scored());
    }
}
