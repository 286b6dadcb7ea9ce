//! Curated book lists, one mood each
//!
//! Bundled with the app as a JSON array and browsed by mood. Read-only: the
//! sync core never writes them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Book, MoodTag};
use crate::error::{ClioError, ClioResult};

/// A hand-picked list of books for one mood
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookList {
    pub id: String,
    pub title: String,
    pub mood_tag: MoodTag,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub books: Vec<Book>,
}

impl BookList {
    /// Decode a catalogue (a JSON array of lists)
    pub fn parse_all(bytes: &[u8]) -> ClioResult<Vec<BookList>> {
        serde_json::from_slice(bytes)
            .map_err(|e| ClioError::DecodeFailure(format!("book list catalogue: {}", e)))
    }

    /// Read and decode a catalogue file
    pub fn load_all(path: impl AsRef<Path>) -> ClioResult<Vec<BookList>> {
        let bytes = std::fs::read(path)?;
        Self::parse_all(&bytes)
    }

    /// Lists curated for `mood`, in catalogue order
    pub fn for_mood(lists: &[BookList], mood: MoodTag) -> Vec<&BookList> {
        lists.iter().filter(|l| l.mood_tag == mood).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOGUE: &str = r#"[
        {
            "id": "6F1C2B1E-0000-4000-8000-000000000001",
            "title": "Quiet Company",
            "moodTag": "grieving",
            "description": "Books that sit with you",
            "books": [
                {
                    "id": "b1",
                    "title": "A Grief Observed",
                    "author": "C. S. Lewis",
                    "coverImageName": "grief_observed",
                    "description": "",
                    "pageCount": 96
                }
            ]
        },
        {
            "id": "6F1C2B1E-0000-4000-8000-000000000002",
            "title": "Clean Slate",
            "moodTag": "startingOver",
            "description": "",
            "books": []
        }
    ]"#;

    #[test]
    fn test_parse_catalogue() {
        let lists = BookList::parse_all(CATALOGUE.as_bytes()).unwrap();
        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0].mood_tag, MoodTag::Grieving);
        assert_eq!(lists[0].books[0].cover_image_ref, "grief_observed");
        assert_eq!(lists[0].books[0].page_count, Some(96));
        assert_eq!(lists[1].mood_tag, MoodTag::StartingOver);
    }

    #[test]
    fn test_for_mood() {
        let lists = BookList::parse_all(CATALOGUE.as_bytes()).unwrap();
        let grieving = BookList::for_mood(&lists, MoodTag::Grieving);
        assert_eq!(grieving.len(), 1);
        assert_eq!(grieving[0].title, "Quiet Company");
        assert!(BookList::for_mood(&lists, MoodTag::Lost).is_empty());
    }

    #[test]
    fn test_unknown_mood_is_a_decode_failure() {
        let bad = r#"[{"id": "x", "title": "T", "moodTag": "sleepy"}]"#;
        assert!(matches!(
            BookList::parse_all(bad.as_bytes()),
            Err(ClioError::DecodeFailure(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            BookList::load_all(dir.path().join("missing.json")),
            Err(ClioError::Io(_))
        ));
    }
}
