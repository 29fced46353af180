use std::cmp::Reverse;

use crate::record::RawPostRecord;

pub const RELATED_LIMIT: usize = 3;

pub const FALLBACK_TITLE: &str = "No Title";
pub const FALLBACK_AUTHOR: &str = "Unknown Author";
pub const FALLBACK_DESC: &str = "No Description Available";
pub const FALLBACK_CONTENT: &str = "No Content Available";
pub const FALLBACK_IMG: &str = "/default-image.jpg";
pub const FALLBACK_DATE: &str = "No Date";

/// Display model. Every text field is non-empty once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub author: String,
    pub desc: String,
    pub content: String,
    pub img: String,
    pub date: String,
}

impl Post {
    /// Maps a wire record onto the display model, filling every missing field
    /// with its fallback. Returns `None` only when the record has no id.
    pub fn from_record(record: RawPostRecord) -> Option<Self> {
        let RawPostRecord {
            id,
            title,
            author,
            description,
            content,
            image_0,
            create_at,
        } = record;

        Some(Self {
            id: id?,
            title: or_fallback(title, FALLBACK_TITLE),
            author: or_fallback(author, FALLBACK_AUTHOR),
            desc: or_fallback(description, FALLBACK_DESC),
            content: or_fallback(content, FALLBACK_CONTENT),
            img: or_fallback(image_0, FALLBACK_IMG),
            date: or_fallback(create_at, FALLBACK_DATE),
        })
    }
}

fn or_fallback(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Picks the related posts for `slug` out of the whole collection: newest
/// first, the current post excluded, at most [`RELATED_LIMIT`] entries.
///
/// Candidates without an id cannot be linked to and are skipped.
pub fn related_posts(mut candidates: Vec<RawPostRecord>, slug: &str) -> Vec<Post> {
    // Stable: equal timestamps keep their collection order.
    candidates.sort_by_cached_key(|c| Reverse(c.created_at()));

    candidates
        .into_iter()
        .filter(|c| c.id.as_deref() != Some(slug))
        .filter_map(Post::from_record)
        .take(RELATED_LIMIT)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawPostRecord {
        RawPostRecord::from_value(value).unwrap()
    }

    #[test]
    fn minimal_record_gets_every_fallback() {
        let post = Post::from_record(record(json!({"id": "abc", "title": "Hi"}))).unwrap();
        assert_eq!(
            post,
            Post {
                id: "abc".into(),
                title: "Hi".into(),
                author: "Unknown Author".into(),
                desc: "No Description Available".into(),
                content: "No Content Available".into(),
                img: "/default-image.jpg".into(),
                date: "No Date".into(),
            }
        );
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let post = Post::from_record(record(json!({
            "id": "x",
            "title": "",
            "author": "",
            "description": "",
            "content": "",
            "image_0": "",
            "create_at": ""
        })))
        .unwrap();

        for field in [
            &post.title,
            &post.author,
            &post.desc,
            &post.content,
            &post.img,
            &post.date,
        ] {
            assert!(!field.is_empty());
        }
        assert_eq!(post.title, FALLBACK_TITLE);
        assert_eq!(post.date, FALLBACK_DATE);
    }

    #[test]
    fn present_fields_are_kept() {
        let post = Post::from_record(record(json!({
            "id": "p1",
            "title": "T",
            "author": "A",
            "description": "D",
            "content": "C",
            "image_0": "https://cdn.example.com/p1.jpg",
            "create_at": "2024-01-01T00:00:00Z"
        })))
        .unwrap();

        assert_eq!(post.author, "A");
        assert_eq!(post.desc, "D");
        assert_eq!(post.content, "C");
        assert_eq!(post.img, "https://cdn.example.com/p1.jpg");
        assert_eq!(post.date, "2024-01-01T00:00:00Z");
    }

    #[test]
    fn missing_id_is_rejected() {
        assert!(Post::from_record(record(json!({"title": "orphan"}))).is_none());
    }

    #[test]
    fn related_excludes_current_and_keeps_three_newest() {
        let candidates = vec![
            record(json!({"id": "p1", "create_at": "2024-01-01T00:00:00Z"})),
            record(json!({"id": "abc", "create_at": "2024-06-01T00:00:00Z"})),
            record(json!({"id": "p2", "create_at": "2024-03-01T00:00:00Z"})),
            record(json!({"id": "p3", "create_at": "2024-05-01T00:00:00Z"})),
            record(json!({"id": "p4", "create_at": "2024-02-01T00:00:00Z"})),
        ];

        let ids: Vec<_> = related_posts(candidates, "abc")
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["p3", "p2", "p4"]);
    }

    #[test]
    fn related_puts_undated_posts_last() {
        let candidates = vec![
            record(json!({"id": "undated"})),
            record(json!({"id": "old", "create_at": "2020-01-01"})),
            record(json!({"id": "new", "create_at": "2023-01-01"})),
        ];

        let ids: Vec<_> = related_posts(candidates, "other")
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["new", "old", "undated"]);
    }

    #[test]
    fn related_handles_short_collections() {
        assert!(related_posts(Vec::new(), "abc").is_empty());

        let only_self = vec![record(json!({"id": "abc", "create_at": "2024-01-01"}))];
        assert!(related_posts(only_self, "abc").is_empty());
    }
}
