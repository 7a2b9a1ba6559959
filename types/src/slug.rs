//! Content identifiers (`author/permlink`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// The `author/permlink` identifier of a post or comment.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slug {
    pub author: String,
    pub permlink: String,
}

impl Slug {
    pub fn new(author: impl Into<String>, permlink: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            permlink: permlink.into(),
        }
    }

    /// Extract a slug from a transfer memo.
    ///
    /// Accepts bare slugs (`@alice/my-post`) as well as full content URLs
    /// (`https://site/tag/@alice/my-post?ref=x#comments`). The memo is
    /// lowercased; anything before the last `@` is discarded. Returns `None`
    /// unless both an author and a permlink are present.
    pub fn from_memo(memo: &str) -> Option<Self> {
        let lowered = memo.trim().to_lowercase();
        let tail = lowered.rsplit('@').next()?;

        let mut segments = tail.split('/');
        let author = segments.next()?.trim().to_string();
        let mut permlink = segments.collect::<Vec<_>>().join("/");

        if let Some((before, _)) = permlink.split_once('?') {
            permlink = before.to_string();
        }
        if let Some(stripped) = permlink.strip_suffix('/') {
            permlink = stripped.to_string();
        }
        if let Some(stripped) = permlink.strip_suffix("#comments") {
            permlink = stripped.to_string();
        }

        if author.is_empty() || permlink.is_empty() {
            return None;
        }
        Some(Self { author, permlink })
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.author, self.permlink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_slug() {
        let slug = Slug::from_memo("@alice/my-post").unwrap();
        assert_eq!(slug, Slug::new("alice", "my-post"));
        assert_eq!(slug.to_string(), "alice/my-post");
    }

    #[test]
    fn parses_full_url() {
        let slug = Slug::from_memo("https://steemit.com/life/@Alice/My-Post").unwrap();
        assert_eq!(slug, Slug::new("alice", "my-post"));
    }

    #[test]
    fn strips_query_trailing_slash_and_comments_anchor() {
        assert_eq!(
            Slug::from_memo("@alice/my-post?sort=new").unwrap().permlink,
            "my-post"
        );
        assert_eq!(Slug::from_memo("@alice/my-post/").unwrap().permlink, "my-post");
        assert_eq!(
            Slug::from_memo("@alice/my-post#comments").unwrap().permlink,
            "my-post"
        );
    }

    #[test]
    fn keeps_nested_permlink_segments() {
        let slug = Slug::from_memo("@alice/re-bob/part-two").unwrap();
        assert_eq!(slug.permlink, "re-bob/part-two");
    }

    #[test]
    fn rejects_memos_without_permlink() {
        assert!(Slug::from_memo("thanks for the vote").is_none());
        assert!(Slug::from_memo("@alice").is_none());
        assert!(Slug::from_memo("@alice/").is_none());
        assert!(Slug::from_memo("").is_none());
    }
}
