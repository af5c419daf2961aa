//! Thread data model: posts, extracted text content, and the validated
//! `Thread` the pipeline consumes.
//!
//! Posts arrive fully fetched and are never mutated by the core. Embed
//! shapes (images, record quotes, externals) are resolved by the excluded
//! extraction collaborator into plain [`TextContent`] before the core ever
//! sees them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ThreadError;

/// One node of the reply graph. Immutable; text rides in the separate
/// per-URI text map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier of the post.
    pub uri: String,
    /// URI of the post this one replies to. `None` for the root.
    #[serde(default)]
    pub parent_uri: Option<String>,
}

impl Post {
    pub fn new(uri: impl Into<String>, parent_uri: Option<String>) -> Self {
        Self {
            uri: uri.into(),
            parent_uri,
        }
    }

    /// Convenience constructor for the root post.
    pub fn root(uri: impl Into<String>) -> Self {
        Self::new(uri, None)
    }

    /// Convenience constructor for a reply.
    pub fn reply(uri: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::new(uri, Some(parent.into()))
    }
}

/// Extracted text of one post, produced upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    /// The post's own text.
    pub own_text: String,
    /// Text of a quoted post, if any.
    #[serde(default)]
    pub quoted_text: Option<String>,
    /// URI of the quoted post, if any.
    #[serde(default)]
    pub quoted_uri: Option<String>,
    /// Alt text of attached or quoted images.
    #[serde(default)]
    pub quoted_alt_text: Vec<String>,
}

impl TextContent {
    pub fn own(text: impl Into<String>) -> Self {
        Self {
            own_text: text.into(),
            ..Self::default()
        }
    }

    /// The text a post is searched against: own text, quoted text, and
    /// image alt text, newline-joined. Quoted text equal to the root's own
    /// text is excluded — re-quoting the prompt is boilerplate, not
    /// evidence.
    pub fn search_text(&self, root_text: &str) -> String {
        let mut parts: Vec<&str> = vec![&self.own_text];
        if let Some(quoted) = &self.quoted_text {
            if quoted.trim() != root_text.trim() {
                parts.push(quoted);
            }
        }
        for alt in &self.quoted_alt_text {
            parts.push(alt);
        }
        parts.retain(|p| !p.trim().is_empty());
        parts.join("\n")
    }
}

/// A complete, validated thread: root post plus every reachable reply and
/// quote-post, paired with per-URI text content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    posts: Vec<Post>,
    texts: BTreeMap<String, TextContent>,
}

impl Thread {
    /// Validate and construct a thread.
    ///
    /// The one fatal precondition of the whole pipeline: `posts[0]` must be
    /// the root (present, parentless) and must have text content. Everything
    /// else — missing parents, posts without text — is tolerated downstream.
    pub fn new(
        posts: Vec<Post>,
        texts: BTreeMap<String, TextContent>,
    ) -> Result<Self, ThreadError> {
        let root = posts.first().ok_or(ThreadError::Empty)?;
        if let Some(parent) = &root.parent_uri {
            return Err(ThreadError::MisindexedRoot {
                uri: root.uri.clone(),
                parent: parent.clone(),
            });
        }
        if !texts.contains_key(&root.uri) {
            return Err(ThreadError::MissingRootText {
                uri: root.uri.clone(),
            });
        }
        Ok(Self { posts, texts })
    }

    pub fn root(&self) -> &Post {
        &self.posts[0]
    }

    /// The root's own text, used for boilerplate suppression.
    pub fn root_text(&self) -> &str {
        &self.texts[&self.root().uri].own_text
    }

    /// Every post, root first.
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Every post except the root.
    pub fn replies(&self) -> &[Post] {
        &self.posts[1..]
    }

    pub fn post(&self, uri: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.uri == uri)
    }

    pub fn text(&self, uri: &str) -> Option<&TextContent> {
        self.texts.get(uri)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Walk ancestors of `uri` via `parent_uri`, nearest first.
    ///
    /// Iterative and bounded by the thread size, so a malformed reply graph
    /// (missing parents, accidental cycles) terminates with a short walk
    /// instead of looping.
    pub fn ancestors<'a>(&'a self, uri: &str) -> impl Iterator<Item = &'a Post> {
        let mut current = self.post(uri).and_then(|p| p.parent_uri.clone());
        let mut remaining = self.posts.len();
        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            remaining -= 1;
            let parent = self.post(current.as_deref()?)?;
            current = parent.parent_uri.clone();
            Some(parent)
        })
    }
}
