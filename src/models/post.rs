// src/models/post.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub const REVIEW_POST_TYPE: &str = "product_review";
pub const PRODUCT_POST_TYPE: &str = "product";

/// Permalink prefix for review records.
pub const REVIEW_SLUG_BASE: &str = "product-reviews";

pub type PostId = i64;
pub type TermId = i64;

/// Meta key -> stored value for a single post.
pub type PostMeta = HashMap<String, String>;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Publish,
    #[default]
    Draft,
    Pending,
    Private,
    Trash,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Publish => "publish",
            PostStatus::Draft => "draft",
            PostStatus::Pending => "pending",
            PostStatus::Private => "private",
            PostStatus::Trash => "trash",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "publish" => Ok(PostStatus::Publish),
            "draft" => Ok(PostStatus::Draft),
            "pending" => Ok(PostStatus::Pending),
            "private" => Ok(PostStatus::Private),
            "trash" => Ok(PostStatus::Trash),
            other => Err(format!("unknown post status '{other}'")),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub post_type: String,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub published_at: DateTime<Utc>,
    pub thumbnail_url: Option<String>,
}

impl Post {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Publish
    }

    pub fn permalink(&self, site_url: &str) -> String {
        let site_url = site_url.trim_end_matches('/');
        if self.post_type == REVIEW_POST_TYPE {
            format!("{site_url}/{REVIEW_SLUG_BASE}/{}/", self.slug)
        } else {
            format!("{site_url}/{}/{}/", self.post_type, self.slug)
        }
    }
}

/// Content record as submitted by an editor, before it has an id.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct NewPost {
    pub post_type: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Taxonomy {
    #[serde(rename = "category")]
    Category,
    #[serde(rename = "post_tag")]
    PostTag,
}

impl Taxonomy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Taxonomy::Category => "category",
            Taxonomy::PostTag => "post_tag",
        }
    }

    /// Hierarchical taxonomies match descendant terms as well.
    pub fn is_hierarchical(&self) -> bool {
        matches!(self, Taxonomy::Category)
    }
}

impl FromStr for Taxonomy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "category" => Ok(Taxonomy::Category),
            "post_tag" => Ok(Taxonomy::PostTag),
            other => Err(format!("unknown taxonomy '{other}'")),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Term {
    pub id: TermId,
    pub taxonomy: Taxonomy,
    pub name: String,
    pub slug: String,
    pub parent: Option<TermId>,
}

/// A resolved link to another content record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProductLink {
    pub id: PostId,
    pub title: String,
    pub url: String,
}

/// A review together with its meta and the record its product field points at,
/// whatever that record's status.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRow {
    pub post: Post,
    pub meta: PostMeta,
    pub product: Option<Post>,
}

/// Lowercase, dash-separated slug built from a title.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}
