//! Core types: posts as returned by the API and tag categories

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Unique identifier of a remote post
pub type PostId = i64;

/// Category of a tag, stored as a single character code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagCategory {
    /// Artist tags (`a`)
    Artist,
    /// Character tags (`c`)
    Character,
    /// Copyright tags (`y`)
    Copyright,
    /// General tags (`g`)
    General,
}

impl TagCategory {
    /// All categories in the order their tag strings are persisted
    pub const ALL: [TagCategory; 4] = [
        TagCategory::Artist,
        TagCategory::Character,
        TagCategory::Copyright,
        TagCategory::General,
    ];

    /// Single-character code stored in the `tags.category` column
    pub fn code(self) -> &'static str {
        match self {
            TagCategory::Artist => "a",
            TagCategory::Character => "c",
            TagCategory::Copyright => "y",
            TagCategory::General => "g",
        }
    }

    /// Parse a category from its stored code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "a" => Some(TagCategory::Artist),
            "c" => Some(TagCategory::Character),
            "y" => Some(TagCategory::Copyright),
            "g" => Some(TagCategory::General),
            _ => None,
        }
    }
}

/// A post record as decoded from the API
///
/// Scalar fields map one-to-one to columns of the `posts` table. The tag,
/// favorite and pool strings are never stored as columns; they are exploded
/// into the `tags`, `tagged`, `favorites` and `pooled` tables.
///
/// Fields the API leaves out (or sends as `null` for non-optional fields)
/// decode to their default value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    /// Remote post ID
    pub id: PostId,
    /// Creation timestamp as sent by the API
    #[serde(deserialize_with = "nullable")]
    pub created_at: String,
    /// Last update timestamp as sent by the API
    #[serde(deserialize_with = "nullable")]
    pub updated_at: String,
    /// ID of the uploading user
    #[serde(deserialize_with = "nullable")]
    pub uploader_id: i64,
    /// Total score
    #[serde(deserialize_with = "nullable")]
    pub score: i64,
    /// Source URL given by the uploader
    #[serde(deserialize_with = "nullable")]
    pub source: String,
    /// MD5 hash of the file content (hidden for some posts)
    pub md5: Option<String>,
    /// Rating code (`g`, `s`, `q`, `e`)
    #[serde(deserialize_with = "nullable")]
    pub rating: String,
    /// Image width in pixels
    #[serde(deserialize_with = "nullable")]
    pub image_width: i64,
    /// Image height in pixels
    #[serde(deserialize_with = "nullable")]
    pub image_height: i64,
    /// File extension without the dot
    #[serde(deserialize_with = "nullable")]
    pub file_ext: String,
    /// Parent post, if any
    pub parent_id: Option<PostId>,
    /// Whether the post has child posts
    #[serde(deserialize_with = "nullable")]
    pub has_children: bool,
    /// File size in bytes
    #[serde(deserialize_with = "nullable")]
    pub file_size: i64,
    /// Space-separated `fav:<user id>` tokens
    #[serde(deserialize_with = "nullable")]
    pub fav_string: String,
    /// Space-separated `pool:<pool id>` tokens
    #[serde(deserialize_with = "nullable")]
    pub pool_string: String,
    /// Number of up votes
    #[serde(deserialize_with = "nullable")]
    pub up_score: i64,
    /// Number of down votes
    #[serde(deserialize_with = "nullable")]
    pub down_score: i64,
    /// Awaiting moderation
    #[serde(deserialize_with = "nullable")]
    pub is_pending: bool,
    /// Flagged for deletion
    #[serde(deserialize_with = "nullable")]
    pub is_flagged: bool,
    /// Deleted
    #[serde(deserialize_with = "nullable")]
    pub is_deleted: bool,
    /// Banned
    #[serde(deserialize_with = "nullable")]
    pub is_banned: bool,
    /// Pixiv illustration ID, if the post comes from pixiv
    pub pixiv_id: Option<i64>,
    /// Server-side bit flags
    #[serde(deserialize_with = "nullable")]
    pub bit_flags: i64,
    /// Space-separated artist tags
    #[serde(deserialize_with = "nullable")]
    pub tag_string_artist: String,
    /// Space-separated character tags
    #[serde(deserialize_with = "nullable")]
    pub tag_string_character: String,
    /// Space-separated copyright tags
    #[serde(deserialize_with = "nullable")]
    pub tag_string_copyright: String,
    /// Space-separated general tags
    #[serde(deserialize_with = "nullable")]
    pub tag_string_general: String,
    /// Location of the post's file, absolute or relative to the API endpoint
    pub file_url: Option<String>,
}

impl Post {
    /// Tag string for one category
    pub fn tag_string(&self, category: TagCategory) -> &str {
        match category {
            TagCategory::Artist => &self.tag_string_artist,
            TagCategory::Character => &self.tag_string_character,
            TagCategory::Copyright => &self.tag_string_copyright,
            TagCategory::General => &self.tag_string_general,
        }
    }

    /// File URL, if the API sent a non-empty one
    pub fn file_url(&self) -> Option<&str> {
        self.file_url.as_deref().filter(|u| !u.trim().is_empty())
    }

    /// Name of the saved file: `<id>.<file_ext>`
    ///
    /// # Errors
    /// Returns [`Error::InvalidFileExt`] if the extension could leave the save
    /// directory (path separators, `..`, NUL).
    pub fn file_name(&self) -> Result<String> {
        let ext = &self.file_ext;
        if ext.contains(['/', '\\', '\0']) || ext.contains("..") {
            return Err(Error::InvalidFileExt {
                post_id: self.id,
                file_ext: ext.clone(),
            });
        }
        Ok(format!("{}.{}", self.id, ext))
    }
}

/// Treat `null` like a missing field
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Split a space-separated token string, ignoring repeated whitespace
pub(crate) fn split_tokens(s: &str) -> impl Iterator<Item = &str> {
    s.split_whitespace()
}

/// Parse `<prefix><id>` tokens (e.g. `fav:42`), skipping malformed ones
pub(crate) fn parse_prefixed_ids<'a>(
    s: &'a str,
    prefix: &'a str,
) -> impl Iterator<Item = i64> + 'a {
    split_tokens(s).filter_map(move |token| token.strip_prefix(prefix)?.parse::<i64>().ok())
}
