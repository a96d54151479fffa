//! Read helpers over the persisted posts and relations.

use crate::types::{PostId, TagCategory};
use crate::{Error, Result};

use super::{Database, PostRow};

impl Database {
    /// Get a post row by ID
    pub async fn get_post(&self, id: PostId) -> Result<Option<PostRow>> {
        sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, created_at, updated_at, score, md5, rating, file_ext,
                   parent_id, is_deleted, bit_flags, file_url
            FROM posts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Sqlx)
    }

    /// Check whether a post row exists
    pub async fn post_exists(&self, id: PostId) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM posts WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Sqlx)
    }

    /// Count all post rows
    pub async fn count_posts(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Sqlx)
    }

    /// Count all tag rows
    pub async fn count_tags(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tags")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Sqlx)
    }

    /// Look up a tag ID by name
    pub async fn tag_id(&self, name: &str) -> Result<Option<i64>> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM tags WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Sqlx)
    }

    /// Category a tag was created with
    pub async fn tag_category(&self, name: &str) -> Result<Option<TagCategory>> {
        let code: Option<String> =
            sqlx::query_scalar::<_, String>("SELECT category FROM tags WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::Sqlx)?;

        Ok(code.as_deref().and_then(TagCategory::from_code))
    }

    /// Names of the tags linked to a post, sorted
    pub async fn tags_for_post(&self, post_id: PostId) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT t.name
            FROM tagged g
            JOIN tags t ON t.id = g.tag_id
            WHERE g.post_id = ?
            ORDER BY t.name
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Sqlx)
    }

    /// User IDs that favorited a post, ascending
    pub async fn favorites_for_post(&self, post_id: PostId) -> Result<Vec<i64>> {
        sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM favorites WHERE post_id = ? ORDER BY user_id",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Sqlx)
    }

    /// Pool IDs a post belongs to, ascending
    pub async fn pools_for_post(&self, post_id: PostId) -> Result<Vec<i64>> {
        sqlx::query_scalar::<_, i64>("SELECT pool_id FROM pooled WHERE post_id = ? ORDER BY pool_id")
            .bind(post_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Sqlx)
    }
}
