//! Post upsert and the per-post persistence sequence.

use crate::types::{Post, TagCategory};
use crate::{Error, Result};
use tracing::{debug, warn};

use super::{Database, PersistOutcome};

impl Database {
    /// Persist a post together with its tags, favorites and pool memberships
    ///
    /// Runs, in order:
    /// 1. the post upsert (if it fails nothing else is attempted)
    /// 2. for each non-empty tag category, one transaction creating the tags
    ///    and one transaction linking them to the post
    /// 3. one transaction for all favorite and pool edges, skipped when both
    ///    strings are empty
    ///
    /// No error escapes: each failure is logged with the post ID and counted
    /// in the returned [`PersistOutcome`].
    pub async fn persist_post(&self, post: &Post) -> PersistOutcome {
        let mut outcome = PersistOutcome::default();

        if let Err(e) = self.upsert_post(post).await {
            warn!(post_id = post.id, error = %e, "Could not insert post");
            outcome.failures += 1;
            return outcome;
        }
        outcome.post_saved = true;

        for category in TagCategory::ALL {
            self.insert_tags(post.id, post.tag_string(category), category, &mut outcome)
                .await;
        }

        self.insert_relations(post, &mut outcome).await;

        debug!(
            post_id = post.id,
            tags = outcome.tags_linked,
            favorites = outcome.favorites_linked,
            pools = outcome.pools_linked,
            failures = outcome.failures,
            "Post persisted"
        );
        outcome
    }

    /// Insert a post row, refreshing every scalar column if it already exists
    pub async fn upsert_post(&self, post: &Post) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (
                id, created_at, updated_at, uploader_id, score, source, md5, rating,
                image_width, image_height, file_ext, parent_id, has_children, file_size,
                up_score, down_score, is_pending, is_flagged, is_deleted, is_banned,
                pixiv_id, bit_flags, file_url
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                created_at = excluded.created_at,
                updated_at = excluded.updated_at,
                uploader_id = excluded.uploader_id,
                score = excluded.score,
                source = excluded.source,
                md5 = excluded.md5,
                rating = excluded.rating,
                image_width = excluded.image_width,
                image_height = excluded.image_height,
                file_ext = excluded.file_ext,
                parent_id = excluded.parent_id,
                has_children = excluded.has_children,
                file_size = excluded.file_size,
                up_score = excluded.up_score,
                down_score = excluded.down_score,
                is_pending = excluded.is_pending,
                is_flagged = excluded.is_flagged,
                is_deleted = excluded.is_deleted,
                is_banned = excluded.is_banned,
                pixiv_id = excluded.pixiv_id,
                bit_flags = excluded.bit_flags,
                file_url = excluded.file_url
            "#,
        )
        .bind(post.id)
        .bind(&post.created_at)
        .bind(&post.updated_at)
        .bind(post.uploader_id)
        .bind(post.score)
        .bind(&post.source)
        .bind(&post.md5)
        .bind(&post.rating)
        .bind(post.image_width)
        .bind(post.image_height)
        .bind(&post.file_ext)
        .bind(post.parent_id)
        .bind(post.has_children)
        .bind(post.file_size)
        .bind(post.up_score)
        .bind(post.down_score)
        .bind(post.is_pending)
        .bind(post.is_flagged)
        .bind(post.is_deleted)
        .bind(post.is_banned)
        .bind(post.pixiv_id)
        .bind(post.bit_flags)
        .bind(&post.file_url)
        .execute(&self.pool)
        .await
        .map_err(Error::Sqlx)?;

        Ok(())
    }
}
