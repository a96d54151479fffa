//! Tag creation and tag/post edges.

use crate::types::{PostId, TagCategory, split_tokens};
use crate::{Error, Result};
use tracing::warn;

use super::{Database, PersistOutcome};

impl Database {
    /// Create the tags of one category and link them to a post
    ///
    /// Tags are created in one transaction and linked in a second one, so a
    /// tag survives even when linking it fails. An empty tag string opens no
    /// transaction at all.
    pub(crate) async fn insert_tags(
        &self,
        post_id: PostId,
        tags: &str,
        category: TagCategory,
        outcome: &mut PersistOutcome,
    ) {
        let names: Vec<&str> = split_tokens(tags).collect();
        if names.is_empty() {
            return;
        }

        outcome.tag_transactions += 1;
        if let Err(e) = self.create_tags(post_id, &names, category, outcome).await {
            warn!(post_id, category = category.code(), error = %e, "Inserting tags failed");
            outcome.failures += 1;
            return;
        }

        outcome.tag_transactions += 1;
        if let Err(e) = self.link_tags(post_id, &names, outcome).await {
            warn!(post_id, category = category.code(), error = %e, "Linking tags failed");
            outcome.failures += 1;
        }
    }

    /// Insert tag names, leaving existing tags (and their category) untouched
    async fn create_tags(
        &self,
        post_id: PostId,
        names: &[&str],
        category: TagCategory,
        outcome: &mut PersistOutcome,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Sqlx)?;

        for &name in names {
            let result =
                sqlx::query("INSERT INTO tags (name, category) VALUES (?, ?) ON CONFLICT DO NOTHING")
                    .bind(name)
                    .bind(category.code())
                    .execute(&mut *tx)
                    .await;

            if let Err(e) = result {
                warn!(post_id, tag = %name, error = %e, "Could not insert tag");
                outcome.failures += 1;
            }
        }

        tx.commit().await.map_err(Error::Sqlx)?;
        Ok(())
    }

    /// Resolve each tag by name and insert its edge to the post
    ///
    /// Lookup and insert are a single statement so the transaction starts
    /// with a write and takes the SQLite write lock up front.
    async fn link_tags(
        &self,
        post_id: PostId,
        names: &[&str],
        outcome: &mut PersistOutcome,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Sqlx)?;

        for &name in names {
            let result = sqlx::query(
                r#"
                INSERT INTO tagged (tag_id, post_id)
                SELECT id, ? FROM tags WHERE name = ?
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(post_id)
            .bind(name)
            .execute(&mut *tx)
            .await;

            match result {
                Ok(r) if r.rows_affected() > 0 => outcome.tags_linked += 1,
                Ok(_) => {
                    // Nothing inserted: either the edge exists or the tag is missing
                    let exists = sqlx::query_scalar::<_, bool>(
                        "SELECT EXISTS(SELECT 1 FROM tags WHERE name = ?)",
                    )
                    .bind(name)
                    .fetch_one(&mut *tx)
                    .await;
                    account_unlinked_tag(post_id, name, exists, outcome);
                }
                Err(e) => {
                    warn!(post_id, tag = %name, error = %e, "Creating tag relationship failed");
                    outcome.failures += 1;
                }
            }
        }

        tx.commit().await.map_err(Error::Sqlx)?;
        Ok(())
    }
}

/// Count a link statement that inserted nothing
///
/// An existing edge is fine. A missing tag or a failed lookup is a failure.
pub(super) fn account_unlinked_tag(
    post_id: PostId,
    name: &str,
    lookup: std::result::Result<bool, sqlx::Error>,
    outcome: &mut PersistOutcome,
) {
    match lookup {
        Ok(true) => {}
        Ok(false) => {
            warn!(post_id, tag = %name, "Querying tag failed: tag does not exist");
            outcome.failures += 1;
        }
        Err(e) => {
            warn!(post_id, tag = %name, error = %e, "Querying tag failed");
            outcome.failures += 1;
        }
    }
}
