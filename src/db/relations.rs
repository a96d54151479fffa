//! Favorite and pool edges.

use crate::types::{Post, parse_prefixed_ids};
use crate::{Error, Result};
use tracing::warn;

use super::{Database, PersistOutcome};

impl Database {
    /// Insert favorite and pool edges for a post in one transaction
    ///
    /// Skipped entirely when both strings are blank. Tokens that are not
    /// `fav:<id>` / `pool:<id>` are ignored.
    pub(crate) async fn insert_relations(&self, post: &Post, outcome: &mut PersistOutcome) {
        if post.fav_string.trim().is_empty() && post.pool_string.trim().is_empty() {
            return;
        }

        outcome.relation_transactions += 1;
        if let Err(e) = self.write_relations(post, outcome).await {
            warn!(post_id = post.id, error = %e, "Inserting favorites and pools failed");
            outcome.failures += 1;
        }
    }

    async fn write_relations(&self, post: &Post, outcome: &mut PersistOutcome) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Sqlx)?;

        for user_id in parse_prefixed_ids(&post.fav_string, "fav:") {
            let result = sqlx::query(
                "INSERT INTO favorites (user_id, post_id) VALUES (?, ?) ON CONFLICT DO NOTHING",
            )
            .bind(user_id)
            .bind(post.id)
            .execute(&mut *tx)
            .await;

            match result {
                Ok(r) if r.rows_affected() > 0 => outcome.favorites_linked += 1,
                Ok(_) => {}
                Err(e) => {
                    warn!(post_id = post.id, user_id, error = %e, "Could not insert favorite");
                    outcome.failures += 1;
                }
            }
        }

        for pool_id in parse_prefixed_ids(&post.pool_string, "pool:") {
            let result = sqlx::query(
                "INSERT INTO pooled (pool_id, post_id) VALUES (?, ?) ON CONFLICT DO NOTHING",
            )
            .bind(pool_id)
            .bind(post.id)
            .execute(&mut *tx)
            .await;

            match result {
                Ok(r) if r.rows_affected() > 0 => outcome.pools_linked += 1,
                Ok(_) => {}
                Err(e) => {
                    warn!(post_id = post.id, pool_id, error = %e, "Could not insert pool");
                    outcome.failures += 1;
                }
            }
        }

        tx.commit().await.map_err(Error::Sqlx)?;
        Ok(())
    }
}
