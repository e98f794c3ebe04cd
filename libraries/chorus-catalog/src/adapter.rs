//! Catalog adapter - collection links to search terms

use crate::classify::classify;
use chorus_core::{CatalogExpander, GuildId, TrackRef};
use chorus_playback::{PlayOutcome, PlaybackController, PlaybackError, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Expands catalog links into "artist title" search terms and feeds them to
/// the playback controller
pub struct CatalogAdapter {
    expander: Arc<dyn CatalogExpander>,
}

impl CatalogAdapter {
    /// Create an adapter over `expander`
    pub fn new(expander: Arc<dyn CatalogExpander>) -> Self {
        Self { expander }
    }

    /// Search terms for a playlist, album, or track reference, in order
    ///
    /// Entries without track data are skipped. Unsupported links and
    /// expander failures give an empty list.
    pub async fn expand(&self, reference: &str) -> Vec<String> {
        let Some(link) = classify(reference) else {
            warn!("Unsupported catalog reference: {}", reference);
            return Vec::new();
        };

        match self.expander.list_tracks(link.kind, &link.id).await {
            Ok(items) => {
                let total = items.len();
                let terms: Vec<String> = items
                    .into_iter()
                    .flatten()
                    .filter_map(|track| track.search_term())
                    .collect();
                if terms.len() < total {
                    info!(
                        "Skipped {} of {} entries in {} {}",
                        total - terms.len(),
                        total,
                        link.kind,
                        link.id
                    );
                }
                terms
            }
            Err(err) => {
                warn!("Could not expand {}: {}", reference, err);
                Vec::new()
            }
        }
    }

    /// Expand `reference` and hand the terms to the controller
    ///
    /// An idle guild starts the first term and queues the rest; a busy guild
    /// queues all of them.
    ///
    /// # Errors
    /// `CatalogUnavailable` when the link yields no terms, otherwise whatever
    /// the controller reports for the first term.
    pub async fn enqueue(
        &self,
        controller: &PlaybackController,
        guild: GuildId,
        reference: &str,
    ) -> Result<PlayOutcome> {
        let terms = self.expand(reference).await;
        if terms.is_empty() {
            return Err(PlaybackError::CatalogUnavailable(reference.to_string()));
        }

        info!("Guild {}: {} tracks from {}", guild, terms.len(), reference);
        controller
            .enqueue_all_or_play(guild, terms.into_iter().map(TrackRef::new).collect())
            .await
    }
}
