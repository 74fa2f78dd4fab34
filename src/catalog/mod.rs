use crate::models::{CandidateItem, Release};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// Data-access contract the ranking pipeline depends on. Implementations own
/// persistence entirely; every query returns plain records with release
/// metadata already attached, and only `LIVE` items.
#[async_trait::async_trait]
pub trait CatalogAccess: Send + Sync {
    async fn find_release(&self, id: Uuid) -> Result<Option<Release>>;

    /// Live items whose release shares the given genre or artist, excluding
    /// items of the reference release itself. Retrieval order is the
    /// implementation's listing order and must be deterministic per call.
    async fn find_live_candidates_by_genre_or_artist(
        &self,
        exclude_release_id: Uuid,
        genre: Option<&str>,
        artist: Option<&str>,
        limit: usize,
    ) -> Result<Vec<CandidateItem>>;

    /// Live items listed at or after `cutoff`, newest first, optionally
    /// filtered by genre.
    async fn find_live_items_listed_since(
        &self,
        cutoff: DateTime<Utc>,
        genre: Option<&str>,
    ) -> Result<Vec<CandidateItem>>;

    /// Wishlist resolution: returns the items (any status) for the given ids,
    /// skipping ids that do not exist.
    async fn find_items(&self, ids: &[Uuid]) -> Result<Vec<CandidateItem>>;

    /// Set-valued counterpart of the genre-or-artist query, used by
    /// personalization: live items whose release genre is in `genres` OR
    /// whose artist is in `artists`, excluding the given release ids.
    async fn find_live_candidates_in_taste(
        &self,
        genres: &HashSet<String>,
        artists: &HashSet<String>,
        exclude_release_ids: &HashSet<Uuid>,
        limit: usize,
    ) -> Result<Vec<CandidateItem>>;
}

/// In-memory catalog backed by RwLock'd maps. Used by tests and benches, and
/// by hosts that load their inventory snapshot at startup.
pub struct InMemoryCatalog {
    releases: RwLock<HashMap<Uuid, Release>>,
    /// Items in listing order; queries preserve this order so retrieval is
    /// deterministic, which the stable tie-break in ranking relies on.
    items: RwLock<Vec<CandidateItem>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            releases: RwLock::new(HashMap::new()),
            items: RwLock::new(Vec::new()),
        }
    }

    pub async fn add_release(&self, release: Release) {
        let mut releases = self.releases.write().await;
        releases.insert(release.id, release);
    }

    pub async fn add_item(&self, item: CandidateItem) {
        {
            let mut releases = self.releases.write().await;
            releases.entry(item.release.id).or_insert_with(|| item.release.clone());
        }
        let mut items = self.items.write().await;
        items.push(item);
    }

    pub async fn item_count(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn load_inventory(&self, inventory: Vec<CandidateItem>) {
        let count = inventory.len();
        for item in inventory {
            self.add_item(item).await;
        }
        info!("Loaded {} inventory items into catalog", count);
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn matches_genre_or_artist(
    release: &Release,
    genre: Option<&str>,
    artist: Option<&str>,
) -> bool {
    let genre_hit = match (genre, &release.genre) {
        (Some(wanted), Some(got)) => wanted == got,
        _ => false,
    };
    let artist_hit = match (artist, &release.artist) {
        (Some(wanted), Some(got)) => wanted == got,
        _ => false,
    };
    genre_hit || artist_hit
}

#[async_trait::async_trait]
impl CatalogAccess for InMemoryCatalog {
    async fn find_release(&self, id: Uuid) -> Result<Option<Release>> {
        let releases = self.releases.read().await;
        Ok(releases.get(&id).cloned())
    }

    async fn find_live_candidates_by_genre_or_artist(
        &self,
        exclude_release_id: Uuid,
        genre: Option<&str>,
        artist: Option<&str>,
        limit: usize,
    ) -> Result<Vec<CandidateItem>> {
        let items = self.items.read().await;
        Ok(items
            .iter()
            .filter(|item| item.is_live())
            .filter(|item| item.release.id != exclude_release_id)
            .filter(|item| matches_genre_or_artist(&item.release, genre, artist))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_live_items_listed_since(
        &self,
        cutoff: DateTime<Utc>,
        genre: Option<&str>,
    ) -> Result<Vec<CandidateItem>> {
        let items = self.items.read().await;
        let mut recent: Vec<CandidateItem> = items
            .iter()
            .filter(|item| item.is_live())
            .filter(|item| item.listed_at >= cutoff)
            .filter(|item| match genre {
                Some(wanted) => item.release.genre.as_deref() == Some(wanted),
                None => true,
            })
            .cloned()
            .collect();
        recent.sort_by(|a, b| b.listed_at.cmp(&a.listed_at));
        Ok(recent)
    }

    async fn find_items(&self, ids: &[Uuid]) -> Result<Vec<CandidateItem>> {
        let wanted: HashSet<&Uuid> = ids.iter().collect();
        let items = self.items.read().await;
        Ok(items
            .iter()
            .filter(|item| wanted.contains(&item.id))
            .cloned()
            .collect())
    }

    async fn find_live_candidates_in_taste(
        &self,
        genres: &HashSet<String>,
        artists: &HashSet<String>,
        exclude_release_ids: &HashSet<Uuid>,
        limit: usize,
    ) -> Result<Vec<CandidateItem>> {
        let items = self.items.read().await;
        Ok(items
            .iter()
            .filter(|item| item.is_live())
            .filter(|item| !exclude_release_ids.contains(&item.release.id))
            .filter(|item| {
                let genre_hit = item
                    .release
                    .genre
                    .as_ref()
                    .map(|g| genres.contains(g))
                    .unwrap_or(false);
                let artist_hit = item
                    .release
                    .artist
                    .as_ref()
                    .map(|a| artists.contains(a))
                    .unwrap_or(false);
                genre_hit || artist_hit
            })
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListingStatus;

    fn item(release: Release, status: ListingStatus) -> CandidateItem {
        CandidateItem {
            id: Uuid::new_v4(),
            release,
            status,
            listed_at: Utc::now(),
            price_cents: Some(2500),
        }
    }

    #[tokio::test]
    async fn test_genre_or_artist_query_excludes_reference_and_non_live() {
        let catalog = InMemoryCatalog::new();
        let reference = Release::new(Uuid::new_v4(), "Ref")
            .with_genre("Jazz")
            .with_artist("Miles Davis");

        catalog
            .add_item(item(
                Release::new(Uuid::new_v4(), "Live Jazz").with_genre("Jazz"),
                ListingStatus::Live,
            ))
            .await;
        catalog
            .add_item(item(
                Release::new(Uuid::new_v4(), "Sold Jazz").with_genre("Jazz"),
                ListingStatus::Sold,
            ))
            .await;
        catalog.add_item(item(reference.clone(), ListingStatus::Live)).await;

        let candidates = catalog
            .find_live_candidates_by_genre_or_artist(
                reference.id,
                reference.genre.as_deref(),
                reference.artist.as_deref(),
                10,
            )
            .await
            .unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].release.title, "Live Jazz");
    }

    #[tokio::test]
    async fn test_listed_since_orders_newest_first() {
        let catalog = InMemoryCatalog::new();
        let now = Utc::now();

        let mut older = item(
            Release::new(Uuid::new_v4(), "Older").with_genre("Rock"),
            ListingStatus::Live,
        );
        older.listed_at = now - chrono::Duration::days(5);
        let mut newer = item(
            Release::new(Uuid::new_v4(), "Newer").with_genre("Rock"),
            ListingStatus::Live,
        );
        newer.listed_at = now - chrono::Duration::days(1);
        let mut ancient = item(
            Release::new(Uuid::new_v4(), "Ancient").with_genre("Rock"),
            ListingStatus::Live,
        );
        ancient.listed_at = now - chrono::Duration::days(90);

        catalog.load_inventory(vec![older, newer, ancient]).await;

        let recent = catalog
            .find_live_items_listed_since(now - chrono::Duration::days(30), Some("Rock"))
            .await
            .unwrap();

        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].release.title, "Newer");
        assert_eq!(recent[1].release.title, "Older");
    }

    #[tokio::test]
    async fn test_taste_query_matches_either_set() {
        let catalog = InMemoryCatalog::new();
        catalog
            .add_item(item(
                Release::new(Uuid::new_v4(), "Genre Hit").with_genre("Soul"),
                ListingStatus::Live,
            ))
            .await;
        catalog
            .add_item(item(
                Release::new(Uuid::new_v4(), "Artist Hit").with_artist("Nina Simone"),
                ListingStatus::Live,
            ))
            .await;
        catalog
            .add_item(item(
                Release::new(Uuid::new_v4(), "No Hit").with_genre("Polka"),
                ListingStatus::Live,
            ))
            .await;

        let genres: HashSet<String> = ["Soul".to_string()].into();
        let artists: HashSet<String> = ["Nina Simone".to_string()].into();

        let candidates = catalog
            .find_live_candidates_in_taste(&genres, &artists, &HashSet::new(), 10)
            .await
            .unwrap();

        assert_eq!(candidates.len(), 2);
    }
}
