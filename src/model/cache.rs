//! Catalog and liked-songs caches

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;

use super::content::{Album, Track};

const LIKED_SONGS_CACHE_FILE: &str = "liked_songs.json";

/// Songs and albums fetched once at startup
#[derive(Clone, Default)]
pub struct CatalogCache {
    songs: Arc<RwLock<Vec<Track>>>,
    albums: Arc<RwLock<Vec<Album>>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, songs: Vec<Track>, albums: Vec<Album>) {
        *self.songs.write().await = songs;
        *self.albums.write().await = albums;
    }

    pub async fn songs(&self) -> Vec<Track> {
        self.songs.read().await.clone()
    }

    pub async fn albums(&self) -> Vec<Album> {
        self.albums.read().await.clone()
    }

    pub async fn album(&self, album_id: &str) -> Option<Album> {
        self.albums.read().await.iter().find(|a| a.id == album_id).cloned()
    }

    /// Catalog songs whose `album` field names this album
    pub async fn album_tracks(&self, album: &Album) -> Vec<Track> {
        let name = album.name();
        self.songs
            .read()
            .await
            .iter()
            .filter(|t| t.album.as_deref() == Some(name))
            .cloned()
            .collect()
    }
}

/// Liked song ids for the like indicator without API calls
#[derive(Clone)]
pub struct LikedSongsCache {
    liked_ids: Arc<RwLock<HashSet<String>>>,
    path: PathBuf,
}

impl LikedSongsCache {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            liked_ids: Arc::new(RwLock::new(HashSet::new())),
            path: data_dir.join(LIKED_SONGS_CACHE_FILE),
        }
    }

    pub async fn load_from_disk(&self) -> Result<()> {
        if self.path.exists() {
            let content = tokio::fs::read_to_string(&self.path).await?;
            let ids: Vec<String> = serde_json::from_str(&content)?;
            *self.liked_ids.write().await = ids.into_iter().collect();
        }
        Ok(())
    }

    pub async fn save_to_disk(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let content = {
            let liked_ids = self.liked_ids.read().await;
            let ids: Vec<&String> = liked_ids.iter().collect();
            serde_json::to_string(&ids)?
        };
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }

    pub async fn update(&self, track_ids: Vec<String>) {
        *self.liked_ids.write().await = track_ids.into_iter().collect();
    }

    pub async fn is_liked(&self, track_id: &str) -> bool {
        self.liked_ids.read().await.contains(track_id)
    }

    pub async fn snapshot(&self) -> HashSet<String> {
        self.liked_ids.read().await.clone()
    }

    pub async fn add(&self, track_id: String) {
        self.liked_ids.write().await.insert(track_id);
    }

    pub async fn remove(&self, track_id: &str) {
        self.liked_ids.write().await.remove(track_id);
    }

    /// Drops everything, memory and disk (on logout)
    pub async fn clear(&self) {
        self.liked_ids.write().await.clear();
        let _ = tokio::fs::remove_file(&self.path).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: &str, album: &str) -> Track {
        Track {
            id: id.into(),
            album: Some(album.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn album_tracks_match_by_album_name() {
        let cache = CatalogCache::new();
        let album = Album {
            id: "al1".into(),
            name: Some("Blue".into()),
            ..Default::default()
        };
        cache
            .set(
                vec![song("s1", "Blue"), song("s2", "Red"), song("s3", "Blue")],
                vec![album.clone()],
            )
            .await;
        let ids: Vec<String> = cache.album_tracks(&album).await.into_iter().map(|t| t.id).collect();
        assert_eq!(ids, ["s1", "s3"]);
        assert_eq!(cache.album("al1").await, Some(album));
    }

    #[tokio::test]
    async fn liked_ids_survive_a_disk_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LikedSongsCache::new(dir.path());
        cache.update(vec!["a".into(), "b".into()]).await;
        cache.remove("a").await;
        cache.add("c".into()).await;
        cache.save_to_disk().await.unwrap();

        let reloaded = LikedSongsCache::new(dir.path());
        reloaded.load_from_disk().await.unwrap();
        assert!(!reloaded.is_liked("a").await);
        assert!(reloaded.is_liked("b").await);
        assert!(reloaded.is_liked("c").await);

        reloaded.clear().await;
        assert!(!dir.path().join(LIKED_SONGS_CACHE_FILE).exists());
    }
}
