//! Local media library
//!
//! Files are copied into the library root and catalogued in SQLite. Assets
//! are keyed by content hash, so registering the same image twice returns
//! the asset that already exists.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lightbox_storage::Database;
use lightbox_transfer::{Album, HostError, HostResult, MediaAsset, MediaLibrary};
use rusqlite::OptionalExtension;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Clone)]
pub struct LocalMediaLibrary {
    db: Database,
    root: PathBuf,
}

impl LocalMediaLibrary {
    pub fn new(db: Database, root: PathBuf) -> Self {
        Self { db, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn find_by_hash(&self, sha256: &str) -> HostResult<Option<MediaAsset>> {
        self.db
            .with_connection(|conn| {
                let asset = conn
                    .query_row(
                        "SELECT id, uri, file_name, sha256, created_at
                         FROM media_assets WHERE sha256 = ?1",
                        [sha256],
                        asset_from_row,
                    )
                    .optional()?;
                Ok(asset)
            })
            .map_err(HostError::new)
    }

    pub fn list_albums(&self) -> HostResult<Vec<Album>> {
        self.db
            .with_connection(|conn| {
                let mut stmt =
                    conn.prepare("SELECT id, name, created_at FROM albums ORDER BY name")?;
                let albums: Vec<Album> = stmt
                    .query_map([], album_from_row)?
                    .filter_map(|r| r.ok())
                    .collect();
                Ok(albums)
            })
            .map_err(HostError::new)
    }

    pub fn album_assets(&self, album: &Album) -> HostResult<Vec<MediaAsset>> {
        self.db
            .with_connection(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT a.id, a.uri, a.file_name, a.sha256, a.created_at
                     FROM media_assets a
                     JOIN album_assets m ON m.asset_id = a.id
                     WHERE m.album_id = ?1
                     ORDER BY m.added_at",
                )?;
                let assets: Vec<MediaAsset> = stmt
                    .query_map([&album.id], asset_from_row)?
                    .filter_map(|r| r.ok())
                    .collect();
                Ok(assets)
            })
            .map_err(HostError::new)
    }

    /// Library path for a new asset, avoiding clashes with other content
    fn target_path(&self, file_name: &str, sha256: &str) -> PathBuf {
        let candidate = self.root.join(file_name);
        if candidate.exists() {
            self.root.join(format!("{}-{}", &sha256[..12], file_name))
        } else {
            candidate
        }
    }

    fn insert_asset(&self, asset: &MediaAsset) -> HostResult<()> {
        self.db
            .with_connection(|conn| {
                conn.execute(
                    "INSERT INTO media_assets (id, uri, file_name, sha256, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    rusqlite::params![
                        asset.id,
                        asset.uri,
                        asset.file_name,
                        asset.sha256,
                        asset.created_at.to_rfc3339(),
                    ],
                )?;
                Ok(())
            })
            .map_err(HostError::new)
    }
}

#[async_trait]
impl MediaLibrary for LocalMediaLibrary {
    async fn create_asset(&self, path: &Path) -> HostResult<MediaAsset> {
        let sha256 = compute_sha256_hex(path.to_path_buf()).await?;

        if let Some(existing) = self.find_by_hash(&sha256)? {
            tracing::debug!(asset_id = %existing.id, "Asset already registered");
            return Ok(existing);
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();

        tokio::fs::create_dir_all(&self.root).await?;
        let target = self.target_path(&file_name, &sha256);
        tokio::fs::copy(path, &target).await?;

        let asset = MediaAsset {
            id: Uuid::new_v4().to_string(),
            uri: target.to_string_lossy().to_string(),
            file_name,
            sha256,
            created_at: Utc::now(),
        };
        self.insert_asset(&asset)?;

        tracing::info!(asset_id = %asset.id, uri = %asset.uri, "Created media asset");
        Ok(asset)
    }

    async fn album(&self, name: &str) -> HostResult<Option<Album>> {
        self.db
            .with_connection(|conn| {
                let album = conn
                    .query_row(
                        "SELECT id, name, created_at FROM albums WHERE name = ?1",
                        [name],
                        album_from_row,
                    )
                    .optional()?;
                Ok(album)
            })
            .map_err(HostError::new)
    }

    async fn create_album(&self, name: &str, asset: &MediaAsset) -> HostResult<Album> {
        let now = Utc::now().to_rfc3339();
        let album = self
            .db
            .transaction(|conn| {
                conn.execute(
                    "INSERT OR IGNORE INTO albums (id, name, created_at) VALUES (?1, ?2, ?3)",
                    rusqlite::params![Uuid::new_v4().to_string(), name, now],
                )?;
                let album = conn.query_row(
                    "SELECT id, name, created_at FROM albums WHERE name = ?1",
                    [name],
                    album_from_row,
                )?;
                conn.execute(
                    "INSERT OR IGNORE INTO album_assets (album_id, asset_id, added_at)
                     VALUES (?1, ?2, ?3)",
                    rusqlite::params![album.id, asset.id, now],
                )?;
                Ok(album)
            })
            .map_err(HostError::new)?;

        tracing::info!(album_id = %album.id, name = %album.name, "Created album");
        Ok(album)
    }

    async fn add_to_album(&self, album: &Album, asset: &MediaAsset) -> HostResult<()> {
        self.db
            .with_connection(|conn| {
                conn.execute(
                    "INSERT OR IGNORE INTO album_assets (album_id, asset_id, added_at)
                     VALUES (?1, ?2, ?3)",
                    rusqlite::params![album.id, asset.id, Utc::now().to_rfc3339()],
                )?;
                Ok(())
            })
            .map_err(HostError::new)
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn asset_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MediaAsset> {
    let created_str: String = row.get(4)?;
    Ok(MediaAsset {
        id: row.get(0)?,
        uri: row.get(1)?,
        file_name: row.get(2)?,
        sha256: row.get(3)?,
        created_at: parse_timestamp(&created_str),
    })
}

fn album_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Album> {
    let created_str: String = row.get(2)?;
    Ok(Album {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: parse_timestamp(&created_str),
    })
}

async fn compute_sha256_hex(path: PathBuf) -> HostResult<String> {
    tokio::task::spawn_blocking(move || {
        let file = std::fs::File::open(path)?;
        let mut reader = std::io::BufReader::new(file);
        let mut hasher = Sha256::new();
        let mut buf = [0u8; 8192];

        loop {
            let n = std::io::Read::read(&mut reader, &mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }

        let digest = hasher.finalize();
        let mut out = String::with_capacity(digest.len() * 2);
        for b in digest {
            out.push_str(&format!("{:02x}", b));
        }
        Ok(out)
    })
    .await
    .unwrap_or_else(|e| Err(HostError::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library(dir: &Path) -> LocalMediaLibrary {
        let db = Database::open_in_memory().unwrap();
        LocalMediaLibrary::new(db, dir.join("media"))
    }

    #[tokio::test]
    async fn test_create_asset_copies_and_dedupes() {
        let dir = tempfile::tempdir().unwrap();
        let library = library(dir.path());
        let source = dir.path().join("abc.jpg");
        std::fs::write(&source, b"jpeg bytes").unwrap();

        let asset = library.create_asset(&source).await.unwrap();
        assert_eq!(asset.file_name, "abc.jpg");
        assert_eq!(asset.sha256.len(), 64);
        assert_eq!(std::fs::read(&asset.uri).unwrap(), b"jpeg bytes");

        let again = library.create_asset(&source).await.unwrap();
        assert_eq!(again.id, asset.id);
        assert_eq!(std::fs::read_dir(library.root()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_same_name_different_content() {
        let dir = tempfile::tempdir().unwrap();
        let library = library(dir.path());
        let source = dir.path().join("abc.jpg");

        std::fs::write(&source, b"first").unwrap();
        let first = library.create_asset(&source).await.unwrap();
        std::fs::write(&source, b"second").unwrap();
        let second = library.create_asset(&source).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_ne!(first.uri, second.uri);
        assert_eq!(std::fs::read(&first.uri).unwrap(), b"first");
        assert_eq!(std::fs::read(&second.uri).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_albums() {
        let dir = tempfile::tempdir().unwrap();
        let library = library(dir.path());
        let source = dir.path().join("abc.jpg");
        std::fs::write(&source, b"jpeg bytes").unwrap();
        let asset = library.create_asset(&source).await.unwrap();

        assert!(library.album("Download").await.unwrap().is_none());

        let album = library.create_album("Download", &asset).await.unwrap();
        assert_eq!(album.name, "Download");
        assert_eq!(library.album("Download").await.unwrap(), Some(album.clone()));

        // Neither the album nor the membership is duplicated
        let again = library.create_album("Download", &asset).await.unwrap();
        assert_eq!(again.id, album.id);
        library.add_to_album(&album, &asset).await.unwrap();

        assert_eq!(library.list_albums().unwrap().len(), 1);
        let members = library.album_assets(&album).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id, asset.id);
    }

    #[tokio::test]
    async fn test_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let library = library(dir.path());

        assert!(library
            .create_asset(&dir.path().join("missing.jpg"))
            .await
            .is_err());
    }
}
