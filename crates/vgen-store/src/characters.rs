//! Character profiles and their lock images.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use vgen_models::{lock_image_filename, Character};

use crate::document::{read_doc, write_doc};
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Default, Serialize, Deserialize)]
struct CharacterDocument {
    characters: HashMap<String, Character>,
}

/// Store for character profiles.
///
/// Metadata lives in one JSON document; each lock image is a separate file
/// under `images_dir`, named by the sanitized character name, at most one
/// per character.
pub struct CharacterStore {
    doc_path: PathBuf,
    images_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl CharacterStore {
    pub async fn open(
        doc_path: impl Into<PathBuf>,
        images_dir: impl Into<PathBuf>,
    ) -> StoreResult<Self> {
        let doc_path = doc_path.into();
        let images_dir = images_dir.into();
        let _: CharacterDocument = read_doc(&doc_path).await?;
        tokio::fs::create_dir_all(&images_dir).await?;
        Ok(Self {
            doc_path,
            images_dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Filesystem path for a character's lock image.
    pub fn lock_image_path(&self, name: &str) -> PathBuf {
        self.images_dir.join(lock_image_filename(name))
    }

    /// Insert or replace a profile, keyed by name.
    pub async fn save(&self, character: Character) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut doc: CharacterDocument = read_doc(&self.doc_path).await?;
        doc.characters.insert(character.name.clone(), character);
        write_doc(&self.doc_path, &doc).await
    }

    pub async fn get(&self, name: &str) -> StoreResult<Character> {
        let doc: CharacterDocument = read_doc(&self.doc_path).await?;
        doc.characters
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("character {name}")))
    }

    /// Profiles sorted newest-first.
    pub async fn list(&self) -> StoreResult<Vec<Character>> {
        let doc: CharacterDocument = read_doc(&self.doc_path).await?;
        let mut characters: Vec<Character> = doc.characters.into_values().collect();
        characters.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(characters)
    }

    /// Remove a profile and its lock image. The image removal is
    /// best-effort; the file may already be gone.
    pub async fn delete(&self, name: &str) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut doc: CharacterDocument = read_doc(&self.doc_path).await?;
        if doc.characters.remove(name).is_none() {
            return Err(StoreError::not_found(format!("character {name}")));
        }
        write_doc(&self.doc_path, &doc).await?;

        if let Err(e) = tokio::fs::remove_file(self.lock_image_path(name)).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(character = %name, error = %e, "failed to remove lock image");
            }
        }
        Ok(())
    }

    /// Persist a lock image for `name`, replacing any previous one, and mark
    /// the profile accordingly.
    pub async fn save_lock_image(&self, name: &str, bytes: &[u8]) -> StoreResult<()> {
        let path = self.lock_image_path(name);
        tokio::fs::write(&path, bytes).await?;
        debug!(character = %name, bytes = bytes.len(), "saved lock image");

        let _guard = self.write_lock.lock().await;
        let mut doc: CharacterDocument = read_doc(&self.doc_path).await?;
        match doc.characters.get_mut(name) {
            Some(c) => c.has_lock_image = true,
            None => {
                let mut c = Character::new(name);
                c.has_lock_image = true;
                doc.characters.insert(name.to_string(), c);
            }
        }
        write_doc(&self.doc_path, &doc).await
    }

    /// Read the persisted lock image for `name`.
    pub async fn lock_image(&self, name: &str) -> StoreResult<Vec<u8>> {
        match tokio::fs::read(self.lock_image_path(name)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::not_found(format!("lock image for {name}")))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open_temp() -> (tempfile::TempDir, CharacterStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CharacterStore::open(dir.path().join("characters.json"), dir.path().join("locks"))
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_save_get_delete() {
        let (_dir, store) = open_temp().await;

        let mut c = Character::new("fox");
        c.bible = Some("a sly red fox, cinematic".into());
        store.save(c).await.unwrap();

        let loaded = store.get("fox").await.unwrap();
        assert_eq!(loaded.bible.as_deref(), Some("a sly red fox, cinematic"));
        assert!(!loaded.has_lock_image);

        store.delete("fox").await.unwrap();
        assert!(store.get("fox").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_lock_image_roundtrip_and_replacement() {
        let (_dir, store) = open_temp().await;

        store.save_lock_image("Red Fox", b"first").await.unwrap();
        assert_eq!(store.lock_image("Red Fox").await.unwrap(), b"first");
        assert!(store.get("Red Fox").await.unwrap().has_lock_image);

        // One image per name: a second upload replaces the first.
        store.save_lock_image("Red Fox", b"second").await.unwrap();
        assert_eq!(store.lock_image("Red Fox").await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_delete_removes_lock_image() {
        let (_dir, store) = open_temp().await;
        store.save_lock_image("fox", b"img").await.unwrap();
        store.delete("fox").await.unwrap();
        assert!(store.lock_image("fox").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_tolerates_missing_image() {
        let (_dir, store) = open_temp().await;
        store.save(Character::new("fox")).await.unwrap();
        // No image was ever written; delete must still succeed.
        store.delete("fox").await.unwrap();
    }

    #[tokio::test]
    async fn test_image_path_is_sanitized() {
        let (dir, store) = open_temp().await;
        let path = store.lock_image_path("../evil");
        assert!(path.starts_with(dir.path().join("locks")));
        assert_eq!(path.file_name().unwrap(), "___evil.jpg");
    }
}
