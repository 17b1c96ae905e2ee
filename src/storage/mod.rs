//! Image storage.
//!
//! Snippet images live outside the database. The store takes the raw bytes
//! and hands back a public URL that is persisted on the snippet row. When that
//! URL is a path on this server, [`FsImageStore::files`] serves the upload
//! directory under it.

use std::path::{Path, PathBuf};

use actix_files::Files;
use async_trait::async_trait;
use log::{debug, info};

use crate::error::AppError;

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persists `bytes` under `file_name` and returns the public URL.
    async fn store(
        &self,
        file_name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, AppError>;
}

pub struct FsImageStore {
    root: PathBuf,
    base_url: String,
}

impl FsImageStore {
    pub async fn new(root: PathBuf, base_url: String) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(&root).await?;
        info!("Storing uploaded images in {}", root.display());

        Ok(Self { root, base_url })
    }

    pub fn public_url(&self, file_name: &str) -> String {
        format!("{}/{}", self.base_url, file_name)
    }

    /// Static file service for the upload directory, or `None` when images
    /// are served from another host.
    pub fn files(&self) -> Option<Files> {
        static_files(&self.base_url, &self.root)
    }
}

fn static_files(base_url: &str, root: &Path) -> Option<Files> {
    // An empty mount would shadow every route.
    if base_url.len() > 1 && base_url.starts_with('/') {
        Some(Files::new(base_url, root))
    } else {
        None
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn store(
        &self,
        file_name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, AppError> {
        let path = self.root.join(file_name);
        tokio::fs::write(&path, bytes).await?;
        debug!(
            "Stored {} bytes of {content_type} at {}",
            bytes.len(),
            path.display()
        );

        Ok(self.public_url(file_name))
    }
}

#[cfg(test)]
pub mod memory {
    use std::{collections::HashMap, sync::Mutex};

    use super::*;

    /// Keeps stored images in a map keyed by file name.
    #[derive(Default)]
    pub struct MemoryImageStore {
        pub images: Mutex<HashMap<String, (Vec<u8>, String)>>,
    }

    #[async_trait]
    impl ImageStore for MemoryImageStore {
        async fn store(
            &self,
            file_name: &str,
            bytes: &[u8],
            content_type: &str,
        ) -> Result<String, AppError> {
            self.images.lock().unwrap().insert(
                file_name.to_string(),
                (bytes.to_vec(), content_type.to_string()),
            );
            Ok(format!("/images/{file_name}"))
        }
    }
}
