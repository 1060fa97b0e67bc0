use std::path::{Path, PathBuf};

use async_trait::async_trait;
use claim_domain::error::ClaimError;

/// Duplicate-handling policy for `BlobStore::download` (spec.md §6).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DuplicatePolicy {
    Raise,
    Copy,
    Overwrite,
}

/// Blob store boundary (spec.md §6), standing in for the real SDK.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, local_path: &Path, virtual_path: &str, overwrite: bool) -> Result<(), ClaimError>;

    async fn download(&self, virtual_path: &str, local_path: &Path, policy: DuplicatePolicy) -> Result<(), ClaimError>;

    async fn delete(&self, virtual_path: &str) -> Result<(), ClaimError>;

    async fn list(&self, directory: &str, ext: Option<&str>, name_regex: Option<&str>) -> Result<Vec<String>, ClaimError>;
}

/// Local-filesystem-backed implementation, rooted at `container_root`.
pub struct LocalBlobStore {
    container_root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(container_root: PathBuf) -> Self {
        Self { container_root }
    }

    fn resolve(&self, virtual_path: &str) -> PathBuf {
        self.container_root.join(virtual_path.trim_start_matches('/'))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, local_path: &Path, virtual_path: &str, overwrite: bool) -> Result<(), ClaimError> {
        let dest = self.resolve(virtual_path);
        if dest.exists() && !overwrite {
            return Err(ClaimError::InvalidConfiguration(format!(
                "{} already exists and overwrite=false",
                dest.display()
            )));
        }
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(local_path, &dest).await?;
        Ok(())
    }

    async fn download(&self, virtual_path: &str, local_path: &Path, policy: DuplicatePolicy) -> Result<(), ClaimError> {
        let src = self.resolve(virtual_path);
        if local_path.exists() {
            match policy {
                DuplicatePolicy::Raise => {
                    return Err(ClaimError::InvalidConfiguration(format!(
                        "{} already exists",
                        local_path.display()
                    )))
                }
                DuplicatePolicy::Copy => {
                    let alt = local_path.with_extension("copy");
                    tokio::fs::copy(&src, &alt).await?;
                    return Ok(());
                }
                DuplicatePolicy::Overwrite => {}
            }
        }
        tokio::fs::copy(&src, local_path).await?;
        Ok(())
    }

    async fn delete(&self, virtual_path: &str) -> Result<(), ClaimError> {
        let path = self.resolve(virtual_path);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, directory: &str, ext: Option<&str>, name_regex: Option<&str>) -> Result<Vec<String>, ClaimError> {
        let re = name_regex
            .map(regex::Regex::new)
            .transpose()
            .map_err(|e| ClaimError::InvalidConfiguration(format!("bad name_regex: {e}")))?;

        let dir = self.resolve(directory);
        let mut names = Vec::new();
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(ext) = ext {
                if !name.ends_with(ext) {
                    continue;
                }
            }
            if let Some(re) = &re {
                if !re.is_match(&name) {
                    continue;
                }
            }
            names.push(name);
        }
        names.sort();
        Ok(names)
    }
}
