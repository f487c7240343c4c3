use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One catalog entry. `image_path` is a site-relative URL under `/uploads`,
/// or `None` for products listed without a picture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(rename = "imagePath")]
    pub image_path: Option<String>,
    pub description: String,
}

/// Result of a successful edit: the record as persisted, plus the image
/// path it displaced (due for best-effort deletion by the caller).
#[derive(Debug)]
pub struct Updated {
    pub product: Product,
    pub stale_image: Option<String>,
}

/// Catalog persisted as a single JSON array on disk.
///
/// Every mutation rewrites the whole file. There is no locking: the tool
/// assumes a single administrator, and concurrent writes are last-write-wins.
#[derive(Clone)]
pub struct ProductStore {
    path: PathBuf,
}

impl ProductStore {
    pub fn new(data_root: &Path) -> Self {
        Self {
            path: data_root.join("products.json"),
        }
    }

    /// Read the full collection, newest first.
    ///
    /// A missing or unparsable file is treated as an empty catalog so a
    /// damaged data directory never takes the public page down.
    pub async fn list(&self) -> Vec<Product> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!("Cannot read {}: {}", self.path.display(), e);
                }
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(products) => products,
            Err(e) => {
                tracing::warn!(
                    "Ignoring unparsable product file {}: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Create a record with a fresh id and prepend it to the collection.
    pub async fn add(
        &self,
        description: &str,
        image_path: Option<String>,
    ) -> io::Result<Product> {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            image_path,
            description: description.trim().to_string(),
        };

        let mut products = self.list().await;
        products.insert(0, product.clone());
        self.persist(&products).await?;

        Ok(product)
    }

    /// Edit a record in place. Returns `Ok(None)` if `id` is unknown.
    ///
    /// The description is applied only when non-empty after trimming; a new
    /// image path is applied only when one was actually supplied, in which
    /// case the displaced path is handed back for cleanup.
    pub async fn update(
        &self,
        id: &str,
        description: &str,
        new_image: Option<String>,
    ) -> io::Result<Option<Updated>> {
        let mut products = self.list().await;
        let Some(product) = products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        let description = description.trim();
        if !description.is_empty() {
            product.description = description.to_string();
        }

        let mut stale_image = None;
        if let Some(path) = new_image {
            stale_image = product.image_path.replace(path);
        }

        let updated = Updated {
            product: product.clone(),
            stale_image,
        };
        self.persist(&products).await?;

        Ok(Some(updated))
    }

    /// Remove a record. Returns the removed record (its `image_path` is the
    /// caller's cleanup signal), or `Ok(None)` if `id` is unknown.
    pub async fn remove(&self, id: &str) -> io::Result<Option<Product>> {
        let mut products = self.list().await;
        let Some(pos) = products.iter().position(|p| p.id == id) else {
            return Ok(None);
        };

        let removed = products.remove(pos);
        self.persist(&products).await?;

        Ok(Some(removed))
    }

    async fn persist(&self, products: &[Product]) -> io::Result<()> {
        let json = serde_json::to_string_pretty(products).map_err(io::Error::other)?;
        tokio::fs::write(&self.path, json).await
    }
}
