use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// URL prefix under which stored images are served.
pub const URL_PREFIX: &str = "/uploads";

/// Image files stored on local disk under `<data_root>/uploads/`.
///
/// Stored names are generated server-side (timestamp + random id), so the
/// client-supplied filename never reaches the filesystem.
#[derive(Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(data_root: &Path) -> Self {
        Self {
            dir: data_root.join("uploads"),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write one uploaded image and return its site-relative URL
    /// (`/uploads/<name>`).
    pub async fn save(&self, original_name: &str, data: &[u8]) -> io::Result<String> {
        let name = stored_name(original_name);
        tokio::fs::write(self.dir.join(&name), data).await?;
        Ok(format!("{URL_PREFIX}/{name}"))
    }

    /// Best-effort deletion of a previously stored image.
    ///
    /// Failures only leak disk space, never correctness, so they are logged
    /// and swallowed. Paths that don't point into the upload dir are ignored.
    pub async fn remove(&self, image_path: &str) {
        let Some(file) = image_path
            .strip_prefix(URL_PREFIX)
            .map(|rest| rest.trim_start_matches('/'))
            .filter(|name| is_safe_name(name))
        else {
            tracing::debug!("Not a stored image path, skipping cleanup: {image_path}");
            return;
        };

        if let Err(e) = tokio::fs::remove_file(self.dir.join(file)).await {
            tracing::debug!("Stale image cleanup failed for {file}: {e}");
        }
    }

    /// Resolve a client-requested filename to its on-disk path for serving.
    /// Rejects anything that isn't a plain filename.
    pub fn resolve(&self, file: &str) -> Option<PathBuf> {
        if is_safe_name(file) {
            Some(self.dir.join(file))
        } else {
            None
        }
    }
}

/// A single plain path segment: non-empty, no separators, no `..`.
fn is_safe_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
}

/// Collision-resistant stored filename: unix-millis, a v4 uuid, and the
/// original file's (sanitized) extension.
fn stored_name(original: &str) -> String {
    format!(
        "{}-{}.{}",
        chrono::Utc::now().timestamp_millis(),
        Uuid::new_v4(),
        sanitize_extension(original)
    )
}

/// Lowercased alphanumeric extension, capped at 8 chars; `bin` if the
/// original name has nothing usable.
fn sanitize_extension(original: &str) -> String {
    let ext: String = Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(8)
        .collect::<String>()
        .to_ascii_lowercase();

    if ext.is_empty() { "bin".to_string() } else { ext }
}
