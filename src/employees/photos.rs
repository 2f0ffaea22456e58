use anyhow::Context;
use bytes::Bytes;
use tracing::warn;
use uuid::Uuid;

use crate::state::AppState;

const PRESIGN_TTL_SECS: u64 = 10 * 60;

/// A photo file part lifted out of the multipart body. The bytes are
/// opaque to the rest of the system; only the object store sees them.
pub struct PhotoUpload {
    pub body: Bytes,
    pub content_type: String,
}

/// Uploads the photo and returns the object key that becomes the stored
/// `photo_url` reference.
pub async fn store_photo(state: &AppState, upload: PhotoUpload) -> anyhow::Result<String> {
    let ext = ext_from_mime(&upload.content_type).unwrap_or("bin");
    let key = format!("employees/{}.{}", Uuid::new_v4(), ext);
    state
        .storage
        .put_object(&key, upload.body, &upload.content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;
    Ok(key)
}

/// Best-effort removal of a replaced or orphaned photo object.
pub async fn discard_photo(state: &AppState, key: &str) {
    if let Err(e) = state.storage.delete_object(key).await {
        warn!(error = %e, key = %key, "failed to delete stored photo");
    }
}

pub async fn presign_photo(state: &AppState, key: &str) -> anyhow::Result<String> {
    state
        .storage
        .presign_get(key, PRESIGN_TTL_SECS)
        .await
        .with_context(|| format!("presign url for {}", key))
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}
