use serde::Deserialize;

/// Standard Imgur response envelope: `{ "data": ..., "success": ..., "status": ... }`.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub status: u32,
}

/// An album created via `POST /3/album`. The create response carries only
/// the id and deletehash; the public link is derived from the id.
#[derive(Debug, Clone, Deserialize)]
pub struct Album {
    pub id: String,
    pub deletehash: String,
}

impl Album {
    /// Public gallery URL for this album.
    pub fn link(&self) -> String {
        album_link(&self.id)
    }
}

/// Public gallery URL for an album id. Kept as a free function so callers
/// that only persisted the id (not the Album) can rebuild the link.
pub fn album_link(id: &str) -> String {
    format!("https://imgur.com/a/{id}")
}

/// An image uploaded via `POST /3/image`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedImage {
    pub id: String,
    pub link: String,
}
