//! Asset loading error types.

/// Errors that can occur while fetching or decoding a texture.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// Offline mode is active and the image is not in the cache.
    #[error("offline and not cached: {url}")]
    Offline { url: String },

    /// The HTTP request failed or returned a non-success status.
    #[error("failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    /// Reading the response body or the cache file failed.
    #[error("asset I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The downloaded bytes are not a decodable image.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}
