//! URL texture fetching with a disk cache.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::AssetError;

/// Cap on a single downloaded image. The planet maps are a few megabytes;
/// anything past this is a wrong URL, not a texture.
const MAX_IMAGE_BYTES: u64 = 64 * 1024 * 1024;

/// A decoded RGBA8 image ready for GPU upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    /// Tightly packed RGBA8 pixels, row-major.
    pub pixels: Vec<u8>,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
}

/// Decode image bytes (PNG or JPEG) to RGBA8.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, AssetError> {
    let image = image::load_from_memory(bytes)?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage {
        pixels: rgba.into_raw(),
        width,
        height,
    })
}

/// Fetches texture images by URL, serving repeat requests from a disk cache.
///
/// The cache stores the raw downloaded bytes keyed by a hash of the URL, so
/// a config pointing at a new URL never collides with stale content. With
/// `offline` set, the fetcher only ever reads the cache.
pub struct TextureFetcher {
    cache_dir: PathBuf,
    offline: bool,
}

impl TextureFetcher {
    /// Create a fetcher caching under `cache_dir`.
    pub fn new(cache_dir: impl Into<PathBuf>, offline: bool) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            offline,
        }
    }

    /// Whether the fetcher skips the network entirely.
    pub fn is_offline(&self) -> bool {
        self.offline
    }

    /// The cache file path for a URL.
    pub fn cache_path(&self, url: &str) -> PathBuf {
        let mut hasher = DefaultHasher::new();
        url.hash(&mut hasher);
        let digest = hasher.finish();

        // Keep the original file stem for a legible cache directory.
        let stem = url
            .rsplit('/')
            .next()
            .unwrap_or("texture")
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '_' || *c == '-')
            .collect::<String>();

        self.cache_dir.join(format!("{digest:016x}-{stem}"))
    }

    /// Fetch and decode the image at `url`.
    ///
    /// Cache hits skip the network. A cache entry that no longer decodes is
    /// discarded and re-downloaded. Fresh downloads are written back to the
    /// cache best-effort; a cache write failure only logs.
    pub fn fetch(&self, url: &str) -> Result<DecodedImage, AssetError> {
        let path = self.cache_path(url);

        if path.exists() {
            match read_and_decode(&path) {
                Ok(image) => {
                    log::debug!("Texture cache hit: {url}");
                    return Ok(image);
                }
                Err(err) if self.offline => return Err(err),
                Err(err) => {
                    log::warn!("Discarding undecodable cache entry for {url}: {err}");
                    let _ = std::fs::remove_file(&path);
                }
            }
        } else if self.offline {
            return Err(AssetError::Offline {
                url: url.to_string(),
            });
        }

        let bytes = download(url)?;
        let image = decode_image(&bytes)?;

        if let Err(err) = write_cache(&self.cache_dir, &path, &bytes) {
            log::warn!("Failed to cache {url}: {err}");
        }

        log::info!(
            "Fetched texture {url} ({}x{}, {} bytes)",
            image.width,
            image.height,
            bytes.len()
        );
        Ok(image)
    }
}

fn read_and_decode(path: &Path) -> Result<DecodedImage, AssetError> {
    let bytes = std::fs::read(path)?;
    decode_image(&bytes)
}

fn download(url: &str) -> Result<Vec<u8>, AssetError> {
    let response = ureq::get(url).call().map_err(|err| AssetError::Http {
        url: url.to_string(),
        source: Box::new(err),
    })?;

    let mut bytes = Vec::new();
    response
        .into_reader()
        .take(MAX_IMAGE_BYTES)
        .read_to_end(&mut bytes)?;
    Ok(bytes)
}

fn write_cache(cache_dir: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::create_dir_all(cache_dir)?;
    std::fs::write(path, bytes)
}
