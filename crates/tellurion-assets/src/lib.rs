//! Texture loading for Tellurion.
//!
//! Fetches planet texture images by URL at startup, decodes them to RGBA8,
//! and keeps a byte-for-byte copy on disk so later runs never touch the
//! network. Every failure here is non-fatal to the application: the caller
//! logs a warning and renders the body with a neutral fallback texture.

mod error;
mod fetch;

pub use error::AssetError;
pub use fetch::{DecodedImage, TextureFetcher, decode_image};
