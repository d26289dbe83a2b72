//! Wires the texture fetcher to the GPU texture manager.
//!
//! Each of the five planet maps loads independently; a failed fetch or
//! upload logs a warning and substitutes a 1x1 fallback so the scene always
//! renders.

use std::sync::Arc;

use tellurion_assets::TextureFetcher;
use tellurion_config::TextureConfig;
use tellurion_render::{ManagedTexture, TextureManager};
use tellurion_scene::SceneTextures;

/// Neutral gray fallback for color maps.
const FALLBACK_COLOR: [u8; 4] = [128, 128, 128, 255];
/// Flat tangent-space normal (+Z).
const FALLBACK_NORMAL: [u8; 4] = [128, 128, 255, 255];
/// Dim specular fallback.
const FALLBACK_SPECULAR: [u8; 4] = [64, 64, 64, 255];
/// Fully transparent cloud fallback: a missing cloud map renders nothing
/// rather than a white shell.
const FALLBACK_CLOUDS: [u8; 4] = [255, 255, 255, 0];

/// Fetch, decode, and upload all five scene textures.
pub fn load_scene_textures(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    manager: &mut TextureManager,
    fetcher: &TextureFetcher,
    config: &TextureConfig,
) -> SceneTextures {
    SceneTextures {
        earth_color: load_or_fallback(
            device,
            queue,
            manager,
            fetcher,
            "earth-color",
            &config.earth_color,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            FALLBACK_COLOR,
        ),
        // Normal maps carry vector data, not color, so no sRGB transfer.
        earth_normal: load_or_fallback(
            device,
            queue,
            manager,
            fetcher,
            "earth-normal",
            &config.earth_normal,
            wgpu::TextureFormat::Rgba8Unorm,
            FALLBACK_NORMAL,
        ),
        earth_specular: load_or_fallback(
            device,
            queue,
            manager,
            fetcher,
            "earth-specular",
            &config.earth_specular,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            FALLBACK_SPECULAR,
        ),
        clouds: load_or_fallback(
            device,
            queue,
            manager,
            fetcher,
            "clouds",
            &config.clouds,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            FALLBACK_CLOUDS,
        ),
        moon: load_or_fallback(
            device,
            queue,
            manager,
            fetcher,
            "moon",
            &config.moon,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            FALLBACK_COLOR,
        ),
    }
}

#[allow(clippy::too_many_arguments)]
fn load_or_fallback(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    manager: &mut TextureManager,
    fetcher: &TextureFetcher,
    name: &str,
    url: &str,
    format: wgpu::TextureFormat,
    fallback: [u8; 4],
) -> Arc<ManagedTexture> {
    match fetcher.fetch(url) {
        Ok(image) => {
            match manager.create_texture(
                device,
                queue,
                name,
                &image.pixels,
                image.width,
                image.height,
                format,
                true,
            ) {
                Ok(texture) => return texture,
                Err(err) => {
                    log::warn!("Failed to upload texture '{name}': {err}");
                }
            }
        }
        Err(err) => {
            log::warn!("Texture '{name}' unavailable ({err}); rendering with fallback");
        }
    }
    manager.create_fallback(device, queue, &format!("{name}-fallback"), fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tellurion_config::Config;

    fn create_test_device() -> Option<(wgpu::Device, wgpu::Queue)> {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });

            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::default(),
                    compatible_surface: None,
                    force_fallback_adapter: false,
                })
                .await
                .ok()?;

            adapter
                .request_device(&wgpu::DeviceDescriptor::default())
                .await
                .ok()
        })
    }

    #[test]
    fn test_fallback_normal_is_flat() {
        // Decoded as a tangent-space vector, the fallback must point +Z.
        let [x, y, z, _] = FALLBACK_NORMAL;
        assert_eq!(x, 128);
        assert_eq!(y, 128);
        assert!(z > 250);
    }

    #[test]
    fn test_fallback_clouds_are_invisible() {
        assert_eq!(FALLBACK_CLOUDS[3], 0);
    }

    #[test]
    fn test_offline_load_uses_fallbacks() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let cache = tempfile::tempdir().unwrap();
        let fetcher = TextureFetcher::new(cache.path(), true);
        let mut manager = TextureManager::new(&device, 1);

        let textures = load_scene_textures(
            &device,
            &queue,
            &mut manager,
            &fetcher,
            &Config::default().textures,
        );

        // With an empty cache and no network, every map is a 1x1 fallback.
        for texture in [
            &textures.earth_color,
            &textures.earth_normal,
            &textures.earth_specular,
            &textures.clouds,
            &textures.moon,
        ] {
            assert_eq!(texture.dimensions, (1, 1));
        }
    }

    #[test]
    fn test_cached_texture_loads_offline() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let cache = tempfile::tempdir().unwrap();
        let fetcher = TextureFetcher::new(cache.path(), true);
        let mut manager = TextureManager::new(&device, 1);

        // Seed the cache with a decodable moon map.
        let config = Config::default().textures;
        let image = image_bytes(8, 8);
        std::fs::write(fetcher.cache_path(&config.moon), image).unwrap();

        let textures = load_scene_textures(&device, &queue, &mut manager, &fetcher, &config);
        assert_eq!(textures.moon.dimensions, (8, 8));
        assert_eq!(textures.earth_color.dimensions, (1, 1));
    }

    fn image_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([90, 90, 90, 255]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        image
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }
}
