use std::path::Path;
use std::sync::mpsc::Sender;
use std::thread;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use eframe::egui;
use log::{error, info};

use super::image_cache::ImageKey;
use super::messages::AppMessage;
use super::state::LoadedImage;

pub fn download_image(tx: Sender<AppMessage>, ctx: egui::Context, key: ImageKey, url: String) {
    thread::spawn(move || {
        info!("downloading image {}", preview(&url));
        let result = fetch_image_bytes(&url).and_then(|bytes| decode_image(&bytes));
        if tx.send(AppMessage::ImageLoaded { key, result }).is_err() {
            error!("failed to send ImageLoaded message");
            return;
        }
        ctx.request_repaint();
    });
}

fn fetch_image_bytes(url: &str) -> Result<Vec<u8>, String> {
    if let Some(encoded) = url.strip_prefix("data:") {
        let (_, payload) = encoded
            .split_once(";base64,")
            .ok_or_else(|| "unsupported data URL".to_string())?;
        return BASE64
            .decode(payload.trim())
            .map_err(|e| format!("Data URL decode error: {e}"));
    }
    let resp = reqwest::blocking::get(url).map_err(|e| format!("Request error: {e}"))?;
    let resp = resp
        .error_for_status()
        .map_err(|e| format!("Request error: {e}"))?;
    let bytes = resp.bytes().map_err(|e| format!("Download error: {e}"))?;
    Ok(bytes.to_vec())
}

fn decode_image(bytes: &[u8]) -> Result<LoadedImage, String> {
    let dyn_img = image::load_from_memory(bytes).map_err(|e| format!("Image decode error: {e}"))?;
    let rgba = dyn_img.to_rgba8();
    Ok(LoadedImage {
        size: [dyn_img.width() as usize, dyn_img.height() as usize],
        pixels: rgba.into_raw(),
    })
}

/// Asks for a local image and returns it as a `data:` URL for embedding.
pub fn pick_image(tx: Sender<AppMessage>, ctx: egui::Context) {
    thread::spawn(move || {
        let picked = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "gif", "webp"])
            .pick_file();
        let result = match picked {
            Some(path) => image_data_url(&path).map(Some),
            None => Ok(None),
        };
        if tx.send(AppMessage::ImagePicked(result)).is_err() {
            error!("failed to send ImagePicked message");
            return;
        }
        ctx.request_repaint();
    });
}

pub fn image_data_url(path: &Path) -> Result<String, String> {
    let mime = image_mime(path).ok_or_else(|| format!("{} is not a supported image", path.display()))?;
    let bytes = std::fs::read(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    Ok(format!("data:{mime};base64,{}", BASE64.encode(bytes)))
}

fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Data URLs can be megabytes long; log only their head.
fn preview(url: &str) -> &str {
    match url.char_indices().nth(64) {
        Some((cut, _)) => &url[..cut],
        None => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_follows_extension() {
        assert_eq!(image_mime(Path::new("a/b.PNG")), Some("image/png"));
        assert_eq!(image_mime(Path::new("photo.jpeg")), Some("image/jpeg"));
        assert_eq!(image_mime(Path::new("notes.txt")), None);
        assert_eq!(image_mime(Path::new("noext")), None);
    }

    #[test]
    fn data_urls_decode_locally() {
        let url = format!("data:image/png;base64,{}", BASE64.encode(b"raw"));
        assert_eq!(fetch_image_bytes(&url), Ok(b"raw".to_vec()));
        assert!(fetch_image_bytes("data:text/plain,hi").is_err());
    }

    #[test]
    fn long_urls_are_shortened_for_logs() {
        let long = "x".repeat(200);
        assert_eq!(preview(&long).len(), 64);
        assert_eq!(preview("short"), "short");
    }
}
