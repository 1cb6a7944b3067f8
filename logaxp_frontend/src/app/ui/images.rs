use eframe::egui::{self, Color32, RichText};

use super::super::image_cache::ImageKey;
use super::super::BlogApp;

impl BlogApp {
    /// Draws `url` scaled to `size`, starting the download on first sight.
    pub(crate) fn render_remote_image(&mut self, ui: &mut egui::Ui, url: &str, size: egui::Vec2) {
        self.render_keyed_image(ui, ImageKey::of(url), url, size);
    }

    fn render_keyed_image(&mut self, ui: &mut egui::Ui, key: ImageKey, url: &str, size: egui::Vec2) {
        let frame = ui.ctx().cumulative_pass_nr();
        if let Some(pending) = self.images.take_pending(&key) {
            let color = egui::ColorImage::from_rgba_unmultiplied(pending.size, &pending.pixels);
            let tex = ui
                .ctx()
                .load_texture(key.texture_name(), color, egui::TextureOptions::default());
            self.images.insert_texture(key, tex, frame);
        }

        if let Some(tex) = self.images.texture(&key, frame) {
            ui.add(egui::Image::from_texture(tex).fit_to_exact_size(size));
            return;
        }

        let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
        ui.painter()
            .rect_filled(rect, 4.0, ui.visuals().extreme_bg_color);
        if self.images.error(&key).is_some() {
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "image unavailable",
                egui::FontId::proportional(12.0),
                Color32::GRAY,
            );
        } else {
            if !self.images.is_loading(&key) {
                self.spawn_download_image(key, url);
            }
            ui.put(rect, egui::Spinner::new());
        }
    }

    /// Inline image inside post or editor content, width-capped.
    pub(crate) fn render_content_image(&mut self, ui: &mut egui::Ui, url: &str, alt: &str) {
        let key = ImageKey::of(url);
        let width = ui.available_width().min(480.0);
        let height = self
            .images
            .peek_texture(&key)
            .map(|tex| {
                let [w, h] = tex.size();
                width * h as f32 / w.max(1) as f32
            })
            .unwrap_or(width * 0.5);
        self.render_keyed_image(ui, key, url, egui::vec2(width, height));
        if !alt.is_empty() {
            ui.label(RichText::new(alt).small().weak());
        }
    }
}
