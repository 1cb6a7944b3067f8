use eframe::egui::{self, Color32, RichText};
use log::error;

use crate::cache::QueryKey;
use crate::models::{sorted_newest_first, Post};
use crate::render::{banner_url, excerpt, format_date};

use super::super::BlogApp;

const CARD_WIDTH: f32 = 260.0;
const BANNER_HEIGHT: f32 = 130.0;

impl BlogApp {
    pub(crate) fn render_home(&mut self, ui: &mut egui::Ui) {
        let (posts, loading, failed) = {
            let query = self.sync.posts();
            (
                query.data.map(|posts| sorted_newest_first(posts)),
                query.is_loading,
                query.error.map(str::to_string),
            )
        };

        ui.heading("Latest Articles");
        ui.add_space(6.0);

        if loading {
            ui.horizontal(|ui| {
                ui.add(egui::Spinner::new());
                ui.label("Loading articles...");
            });
            return;
        }
        if let Some(err) = &failed {
            ui.colored_label(Color32::LIGHT_RED, format!("Failed to load articles: {err}"));
            if ui.button("Retry").clicked() {
                self.sync.invalidate(&QueryKey::Posts);
            }
            ui.separator();
        }
        let posts = posts.unwrap_or_default();
        if posts.is_empty() {
            if failed.is_none() {
                ui.label("No articles published yet.");
            }
            return;
        }

        let mut to_open: Option<String> = None;
        let mut load_more = false;
        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    for (index, post) in self.home.pager.page(&posts).iter().enumerate() {
                        if self.render_card(ui, post, index) {
                            to_open = Some(post.id.clone());
                        }
                    }
                });
                ui.add_space(12.0);
                if let Some(label) = self.home.pager.load_more_label(posts.len()) {
                    ui.vertical_centered(|ui| {
                        if ui.button(label).clicked() {
                            load_more = true;
                        }
                    });
                }
            });

        if load_more {
            self.home.pager.load_more();
        }
        if let Some(id) = to_open {
            self.open_post(&id);
        }
    }

    /// Returns true when the card asked to open its post.
    fn render_card(&mut self, ui: &mut egui::Ui, post: &Post, index: usize) -> bool {
        let mut open = false;
        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .inner_margin(egui::vec2(8.0, 8.0))
            .show(ui, |ui| {
                ui.set_width(CARD_WIDTH);
                ui.vertical(|ui| {
                    let banner = banner_url(post, index).to_string();
                    self.render_remote_image(ui, &banner, egui::vec2(CARD_WIDTH, BANNER_HEIGHT));
                    ui.add_space(4.0);
                    let title = if post.title.is_empty() {
                        "(untitled)"
                    } else {
                        post.title.as_str()
                    };
                    if ui.link(RichText::new(title).strong().size(16.0)).clicked() {
                        open = true;
                    }
                    ui.label(excerpt(post));
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(post.display_author()).small());
                        ui.label(RichText::new(format_date(post)).small().weak());
                        if let Some(url) = post.external_url.as_deref().filter(|u| !u.is_empty()) {
                            if ui.small_button("↗").on_hover_text(url).clicked() {
                                if let Err(err) = open::that(url) {
                                    error!("failed to open {url}: {err}");
                                }
                            }
                        }
                    });
                    let tags = post.tag_names();
                    if !tags.is_empty() {
                        ui.label(RichText::new(tags.join(" · ")).small().weak());
                    }
                    if ui.button("Read more").clicked() {
                        open = true;
                    }
                });
            });
        open
    }
}
