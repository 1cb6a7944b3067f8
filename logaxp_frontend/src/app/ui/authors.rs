use eframe::egui::{self, Color32, RichText};

use crate::cache::QueryKey;
use crate::feed::group_by_author;

use super::super::BlogApp;

impl BlogApp {
    pub(crate) fn render_authors(&mut self, ui: &mut egui::Ui) {
        let (authors, loading, failed) = {
            let query = self.sync.posts();
            (
                query.data.map(|posts| group_by_author(posts)),
                query.is_loading,
                query.error.map(str::to_string),
            )
        };

        ui.heading("Our Authors");
        ui.add_space(6.0);
        if loading {
            ui.add(egui::Spinner::new());
            return;
        }
        if let Some(err) = failed {
            ui.colored_label(Color32::LIGHT_RED, format!("Failed to load authors: {err}"));
            if ui.button("Retry").clicked() {
                self.sync.invalidate(&QueryKey::Posts);
            }
            return;
        }
        let authors = authors.unwrap_or_default();
        if authors.is_empty() {
            ui.label("No authors yet.");
            return;
        }

        let mut to_open: Option<String> = None;
        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                for author in &authors {
                    let latest = author
                        .latest
                        .map(|ts| ts.format("%b %-d, %Y").to_string())
                        .unwrap_or_else(|| "unknown".to_string());
                    let noun = if author.post_count() == 1 { "post" } else { "posts" };
                    let header = format!(
                        "{} · {} {noun} · latest {latest}",
                        author.name,
                        author.post_count()
                    );
                    egui::CollapsingHeader::new(RichText::new(header).strong())
                        .id_salt(("author", &author.email, &author.name))
                        .show(ui, |ui| {
                            if !author.email.is_empty() {
                                ui.label(RichText::new(&author.email).weak());
                            }
                            for post in &author.posts {
                                if ui.link(post.title.as_str()).clicked() {
                                    to_open = Some(post.id.clone());
                                }
                            }
                        });
                }
            });

        if let Some(id) = to_open {
            self.open_post(&id);
        }
    }
}
