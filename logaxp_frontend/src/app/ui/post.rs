use std::time::{Duration, Instant};

use eframe::egui::{self, Color32, RichText};
use log::{error, info};

use crate::cache::QueryKey;
use crate::comments::CommentThread;
use crate::models::{Comment, Post};
use crate::render::{format_date, post_body};
use crate::share::{page_url, share_url, SharePlatform};

use super::super::state::{PostPage, ViewState};
use super::super::BlogApp;

const COPIED_FOR: Duration = Duration::from_secs(2);

impl BlogApp {
    pub(crate) fn render_post(&mut self, ui: &mut egui::Ui, id: &str) {
        let (post, loading, failed) = {
            let query = self.sync.post(id);
            (
                query.data.cloned(),
                query.is_loading,
                query.error.map(str::to_string),
            )
        };

        if ui.button("← Back").clicked() {
            self.view = ViewState::Home;
            return;
        }

        let Some(post) = post else {
            if loading {
                ui.horizontal(|ui| {
                    ui.add(egui::Spinner::new());
                    ui.label("Loading blog...");
                });
            } else if let Some(err) = failed {
                ui.colored_label(Color32::LIGHT_RED, "Failed to load blog");
                ui.label("Please try again later");
                ui.label(RichText::new(err).small().weak());
                if ui.button("Retry").clicked() {
                    self.sync.invalidate(&QueryKey::Post(id.to_string()));
                }
            }
            return;
        };

        // Detach the page state so the helpers below can borrow `self`.
        let mut page = std::mem::take(&mut self.post_page);
        if page.id != id {
            page = PostPage::for_post(id);
        }
        match page.thread.as_mut() {
            Some(thread) => thread.reconcile(&post),
            None => page.thread = Some(CommentThread::from_post(&post)),
        }

        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                self.render_post_header(ui, &post);
                ui.separator();
                let stale = page
                    .rendered
                    .as_ref()
                    .map_or(true, |(source, _)| *source != post.content);
                if stale {
                    page.rendered = Some((post.content.clone(), post_body(&post.content)));
                }
                if let Some((_, blocks)) = &page.rendered {
                    self.render_body(ui, blocks);
                }
                ui.add_space(12.0);
                self.render_share_bar(ui, &post, &mut page);
                ui.separator();
                self.render_comments(ui, &mut page);
            });

        self.post_page = page;
    }

    fn render_post_header(&mut self, ui: &mut egui::Ui, post: &Post) {
        if let Some(image) = post
            .social_image
            .as_deref()
            .filter(|url| !url.is_empty() && !url.contains("default-thumbnail"))
        {
            let image = image.to_string();
            self.render_content_image(ui, &image, "");
        }
        ui.heading(RichText::new(&post.title).size(26.0));
        ui.horizontal(|ui| {
            ui.label(RichText::new(post.display_author()).strong());
            ui.label(RichText::new(format_date(post)).weak());
        });
        let tags = post.tag_names();
        if !tags.is_empty() {
            ui.label(RichText::new(tags.join(" · ")).small().weak());
        }
    }

    fn render_share_bar(&mut self, ui: &mut egui::Ui, post: &Post, page: &mut PostPage) {
        let url = match page_url(&self.config.site_url, &post.id) {
            Ok(url) => url,
            Err(err) => {
                error!("cannot build share link: {err}");
                return;
            }
        };
        let copied = page
            .copied_at
            .is_some_and(|at| at.elapsed() < COPIED_FOR);
        ui.horizontal(|ui| {
            ui.label("Share:");
            for platform in SharePlatform::ALL {
                let label = if platform == SharePlatform::CopyLink && copied {
                    "Copied!"
                } else {
                    platform.label()
                };
                if !ui.button(label).clicked() {
                    continue;
                }
                let target = share_url(platform, &url, &post.title);
                if platform == SharePlatform::CopyLink {
                    ui.output_mut(|o| o.copied_text = target.to_string());
                    page.copied_at = Some(Instant::now());
                    ui.ctx().request_repaint_after(COPIED_FOR);
                } else if let Err(err) = open::that(target.as_str()) {
                    error!("failed to open share link: {err}");
                }
            }
        });
    }

    fn render_comments(&mut self, ui: &mut egui::Ui, page: &mut PostPage) {
        let visible: Vec<Comment> = page
            .thread
            .as_ref()
            .map(|thread| thread.visible().into_iter().cloned().collect())
            .unwrap_or_default();

        ui.heading(format!("Comments ({})", visible.len()));
        ui.add_space(4.0);

        ui.add(
            egui::TextEdit::multiline(&mut page.comment.text)
                .desired_rows(3)
                .desired_width(f32::INFINITY)
                .hint_text("Share your thoughts..."),
        );
        if let Some(err) = page.comment.error() {
            ui.colored_label(Color32::LIGHT_RED, err);
        }
        let pending = page.comment.is_pending();
        let blank = page.comment.text.trim().is_empty();
        let label = if pending { "Posting..." } else { "Post Comment" };
        if ui
            .add_enabled(!pending && !blank, egui::Button::new(label))
            .clicked()
        {
            let id = page.id.clone();
            if let Err(err) = page.comment.submit(&mut self.sync, &id) {
                info!("comment not sent: {err}");
            }
        }

        ui.add_space(8.0);
        if visible.is_empty() {
            ui.label(RichText::new("No comments yet. Be the first to comment!").weak());
        }
        for comment in &visible {
            egui::Frame::group(ui.style())
                .inner_margin(egui::vec2(8.0, 6.0))
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.horizontal(|ui| {
                        let name = if comment.name.is_empty() {
                            "Anonymous"
                        } else {
                            comment.name.as_str()
                        };
                        ui.label(RichText::new(name).strong());
                        if let Some(ts) = comment
                            .created_at
                            .as_deref()
                            .and_then(crate::models::parse_timestamp)
                        {
                            ui.label(RichText::new(ts.format("%b %-d, %Y").to_string()).weak());
                        }
                    });
                    ui.label(comment.content.as_str());
                });
        }
    }
}
