use eframe::egui::{self, Color32, RichText};
use egui_extras::{Column, TableBuilder};

use crate::cache::QueryKey;
use crate::forms::EditPostForm;
use crate::models::{sorted_newest_first, Post};
use crate::render::format_date;
use crate::sync::MutationKind;

use super::super::state::AdminTab;
use super::super::BlogApp;

enum RowAction {
    Open(String),
    Edit(Post),
    Delete(String),
}

impl BlogApp {
    pub(crate) fn render_admin(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Dashboard");
            ui.separator();
            ui.selectable_value(&mut self.admin.tab, AdminTab::Posts, "All Posts");
            ui.selectable_value(&mut self.admin.tab, AdminTab::Create, "Create Post");
        });
        ui.separator();
        match self.admin.tab {
            AdminTab::Posts => self.render_post_table(ui),
            AdminTab::Create => self.render_create(ui),
        }
    }

    fn render_post_table(&mut self, ui: &mut egui::Ui) {
        let (posts, loading, failed) = {
            let query = self.sync.posts();
            (
                query.data.map(|posts| sorted_newest_first(posts)),
                query.is_loading,
                query.error.map(str::to_string),
            )
        };

        ui.horizontal(|ui| {
            ui.label(RichText::new("Blog Posts").strong().size(18.0));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Create New Post").clicked() {
                    self.admin.tab = AdminTab::Create;
                }
            });
        });
        ui.add_space(6.0);

        if loading {
            ui.add(egui::Spinner::new());
            return;
        }
        if let Some(err) = failed {
            ui.colored_label(Color32::LIGHT_RED, format!("Failed to load posts: {err}"));
            if ui.button("Retry").clicked() {
                self.sync.invalidate(&QueryKey::Posts);
            }
            return;
        }
        let posts = posts.unwrap_or_default();
        if posts.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(24.0);
                ui.label(RichText::new("No blog posts yet").size(16.0));
                if ui.button("Create First Post").clicked() {
                    self.admin.tab = AdminTab::Create;
                }
            });
            return;
        }

        let deleting = self.sync.mutation(MutationKind::DeletePost).is_pending();
        let mut action: Option<RowAction> = None;
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::initial(320.0).at_least(160.0).clip(true))
            .column(Column::initial(160.0).clip(true))
            .column(Column::initial(110.0))
            .column(Column::remainder())
            .header(22.0, |mut header| {
                for title in ["Title", "Author", "Date", "Actions"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for post in &posts {
                    body.row(28.0, |mut row| {
                        row.col(|ui| {
                            if ui.link(post.title.as_str()).clicked() {
                                action = Some(RowAction::Open(post.id.clone()));
                            }
                        });
                        row.col(|ui| {
                            ui.label(post.display_author());
                        });
                        row.col(|ui| {
                            ui.label(format_date(post));
                        });
                        row.col(|ui| {
                            if ui.small_button("Edit").clicked() {
                                action = Some(RowAction::Edit(post.clone()));
                            }
                            if ui
                                .add_enabled(!deleting, egui::Button::new("Delete").small())
                                .clicked()
                            {
                                action = Some(RowAction::Delete(post.id.clone()));
                            }
                        });
                    });
                }
            });

        ui.add_space(6.0);
        ui.label(RichText::new(format!("Showing {} posts", posts.len())).weak());

        match action {
            Some(RowAction::Open(id)) => self.open_post(&id),
            Some(RowAction::Edit(post)) => self.admin.edit = Some(EditPostForm::from_post(&post)),
            Some(RowAction::Delete(id)) => self.admin.confirm_delete = Some(id),
            None => {}
        }
    }
}
