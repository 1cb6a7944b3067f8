use eframe::egui::{self, Align2, Color32, Context};
use log::info;

use super::super::BlogApp;

const DELETE_WARNING: &str =
    "Are you sure you want to delete this blog post? This action cannot be undone.";

impl BlogApp {
    pub(crate) fn render_delete_dialog(&mut self, ctx: &Context) {
        let Some(id) = self.admin.confirm_delete.clone() else {
            return;
        };

        let mut open = true;
        let mut confirmed = false;
        let mut cancelled = false;
        egui::Window::new("Delete Post")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(DELETE_WARNING);
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui
                        .button(egui::RichText::new("Delete").color(Color32::LIGHT_RED))
                        .clicked()
                    {
                        confirmed = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancelled = true;
                    }
                });
            });

        if confirmed {
            info!("deleting post {id}");
            self.sync.delete_post(id);
        }
        if confirmed || cancelled || !open {
            self.admin.confirm_delete = None;
        }
    }

    pub(crate) fn render_edit_dialog(&mut self, ctx: &Context) {
        let Some(form) = self.admin.edit.as_mut() else {
            return;
        };

        let mut open = true;
        let mut save = false;
        let mut cancel = false;
        egui::Window::new("Edit Blog Post")
            .open(&mut open)
            .collapsible(false)
            .default_width(560.0)
            .anchor(Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                if let Some(err) = form.error() {
                    ui.colored_label(Color32::LIGHT_RED, err);
                }
                ui.label("Title");
                ui.add(egui::TextEdit::singleline(&mut form.title).desired_width(f32::INFINITY));
                ui.add_space(6.0);
                ui.label("Content (HTML)");
                egui::ScrollArea::vertical().max_height(320.0).show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut form.content)
                            .code_editor()
                            .desired_rows(12)
                            .desired_width(f32::INFINITY),
                    );
                });
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    let saving = form.is_saving();
                    let label = if saving { "Saving..." } else { "Save Changes" };
                    if ui.add_enabled(!saving, egui::Button::new(label)).clicked() {
                        save = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });

        if save {
            if let Err(err) = form.submit(&mut self.sync) {
                info!("edit not saved: {err}");
            }
        }
        if cancel || !open {
            self.admin.edit = None;
        }
    }
}
