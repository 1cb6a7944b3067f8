use eframe::egui::{self, Color32, RichText};

use super::super::state::{AdminTab, ViewState};
use super::super::BlogApp;

impl BlogApp {
    pub(crate) fn render_sign_in(&mut self, ui: &mut egui::Ui) {
        let mut signed_in = false;
        ui.vertical_centered(|ui| {
            ui.add_space(32.0);
            ui.set_max_width(360.0);
            ui.heading("Welcome back");
            ui.label(RichText::new("Sign in to manage your posts").weak());
            ui.add_space(12.0);

            let form = &mut self.sign_in.form;
            if let Some(err) = form.error() {
                ui.colored_label(Color32::LIGHT_RED, err);
            }
            ui.add(
                egui::TextEdit::singleline(&mut form.email)
                    .hint_text("Email")
                    .desired_width(f32::INFINITY),
            );
            ui.horizontal(|ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut form.password)
                        .password(!form.show_password)
                        .hint_text("Password")
                        .desired_width(ui.available_width() - 60.0),
                );
                let toggle = if form.show_password { "Hide" } else { "Show" };
                if ui.small_button(toggle).clicked() {
                    form.show_password = !form.show_password;
                }
            });
            ui.checkbox(&mut form.remember_me, "Remember me");
            ui.add_space(8.0);
            if ui.button("Sign In").clicked() {
                signed_in = form.submit().is_ok();
            }
        });

        if signed_in {
            self.admin.tab = AdminTab::Posts;
            self.view = ViewState::Admin;
        }
    }
}
