use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use eframe::egui::{self, Context, RichText, TextureHandle};
use log::debug;

use crate::api::BlogApi;
use crate::cache::QueryKey;
use crate::config::FrontendConfig;
use crate::sync::BlogSync;

mod image_cache;
mod messages;
mod state;
mod tasks;
mod ui;

use image_cache::{ImageCache, ImageKey};
use messages::AppMessage;
use state::{AdminState, CreatePage, HomeState, PostPage, SignInState, ViewState};

pub struct BlogApp {
    config: FrontendConfig,
    sync: BlogSync,
    tx: Sender<AppMessage>,
    rx: Receiver<AppMessage>,
    view: ViewState,
    alert: Option<String>,
    home: HomeState,
    post_page: PostPage,
    admin: AdminState,
    create: CreatePage,
    sign_in: SignInState,
    images: ImageCache<TextureHandle>,
    ctx: egui::Context,
}

impl BlogApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: FrontendConfig,
        api: Arc<dyn BlogApi>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        let ctx = cc.egui_ctx.clone();
        let mut sync = BlogSync::new(api);
        let repaint = ctx.clone();
        sync.set_waker(Arc::new(move || repaint.request_repaint()));
        Self {
            config,
            sync,
            tx,
            rx,
            view: ViewState::default(),
            alert: None,
            home: HomeState::default(),
            post_page: PostPage::default(),
            admin: AdminState::default(),
            create: CreatePage::default(),
            sign_in: SignInState::default(),
            images: ImageCache::default(),
            ctx,
        }
    }

    fn open_post(&mut self, id: &str) {
        if self.post_page.id != id {
            self.post_page = PostPage::for_post(id);
        }
        self.view = ViewState::Post(id.to_string());
    }

    fn refresh(&mut self) {
        self.sync.invalidate(&QueryKey::Posts);
        self.images.clear_errors();
    }

    fn spawn_download_image(&mut self, key: ImageKey, url: &str) {
        self.images.request(key, url);
        self.process_download_queue();
    }

    fn process_download_queue(&mut self) {
        while let Some((key, url)) = self.images.next_download() {
            tasks::download_image(self.tx.clone(), self.ctx.clone(), key, url);
        }
    }

    fn render_nav(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("LogaXP Blog").heading().strong());
            ui.separator();
            let tabs = [
                (ViewState::Home, "Home"),
                (ViewState::Authors, "Authors"),
                (ViewState::Admin, "Admin"),
            ];
            for (target, label) in tabs {
                if ui.selectable_label(self.view == target, label).clicked() {
                    self.view = target;
                }
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .selectable_label(self.view == ViewState::SignIn, "Sign In")
                    .clicked()
                {
                    self.view = ViewState::SignIn;
                }
                if ui.button("Refresh").clicked() {
                    self.refresh();
                }
            });
        });

        if let Some(message) = self.alert.clone() {
            let mut dismiss = false;
            egui::Frame::group(ui.style())
                .fill(ui.visuals().extreme_bg_color)
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.colored_label(ui.visuals().warn_fg_color, message.as_str());
                        if ui.button("Dismiss").clicked() {
                            dismiss = true;
                        }
                    });
                });
            if dismiss {
                self.alert = None;
            }
        }
    }
}

impl eframe::App for BlogApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.process_messages();

        egui::TopBottomPanel::top("nav").show(ctx, |ui| {
            self.render_nav(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.view.clone() {
            ViewState::Home => self.render_home(ui),
            ViewState::Authors => self.render_authors(ui),
            ViewState::Post(id) => self.render_post(ui, &id),
            ViewState::SignIn => self.render_sign_in(ui),
            ViewState::Admin => self.render_admin(ui),
        });

        self.render_delete_dialog(ctx);
        self.render_edit_dialog(ctx);

        let evicted = self.images.evict(ctx.cumulative_pass_nr());
        if evicted > 0 {
            debug!("evicted {evicted} textures, {} resident", self.images.len());
        }
    }
}
