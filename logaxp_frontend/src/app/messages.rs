use log::{error, info};

use crate::cache::QueryKey;
use crate::sync::{MutationOutput, SyncEvent};

use super::image_cache::ImageKey;
use super::state::{AdminTab, LoadedImage, ViewState};
use super::BlogApp;

pub enum AppMessage {
    ImageLoaded {
        key: ImageKey,
        result: Result<LoadedImage, String>,
    },
    /// `Ok(None)` when the file dialog was dismissed.
    ImagePicked(Result<Option<String>, String>),
}

impl BlogApp {
    pub(super) fn process_messages(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            self.handle_message(message);
        }
        for event in self.sync.poll() {
            self.handle_sync_event(event);
        }
    }

    fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::ImageLoaded { key, result } => {
                if let Err(err) = &result {
                    error!("image load failed: {err}");
                }
                self.images.finish(key, result);
                self.process_download_queue();
            }
            AppMessage::ImagePicked(result) => {
                self.create.picking_image = false;
                match result {
                    Ok(Some(data_url)) => self.insert_image_at_cursor(&data_url),
                    Ok(None) => {}
                    Err(err) => {
                        error!("image pick failed: {err}");
                        self.alert = Some(err);
                    }
                }
            }
        }
    }

    fn handle_sync_event(&mut self, event: SyncEvent) {
        if self.create.form.on_event(&event) {
            info!("create form settled: {:?}", self.create.form.phase());
        }
        if let Some(edit) = self.admin.edit.as_mut() {
            if edit.on_event(&event) {
                self.admin.edit = None;
            }
        }
        if let Some((post, submitted)) = self.post_page.comment.on_event(&event) {
            if let Some(thread) = self.post_page.thread.as_mut() {
                let added = thread.absorb_created(&post.comments, &submitted);
                info!("{added} new comment(s) on {}", thread.post_id());
            }
        }

        match event {
            SyncEvent::QueryUpdated(QueryKey::Post(id)) if id == self.post_page.id => {
                self.post_page.rendered = None;
            }
            SyncEvent::QueryUpdated(_) => {}
            SyncEvent::MutationSucceeded(MutationOutput::Created(post)) => {
                info!("created post {}", post.id);
            }
            SyncEvent::MutationSucceeded(MutationOutput::Deleted { id }) => {
                info!("deleted post {id}");
                if self.view == ViewState::Post(id) {
                    self.view = ViewState::Admin;
                    self.admin.tab = AdminTab::Posts;
                }
            }
            SyncEvent::MutationSucceeded(_) => {}
            SyncEvent::MutationFailed { alert, .. } => {
                self.alert = Some(alert.to_string());
            }
        }
    }
}
