//! Form state that outlives a frame: field values, validation and the
//! submit lifecycle. Widgets live in `app::ui`.

use log::{info, warn};
use thiserror::Error;

use crate::editor::Document;
use crate::models::{CommentInput, Post, PostInput};
use crate::sync::{BlogSync, MutationKind, MutationOutput, SyncEvent};

pub const CREATED_MESSAGE: &str = "Blog created successfully!";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all required fields")]
    MissingFields(Vec<&'static str>),
    #[error("Please fill in all fields")]
    MissingCredentials,
    #[error("Comment cannot be empty")]
    EmptyComment,
}

fn missing(fields: &[(&'static str, bool)]) -> Result<(), ValidationError> {
    let empty: Vec<&'static str> = fields
        .iter()
        .filter(|(_, filled)| !filled)
        .map(|(name, _)| *name)
        .collect();
    if empty.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(empty))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Submitting,
    Success,
    Error,
}

/// New post: title, author and rich-text body.
#[derive(Debug, Clone, Default)]
pub struct CreatePostForm {
    pub title: String,
    pub name: String,
    pub email: String,
    pub document: Document,
    phase: SubmitPhase,
    message: Option<String>,
}

impl CreatePostForm {
    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == SubmitPhase::Submitting
    }

    pub fn validate(&self, tenant: &str) -> Result<PostInput, ValidationError> {
        missing(&[
            ("title", !self.title.trim().is_empty()),
            ("content", !self.document.is_blank()),
            ("name", !self.name.trim().is_empty()),
            ("email", !self.email.trim().is_empty()),
        ])?;
        Ok(PostInput {
            title: self.title.trim().to_string(),
            content: self.document.to_html(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            app: tenant.to_string(),
        })
    }

    /// Validates and starts the create mutation. Invalid input never reaches
    /// the network.
    pub fn submit(&mut self, sync: &mut BlogSync) -> Result<(), ValidationError> {
        if self.is_submitting() {
            return Ok(());
        }
        match self.validate(sync.tenant()) {
            Ok(input) => {
                info!("creating post {:?}", input.title);
                sync.create_post(input);
                self.phase = SubmitPhase::Submitting;
                self.message = None;
                Ok(())
            }
            Err(err) => {
                warn!("create form rejected: {err:?}");
                self.phase = SubmitPhase::Idle;
                self.message = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Returns true when the event finished this form's submission.
    pub fn on_event(&mut self, event: &SyncEvent) -> bool {
        if !self.is_submitting() {
            return false;
        }
        match event {
            SyncEvent::MutationSucceeded(MutationOutput::Created(_)) => {
                *self = Self {
                    phase: SubmitPhase::Success,
                    message: Some(CREATED_MESSAGE.to_string()),
                    ..Self::default()
                };
                true
            }
            SyncEvent::MutationFailed {
                kind: MutationKind::CreatePost,
                alert,
                ..
            } => {
                self.phase = SubmitPhase::Error;
                self.message = Some((*alert).to_string());
                true
            }
            _ => false,
        }
    }

    pub fn dismiss_message(&mut self) {
        self.message = None;
        if self.phase != SubmitPhase::Submitting {
            self.phase = SubmitPhase::Idle;
        }
    }
}

/// Edit modal for an existing post. Only title and content change; author
/// identity is carried over from the stored post.
#[derive(Debug, Clone)]
pub struct EditPostForm {
    original: Post,
    pub title: String,
    pub content: String,
    saving: bool,
    error: Option<String>,
}

impl EditPostForm {
    pub fn from_post(post: &Post) -> Self {
        Self {
            original: post.clone(),
            title: post.title.clone(),
            content: post.content.clone(),
            saving: false,
            error: None,
        }
    }

    pub fn post_id(&self) -> &str {
        &self.original.id
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn validate(&self, tenant: &str) -> Result<PostInput, ValidationError> {
        missing(&[
            ("title", !self.title.trim().is_empty()),
            ("content", !self.content.trim().is_empty()),
        ])?;
        Ok(PostInput::edit_of(
            &self.original,
            self.title.trim(),
            &self.content,
            tenant,
        ))
    }

    pub fn submit(&mut self, sync: &mut BlogSync) -> Result<(), ValidationError> {
        if self.saving {
            return Ok(());
        }
        let input = self.validate(sync.tenant()).inspect_err(|err| {
            self.error = Some(err.to_string());
        })?;
        sync.update_post(self.original.id.clone(), input);
        self.saving = true;
        self.error = None;
        Ok(())
    }

    /// Returns true when the modal should close.
    pub fn on_event(&mut self, event: &SyncEvent) -> bool {
        if !self.saving {
            return false;
        }
        match event {
            SyncEvent::MutationSucceeded(MutationOutput::Updated(post))
                if post.id == self.original.id || post.id.is_empty() =>
            {
                self.saving = false;
                true
            }
            SyncEvent::MutationFailed {
                kind: MutationKind::UpdatePost,
                alert,
                ..
            } => {
                self.saving = false;
                self.error = Some((*alert).to_string());
                false
            }
            _ => false,
        }
    }
}

/// Reader comment box under a post.
#[derive(Debug, Clone, Default)]
pub struct CommentForm {
    pub text: String,
    /// Target post and the body sent, while the request is in flight.
    pending: Option<(String, CommentInput)>,
    error: Option<String>,
}

impl CommentForm {
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn submit(&mut self, sync: &mut BlogSync, post_id: &str) -> Result<(), ValidationError> {
        if self.is_pending() {
            return Ok(());
        }
        let content = self.text.trim();
        if content.is_empty() {
            return Err(ValidationError::EmptyComment);
        }
        let input = CommentInput::anonymous(content);
        sync.add_comment(post_id.to_string(), input.clone());
        self.pending = Some((post_id.to_string(), input));
        self.error = None;
        Ok(())
    }

    /// On success returns the post the server sent back, with the body that
    /// was submitted, so the caller can fold the new comment into its thread.
    pub fn on_event<'a>(&mut self, event: &'a SyncEvent) -> Option<(&'a Post, CommentInput)> {
        let (pending, _) = self.pending.as_ref()?;
        match event {
            SyncEvent::MutationSucceeded(MutationOutput::CommentAdded { post_id, post })
                if post_id == pending =>
            {
                let (_, submitted) = self.pending.take()?;
                self.text.clear();
                Some((post, submitted))
            }
            SyncEvent::MutationFailed {
                kind: MutationKind::AddComment,
                alert,
                ..
            } => {
                self.pending = None;
                self.error = Some((*alert).to_string());
                None
            }
            _ => None,
        }
    }
}

/// Sign-in form. Credentials are only checked for presence; there is no
/// authentication backend.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub show_password: bool,
    pub remember_me: bool,
    error: Option<String>,
}

impl LoginForm {
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// On success the form is cleared and the caller navigates on.
    pub fn submit(&mut self) -> Result<(), ValidationError> {
        if self.email.trim().is_empty() || self.password.trim().is_empty() {
            let err = ValidationError::MissingCredentials;
            self.error = Some(err.to_string());
            return Err(err);
        }
        info!("signed in as {}", self.email.trim());
        *self = Self::default();
        Ok(())
    }
}
