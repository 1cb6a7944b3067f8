use std::collections::HashSet;

use crate::models::{Comment, CommentInput, Post};

/// Reader feedback only: comments written with the post author's own email
/// are seed content and never shown.
pub fn visible_comments<'a>(post_email: &str, comments: &'a [Comment]) -> Vec<&'a Comment> {
    comments
        .iter()
        .filter(|comment| comment.email != post_email)
        .collect()
}

fn is_submission(comment: &Comment, submitted: &CommentInput) -> bool {
    comment.email.eq_ignore_ascii_case(submitted.email.trim())
        && comment.content.trim() == submitted.content.trim()
}

/// Locally displayed comment list for one post.
///
/// Seeded from the server once, then grown by prepending comments this
/// client created and appending ones it has not seen yet.
#[derive(Debug, Clone, Default)]
pub struct CommentThread {
    post_id: String,
    author_email: String,
    comments: Vec<Comment>,
}

impl CommentThread {
    pub fn from_post(post: &Post) -> Self {
        Self {
            post_id: post.id.clone(),
            author_email: post.email.clone(),
            comments: post.comments.clone(),
        }
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn visible(&self) -> Vec<&Comment> {
        visible_comments(&self.author_email, &self.comments)
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    fn known_ids(&self) -> HashSet<&str> {
        self.comments
            .iter()
            .filter(|comment| !comment.id.is_empty())
            .map(|comment| comment.id.as_str())
            .collect()
    }

    /// Finds the comment the server added for `submitted`.
    ///
    /// Among comments whose id we have never seen, the one matching the
    /// submitted email and text wins; others are from other readers. With no
    /// match every unseen comment counts. When ids are missing altogether the
    /// last matching (else last) element is taken, matching servers that
    /// append.
    pub fn created_in<'a>(
        &self,
        returned: &'a [Comment],
        submitted: &CommentInput,
    ) -> Vec<&'a Comment> {
        let known = self.known_ids();
        let fresh: Vec<&Comment> = returned
            .iter()
            .filter(|comment| !comment.id.is_empty() && !known.contains(comment.id.as_str()))
            .collect();
        if let Some(ours) = fresh
            .iter()
            .copied()
            .find(|comment| is_submission(comment, submitted))
        {
            return vec![ours];
        }
        if !fresh.is_empty() {
            return fresh;
        }
        if returned.iter().all(|comment| comment.id.is_empty()) {
            return returned
                .iter()
                .rev()
                .find(|comment| is_submission(comment, submitted))
                .or_else(|| returned.last())
                .into_iter()
                .collect();
        }
        Vec::new()
    }

    /// Applies an add-comment response: our comment goes to the front and
    /// anything else unseen is appended as a refetch would. Returns how many
    /// were put in front.
    pub fn absorb_created(&mut self, returned: &[Comment], submitted: &CommentInput) -> usize {
        let created: Vec<Comment> = self
            .created_in(returned, submitted)
            .into_iter()
            .cloned()
            .collect();
        let added = created.len();
        for comment in created.into_iter().rev() {
            self.comments.insert(0, comment);
        }
        self.append_unseen(returned);
        added
    }

    /// Merges a refetched post without disturbing local order: unseen
    /// comments are appended in server order.
    pub fn reconcile(&mut self, post: &Post) {
        if post.id != self.post_id {
            *self = Self::from_post(post);
            return;
        }
        self.author_email = post.email.clone();
        self.append_unseen(&post.comments);
    }

    fn append_unseen(&mut self, comments: &[Comment]) {
        let known: HashSet<String> = self.known_ids().into_iter().map(str::to_string).collect();
        for comment in comments {
            if !comment.id.is_empty() && !known.contains(&comment.id) {
                self.comments.push(comment.clone());
            }
        }
    }
}
