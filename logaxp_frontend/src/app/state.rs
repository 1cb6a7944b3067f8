use std::ops::Range;
use std::time::Instant;

use crate::comments::CommentThread;
use crate::feed::FeedPager;
use crate::forms::{CommentForm, CreatePostForm, EditPostForm, LoginForm};
use crate::render::BodyBlock;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Home,
    Authors,
    Post(String),
    SignIn,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminTab {
    #[default]
    Posts,
    Create,
}

#[derive(Debug, Default)]
pub struct AdminState {
    pub tab: AdminTab,
    pub confirm_delete: Option<String>,
    pub edit: Option<EditPostForm>,
}

/// Everything the detail page keeps between frames for the open post.
#[derive(Default)]
pub struct PostPage {
    pub id: String,
    pub thread: Option<CommentThread>,
    pub comment: CommentForm,
    pub copied_at: Option<Instant>,
    /// Source HTML and its laid-out blocks, so sanitizing runs once per
    /// content change.
    pub rendered: Option<(String, Vec<BodyBlock>)>,
}

impl PostPage {
    pub fn for_post(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }
}

/// Creation tab: the form plus where the toolbar acts.
#[derive(Default)]
pub struct CreatePage {
    pub form: CreatePostForm,
    pub focused_block: usize,
    pub selection: Range<usize>,
    pub link_url: String,
    pub image_url: String,
    pub picking_image: bool,
    pub show_preview: bool,
}

#[derive(Default)]
pub struct HomeState {
    pub pager: FeedPager,
}

pub struct LoadedImage {
    pub size: [usize; 2],
    pub pixels: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct SignInState {
    pub form: LoginForm,
}
