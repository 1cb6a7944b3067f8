use chrono::{DateTime, Utc};

use crate::models::{sorted_newest_first, Post};

pub const INITIAL_VISIBLE: usize = 8;
pub const LOAD_MORE_STEP: usize = 4;

/// Paging over the home grid. Only the count is kept; the posts themselves
/// come from the cache every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedPager {
    visible: usize,
}

impl Default for FeedPager {
    fn default() -> Self {
        Self {
            visible: INITIAL_VISIBLE,
        }
    }
}

impl FeedPager {
    pub fn visible(&self) -> usize {
        self.visible
    }

    pub fn page<'a>(&self, sorted: &'a [Post]) -> &'a [Post] {
        &sorted[..self.visible.min(sorted.len())]
    }

    pub fn remaining(&self, total: usize) -> usize {
        total.saturating_sub(self.visible)
    }

    pub fn load_more(&mut self) {
        self.visible += LOAD_MORE_STEP;
    }

    pub fn load_more_label(&self, total: usize) -> Option<String> {
        match self.remaining(total) {
            0 => None,
            n => Some(format!("Load More Articles ({n} remaining)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthorSummary {
    pub name: String,
    pub email: String,
    pub latest: Option<DateTime<Utc>>,
    /// Newest first.
    pub posts: Vec<Post>,
}

impl AuthorSummary {
    pub fn post_count(&self) -> usize {
        self.posts.len()
    }
}

/// Groups posts by author email, else author name. Authors with the most
/// recent post come first.
pub fn group_by_author(posts: &[Post]) -> Vec<AuthorSummary> {
    let mut authors: Vec<AuthorSummary> = Vec::new();
    for post in sorted_newest_first(posts) {
        let email = post.email.trim().to_lowercase();
        let name = post.display_author().to_string();
        let existing = authors.iter_mut().find(|author| {
            if email.is_empty() {
                author.email.is_empty() && author.name == name
            } else {
                author.email == email
            }
        });
        match existing {
            Some(author) => author.posts.push(post),
            None => authors.push(AuthorSummary {
                latest: post.created_time().or_else(|| {
                    post.published_at
                        .as_deref()
                        .and_then(crate::models::parse_timestamp)
                }),
                name,
                email,
                posts: vec![post],
            }),
        }
    }
    authors
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn post(id: &str, name: &str, email: &str, day: u32) -> Post {
        Post {
            id: id.into(),
            title: format!("title {id}"),
            name: name.into(),
            email: email.into(),
            created_at: Some(format!("2024-02-{day:02}T00:00:00Z")),
            ..Post::default()
        }
    }

    #[test]
    fn pager_shows_eight_then_steps_by_four() {
        let posts: Vec<Post> = (1..=14).map(|i| post(&i.to_string(), "a", "", i)).collect();
        let mut pager = FeedPager::default();
        assert_eq!(pager.page(&posts).len(), 8);
        assert_eq!(
            pager.load_more_label(posts.len()).as_deref(),
            Some("Load More Articles (6 remaining)")
        );
        pager.load_more();
        assert_eq!(pager.page(&posts).len(), 12);
        pager.load_more();
        assert_eq!(pager.page(&posts).len(), 14);
        assert_eq!(pager.load_more_label(posts.len()), None);
    }

    #[test]
    fn short_lists_fit_on_one_page() {
        let posts = vec![post("1", "a", "", 1)];
        let pager = FeedPager::default();
        assert_eq!(pager.page(&posts).len(), 1);
        assert_eq!(pager.remaining(posts.len()), 0);
    }

    #[test]
    fn authors_grouped_by_email_and_ordered_by_latest() {
        let posts = vec![
            post("1", "Ann", "ann@x.com", 1),
            post("2", "Bob", "bob@x.com", 5),
            post("3", "Ann B.", "ANN@x.com", 9),
            post("4", "Cy", "", 3),
            post("5", "Cy", "", 4),
        ];
        let authors = group_by_author(&posts);
        let summary: Vec<(String, usize)> = authors
            .iter()
            .map(|a| (a.name.clone(), a.post_count()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Ann B.".to_string(), 2),
                ("Bob".to_string(), 1),
                ("Cy".to_string(), 2),
            ]
        );
        let ann_posts: Vec<&str> = authors[0].posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ann_posts, vec!["3", "1"]);
        assert_eq!(
            authors[0].latest.map(|ts| ts.format("%Y-%m-%d").to_string()),
            Some("2024-02-09".to_string())
        );
    }
}
