use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag_list: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<PostUser>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(rename = "blog", alias = "post", default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Body of create and update requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostInput {
    pub title: String,
    pub content: String,
    pub name: String,
    pub email: String,
    pub app: String,
}

impl PostInput {
    /// Update body for `post`: identity fields from the stored post, edited
    /// title and content from the caller.
    pub fn edit_of(post: &Post, title: &str, content: &str, tenant: &str) -> Self {
        Self {
            title: title.to_string(),
            content: content.to_string(),
            name: post.name.clone(),
            email: post.email.clone(),
            app: tenant.to_string(),
        }
    }
}

pub const ANONYMOUS_NAME: &str = "Anonymous User";
pub const ANONYMOUS_EMAIL: &str = "anonymous@example.com";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentInput {
    pub name: String,
    pub email: String,
    pub content: String,
}

impl CommentInput {
    pub fn anonymous(content: impl Into<String>) -> Self {
        Self {
            name: ANONYMOUS_NAME.to_string(),
            email: ANONYMOUS_EMAIL.to_string(),
            content: content.into(),
        }
    }
}

impl Post {
    pub fn created_time(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }

    /// Creation time, else publication date, else the epoch.
    pub fn sort_key(&self) -> DateTime<Utc> {
        self.created_time()
            .or_else(|| self.published_at.as_deref().and_then(parse_timestamp))
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    pub fn display_author(&self) -> &str {
        self.user
            .as_ref()
            .and_then(|user| user.name.as_deref())
            .filter(|name| !name.trim().is_empty())
            .or(Some(self.name.as_str()).filter(|name| !name.trim().is_empty()))
            .unwrap_or("Unknown Author")
    }

    pub fn tag_names(&self) -> Vec<&str> {
        let from_objects = self.tags.iter().filter_map(|tag| tag.name.as_deref());
        let from_list = self.tag_list.iter().map(String::as_str);
        from_objects
            .chain(from_list)
            .filter(|name| !name.is_empty())
            .collect()
    }
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Newest first. The sort is stable, so equal timestamps keep input order.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
}

pub fn sorted_newest_first(posts: &[Post]) -> Vec<Post> {
    let mut sorted = posts.to_vec();
    sort_newest_first(&mut sorted);
    sorted
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn post(id: &str, created_at: Option<&str>) -> Post {
        Post {
            id: id.into(),
            created_at: created_at.map(str::to_string),
            ..Post::default()
        }
    }

    #[test]
    fn decodes_server_shape() {
        let raw = r#"{
            "_id": "66a1",
            "title": "Hello",
            "content": "<p>World</p>",
            "name": "A",
            "email": "a@x.com",
            "app": "myapp1",
            "createdAt": "2024-05-01T10:00:00.000Z",
            "comments": [
                {"_id": "c1", "blog": "66a1", "name": "B", "email": "b@x.com", "content": "hi"}
            ],
            "__v": 0
        }"#;
        let post: Post = serde_json::from_str(raw).unwrap();
        assert_eq!(post.id, "66a1");
        assert_eq!(post.comments.len(), 1);
        assert_eq!(post.comments[0].post_id.as_deref(), Some("66a1"));
        assert!(post.created_time().is_some());
    }

    #[test]
    fn id_alias_is_accepted() {
        let post: Post = serde_json::from_str(r#"{"id": "x", "title": "t"}"#).unwrap();
        assert_eq!(post.id, "x");
    }

    #[test]
    fn newest_first_with_stable_ties() {
        let mut posts = vec![
            post("old", Some("2024-01-01T00:00:00Z")),
            post("tie-a", Some("2024-03-01T00:00:00Z")),
            post("new", Some("2024-06-01T00:00:00Z")),
            post("tie-b", Some("2024-03-01T00:00:00Z")),
            post("undated", None),
        ];
        sort_newest_first(&mut posts);
        let ids: Vec<_> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "tie-a", "tie-b", "old", "undated"]);
    }

    #[test]
    fn published_date_is_a_fallback_sort_key() {
        let mut dated = post("dated", None);
        dated.published_at = Some("2024-01-18".into());
        let mut posts = vec![post("undated", None), dated];
        sort_newest_first(&mut posts);
        assert_eq!(posts[0].id, "dated");
    }

    #[test]
    fn author_falls_back_through_user_and_name() {
        let mut p = post("p", None);
        assert_eq!(p.display_author(), "Unknown Author");
        p.name = "Ada".into();
        assert_eq!(p.display_author(), "Ada");
        p.user = Some(PostUser {
            name: Some("Drew Cano".into()),
            profile_image: None,
        });
        assert_eq!(p.display_author(), "Drew Cano");
    }

    #[test]
    fn edit_body_keeps_identity_fields() {
        let mut original = post("p", None);
        original.name = "A".into();
        original.email = "a@x.com".into();
        let body = PostInput::edit_of(&original, "Hello v2", "<p>World</p>", "myapp1");
        assert_eq!(
            body,
            PostInput {
                title: "Hello v2".into(),
                content: "<p>World</p>".into(),
                name: "A".into(),
                email: "a@x.com".into(),
                app: "myapp1".into(),
            }
        );
    }
}
