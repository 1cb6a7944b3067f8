use reqwest::Url;

use crate::config::ConfigError;

const DEFAULT_SHARE_TITLE: &str = "Check out this blog post";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharePlatform {
    CopyLink,
    Facebook,
    Twitter,
    LinkedIn,
    WhatsApp,
}

impl SharePlatform {
    pub const ALL: [SharePlatform; 5] = [
        SharePlatform::CopyLink,
        SharePlatform::Facebook,
        SharePlatform::Twitter,
        SharePlatform::LinkedIn,
        SharePlatform::WhatsApp,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SharePlatform::CopyLink => "Copy link",
            SharePlatform::Facebook => "Facebook",
            SharePlatform::Twitter => "X (Twitter)",
            SharePlatform::LinkedIn => "LinkedIn",
            SharePlatform::WhatsApp => "WhatsApp",
        }
    }
}

/// Public page address of a post on the site.
pub fn page_url(site_url: &str, id: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(site_url).map_err(|err| ConfigError::InvalidUrl {
        url: site_url.to_string(),
        reason: err.to_string(),
    })?;
    url.path_segments_mut()
        .map_err(|_| ConfigError::NotABase(site_url.to_string()))?
        .pop_if_empty()
        .extend(["blog", id]);
    Ok(url)
}

/// The address to open for `platform`. `CopyLink` yields the page itself.
pub fn share_url(platform: SharePlatform, page: &Url, title: &str) -> Url {
    let title = match title.trim() {
        "" => DEFAULT_SHARE_TITLE,
        trimmed => trimmed,
    };
    let text = format!("{title} - {page}");
    let intent = match platform {
        SharePlatform::CopyLink => return page.clone(),
        SharePlatform::Facebook => Url::parse_with_params(
            "https://www.facebook.com/sharer/sharer.php",
            [("u", page.as_str())],
        ),
        SharePlatform::Twitter => Url::parse_with_params(
            "https://twitter.com/intent/tweet",
            [("text", text.as_str())],
        ),
        SharePlatform::LinkedIn => Url::parse_with_params(
            "https://www.linkedin.com/sharing/share-offsite/",
            [("url", page.as_str())],
        ),
        SharePlatform::WhatsApp => {
            Url::parse_with_params("https://wa.me/", [("text", text.as_str())])
        }
    };
    // The bases above are constants; a failure here would be a typo.
    intent.unwrap_or_else(|_| page.clone())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn page() -> Url {
        page_url("http://localhost:3000", "66a1").unwrap()
    }

    #[test]
    fn page_url_joins_site_and_id() {
        assert_eq!(page().as_str(), "http://localhost:3000/blog/66a1");
        let nested = page_url("https://example.com/site/", "x y").unwrap();
        assert_eq!(nested.as_str(), "https://example.com/site/blog/x%20y");
    }

    #[test]
    fn copy_link_is_the_page() {
        assert_eq!(share_url(SharePlatform::CopyLink, &page(), "t"), page());
    }

    #[test]
    fn facebook_and_linkedin_carry_only_the_url() {
        let fb = share_url(SharePlatform::Facebook, &page(), "Hello");
        assert_eq!(
            fb.as_str(),
            "https://www.facebook.com/sharer/sharer.php?u=http%3A%2F%2Flocalhost%3A3000%2Fblog%2F66a1"
        );
        let li = share_url(SharePlatform::LinkedIn, &page(), "Hello");
        assert_eq!(li.host_str(), Some("www.linkedin.com"));
        let params: Vec<(String, String)> = li.query_pairs().into_owned().collect();
        assert_eq!(
            params,
            vec![("url".to_string(), "http://localhost:3000/blog/66a1".to_string())]
        );
    }

    #[test]
    fn text_intents_combine_title_and_url() {
        let tweet = share_url(SharePlatform::Twitter, &page(), "Hello & bye");
        let text = tweet
            .query_pairs()
            .find(|(key, _)| key == "text")
            .map(|(_, value)| value.into_owned());
        assert_eq!(
            text.as_deref(),
            Some("Hello & bye - http://localhost:3000/blog/66a1")
        );
    }

    #[test]
    fn empty_title_uses_default_text() {
        let wa = share_url(SharePlatform::WhatsApp, &page(), "  ");
        let text = wa
            .query_pairs()
            .find(|(key, _)| key == "text")
            .map(|(_, value)| value.into_owned());
        assert_eq!(
            text.as_deref(),
            Some("Check out this blog post - http://localhost:3000/blog/66a1")
        );
    }
}
