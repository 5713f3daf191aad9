mod issue_title;
mod lexical;
mod newsletter_html;

pub use issue_title::IssueTitle;
pub use lexical::{Callout, Document, Heading, HorizontalRule, ImageCard, Inline, Link, Node};
pub use lexical::{Paragraph, Root, Text};
pub use newsletter_html::NewsletterHtml;

use crate::ghost_client::Post;
use serde::Deserialize;

pub(crate) const INTRO_COPY: &str =
    "Welcome to this week's newsletter! Here's what's been happening...";
pub(crate) const INTERSTITIAL_COPY: &str =
    "Check out our latest updates and stories from the community.";
pub(crate) const CLOSING_COPY: &str =
    "Thank you for being part of our community. Have a great weekend!";
pub(crate) const RECENT_HEADING: &str = "Recent Highlights";
pub(crate) const FEATURED_HEADING: &str = "Featured Content";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyFormat {
    #[default]
    Html,
    Lexical,
}

/// A post's feature image together with the post it links back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePick {
    pub src: String,
    pub href: String,
    pub title: String,
}

impl TryFrom<Post> for ImagePick {
    type Error = String;

    fn try_from(post: Post) -> Result<Self, Self::Error> {
        let src = post
            .feature_image
            .filter(|src| !src.trim().is_empty())
            .ok_or_else(|| format!("Post '{}' has no feature image.", post.title))?;
        let href = post
            .url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| format!("Post '{}' has no public URL.", post.title))?;

        Ok(Self {
            src,
            href,
            title: post.title,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentPost {
    pub title: String,
    pub url: String,
}

impl TryFrom<Post> for RecentPost {
    type Error = String;

    fn try_from(post: Post) -> Result<Self, Self::Error> {
        let url = post
            .url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| format!("Post '{}' has no public URL.", post.title))?;

        Ok(Self {
            title: post.title,
            url,
        })
    }
}

/// Everything that goes into one newsletter issue, independent of body format.
#[derive(Debug, Clone)]
pub struct IssueContent {
    pub title: IssueTitle,
    pub hero: ImagePick,
    pub picks: Vec<ImagePick>,
    pub recent: Vec<RecentPost>,
}

#[derive(Debug)]
pub enum IssueBody {
    Html(NewsletterHtml),
    /// Serialized lexical document, as stored in a post's `lexical` field.
    Lexical(String),
}

impl IssueContent {
    pub fn render(&self, format: BodyFormat) -> Result<IssueBody, String> {
        match format {
            BodyFormat::Html => {
                NewsletterHtml::parse(newsletter_html::render_issue(self)).map(IssueBody::Html)
            }
            BodyFormat::Lexical => Document::from_issue(self)
                .to_json()
                .map(IssueBody::Lexical)
                .map_err(|e| format!("Failed to serialize newsletter document: {e}")),
        }
    }
}
