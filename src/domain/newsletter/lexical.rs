//! The subset of Ghost's lexical rich-text format the newsletter emits.
//!
//! A document is a `root` holding an ordered list of block nodes, each
//! discriminated by its `type` field. The serialized JSON string is what Ghost
//! stores in a post's `lexical` field.

use super::{
    CLOSING_COPY, FEATURED_HEADING, INTRO_COPY, ImagePick, IssueContent, RECENT_HEADING,
};
use html_escape::encode_text;
use serde::{Deserialize, Serialize};

const LEXICAL_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub root: Root,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Root {
    pub children: Vec<Node>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub indent: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Heading(Heading),
    Paragraph(Paragraph),
    Image(ImageCard),
    HorizontalRule(HorizontalRule),
    Callout(Callout),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub children: Vec<Inline>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub indent: u32,
    pub tag: String,
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub children: Vec<Inline>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub indent: u32,
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageCard {
    pub src: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub card_width: String,
    #[serde(default)]
    pub href: String,
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizontalRule {
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Callout {
    /// HTML fragment.
    pub callout_text: String,
    #[serde(default)]
    pub callout_emoji: String,
    #[serde(default)]
    pub background_color: String,
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Inline {
    Text(Text),
    Link(Link),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    #[serde(default)]
    pub detail: u32,
    #[serde(default)]
    pub format: u32,
    #[serde(default = "normal_mode")]
    pub mode: String,
    #[serde(default)]
    pub style: String,
    pub text: String,
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub children: Vec<Inline>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub indent: u32,
    #[serde(default)]
    pub rel: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub url: String,
    pub version: u32,
}

fn normal_mode() -> String {
    "normal".to_string()
}

fn ltr() -> Option<String> {
    Some("ltr".to_string())
}

impl Inline {
    pub fn text(text: &str) -> Self {
        Inline::Text(Text {
            detail: 0,
            format: 0,
            mode: normal_mode(),
            style: String::new(),
            text: text.to_string(),
            version: LEXICAL_VERSION,
        })
    }

    pub fn link(url: &str, text: &str) -> Self {
        Inline::Link(Link {
            children: vec![Inline::text(text)],
            direction: ltr(),
            format: String::new(),
            indent: 0,
            rel: Some("noreferrer".to_string()),
            target: None,
            title: None,
            url: url.to_string(),
            version: LEXICAL_VERSION,
        })
    }
}

impl Node {
    pub fn heading(tag: &str, text: &str) -> Self {
        Node::Heading(Heading {
            children: vec![Inline::text(text)],
            direction: ltr(),
            format: String::new(),
            indent: 0,
            tag: tag.to_string(),
            version: LEXICAL_VERSION,
        })
    }

    pub fn paragraph(children: Vec<Inline>) -> Self {
        Node::Paragraph(Paragraph {
            children,
            direction: ltr(),
            format: String::new(),
            indent: 0,
            version: LEXICAL_VERSION,
        })
    }

    pub fn image(pick: &ImagePick) -> Self {
        Node::Image(ImageCard {
            src: pick.src.clone(),
            width: None,
            height: None,
            title: pick.title.clone(),
            alt: pick.title.clone(),
            caption: pick.title.clone(),
            card_width: "regular".to_string(),
            href: pick.href.clone(),
            version: LEXICAL_VERSION,
        })
    }

    pub fn horizontal_rule() -> Self {
        Node::HorizontalRule(HorizontalRule {
            version: LEXICAL_VERSION,
        })
    }

    pub fn callout(text: &str, emoji: &str) -> Self {
        Node::Callout(Callout {
            callout_text: format!("<p>{}</p>", encode_text(text)),
            callout_emoji: emoji.to_string(),
            background_color: "grey".to_string(),
            version: LEXICAL_VERSION,
        })
    }
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self {
            root: Root {
                children,
                direction: ltr(),
                format: String::new(),
                indent: 0,
                kind: "root".to_string(),
                version: LEXICAL_VERSION,
            },
        }
    }

    /// Title heading, intro, rule, recent highlights, a heading and image per
    /// pick, closing callout. The hero travels as the post's feature image.
    pub fn from_issue(issue: &IssueContent) -> Self {
        let mut children = vec![
            Node::heading("h1", issue.title.as_ref()),
            Node::paragraph(vec![Inline::text(INTRO_COPY)]),
            Node::horizontal_rule(),
        ];

        if !issue.recent.is_empty() {
            children.push(Node::heading("h2", RECENT_HEADING));
            children.extend(
                issue
                    .recent
                    .iter()
                    .map(|post| Node::paragraph(vec![Inline::link(&post.url, &post.title)])),
            );
        }

        if !issue.picks.is_empty() {
            children.push(Node::heading("h2", FEATURED_HEADING));
            for pick in &issue.picks {
                children.push(Node::heading("h3", &pick.title));
                children.push(Node::image(pick));
            }
        }

        children.push(Node::callout(CLOSING_COPY, "💌"));
        Self::new(children)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn image_sources(&self) -> Vec<&str> {
        self.root
            .children
            .iter()
            .filter_map(|node| match node {
                Node::Image(image) => Some(image.src.as_str()),
                _ => None,
            })
            .collect()
    }
}
