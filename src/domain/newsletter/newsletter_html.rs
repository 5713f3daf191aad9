use super::{
    CLOSING_COPY, FEATURED_HEADING, INTERSTITIAL_COPY, INTRO_COPY, ImagePick, IssueContent,
    RECENT_HEADING,
};
use html_escape::{encode_double_quoted_attribute, encode_text};
use html5ever::driver;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// A rendered newsletter body, checked to be non-empty, bounded and parseable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsletterHtml(String);

impl NewsletterHtml {
    pub fn parse(s: String) -> Result<Self, String> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err("Invalid newsletter HTML: cannot be empty.".to_string());
        }

        if trimmed.len() > 100_000 {
            return Err(
                "Invalid newsletter HTML: cannot be longer than 100,000 characters.".to_string(),
            );
        }

        let dom = parse_fragment(trimmed);
        if !has_element_nodes(&dom.document) {
            return Err("Invalid newsletter HTML: must contain valid HTML tags.".to_string());
        }

        Ok(Self(trimmed.to_string()))
    }

    /// `src` of every `<img>` in document order.
    pub fn image_sources(&self) -> Vec<String> {
        let dom = parse_fragment(&self.0);
        let mut sources = Vec::new();
        collect_image_sources(&dom.document, &mut sources);
        sources
    }
}

impl AsRef<str> for NewsletterHtml {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NewsletterHtml {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

fn parse_fragment(s: &str) -> RcDom {
    driver::parse_document(RcDom::default(), Default::default()).one(s)
}

fn has_element_nodes(node: &Handle) -> bool {
    node.children.borrow().iter().any(|child| match &child.data {
        // html5ever always synthesises <html>/<head>/<body>, so look below them.
        NodeData::Element { name, .. }
            if matches!(&*name.local, "html" | "head" | "body") =>
        {
            has_element_nodes(child)
        }
        NodeData::Element { .. } => true,
        _ => has_element_nodes(child),
    })
}

fn collect_image_sources(node: &Handle, sources: &mut Vec<String>) {
    if let NodeData::Element { name, attrs, .. } = &node.data {
        if &*name.local == "img" {
            let src = attrs
                .borrow()
                .iter()
                .find(|a| &*a.name.local == "src")
                .map(|a| a.value.to_string());
            sources.extend(src);
        }
    }

    for child in node.children.borrow().iter() {
        collect_image_sources(child, sources);
    }
}

fn push_figure(html: &mut String, image: &ImagePick) {
    let src = encode_double_quoted_attribute(&image.src);
    let href = encode_double_quoted_attribute(&image.href);
    let alt = encode_double_quoted_attribute(&image.title);
    let caption = encode_text(&image.title);

    html.push_str(&format!(
        "<figure class=\"kg-card kg-image-card kg-card-hascaption\">\
         <a href=\"{href}\"><img src=\"{src}\" class=\"kg-image\" alt=\"{alt}\" loading=\"lazy\"></a>\
         <figcaption><a href=\"{href}\">{caption}</a></figcaption>\
         </figure>"
    ));
}

fn push_paragraph(html: &mut String, text: &str) {
    html.push_str(&format!("<p>{}</p>", encode_text(text)));
}

/// Hero figure, intro, recent highlights, picks, closing copy.
pub(super) fn render_issue(issue: &IssueContent) -> String {
    let mut html = String::new();

    push_figure(&mut html, &issue.hero);
    push_paragraph(&mut html, INTRO_COPY);

    if !issue.recent.is_empty() {
        html.push_str(&format!("<h2>{RECENT_HEADING}</h2><ul>"));
        for post in &issue.recent {
            html.push_str(&format!(
                "<li><a href=\"{}\">{}</a></li>",
                encode_double_quoted_attribute(&post.url),
                encode_text(&post.title)
            ));
        }
        html.push_str("</ul>");
    }

    if !issue.picks.is_empty() {
        html.push_str(&format!("<h2>{FEATURED_HEADING}</h2>"));
        for (i, pick) in issue.picks.iter().enumerate() {
            push_figure(&mut html, pick);
            if i == 0 {
                push_paragraph(&mut html, INTERSTITIAL_COPY);
            }
        }
    }

    push_paragraph(&mut html, CLOSING_COPY);
    html
}
