use super::Filter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
    Scheduled,
    Sent,
    #[serde(other)]
    Unknown,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Scheduled => "scheduled",
            PostStatus::Sent => "sent",
            PostStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Members,
    Paid,
    Tiers,
    #[serde(other)]
    Unknown,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Members => "members",
            Visibility::Paid => "paid",
            Visibility::Tiers => "tiers",
            Visibility::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// A Ghost post as returned by the Admin API. Every field may be absent when
/// the request restricted `fields`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    pub id: String,
    pub uuid: Option<String>,
    pub title: String,
    pub slug: String,
    pub status: Option<PostStatus>,
    pub featured: bool,
    pub visibility: Option<Visibility>,
    pub tags: Vec<Tag>,
    pub feature_image: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    /// Opaque collision token, echoed back verbatim on edit.
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub page: u64,
    pub pages: u64,
    pub total: u64,
    pub next: Option<u64>,
    pub prev: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Newsletter {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Limit {
    #[default]
    All,
    Count(u32),
}

impl Limit {
    pub fn to_query_value(self) -> String {
        match self {
            Limit::All => "all".to_string(),
            Limit::Count(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    PublishedAtDesc,
}

impl Order {
    pub fn as_str(&self) -> &'static str {
        match self {
            Order::PublishedAtDesc => "published_at desc",
        }
    }
}

/// Parameters of a `GET posts/` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrowseQuery {
    pub filter: Filter,
    pub limit: Limit,
    pub fields: Vec<&'static str>,
    pub order: Option<Order>,
    pub page: Option<u64>,
}

impl BrowseQuery {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn limit(mut self, limit: Limit) -> Self {
        self.limit = limit;
        self
    }

    pub fn fields(mut self, fields: &[&'static str]) -> Self {
        self.fields = fields.to_vec();
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("limit", self.limit.to_query_value())];
        if !self.filter.is_empty() {
            pairs.push(("filter", self.filter.to_string()));
        }
        if !self.fields.is_empty() {
            pairs.push(("fields", self.fields.join(",")));
        }
        if let Some(order) = self.order {
            pairs.push(("order", order.as_str().to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        pairs
    }
}

/// Partial update sent alongside the post's `updated_at`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

impl PostPatch {
    pub fn featured(featured: bool) -> Self {
        Self {
            featured: Some(featured),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagRef {
    pub name: String,
}

/// Payload of a `POST posts/` call. Exactly one of `html` / `lexical` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPost {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lexical: Option<String>,
    pub status: PostStatus,
    pub tags: Vec<TagRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    pub email_only: bool,
}

/// Query options for `POST posts/` that make Ghost email a published post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddOptions {
    pub newsletter: Option<String>,
    pub email_segment: Option<String>,
}

impl AddOptions {
    pub fn to_query_pairs(&self, source_html: bool) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if source_html {
            pairs.push(("source", "html".to_string()));
        }
        if let Some(newsletter) = &self.newsletter {
            pairs.push(("newsletter", newsletter.clone()));
        }
        if let Some(segment) = &self.email_segment {
            pairs.push(("email_segment", segment.clone()));
        }
        pairs
    }
}

#[derive(Deserialize)]
pub(crate) struct PostsEnvelope {
    pub posts: Vec<Post>,
    #[serde(default)]
    pub meta: Option<Meta>,
}

#[derive(Deserialize)]
pub(crate) struct Meta {
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Deserialize)]
pub(crate) struct NewslettersEnvelope {
    pub newsletters: Vec<Newsletter>,
}

#[derive(Deserialize)]
pub(crate) struct ErrorsEnvelope {
    pub errors: Vec<ApiErrorBody>,
}

#[derive(Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: String,
    #[serde(default)]
    pub context: Option<String>,
}
