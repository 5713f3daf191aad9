use super::{
    AddOptions, BrowseQuery, Clause, GhostApi, GhostError, Limit, NewPost, Newsletter, Order,
    Pagination, Post, PostPage, PostPatch, PostStatus, Tag, Visibility,
};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::StatusCode;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// A Ghost double that evaluates the filter grammar over an in-memory post list.
#[derive(Default)]
pub struct InMemoryGhost {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    posts: Vec<Post>,
    newsletters: Vec<Newsletter>,
    created: Vec<(NewPost, AddOptions)>,
    edits: Vec<(String, PostPatch)>,
    browse_calls: usize,
    failing_edits: HashSet<String>,
    failing_browse: bool,
    empty_pages_from: Option<u64>,
    revision: u64,
}

#[derive(Debug, Clone)]
pub struct PostFixture {
    post: Post,
}

impl PostFixture {
    pub fn published(id: &str) -> Self {
        Self {
            post: Post {
                id: id.to_string(),
                title: format!("Post {id}"),
                slug: id.to_lowercase(),
                status: Some(PostStatus::Published),
                visibility: Some(Visibility::Public),
                url: Some(format!("https://blog.example.com/{}/", id.to_lowercase())),
                published_at: Some(day(1)),
                updated_at: Some("2026-01-01T00:00:00.000Z".to_string()),
                ..Post::default()
            },
        }
    }

    pub fn draft(id: &str) -> Self {
        let mut fixture = Self::published(id);
        fixture.post.status = Some(PostStatus::Draft);
        fixture.post.published_at = None;
        fixture
    }

    pub fn featured(mut self) -> Self {
        self.post.featured = true;
        self
    }

    pub fn tagged(mut self, slug: &str) -> Self {
        self.post.tags.push(Tag {
            id: slug.to_string(),
            name: slug.to_string(),
            slug: slug.to_string(),
        });
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.post.visibility = Some(visibility);
        self
    }

    pub fn with_image(mut self) -> Self {
        self.post.feature_image = Some(format!(
            "https://blog.example.com/content/images/{}.jpg",
            self.post.slug
        ));
        self
    }

    pub fn published_on(mut self, day_of_month: u32) -> Self {
        self.post.published_at = Some(day(day_of_month));
        self
    }

    pub fn build(self) -> Post {
        self.post
    }
}

fn day(day_of_month: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, day_of_month, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

impl InMemoryGhost {
    pub fn with_posts(posts: impl IntoIterator<Item = PostFixture>) -> Self {
        let ghost = Self::default();
        ghost.lock().posts = posts.into_iter().map(PostFixture::build).collect();
        ghost
    }

    pub fn add_newsletter(&self, name: &str, slug: &str) {
        self.add_newsletter_with_status(name, slug, "active");
    }

    pub fn add_newsletter_with_status(&self, name: &str, slug: &str, status: &str) {
        self.lock().newsletters.push(Newsletter {
            id: slug.to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
            status: status.to_string(),
        });
    }

    pub fn fail_edits_of(&self, id: &str) {
        self.lock().failing_edits.insert(id.to_string());
    }

    pub fn fail_browsing(&self) {
        self.lock().failing_browse = true;
    }

    /// Pages from `page` onwards come back empty while the reported total
    /// stays unchanged, as when posts vanish between two browse calls.
    pub fn empty_pages_from(&self, page: u64) {
        self.lock().empty_pages_from = Some(page);
    }

    pub fn post(&self, id: &str) -> Option<Post> {
        self.lock().posts.iter().find(|p| p.id == id).cloned()
    }

    pub fn featured_ids(&self) -> HashSet<String> {
        self.lock()
            .posts
            .iter()
            .filter(|p| p.featured)
            .map(|p| p.id.clone())
            .collect()
    }

    pub fn edits(&self) -> Vec<(String, PostPatch)> {
        self.lock().edits.clone()
    }

    pub fn created(&self) -> Vec<(NewPost, AddOptions)> {
        self.lock().created.clone()
    }

    pub fn browse_calls(&self) -> usize {
        self.lock().browse_calls
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn clause_matches(post: &Post, clause: &Clause) -> bool {
    let value = clause.value.as_str();
    let matched = match clause.field.as_str() {
        "id" => post.id == value,
        "status" => post.status.map(|s| s.as_str()) == Some(value),
        "featured" => post.featured.to_string() == value,
        "visibility" => post.visibility.map(|v| v.as_str()) == Some(value),
        "tag" => post.tags.iter().any(|t| t.slug == value),
        "feature_image" if value == "null" => post.feature_image.is_none(),
        "feature_image" => post.feature_image.as_deref() == Some(value),
        _ => false,
    };
    matched != clause.negated
}

fn project(post: &Post, fields: &[&str]) -> Post {
    if fields.is_empty() {
        return post.clone();
    }

    let mut projected = Post::default();
    for field in fields {
        match *field {
            "id" => projected.id = post.id.clone(),
            "title" => projected.title = post.title.clone(),
            "slug" => projected.slug = post.slug.clone(),
            "url" => projected.url = post.url.clone(),
            "feature_image" => projected.feature_image = post.feature_image.clone(),
            "updated_at" => projected.updated_at = post.updated_at.clone(),
            "published_at" => projected.published_at = post.published_at,
            "featured" => projected.featured = post.featured,
            _ => {}
        }
    }
    projected
}

fn not_found(what: &str) -> GhostError {
    GhostError::Status {
        status: StatusCode::NOT_FOUND,
        message: format!("{what} not found"),
    }
}

#[async_trait]
impl GhostApi for InMemoryGhost {
    async fn browse_posts(&self, query: &BrowseQuery) -> Result<PostPage, GhostError> {
        let mut state = self.lock();
        state.browse_calls += 1;

        if state.failing_browse {
            return Err(GhostError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "browse failed".into(),
            });
        }

        let mut matching: Vec<&Post> = state
            .posts
            .iter()
            .filter(|p| query.filter.clauses().iter().all(|c| clause_matches(p, c)))
            .collect();

        if query.order == Some(Order::PublishedAtDesc) {
            matching.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        }

        let total = matching.len() as u64;
        let page = query.page.unwrap_or(1).max(1);
        let (selected, pages): (Vec<&Post>, u64) = match query.limit {
            Limit::All => (matching, 1),
            Limit::Count(limit) => {
                let limit = u64::from(limit.max(1));
                let start = ((page - 1) * limit) as usize;
                let selected = matching
                    .into_iter()
                    .skip(start)
                    .take(limit as usize)
                    .collect();
                (selected, total.div_ceil(limit))
            }
        };

        let vanished = state.empty_pages_from.is_some_and(|from| page >= from);
        let posts = if vanished {
            Vec::new()
        } else {
            selected.into_iter().map(|p| project(p, &query.fields)).collect()
        };

        Ok(PostPage {
            posts,
            pagination: Pagination {
                page,
                pages,
                total,
                next: (page < pages).then_some(page + 1),
                prev: (page > 1).then_some(page - 1),
            },
        })
    }

    async fn read_post(&self, id: &str) -> Result<Post, GhostError> {
        self.post(id).ok_or_else(|| not_found("Post"))
    }

    async fn edit_post(
        &self,
        id: &str,
        updated_at: &str,
        patch: &PostPatch,
    ) -> Result<Post, GhostError> {
        let mut state = self.lock();

        if state.failing_edits.contains(id) {
            return Err(GhostError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: format!("edit of {id} failed"),
            });
        }

        state.revision += 1;
        let revision = format!("2026-02-01T00:00:{:02}.000Z", state.revision % 60);

        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found("Post"))?;

        if post.updated_at.as_deref() != Some(updated_at) {
            return Err(GhostError::Conflict(format!(
                "{id} was modified since it was fetched"
            )));
        }

        if let Some(featured) = patch.featured {
            post.featured = featured;
        }
        post.updated_at = Some(revision);
        let edited = post.clone();

        state.edits.push((id.to_string(), patch.clone()));
        Ok(edited)
    }

    async fn add_post(&self, post: &NewPost, options: &AddOptions) -> Result<Post, GhostError> {
        let mut state = self.lock();
        state.created.push((post.clone(), options.clone()));

        Ok(Post {
            id: format!("created-{}", state.created.len()),
            title: post.title.clone(),
            status: Some(post.status),
            feature_image: post.feature_image.clone(),
            ..Post::default()
        })
    }

    async fn browse_newsletters(&self) -> Result<Vec<Newsletter>, GhostError> {
        Ok(self.lock().newsletters.clone())
    }

    fn editor_url(&self, post_id: &str) -> String {
        format!("https://blog.example.com/ghost/#/editor/post/{post_id}")
    }
}
