use crate::configuration::NewsletterSettings;
use crate::domain::{ImagePick, IssueBody, IssueContent, IssueTitle, RecentPost};
use crate::ghost_client::{
    AddOptions, BrowseQuery, Filter, GhostApi, GhostError, Limit, NewPost, Newsletter, Order,
    PostStatus, TagRef, Visibility,
};
use crate::utils::error_chain_fmt;
use chrono::{DateTime, Datelike, Utc, Weekday};
use rand::Rng;
use rand::seq::SliceRandom;

#[derive(thiserror::Error)]
pub enum NewsletterError {
    #[error("No published posts with feature images found")]
    NoImagesAvailable,

    #[error("No newsletter matching '{0}' found")]
    NewsletterNotFound(String),

    #[error("Failed to fetch {0}")]
    FetchFailed(&'static str, #[source] GhostError),

    #[error("{0}")]
    InvalidContent(String),

    #[error("Failed to create the newsletter post")]
    PostCreationFailed(#[source] GhostError),
}

impl std::fmt::Debug for NewsletterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// `Draft` leaves the issue for review in the editor; `Live` publishes it and
/// has Ghost email it to the newsletter's members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    Draft,
    Live,
}

impl DeliveryMode {
    pub fn from_test_flag(test: bool) -> Self {
        if test {
            DeliveryMode::Draft
        } else {
            DeliveryMode::Live
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedIssue {
    pub id: String,
    pub title: String,
    pub status: PostStatus,
    pub edit_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsletterOutcome {
    Skipped { weekday: Weekday },
    Created(CreatedIssue),
}

#[tracing::instrument(name = "Build weekly newsletter", skip(ghost, settings, rng))]
pub async fn build_weekly_newsletter<C, R>(
    ghost: &C,
    settings: &NewsletterSettings,
    mode: DeliveryMode,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<NewsletterOutcome, NewsletterError>
where
    C: GhostApi + ?Sized,
    R: Rng + ?Sized,
{
    let weekday = now.weekday();
    if mode == DeliveryMode::Live && weekday != settings.weekday {
        tracing::info!(%weekday, scheduled = %settings.weekday, "Not a newsletter day. Skipping.");
        return Ok(NewsletterOutcome::Skipped { weekday });
    }

    let mut images = pick_images(ghost, settings.image_count, rng).await?;
    let hero = images.remove(0);
    let recent = recent_posts(ghost, settings.recent_post_count).await;

    let newsletter = match mode {
        DeliveryMode::Draft => None,
        DeliveryMode::Live => Some(resolve_newsletter(ghost, &settings.newsletter_name).await?),
    };

    let title = IssueTitle::for_date(&settings.title_prefix, now.date_naive())
        .map_err(NewsletterError::InvalidContent)?;
    let content = IssueContent {
        title,
        hero,
        picks: images,
        recent,
    };

    let post = new_post(&content, settings, mode)?;
    let options = AddOptions {
        newsletter: newsletter.map(|n| n.slug),
        email_segment: (mode == DeliveryMode::Live).then(|| settings.email_segment.clone()),
    };

    let created = ghost
        .add_post(&post, &options)
        .await
        .map_err(NewsletterError::PostCreationFailed)?;

    tracing::info!(post_id = %created.id, title = %created.title, "Created newsletter post");

    Ok(NewsletterOutcome::Created(CreatedIssue {
        edit_url: ghost.editor_url(&created.id),
        status: created.status.unwrap_or(post.status),
        title: created.title,
        id: created.id,
    }))
}

fn new_post(
    content: &IssueContent,
    settings: &NewsletterSettings,
    mode: DeliveryMode,
) -> Result<NewPost, NewsletterError> {
    let (html, lexical) = match content
        .render(settings.body_format)
        .map_err(NewsletterError::InvalidContent)?
    {
        IssueBody::Html(html) => (Some(html.to_string()), None),
        IssueBody::Lexical(document) => (None, Some(document)),
    };

    let (status, visibility, email_only) = match mode {
        DeliveryMode::Draft => (PostStatus::Draft, None, false),
        DeliveryMode::Live => (
            PostStatus::Published,
            Some(Visibility::Public),
            settings.email_only,
        ),
    };

    Ok(NewPost {
        title: content.title.to_string(),
        html,
        lexical,
        status,
        tags: vec![TagRef {
            name: settings.tag.clone(),
        }],
        feature_image: Some(content.hero.src.clone()),
        visibility,
        email_only,
    })
}

/// Returns `min(count, available)` distinct posts with feature images, in
/// random order. Never empty.
#[tracing::instrument(name = "Pick newsletter images", skip(ghost, rng))]
pub async fn pick_images<C, R>(
    ghost: &C,
    count: usize,
    rng: &mut R,
) -> Result<Vec<ImagePick>, NewsletterError>
where
    C: GhostApi + ?Sized,
    R: Rng + ?Sized,
{
    let query = BrowseQuery::new(
        Filter::new()
            .matching("status", "published")
            .excluding("feature_image", "null"),
    )
    .limit(Limit::All)
    .fields(&["feature_image", "url", "title"]);

    let posts = ghost
        .browse_posts(&query)
        .await
        .map_err(|e| NewsletterError::FetchFailed("posts with feature images", e))?
        .posts;

    let mut candidates: Vec<ImagePick> = posts
        .into_iter()
        .filter_map(|post| match ImagePick::try_from(post) {
            Ok(pick) => Some(pick),
            Err(reason) => {
                tracing::warn!(%reason, "Skipping post without a usable feature image");
                None
            }
        })
        .collect();

    if candidates.is_empty() {
        return Err(NewsletterError::NoImagesAvailable);
    }

    let amount = count.clamp(1, candidates.len());
    let (picked, _) = candidates.partial_shuffle(rng, amount);
    Ok(picked.to_vec())
}

/// Most recently published posts. Failure only costs the issue its
/// highlights section.
#[tracing::instrument(name = "Fetch recent posts", skip(ghost))]
pub async fn recent_posts<C>(ghost: &C, count: u32) -> Vec<RecentPost>
where
    C: GhostApi + ?Sized,
{
    if count == 0 {
        return Vec::new();
    }

    let query = BrowseQuery::new(Filter::new().matching("status", "published"))
        .limit(Limit::Count(count))
        .fields(&["title", "url"])
        .order(Order::PublishedAtDesc);

    match ghost.browse_posts(&query).await {
        Ok(page) => page
            .posts
            .into_iter()
            .filter_map(|post| RecentPost::try_from(post).ok())
            .collect(),
        Err(e) => {
            tracing::warn!(
                error.cause_chain = ?e,
                error.message = %e,
                "Failed to fetch recent posts. Continuing without highlights."
            );
            Vec::new()
        }
    }
}

#[tracing::instrument(name = "Resolve newsletter", skip(ghost))]
pub async fn resolve_newsletter<C>(ghost: &C, name: &str) -> Result<Newsletter, NewsletterError>
where
    C: GhostApi + ?Sized,
{
    let needle = name.to_lowercase();

    let mut candidates: Vec<Newsletter> = ghost
        .browse_newsletters()
        .await
        .map_err(|e| NewsletterError::FetchFailed("newsletters", e))?
        .into_iter()
        .filter(|newsletter| newsletter.status != "archived")
        .filter(|newsletter| newsletter.name.to_lowercase().contains(&needle))
        .collect();

    if candidates.is_empty() {
        return Err(NewsletterError::NewsletterNotFound(name.to_string()));
    }

    // Active newsletters win over ones with an unknown or missing status.
    let position = candidates
        .iter()
        .position(|newsletter| newsletter.status == "active")
        .unwrap_or(0);
    Ok(candidates.swap_remove(position))
}
