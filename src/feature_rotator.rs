use crate::configuration::RotationSettings;
use crate::ghost_client::{BrowseQuery, Filter, GhostApi, GhostError, Limit, Order, PostPatch};
use crate::utils::error_chain_fmt;
use rand::Rng;
use rand::seq::index;

#[derive(thiserror::Error)]
pub enum RotationError {
    #[error("No eligible published posts found")]
    NoEligiblePosts,

    #[error("Failed to fetch eligible posts")]
    FetchFailed(#[source] GhostError),

    #[error("Failed to feature any of the {0} selected posts")]
    FeatureFailedForAll(usize),
}

impl std::fmt::Debug for RotationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RotationReport {
    pub unfeatured: Vec<String>,
    pub unfeature_failures: usize,
    pub featured: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UnfeatureOutcome {
    pub unfeatured: Vec<String>,
    pub failures: usize,
}

/// Currently featured posts that rotation is allowed to take back.
pub fn unfeature_filter(settings: &RotationSettings) -> Filter {
    let filter = Filter::new()
        .matching("featured", "true")
        .excluding("tag", &settings.permanent_feature_tag);
    public_only(filter, settings)
}

/// Posts eligible to become featured.
pub fn selection_filter(settings: &RotationSettings) -> Filter {
    let filter = Filter::new()
        .matching("status", "published")
        .excluding("tag", &settings.permanent_feature_tag);
    public_only(filter, settings)
}

fn public_only(filter: Filter, settings: &RotationSettings) -> Filter {
    if settings.public_only {
        filter.matching("visibility", "public")
    } else {
        filter
    }
}

#[tracing::instrument(name = "Rotate featured posts", skip_all)]
pub async fn rotate_featured_posts<C, R>(
    ghost: &C,
    settings: &RotationSettings,
    rng: &mut R,
) -> Result<RotationReport, RotationError>
where
    C: GhostApi + ?Sized,
    R: Rng + ?Sized,
{
    let unfeature = unfeature_dynamic_posts(ghost, settings).await;
    let featured = feature_random_posts(ghost, settings, rng).await?;

    Ok(RotationReport {
        unfeatured: unfeature.unfeatured,
        unfeature_failures: unfeature.failures,
        featured,
    })
}

/// Clears `featured` on every non-permanent featured post. Never fails: each
/// problem is logged and counted.
#[tracing::instrument(name = "Unfeature dynamic posts", skip_all)]
pub async fn unfeature_dynamic_posts<C>(ghost: &C, settings: &RotationSettings) -> UnfeatureOutcome
where
    C: GhostApi + ?Sized,
{
    let mut outcome = UnfeatureOutcome::default();

    let query = BrowseQuery::new(unfeature_filter(settings)).limit(Limit::All);
    let candidates = match ghost.browse_posts(&query).await {
        Ok(page) => page.posts,
        Err(e) => {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "Failed to fetch featured posts to unfeature. Skipping."
            );
            outcome.failures += 1;
            return outcome;
        }
    };

    tracing::info!(count = candidates.len(), "Found posts to unfeature");

    // Sequential on purpose: each edit carries its own collision token.
    for post in candidates {
        let Some(updated_at) = post.updated_at.as_deref() else {
            tracing::warn!(post_id = %post.id, "Featured post has no updated_at. Skipping.");
            outcome.failures += 1;
            continue;
        };

        match ghost
            .edit_post(&post.id, updated_at, &PostPatch::featured(false))
            .await
        {
            Ok(_) => {
                tracing::info!(post_id = %post.id, title = %post.title, "Unfeatured post");
                outcome.unfeatured.push(post.title);
            }
            Err(e) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    post_id = %post.id,
                    "Failed to unfeature post. Skipping."
                );
                outcome.failures += 1;
            }
        }
    }

    outcome
}

fn id_page(filter: &Filter, page: u64) -> BrowseQuery {
    BrowseQuery::new(filter.clone())
        .limit(Limit::Count(1))
        .fields(&["id"])
        .order(Order::PublishedAtDesc)
        .page(page)
}

/// Picks `featured_count` distinct posts uniformly at random by index against
/// the pagination total, fetching one single-post page per pick, and features
/// them. Fails unless at least one post ends up featured.
#[tracing::instrument(name = "Feature random posts", skip_all)]
pub async fn feature_random_posts<C, R>(
    ghost: &C,
    settings: &RotationSettings,
    rng: &mut R,
) -> Result<Vec<String>, RotationError>
where
    C: GhostApi + ?Sized,
    R: Rng + ?Sized,
{
    let filter = selection_filter(settings);

    let first_page = ghost
        .browse_posts(&id_page(&filter, 1))
        .await
        .map_err(RotationError::FetchFailed)?;

    let total = usize::try_from(first_page.pagination.total).unwrap_or(usize::MAX);
    if total == 0 {
        return Err(RotationError::NoEligiblePosts);
    }

    let count = settings.featured_count.clamp(1, total);
    let picks = index::sample(rng, total, count).into_vec();
    tracing::info!(total, ?picks, "Selected posts to feature");

    let mut featured = Vec::with_capacity(count);
    for position in picks {
        let id = if position == 0 {
            first_page.posts.first().map(|p| p.id.clone())
        } else {
            match ghost.browse_posts(&id_page(&filter, position as u64 + 1)).await {
                Ok(page) => page.posts.into_iter().next().map(|p| p.id),
                Err(e) => {
                    tracing::error!(
                        error.cause_chain = ?e,
                        error.message = %e,
                        position,
                        "Failed to fetch selected post. Skipping."
                    );
                    continue;
                }
            }
        };

        let Some(id) = id.filter(|id| !id.is_empty()) else {
            tracing::warn!(position, "Selected page was empty. The eligible pool shrank.");
            continue;
        };

        match feature_post(ghost, &id).await {
            Ok(title) => {
                tracing::info!(post_id = %id, title = %title, "Featured post");
                featured.push(title);
            }
            Err(e) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    post_id = %id,
                    "Failed to feature post. Skipping."
                );
            }
        }
    }

    if featured.is_empty() {
        return Err(RotationError::FeatureFailedForAll(count));
    }

    Ok(featured)
}

async fn feature_post<C>(ghost: &C, id: &str) -> Result<String, GhostError>
where
    C: GhostApi + ?Sized,
{
    let post = ghost.read_post(id).await?;
    let updated_at = post
        .updated_at
        .as_deref()
        .ok_or(GhostError::MissingItem("updated_at"))?;

    let edited = ghost
        .edit_post(&post.id, updated_at, &PostPatch::featured(true))
        .await?;

    Ok(edited.title)
}
