use super::CronQuery;
use crate::configuration::RotationSettings;
use crate::feature_rotator::{RotationError, rotate_featured_posts};
use crate::ghost_client::GhostClient;
use crate::utils::build_error_response;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

impl ResponseError for RotationError {
    fn error_response(&self) -> HttpResponse {
        build_error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Feature rotation failed: {self}"),
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RotationResponse {
    success: bool,
    message: String,
    featured: Vec<String>,
    unfeatured: Vec<String>,
    unfeature_failures: usize,
}

// The rotation has no dry-run: `test` is accepted and only recorded.
#[tracing::instrument(name = "Featured rotation cron", skip_all, fields(test = query.is_test()))]
pub async fn rotate_featured(
    query: web::Query<CronQuery>,
    ghost: web::Data<GhostClient>,
    settings: web::Data<RotationSettings>,
) -> Result<HttpResponse, RotationError> {
    let mut rng = StdRng::from_entropy();
    let report = rotate_featured_posts(ghost.get_ref(), &settings, &mut rng).await?;

    Ok(HttpResponse::Ok().json(RotationResponse {
        success: true,
        message: format!(
            "Featured {} post(s), unfeatured {} post(s)",
            report.featured.len(),
            report.unfeatured.len()
        ),
        featured: report.featured,
        unfeatured: report.unfeatured,
        unfeature_failures: report.unfeature_failures,
    }))
}
