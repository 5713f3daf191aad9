use super::CronQuery;
use crate::configuration::NewsletterSettings;
use crate::ghost_client::GhostClient;
use crate::newsletter_builder::{
    DeliveryMode, NewsletterError, NewsletterOutcome, build_weekly_newsletter,
};
use crate::utils::build_error_response;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

impl ResponseError for NewsletterError {
    fn error_response(&self) -> HttpResponse {
        build_error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Newsletter creation failed: {self}"),
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewsletterResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    post_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    edit_url: Option<String>,
}

#[tracing::instrument(name = "Weekly newsletter cron", skip_all, fields(test = query.is_test()))]
pub async fn weekly_newsletter(
    query: web::Query<CronQuery>,
    ghost: web::Data<GhostClient>,
    settings: web::Data<NewsletterSettings>,
) -> Result<HttpResponse, NewsletterError> {
    let mode = DeliveryMode::from_test_flag(query.is_test());
    let mut rng = StdRng::from_entropy();

    let outcome =
        build_weekly_newsletter(ghost.get_ref(), &settings, mode, Utc::now(), &mut rng).await?;

    let response = match outcome {
        NewsletterOutcome::Skipped { weekday } => NewsletterResponse {
            success: true,
            message: format!("Not scheduled today ({weekday})"),
            post_id: None,
            title: None,
            status: None,
            edit_url: None,
        },
        NewsletterOutcome::Created(issue) => NewsletterResponse {
            success: true,
            message: match mode {
                DeliveryMode::Draft => "Newsletter draft created".to_string(),
                DeliveryMode::Live => "Newsletter published and sent".to_string(),
            },
            post_id: Some(issue.id),
            title: Some(issue.title),
            status: Some(issue.status.to_string()),
            edit_url: Some(issue.edit_url),
        },
    };

    Ok(HttpResponse::Ok().json(response))
}
