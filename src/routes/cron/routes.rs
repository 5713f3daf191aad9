use actix_web::web;

use crate::routes;

pub fn cron_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/featured/rotate", web::get().to(routes::rotate_featured))
        .route("/newsletter/weekly", web::get().to(routes::weekly_newsletter));
}
