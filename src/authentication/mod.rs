mod middleware;

pub use middleware::{CronSecret, reject_unauthorized_cron_calls};
