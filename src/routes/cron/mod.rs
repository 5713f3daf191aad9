mod featured;
mod newsletter;
mod routes;

pub use featured::*;
pub use newsletter::*;
pub use routes::*;

use serde::Deserialize;

/// `?test=true` switches a cron route into its dry-run mode. Any other
/// value, including a malformed one, leaves the route in live mode.
#[derive(Debug, Deserialize)]
pub struct CronQuery {
    #[serde(default)]
    test: Option<String>,
}

impl CronQuery {
    pub fn is_test(&self) -> bool {
        self.test.as_deref() == Some("true")
    }
}
