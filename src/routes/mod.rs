mod cron;
mod health_check;

pub use cron::*;
pub use health_check::*;
