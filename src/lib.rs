pub mod authentication;
pub mod configuration;
pub mod domain;
pub mod feature_rotator;
pub mod ghost_client;
pub mod newsletter_builder;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod utils;
