pub mod health;
pub mod metrics;
pub mod swagger;
pub mod user_payload;
pub mod users;
