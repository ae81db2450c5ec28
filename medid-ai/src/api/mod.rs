//! HTTP API handlers for medid-ai

pub mod health;
pub mod identify;
pub mod ui;

pub use health::health_routes;
pub use identify::identify_routes;
pub use ui::ui_routes;
