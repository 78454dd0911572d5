//! Car Price Service Library
//!
//! Serves a car price estimation form populated from a reference dataset and
//! answers form submissions with a point estimate from a pre-trained model.

pub mod config;
pub mod metrics;
pub mod models;
pub mod page;
pub mod reference;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use models::inference::InferenceEngine;
pub use models::loader::ModelLoader;
pub use reference::FormChoices;
pub use server::{router, AppState};
pub use types::{outcome::PredictFailure, request::PredictForm};
