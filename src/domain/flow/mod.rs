pub mod error;
pub mod model;
pub mod service;

pub use error::FlowServiceError;
pub use model::{AppStep, Flow, FlowView, Interstitial, InterstitialView};
pub use service::{FlowService, FlowServiceApi, FlowSettings, ImageUpload};
