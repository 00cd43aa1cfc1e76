// CampaignLens - core/mod.rs
//
// Core business logic layer.
// Must NOT depend on: platform, app, or the filesystem directly.

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod locale;
pub mod model;
pub mod normalize;
pub mod reader;
