// CampaignLens - app/mod.rs
//
// Application layer: dataset loading, caching and report assembly.
// Dependencies: core layer, platform layer.

pub mod cache;
pub mod loader;
pub mod report;
