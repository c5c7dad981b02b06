// LogTriage - app/mod.rs
//
// Application layer: rules lookup and batch orchestration.
// Dependencies: core layer, platform config.

pub mod batch;
pub mod rules_mgr;
