// LogTriage - core/mod.rs
//
// Core business logic layer: content loading, rules, analysis, reports.
// Dependencies: standard library, regex, serde, platform::fs for raw reads.
// Must NOT depend on: app.

pub mod analyzer;
pub mod content;
pub mod export;
pub mod model;
pub mod rules;
pub mod template;
