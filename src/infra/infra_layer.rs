// The infra module contains implementations of core traits.
// Each adapter goes in its own submodule.

#[path = "google_drive/mod.rs"]
pub mod google_drive;

#[path = "local_docs/mod.rs"]
pub mod local_docs;

#[path = "ai/mod.rs"]
pub mod ai;

#[path = "evaluation/mod.rs"]
pub mod evaluation;
