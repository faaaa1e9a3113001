// The core module contains all search logic.
// Nothing in here talks to the network or the filesystem directly; the
// ports (`DriveSource`, `AiProvider`, `ReportStore`) are implemented in infra.

#[path = "relevance/mod.rs"]
pub mod relevance;

#[path = "search/mod.rs"]
pub mod search;

#[path = "ai/mod.rs"]
pub mod ai;

#[path = "retry/mod.rs"]
pub mod retry;

#[path = "evaluation/mod.rs"]
pub mod evaluation;
