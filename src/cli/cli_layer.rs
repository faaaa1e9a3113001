// Terminal adapter: argument parsing helpers, the panel state machine,
// text rendering and the per-subcommand composition.

pub mod args;
pub mod commands;
pub mod panel;
pub mod render;
