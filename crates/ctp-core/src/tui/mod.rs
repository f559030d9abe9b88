//! CLI prompts using cliclack (Charm-style inline prompts)
//!
//! This module is optional and only available when the `tui` feature is enabled.

mod prompter;
mod prompts;

pub use prompter::ClackPrompter;
pub use prompts::{list, run, CreateArgs};
