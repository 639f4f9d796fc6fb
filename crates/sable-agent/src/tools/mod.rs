//! Built-in tool implementations

mod bash;
mod editor;

pub use bash::BashTool;
pub use editor::EditorTool;
