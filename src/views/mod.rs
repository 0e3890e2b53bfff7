pub mod quick_jump;
pub mod viewport_panel;

pub use quick_jump::quick_jump_panel;
pub use viewport_panel::viewport_panel;
