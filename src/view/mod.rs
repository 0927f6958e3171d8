pub mod format;
pub mod state;
pub mod terminal;

pub use state::{DetailTab, StatusFilter, ViewState};
