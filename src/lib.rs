pub mod report;
pub mod session;
pub mod utils;
pub mod view;

// Re-export common items
pub use report::{generate_report, generate_report_html, types::ReportPayload, RenderOptions};
pub use view::ViewState;
