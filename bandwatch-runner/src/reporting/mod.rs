//! Dashboard rendering: the HTML page, a JSON export, and snapshot files.

mod html;
mod json;

pub use html::{daily_rsi_class, escape_html, render_html, RenderOptions};
pub use json::{render_json, DashboardView};
