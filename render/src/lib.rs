mod buffer;
mod events;
mod format;
mod page;
mod wall;

pub use buffer::Buffer;
pub use events::{render_connection, render_events_page, render_log};
pub use format::{format_count, format_time};
pub use page::render_index;
pub use wall::{render_stats, render_wall, render_wall_page};

/// Element ids of the fragments pushed to live pages.
pub const STATS_ID: &str = "stats";
pub const WALL_ID: &str = "wall";
pub const CONNECTION_ID: &str = "connection";
pub const LOG_ID: &str = "log";

pub trait RenderHtml {
    fn render(&self, output: &mut Buffer);
}
