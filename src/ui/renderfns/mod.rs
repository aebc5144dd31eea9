pub mod footer;
pub mod header;
pub mod utils;

pub use footer::draw_footer;
pub use header::{draw_header, HeaderInfo};
pub use utils::{format_fetched_at, wrap};
