pub mod markup;
pub mod overview;
pub mod results;

pub use overview::{listing_links, overview_rows, OverviewRow};
pub use results::parse_results;
