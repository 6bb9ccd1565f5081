//! Data types that flow through a harvest
//!
//! - `ListingEntry`: one slot collected by the page walker
//! - `ItemRecord`: one slot produced by the content fetcher, either a fetched
//!   `Document` or the uniform missing-value `Placeholder`

mod entry;
mod record;

pub use entry::ListingEntry;
pub use record::{Document, ItemRecord};
