pub mod payload;
pub mod query;
pub mod service;

pub use query::{AvailableFilters, QueryService};
pub use service::{ImageAction, ListingService};
