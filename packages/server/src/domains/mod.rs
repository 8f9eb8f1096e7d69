// Business domains
pub mod comments;
pub mod geo;
pub mod parcels;
pub mod summaries;
