// Blockly - Vacant Land Feedback API Core
//
// Residents comment on vacant parcels; comments are ranked, pooled across each
// parcel's nearest neighbors, and condensed into summaries for planners.
//
// Domains live under domains/*; infrastructure traits and clients under kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
