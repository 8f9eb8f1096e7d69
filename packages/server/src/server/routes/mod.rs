// HTTP routes
pub mod comments;
pub mod health;
pub mod parcels;
pub mod summary;

pub use comments::*;
pub use health::*;
pub use parcels::*;
pub use summary::*;
