pub mod neighbor_set;
pub mod parcel;

pub use neighbor_set::*;
pub use parcel::*;
