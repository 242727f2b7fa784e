mod address;
mod list;

pub use address::Address;
pub use list::{List, SortKey};
