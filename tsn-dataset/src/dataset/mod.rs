//! Dataset processing toolkit.

mod catalog;
mod dataset_;
mod record;
mod streaming;
mod tsn;

pub use catalog::*;
pub use dataset_::*;
pub use record::*;
pub use streaming::*;
pub use tsn::*;
