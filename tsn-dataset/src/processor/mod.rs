//! Frame decoding and preprocessing building blocks.

pub mod frame;
pub mod frame_reader;
pub mod modality;
pub mod template;
pub mod transform;

pub use frame::*;
pub use frame_reader::*;
pub use modality::*;
pub use template::*;
pub use transform::*;
