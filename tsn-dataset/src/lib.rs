//! Segment-sampled video frame datasets for temporal segment network training.

mod common;
pub mod dataset;
pub mod processor;
pub mod profiling;
pub mod sampler;
