//! The transform seam between loaded frames and model input.

use super::Frame;
use crate::common::*;

/// Converts a sampled frame sequence into the model-ready representation.
pub trait Transform
where
    Self: Send + Sync,
{
    type Output;

    fn apply(&self, frames: Vec<Frame>) -> Result<Self::Output>;
}

impl<F, T> Transform for F
where
    F: Fn(Vec<Frame>) -> Result<T> + Send + Sync,
{
    type Output = T;

    fn apply(&self, frames: Vec<Frame>) -> Result<T> {
        self(frames)
    }
}

/// Stacks frames into a `[frames, channels, height, width]` array scaled to [0, 1].
#[derive(Debug, Clone)]
pub struct StackTransform {
    size: Option<(u32, u32)>,
    filter: FilterType,
}

impl StackTransform {
    pub fn new() -> Self {
        Self {
            size: None,
            filter: FilterType::Triangle,
        }
    }

    /// Resize every frame to `width` x `height` before stacking.
    pub fn with_size(width: u32, height: u32) -> Result<Self> {
        ensure!(
            width > 0 && height > 0,
            "resize width and height must be positive"
        );
        Ok(Self {
            size: Some((width, height)),
            filter: FilterType::Triangle,
        })
    }
}

impl Default for StackTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for StackTransform {
    type Output = Array4<f32>;

    fn apply(&self, frames: Vec<Frame>) -> Result<Array4<f32>> {
        let frames: Vec<_> = match self.size {
            Some((width, height)) => frames
                .iter()
                .map(|frame| frame.resize(width, height, self.filter))
                .collect(),
            None => frames,
        };

        let first = frames
            .first()
            .ok_or_else(|| format_err!("cannot stack an empty frame sequence"))?;
        let channels = first.channels();
        let (width, height) = first.dimensions();

        frames.iter().enumerate().try_for_each(|(index, frame)| {
            ensure!(
                frame.channels() == channels && frame.dimensions() == (width, height),
                "frame {} has {} channels in {:?}, but expect {} channels in {:?}",
                index,
                frame.channels(),
                frame.dimensions(),
                channels,
                (width, height)
            );
            Ok(())
        })?;

        let (width, height) = (width as usize, height as usize);
        let mut array = Array4::zeros((frames.len(), channels, height, width));

        izip!(array.outer_iter_mut(), &frames).for_each(|(mut slot, frame)| {
            // pixel data is interleaved as [height, width, channels]
            frame
                .as_raw()
                .iter()
                .enumerate()
                .for_each(|(offset, &value)| {
                    let channel = offset % channels;
                    let x = (offset / channels) % width;
                    let y = offset / (channels * width);
                    slot[[channel, y, x]] = value as f32 / 255.0;
                });
        });

        Ok(array)
    }
}

/// Stacks frames into a `tch::Tensor` shaped like [StackTransform].
#[cfg(feature = "with-tch")]
#[derive(Debug, Clone, Default)]
pub struct TensorTransform {
    stack: StackTransform,
}

#[cfg(feature = "with-tch")]
impl TensorTransform {
    pub fn new(stack: StackTransform) -> Self {
        Self { stack }
    }
}

#[cfg(feature = "with-tch")]
impl Transform for TensorTransform {
    type Output = tch::Tensor;

    fn apply(&self, frames: Vec<Frame>) -> Result<tch::Tensor> {
        let array = self.stack.apply(frames)?;
        let shape: Vec<i64> = array.shape().iter().map(|&dim| dim as i64).collect();
        let values: Vec<f32> = array.iter().cloned().collect();
        Ok(tch::Tensor::of_slice(&values).view(shape.as_slice()))
    }
}
