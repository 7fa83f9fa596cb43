use crate::common::*;

/// A decoded still image in a sampled frame sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Rgb(RgbImage),
    /// A single-channel image, such as one component of an optical-flow field.
    Luma(GrayImage),
}

impl Frame {
    pub fn channels(&self) -> usize {
        match self {
            Self::Rgb(_) => 3,
            Self::Luma(_) => 1,
        }
    }

    /// The image size in (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Rgb(image) => image.dimensions(),
            Self::Luma(image) => image.dimensions(),
        }
    }

    pub fn resize(&self, width: u32, height: u32, filter: FilterType) -> Self {
        match self {
            Self::Rgb(buffer) => Self::Rgb(image::imageops::resize(buffer, width, height, filter)),
            Self::Luma(buffer) => {
                Self::Luma(image::imageops::resize(buffer, width, height, filter))
            }
        }
    }

    /// The raw channel-interleaved pixel data.
    pub fn as_raw(&self) -> &[u8] {
        match self {
            Self::Rgb(image) => image.as_raw(),
            Self::Luma(image) => image.as_raw(),
        }
    }
}

/// Split a 3-channel flow image into its horizontal and vertical components.
pub fn split_flow(flow: &RgbImage) -> (GrayImage, GrayImage) {
    let (width, height) = flow.dimensions();
    let flow_x = ImageBuffer::from_fn(width, height, |x, y| Luma([flow.get_pixel(x, y)[0]]));
    let flow_y = ImageBuffer::from_fn(width, height, |x, y| Luma([flow.get_pixel(x, y)[1]]));
    (flow_x, flow_y)
}

/// The image decoding backend.
pub trait ImageLoader
where
    Self: Debug + Send + Sync,
{
    /// Check whether a frame file is present on the backing store.
    fn exists(&self, path: &Path) -> bool;

    fn load(&self, path: &Path) -> Result<DynamicImage>;
}

/// Decode image files from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsImageLoader;

impl ImageLoader for FsImageLoader {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn load(&self, path: &Path) -> Result<DynamicImage> {
        let image = image::open(path)
            .with_context(|| format!("failed to decode image '{}'", path.display()))?;
        Ok(image)
    }
}

impl<L> ImageLoader for Arc<L>
where
    L: ImageLoader + ?Sized,
{
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn load(&self, path: &Path) -> Result<DynamicImage> {
        (**self).load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_flow_channels() {
        let flow = RgbImage::from_fn(4, 2, |x, y| image::Rgb([x as u8, y as u8, 200]));
        let (flow_x, flow_y) = split_flow(&flow);
        assert_eq!(flow_x.dimensions(), (4, 2));
        assert_eq!(flow_x.get_pixel(3, 1)[0], 3);
        assert_eq!(flow_y.get_pixel(3, 1)[0], 1);
    }
}
