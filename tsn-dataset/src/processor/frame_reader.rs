//! Frame loading with the fallback to the first frame.

use super::{split_flow, Frame, ImageLoader, ImageTemplate, Modality};
use crate::common::*;

/// Number of source frames multiplexed into one stored flow image.
pub const FLOW_FRAME_STRIDE: usize = 5;

/// Resolves frame files under a root directory and decodes them per modality.
#[derive(Debug, Clone)]
pub struct FrameReader<L>
where
    L: ImageLoader,
{
    root: PathBuf,
    template: ImageTemplate,
    modality: Modality,
    loader: L,
}

impl<L> FrameReader<L>
where
    L: ImageLoader,
{
    pub fn new(
        root: impl Into<PathBuf>,
        template: ImageTemplate,
        modality: Modality,
        loader: L,
    ) -> Self {
        Self {
            root: root.into(),
            template,
            modality,
            loader,
        }
    }

    pub fn modality(&self) -> Modality {
        self.modality
    }

    pub fn template(&self) -> &ImageTemplate {
        &self.template
    }

    /// The path of the frame file `index` (1-based) of the video `key`.
    pub fn frame_path(&self, key: &str, index: usize) -> PathBuf {
        self.root.join(key).join(self.template.format(key, index))
    }

    pub fn first_frame_exists(&self, key: &str) -> bool {
        self.loader.exists(&self.frame_path(key, 1))
    }

    /// Load the frames at sampling position `position`.
    ///
    /// A failed load is reported and replaced by frame 1 of the same video.
    /// It errors only if frame 1 cannot be loaded either.
    pub fn load(&self, key: &str, position: usize) -> Result<Vec<Frame>> {
        match self.modality {
            Modality::Rgb | Modality::RgbDiff => {
                let image = self.load_or_first(key, position, "image")?;
                Ok(vec![Frame::Rgb(image.into_rgb8())])
            }
            Modality::Flow => {
                let index = 1 + position.saturating_sub(1) * FLOW_FRAME_STRIDE;
                let flow = self.load_or_first(key, index, "flow file")?.into_rgb8();
                let (flow_x, flow_y) = split_flow(&flow);
                Ok(vec![Frame::Luma(flow_x), Frame::Luma(flow_y)])
            }
        }
    }

    fn load_or_first(&self, key: &str, index: usize, what: &str) -> Result<DynamicImage> {
        let path = self.frame_path(key, index);

        match self.loader.load(&path) {
            Ok(image) => Ok(image),
            Err(err) => {
                error!("error loading {} '{}': {:#}", what, path.display(), err);
                let fallback = self.frame_path(key, 1);
                self.loader.load(&fallback).with_context(|| {
                    format!(
                        "failed to load the fallback {} '{}'",
                        what,
                        fallback.display()
                    )
                })
            }
        }
    }
}
