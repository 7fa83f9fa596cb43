use crate::common::*;

/// The sampled 1-based start frame of every segment of a video.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SegmentPlan {
    pub starts: Vec<usize>,
}

impl SegmentPlan {
    pub fn num_segments(&self) -> usize {
        self.starts.len()
    }

    /// Expand each segment start into `new_length` consecutive frame positions.
    ///
    /// The position stops advancing at `num_frames`, so the tail of a segment
    /// near the end of a video repeats the last frame.
    pub fn frame_positions(&self, num_frames: usize, new_length: usize) -> Vec<usize> {
        self.starts
            .iter()
            .flat_map(|&start| {
                iter::successors(Some(start), move |&position| {
                    Some(if position < num_frames {
                        position + 1
                    } else {
                        position
                    })
                })
                .take(new_length)
            })
            .collect()
    }
}
