use super::SegmentPlan;
use crate::common::*;

/// Selects how segment start frames are picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleMode {
    /// A random frame within each equal-width segment, for training.
    RandomShift,
    /// The center frame of each segment, falling back to frame 1 on short videos.
    Validation,
    /// The center frame of each segment without the short video guard.
    Test,
}

impl SampleMode {
    /// Resolve the mode from dataset flags. `test_mode` takes precedence.
    pub fn from_flags(random_shift: bool, test_mode: bool) -> Self {
        match (test_mode, random_shift) {
            (true, _) => Self::Test,
            (false, true) => Self::RandomShift,
            (false, false) => Self::Validation,
        }
    }
}

/// Computes segment plans for videos of a given length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentSampler {
    num_segments: usize,
    new_length: usize,
}

impl SegmentSampler {
    /// * `num_segments` - The number of segments per video.
    /// * `new_length` - The number of consecutive frames read per segment,
    ///   including the modality extra frames.
    pub fn new(num_segments: usize, new_length: usize) -> Result<Self> {
        ensure!(num_segments > 0, "num_segments must be positive");
        ensure!(new_length > 0, "new_length must be positive");
        Ok(Self {
            num_segments,
            new_length,
        })
    }

    pub fn num_segments(&self) -> usize {
        self.num_segments
    }

    pub fn new_length(&self) -> usize {
        self.new_length
    }

    pub fn plan<R>(&self, mode: SampleMode, num_frames: usize, rng: &mut R) -> SegmentPlan
    where
        R: Rng + ?Sized,
    {
        match mode {
            SampleMode::RandomShift => self.random_shift(num_frames, rng),
            SampleMode::Validation => self.validation(num_frames),
            SampleMode::Test => self.test(num_frames),
        }
    }

    /// The number of valid segment start frames, which is negative when the
    /// video is shorter than a segment.
    fn usable_frames(&self, num_frames: usize) -> isize {
        num_frames as isize - self.new_length as isize + 1
    }

    pub fn random_shift<R>(&self, num_frames: usize, rng: &mut R) -> SegmentPlan
    where
        R: Rng + ?Sized,
    {
        let num_segments = self.num_segments;
        let usable = self.usable_frames(num_frames);
        let average_duration = usable.div_euclid(num_segments as isize);

        let offsets: Vec<usize> = if average_duration > 0 {
            let average_duration = average_duration as usize;
            (0..num_segments)
                .map(|index| index * average_duration + rng.gen_range(0..average_duration))
                .collect()
        } else if num_frames > num_segments && usable > 0 {
            let mut offsets: Vec<usize> = (0..num_segments)
                .map(|_| rng.gen_range(0..usable as usize))
                .collect();
            offsets.sort_unstable();
            offsets
        } else {
            vec![0; num_segments]
        };

        to_plan(offsets)
    }

    pub fn validation(&self, num_frames: usize) -> SegmentPlan {
        if num_frames > self.num_segments + self.new_length - 1 {
            self.center(num_frames)
        } else {
            to_plan(vec![0; self.num_segments])
        }
    }

    pub fn test(&self, num_frames: usize) -> SegmentPlan {
        self.center(num_frames)
    }

    fn center(&self, num_frames: usize) -> SegmentPlan {
        let tick = r64(self.usable_frames(num_frames) as f64) / self.num_segments as f64;
        let offsets = (0..self.num_segments)
            .map(|index| {
                // truncate toward zero; a non-positive tick maps to frame 1
                let offset = (tick / 2.0 + tick * index as f64).raw().trunc();
                offset.max(0.0) as usize
            })
            .collect();
        to_plan(offsets)
    }
}

fn to_plan(offsets: Vec<usize>) -> SegmentPlan {
    SegmentPlan {
        starts: offsets.into_iter().map(|offset| offset + 1).collect(),
    }
}
