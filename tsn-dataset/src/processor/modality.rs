use crate::common::*;

/// The input signal type of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modality {
    /// Color frames.
    #[serde(rename = "RGB")]
    Rgb,
    /// Stored optical-flow images, each multiplexing 5 source frames.
    #[serde(rename = "Flow")]
    Flow,
    /// Color frames consumed as differences of consecutive frames.
    #[serde(rename = "RGBDiff")]
    RgbDiff,
}

impl Modality {
    /// Extra frames a segment reads on top of the configured length.
    pub fn extra_length(&self) -> usize {
        match self {
            Self::Rgb | Self::Flow => 0,
            // one more frame to compute the difference
            Self::RgbDiff => 1,
        }
    }

    /// The number of frames produced by a single load.
    pub fn frames_per_load(&self) -> usize {
        match self {
            Self::Rgb | Self::RgbDiff => 1,
            Self::Flow => 2,
        }
    }
}

impl Default for Modality {
    fn default() -> Self {
        Self::Rgb
    }
}

impl FromStr for Modality {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let modality = match text {
            "RGB" => Self::Rgb,
            "Flow" => Self::Flow,
            "RGBDiff" => Self::RgbDiff,
            _ => bail!(
                "unknown modality '{}', expect one of RGB, Flow or RGBDiff",
                text
            ),
        };
        Ok(modality)
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Rgb => "RGB",
            Self::Flow => "Flow",
            Self::RgbDiff => "RGBDiff",
        };
        f.write_str(name)
    }
}
