//! Tool configuration format.

use crate::common::*;

/// The main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub dataset: TsnDatasetInit,
    #[serde(default)]
    pub transform: TransformConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
}

impl Config {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = std::fs::read_to_string(path)?;
        let config = json5::from_str(&text)?;
        Ok(config)
    }
}

/// Frame stacking options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Resize frames to (width, height) before stacking.
    pub resize: Option<(u32, u32)>,
}

/// Example streaming options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// The maximum number of examples loaded concurrently.
    #[serde(default = "default_num_workers")]
    pub num_workers: NonZeroUsize,
    /// The seed of the first epoch. Epoch `n` uses `seed + n`.
    pub seed: Option<u64>,
    #[serde(default = "default_shuffle")]
    pub shuffle: bool,
    #[serde(default = "default_epochs")]
    pub epochs: NonZeroUsize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            num_workers: default_num_workers(),
            seed: None,
            shuffle: default_shuffle(),
            epochs: default_epochs(),
        }
    }
}

fn default_num_workers() -> NonZeroUsize {
    NonZeroUsize::new(4).unwrap()
}

fn default_shuffle() -> bool {
    true
}

fn default_epochs() -> NonZeroUsize {
    NonZeroUsize::new(1).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_example_config() -> Result<()> {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tsn.json5");
        let config = Config::open(&path)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        assert_eq!(config.dataset.num_segments, 3);
        assert_eq!(config.transform.resize, Some((224, 224)));
        assert_eq!(config.loader.epochs.get(), 1);
        Ok(())
    }
}
