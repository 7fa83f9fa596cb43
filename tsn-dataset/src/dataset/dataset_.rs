use super::*;
use crate::{common::*, processor::Modality};

/// The generic dataset trait.
pub trait GenericDataset
where
    Self: Debug + Send + Sync,
{
    /// The length of the multi-hot label vector.
    fn num_class(&self) -> usize;

    /// The input signal type of the dataset.
    fn modality(&self) -> Modality;
}

/// The dataset backed by a catalog of video records.
pub trait CatalogDataset
where
    Self: GenericDataset,
{
    fn catalog(&self) -> &Catalog;
}

/// The dataset that can be random accessed.
pub trait RandomAccessDataset
where
    Self: GenericDataset,
{
    type Output;

    /// Get number of records in the dataset.
    fn num_records(&self) -> usize;

    /// Get the nth example in the dataset, drawing randomness from `rng`.
    fn nth_with_rng(&self, index: usize, rng: &mut dyn RngCore) -> Result<Example<Self::Output>>;

    /// Get the nth example with a freshly seeded random generator.
    fn nth(&self, index: usize) -> Result<Example<Self::Output>> {
        let mut rng = StdRng::from_entropy();
        self.nth_with_rng(index, &mut rng)
    }
}

/// The dataset that can be enumerated through a stream.
pub trait StreamingDataset
where
    Self: GenericDataset,
{
    type Output;

    /// Enumerate one epoch of examples. The same `seed` reproduces the epoch.
    fn stream(
        &self,
        seed: u64,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<Example<Self::Output>>> + Send>>>;
}
