use super::*;
use crate::{common::*, processor::Modality};

/// Streams the examples of a random access dataset on blocking worker threads.
#[derive(Debug)]
pub struct RandomAccessStream<D>
where
    D: 'static + RandomAccessDataset,
{
    dataset: Arc<D>,
    shuffle: bool,
    num_workers: usize,
}

impl<D> RandomAccessStream<D>
where
    D: 'static + RandomAccessDataset,
{
    pub fn new(dataset: D) -> Self {
        Self::from_arc(Arc::new(dataset))
    }

    pub fn from_arc(dataset: Arc<D>) -> Self {
        Self {
            dataset,
            shuffle: false,
            num_workers: 1,
        }
    }

    /// Visit records in a random order in each epoch.
    pub fn shuffle(self, shuffle: bool) -> Self {
        Self { shuffle, ..self }
    }

    /// The maximum number of examples loaded concurrently.
    pub fn num_workers(self, num_workers: NonZeroUsize) -> Self {
        Self {
            num_workers: num_workers.get(),
            ..self
        }
    }

    pub fn dataset(&self) -> &Arc<D> {
        &self.dataset
    }
}

impl<D> GenericDataset for RandomAccessStream<D>
where
    D: 'static + RandomAccessDataset,
{
    fn num_class(&self) -> usize {
        self.dataset.num_class()
    }

    fn modality(&self) -> Modality {
        self.dataset.modality()
    }
}

impl<D> StreamingDataset for RandomAccessStream<D>
where
    D: 'static + RandomAccessDataset,
    D::Output: 'static + Send,
{
    type Output = D::Output;

    fn stream(
        &self,
        seed: u64,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<Example<D::Output>>> + Send>>> {
        let mut rng = StdRng::seed_from_u64(seed);

        let mut indexes: Vec<usize> = (0..self.dataset.num_records()).collect();
        if self.shuffle {
            indexes.shuffle(&mut rng);
        }

        // each example draws from its own generator
        let jobs: Vec<(usize, u64)> = indexes
            .into_iter()
            .map(|index| (index, rng.gen()))
            .collect();

        let dataset = self.dataset.clone();
        let stream = stream::iter(jobs)
            .map(move |(index, seed)| {
                let dataset = dataset.clone();
                tokio::task::spawn_blocking(move || {
                    let mut rng = StdRng::seed_from_u64(seed);
                    dataset.nth_with_rng(index, &mut rng)
                })
                .map(|result| -> Result<_> { result? })
            })
            .buffered(self.num_workers);

        Ok(Box::pin(stream))
    }
}
