//! The dataset inspection program for tsn-dataset.

pub mod common;
pub mod config;

use crate::{common::*, config::Config};

pub type Dataset = TsnDataset<FsImageLoader, StackTransform>;

/// The tool subcommands.
#[derive(Debug, Clone, StructOpt)]
pub enum Command {
    /// Print the video records of the catalog
    Catalog,
    /// Print the segment plan of a record
    Plan {
        #[structopt(long, default_value = "0")]
        /// record index
        index: usize,
        #[structopt(long)]
        /// random seed, drawn from entropy if unset
        seed: Option<u64>,
    },
    /// Stream sampled examples
    Sample {
        #[structopt(long)]
        /// maximum number of examples per epoch
        limit: Option<usize>,
    },
}

pub fn build_dataset(config: &Config) -> Result<Dataset> {
    let transform = match config.transform.resize {
        Some((width, height)) => StackTransform::with_size(width, height)?,
        None => StackTransform::new(),
    };
    config.dataset.clone().build(FsImageLoader, transform)
}

/// The entry of the tool.
pub async fn start(config: Config, command: Command) -> Result<()> {
    info!("loading dataset");
    let dataset = build_dataset(&config)?;

    match command {
        Command::Catalog => print_catalog(&dataset),
        Command::Plan { index, seed } => print_plan(&dataset, index, seed),
        Command::Sample { limit } => sample(&config, dataset, limit).await,
    }
}

fn print_catalog(dataset: &Dataset) -> Result<()> {
    info!(
        "{} records, {} classes, {} modality",
        dataset.num_records(),
        dataset.num_class(),
        dataset.modality()
    );
    dataset.catalog().iter().for_each(|record| {
        info!(
            "{}\t{} frames\tlabels {}",
            record.path,
            record.num_frames,
            record.labels.iter().join(",")
        );
    });
    Ok(())
}

fn print_plan(dataset: &Dataset, index: usize, seed: Option<u64>) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let (record, plan) = dataset.plan(index, &mut rng)?;
    let positions = plan.frame_positions(record.num_frames, dataset.sampler().new_length());

    info!("record '{}' with {} frames", record.path, record.num_frames);
    info!("mode {:?}", dataset.sample_mode());
    info!("segment starts {}", plan.starts.iter().join(" "));
    info!("frame positions {}", positions.iter().join(" "));
    positions.iter().dedup().for_each(|&position| {
        info!(
            "- {}",
            dataset.reader().frame_path(&record.path, position).display()
        );
    });
    Ok(())
}

async fn sample(config: &Config, dataset: Dataset, limit: Option<usize>) -> Result<()> {
    let loader = &config.loader;
    let base_seed = loader.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let limit = limit.unwrap_or(usize::MAX);
    let dataset = RandomAccessStream::new(dataset)
        .shuffle(loader.shuffle)
        .num_workers(loader.num_workers);

    for epoch in 0..loader.epochs.get() {
        let seed = base_seed.wrapping_add(epoch as u64);
        info!("start epoch {} with seed {}", epoch, seed);

        let instant = Instant::now();
        let mut examples = dataset.stream(seed)?.take(limit);
        let mut count = 0;

        while let Some(example) = examples.next().await {
            let example = example?;
            let labels = example
                .label
                .iter()
                .enumerate()
                .filter(|(_, value)| **value > 0.5)
                .map(|(index, _)| index)
                .join(",");
            info!(
                "{}\tshape {:?}\tlabels {}",
                example.path,
                example.data.shape(),
                labels
            );
            count += 1;
        }

        info!(
            "epoch {} yields {} examples in {:?}",
            epoch,
            count,
            instant.elapsed()
        );
    }

    Ok(())
}
