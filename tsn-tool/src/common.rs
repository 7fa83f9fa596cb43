//! Common imports from external crates.

pub use anyhow::{bail, ensure, format_err, Context, Error, Result};
pub use futures::stream::{self, Stream, StreamExt, TryStreamExt};
pub use itertools::Itertools;
pub use log::{error, info, warn};
pub use rand::{prelude::*, rngs::StdRng};
pub use serde::{Deserialize, Serialize};
pub use std::{
    env,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    time::Instant,
};
pub use structopt::StructOpt;
pub use tsn_dataset::{
    dataset::{
        CatalogDataset, GenericDataset, RandomAccessDataset, RandomAccessStream,
        StreamingDataset, TsnDataset, TsnDatasetInit,
    },
    processor::{FsImageLoader, StackTransform},
};
