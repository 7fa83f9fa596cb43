pub use anyhow::{bail, ensure, format_err, Context as _, Error, Result};
pub use derivative::Derivative;
pub use futures::{
    future,
    future::FutureExt as _,
    stream::{self, Stream, StreamExt as _, TryStreamExt as _},
};
pub use image::{imageops::FilterType, DynamicImage, GrayImage, ImageBuffer, Luma, RgbImage};
pub use itertools::{izip, Itertools as _};
pub use log::{error, info, warn};
pub use ndarray::{Array1, Array4};
pub use noisy_float::prelude::*;
pub use rand::{prelude::*, rngs::StdRng, seq::SliceRandom};
pub use serde::{Deserialize, Serialize};
pub use std::{
    collections::{btree_map, BTreeMap, BTreeSet, HashMap, HashSet},
    fmt,
    fmt::Debug,
    fs,
    iter,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    pin::Pin,
    str::FromStr,
    sync::Arc,
    time::{Duration, Instant},
};
