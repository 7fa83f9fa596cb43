use super::*;
use crate::{
    common::*,
    processor::{FrameReader, ImageLoader, ImageTemplate, Modality, Transform},
    profiling::AccessProfile,
    sampler::{SampleMode, SegmentPlan, SegmentSampler},
};

/// The options to build a [TsnDataset].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TsnDatasetInit {
    /// The directory containing one frame directory per video.
    pub root_path: PathBuf,
    /// The label file with `key ... label` rows.
    pub list_file: PathBuf,
    /// The frame count file with `key count` rows.
    pub num_file: PathBuf,
    pub num_class: usize,
    #[serde(default = "default_num_segments")]
    pub num_segments: usize,
    /// The number of consecutive frames per segment.
    #[serde(default = "default_new_length")]
    pub new_length: usize,
    #[serde(default)]
    pub modality: Modality,
    /// The frame filename template, filled with the video key `{0}` and the frame index `{1}`.
    #[serde(default = "default_image_tmpl")]
    pub image_tmpl: String,
    /// Accepted for compatibility. It has no effect on loaded frames.
    #[serde(default)]
    pub force_grayscale: bool,
    #[serde(default = "default_random_shift")]
    pub random_shift: bool,
    #[serde(default)]
    pub test_mode: bool,
    /// The maximum number of random substitutions for a record with missing frames.
    #[serde(default = "default_max_fallback_attempts")]
    pub max_fallback_attempts: usize,
}

fn default_num_segments() -> usize {
    3
}

fn default_new_length() -> usize {
    1
}

fn default_image_tmpl() -> String {
    "img_{1:05d}.jpg".into()
}

fn default_random_shift() -> bool {
    true
}

fn default_max_fallback_attempts() -> usize {
    64
}

impl TsnDatasetInit {
    pub fn new(
        root_path: impl Into<PathBuf>,
        list_file: impl Into<PathBuf>,
        num_file: impl Into<PathBuf>,
        num_class: usize,
    ) -> Self {
        Self {
            root_path: root_path.into(),
            list_file: list_file.into(),
            num_file: num_file.into(),
            num_class,
            num_segments: default_num_segments(),
            new_length: default_new_length(),
            modality: Modality::default(),
            image_tmpl: default_image_tmpl(),
            force_grayscale: false,
            random_shift: default_random_shift(),
            test_mode: false,
            max_fallback_attempts: default_max_fallback_attempts(),
        }
    }

    /// Load the annotation files and build the dataset.
    pub fn build<L, T>(self, loader: L, transform: T) -> Result<TsnDataset<L, T>>
    where
        L: ImageLoader,
        T: Transform,
    {
        let catalog = Catalog::load(&self.list_file, &self.num_file)?;
        self.build_with_catalog(catalog, loader, transform)
    }

    /// Build the dataset on an already loaded catalog.
    pub fn build_with_catalog<L, T>(
        self,
        catalog: Catalog,
        loader: L,
        transform: T,
    ) -> Result<TsnDataset<L, T>>
    where
        L: ImageLoader,
        T: Transform,
    {
        let Self {
            root_path,
            num_class,
            num_segments,
            new_length,
            modality,
            image_tmpl,
            force_grayscale,
            random_shift,
            test_mode,
            max_fallback_attempts,
            ..
        } = self;

        ensure!(num_class > 0, "num_class must be positive");
        ensure!(
            max_fallback_attempts > 0,
            "max_fallback_attempts must be positive"
        );
        if force_grayscale {
            warn!("force_grayscale is set but has no effect on loaded frames");
        }

        catalog.iter().try_for_each(|record| {
            match record.labels.iter().find(|&&label| label >= num_class) {
                Some(label) => bail!(
                    "label {} of '{}' exceeds num_class {}",
                    label,
                    record.path,
                    num_class
                ),
                None => Ok(()),
            }
        })?;

        let template = ImageTemplate::new(image_tmpl)?;
        let sampler = SegmentSampler::new(num_segments, new_length + modality.extra_length())?;
        let reader = FrameReader::new(root_path, template, modality, loader);

        Ok(TsnDataset {
            catalog,
            reader,
            sampler,
            mode: SampleMode::from_flags(random_shift, test_mode),
            num_class,
            max_fallback_attempts,
            transform,
        })
    }
}

/// The record chosen for one access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'a> {
    /// The record at the accessed index.
    pub requested: &'a VideoRecord,
    /// The record whose frames are loaded.
    pub record: &'a VideoRecord,
    /// How many random substitutions were made before `record` was found.
    pub substitutions: usize,
}

/// The segment-sampled video dataset.
#[derive(Derivative)]
#[derivative(Debug(bound = "L: Debug"))]
pub struct TsnDataset<L, T>
where
    L: ImageLoader,
{
    catalog: Catalog,
    reader: FrameReader<L>,
    sampler: SegmentSampler,
    mode: SampleMode,
    num_class: usize,
    max_fallback_attempts: usize,
    #[derivative(Debug = "ignore")]
    transform: T,
}

impl<L, T> TsnDataset<L, T>
where
    L: ImageLoader,
    T: Transform,
{
    pub fn sample_mode(&self) -> SampleMode {
        self.mode
    }

    pub fn sampler(&self) -> &SegmentSampler {
        &self.sampler
    }

    pub fn reader(&self) -> &FrameReader<L> {
        &self.reader
    }

    /// Resolve the record at `index`, substituting a random record if its
    /// first frame is missing.
    pub fn resolve_record(&self, index: usize, rng: &mut dyn RngCore) -> Result<&VideoRecord> {
        Ok(self.resolve(index, rng)?.record)
    }

    /// Like [resolve_record](Self::resolve_record), but also reports the
    /// requested record and the number of substitutions.
    pub fn resolve(&self, index: usize, rng: &mut dyn RngCore) -> Result<Resolution<'_>> {
        let requested = self.catalog.get(index).ok_or_else(|| {
            format_err!(
                "invalid index {}, the dataset has {} records",
                index,
                self.catalog.len()
            )
        })?;

        let mut record = requested;

        for substitutions in 0..=self.max_fallback_attempts {
            if self.reader.first_frame_exists(&record.path) {
                return Ok(Resolution {
                    requested,
                    record,
                    substitutions,
                });
            }
            if substitutions == self.max_fallback_attempts {
                break;
            }
            error!(
                "missing first frame '{}'",
                self.reader.frame_path(&record.path, 1).display()
            );
            let index = rng.gen_range(0..self.catalog.len());
            record = &self.catalog.records()[index];
        }

        bail!(
            "no record with an existing first frame is found in {} attempts, starting from '{}'",
            self.max_fallback_attempts,
            requested.path
        )
    }

    /// Resolve the record at `index` and compute its segment plan.
    pub fn plan(
        &self,
        index: usize,
        rng: &mut dyn RngCore,
    ) -> Result<(&VideoRecord, SegmentPlan)> {
        let record = self.resolve_record(index, rng)?;
        let plan = self.sampler.plan(self.mode, record.num_frames, rng);
        Ok((record, plan))
    }
}

impl<L, T> GenericDataset for TsnDataset<L, T>
where
    L: ImageLoader,
    T: Transform,
{
    fn num_class(&self) -> usize {
        self.num_class
    }

    fn modality(&self) -> Modality {
        self.reader.modality()
    }
}

impl<L, T> CatalogDataset for TsnDataset<L, T>
where
    L: ImageLoader,
    T: Transform,
{
    fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

impl<L, T> RandomAccessDataset for TsnDataset<L, T>
where
    L: ImageLoader,
    T: Transform,
{
    type Output = T::Output;

    fn num_records(&self) -> usize {
        self.catalog.len()
    }

    fn nth_with_rng(&self, index: usize, rng: &mut dyn RngCore) -> Result<Example<T::Output>> {
        let mut profile = AccessProfile::start(self.modality());

        let resolution = self.resolve(index, rng)?;
        let record = resolution.record;
        profile.set_resolution(resolution);

        let plan = self.sampler.plan(self.mode, record.num_frames, rng);
        profile.set_stage("sample indices");

        let new_length = self.sampler.new_length();
        let positions = plan.frame_positions(record.num_frames, new_length);
        let mut frames = Vec::with_capacity(positions.len() * self.modality().frames_per_load());
        for segment in positions.chunks(new_length) {
            for &position in segment {
                frames.extend(self.reader.load(&record.path, position)?);
            }
            profile.segment_loaded();
        }
        profile.set_stage("load frames");

        let data = self
            .transform
            .apply(frames)
            .with_context(|| format!("failed to transform frames of '{}'", record.path))?;
        profile.set_stage("transform");

        let label = record.label_vector(self.num_class)?;
        profile.report();

        Ok(Example {
            data,
            label,
            path: record.path.clone(),
        })
    }
}
