use super::*;
use crate::common::*;

/// Videos with fewer frames are dropped from the catalog.
pub const MIN_NUM_FRAMES: usize = 3;

/// The sorted and deduplicated list of video records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    records: Vec<VideoRecord>,
}

impl Catalog {
    /// Build the catalog from a label file and a frame count file.
    pub fn load(label_file: impl AsRef<Path>, count_file: impl AsRef<Path>) -> Result<Self> {
        CatalogBuilder::default().load(label_file, count_file)
    }

    pub fn records(&self) -> &[VideoRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&VideoRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VideoRecord> {
        self.records.iter()
    }
}

/// Joins the annotation files into a [Catalog].
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    pub min_frames: usize,
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self {
            min_frames: MIN_NUM_FRAMES,
        }
    }
}

impl CatalogBuilder {
    pub fn load(
        &self,
        label_file: impl AsRef<Path>,
        count_file: impl AsRef<Path>,
    ) -> Result<Catalog> {
        let label_file = label_file.as_ref();
        let count_file = count_file.as_ref();

        let label_text = fs::read_to_string(label_file)
            .with_context(|| format!("failed to read label file '{}'", label_file.display()))?;
        let count_text = fs::read_to_string(count_file).with_context(|| {
            format!(
                "failed to read frame count file '{}'",
                count_file.display()
            )
        })?;

        let labels = parse_label_list(&label_text)
            .with_context(|| format!("failed to parse '{}'", label_file.display()))?;
        let counts = parse_count_list(&count_text)
            .with_context(|| format!("failed to parse '{}'", count_file.display()))?;

        self.join(labels, counts)
    }

    /// Build the catalog from the contents of the two annotation files.
    pub fn build(&self, label_text: &str, count_text: &str) -> Result<Catalog> {
        let labels = parse_label_list(label_text).context("failed to parse the label list")?;
        let counts =
            parse_count_list(count_text).context("failed to parse the frame count list")?;
        self.join(labels, counts)
    }

    fn join(
        &self,
        labels: BTreeMap<String, BTreeSet<usize>>,
        counts: HashMap<String, usize>,
    ) -> Result<Catalog> {
        let num_labeled = labels.len();

        // the label map is ordered by key
        let records: Vec<_> = labels
            .into_iter()
            .map(|(path, labels)| -> Result<_> {
                let num_frames = *counts
                    .get(&path)
                    .ok_or_else(|| format_err!("missing frame count for key '{}'", path))?;
                Ok(VideoRecord {
                    path,
                    num_frames,
                    labels,
                })
            })
            .filter_ok(|record| record.num_frames >= self.min_frames)
            .try_collect()?;

        let num_dropped = num_labeled - records.len();
        if num_dropped > 0 {
            warn!(
                "dropped {} videos with less than {} frames",
                num_dropped, self.min_frames
            );
        }

        info!("video number: {}", records.len());

        Ok(Catalog { records })
    }
}

/// Parse rows of `key ... label` into the label set of each key.
pub fn parse_label_list(text: &str) -> Result<BTreeMap<String, BTreeSet<usize>>> {
    let mut labels: BTreeMap<String, BTreeSet<usize>> = BTreeMap::new();

    non_blank_lines(text).try_for_each(|(line_no, line)| -> Result<_> {
        let tokens: Vec<_> = line.split_whitespace().collect();
        let (key, label) = match tokens.as_slice() {
            [key, .., label] => (*key, *label),
            _ => bail!(
                "line {}: expect at least a key and a label, but get '{}'",
                line_no,
                line
            ),
        };
        let label: usize = label
            .parse()
            .with_context(|| format!("line {}: invalid label index '{}'", line_no, label))?;

        labels.entry(key.to_owned()).or_default().insert(label);
        Ok(())
    })?;

    Ok(labels)
}

/// Parse rows of `key count` into the frame count of each key.
pub fn parse_count_list(text: &str) -> Result<HashMap<String, usize>> {
    let mut counts = HashMap::new();

    non_blank_lines(text).try_for_each(|(line_no, line)| -> Result<_> {
        let tokens: Vec<_> = line.split_whitespace().collect();
        let (key, count) = match tokens.as_slice() {
            [key, count] => (*key, *count),
            _ => bail!(
                "line {}: expect a key and a frame count, but get '{}'",
                line_no,
                line
            ),
        };
        let count: usize = count
            .parse()
            .with_context(|| format!("line {}: invalid frame count '{}'", line_no, count))?;

        if counts.insert(key.to_owned(), count).is_some() {
            warn!(
                "line {}: duplicated frame count for key '{}', the last one is used",
                line_no, key
            );
        }
        Ok(())
    })?;

    Ok(counts)
}

/// Enumerate lines with 1-based line numbers, skipping blank lines.
fn non_blank_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}
