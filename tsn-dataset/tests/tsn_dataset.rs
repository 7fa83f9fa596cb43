use anyhow::{ensure, format_err, Result};
use futures::stream::TryStreamExt as _;
use image::{DynamicImage, Rgb, RgbImage};
use rand::{rngs::StdRng, SeedableRng};
use std::{
    collections::HashSet,
    fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};
use tsn_dataset::{
    dataset::{
        CatalogBuilder, CatalogDataset, RandomAccessDataset, RandomAccessStream,
        StreamingDataset, TsnDatasetInit,
    },
    processor::{Frame, FsImageLoader, ImageLoader, Modality, StackTransform},
    sampler::SampleMode,
};

/// Serves 2x2 frames whose red channel encodes the frame index.
#[derive(Debug, Default)]
struct SyntheticLoader {
    /// Videos without any frame file.
    missing: HashSet<String>,
    /// Fail to decode every frame except frame 1.
    corrupted: bool,
}

impl SyntheticLoader {
    fn video_key(path: &Path) -> String {
        path.parent()
            .and_then(|dir| dir.file_name())
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_owned()
    }

    fn frame_index(path: &Path) -> Result<usize> {
        let index = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.strip_prefix("img_"))
            .ok_or_else(|| format_err!("unexpected frame path '{}'", path.display()))?
            .parse()?;
        Ok(index)
    }
}

impl ImageLoader for SyntheticLoader {
    fn exists(&self, path: &Path) -> bool {
        !self.missing.contains(&Self::video_key(path))
    }

    fn load(&self, path: &Path) -> Result<DynamicImage> {
        ensure!(self.exists(path), "'{}' does not exist", path.display());
        let index = Self::frame_index(path)?;
        ensure!(!self.corrupted || index == 1, "frame {} is corrupted", index);
        let image = RgbImage::from_pixel(2, 2, Rgb([index as u8, 0, 0]));
        Ok(DynamicImage::ImageRgb8(image))
    }
}

fn red_values(frames: Vec<Frame>) -> Result<Vec<u8>> {
    frames
        .iter()
        .map(|frame| match frame {
            Frame::Rgb(image) => Ok(image.get_pixel(0, 0)[0]),
            Frame::Luma(image) => Ok(image.get_pixel(0, 0)[0]),
        })
        .collect()
}

fn init(num_class: usize) -> TsnDatasetInit {
    TsnDatasetInit::new("/frames", "unused.txt", "unused.txt", num_class)
}

fn fixture_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tsn-dataset-{}-{}", name, std::process::id()));
    if dir.exists() {
        fs::remove_dir_all(&dir).unwrap();
    }
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn end_to_end_from_files() -> Result<()> {
    let dir = fixture_dir("end-to-end");
    let root = dir.join("frames");
    let video_dir = root.join("vid1");
    fs::create_dir_all(&video_dir)?;
    for index in 1..=9 {
        let image = RgbImage::from_pixel(4, 3, Rgb([index * 10, 0, 0]));
        image.save(video_dir.join(format!("img_{:05}.png", index)))?;
    }

    let list_file = dir.join("list.txt");
    let num_file = dir.join("num.txt");
    fs::write(&list_file, "vid1 0 0 3\nvid1 0 0 5\nshort 0 0 1\n")?;
    fs::write(&num_file, "short 2\nvid1 9\n")?;

    let dataset = TsnDatasetInit {
        image_tmpl: "img_{1:05d}.png".into(),
        test_mode: true,
        ..TsnDatasetInit::new(&root, &list_file, &num_file, 10)
    }
    .build(FsImageLoader, StackTransform::new())?;

    assert_eq!(dataset.num_records(), 1);
    let record = &dataset.catalog().records()[0];
    assert_eq!(record.path, "vid1");
    assert_eq!(record.num_frames, 9);
    assert_eq!(record.labels.iter().cloned().collect::<Vec<_>>(), vec![3, 5]);

    let example = dataset.nth(0)?;
    assert_eq!(example.path, "vid1");
    assert_eq!(example.data.shape(), &[3, 3, 3, 4]);
    assert_eq!(
        example.label.to_vec(),
        vec![0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]
    );

    // test mode picks the frames 2, 5 and 8
    let reds: Vec<f32> = (0..3).map(|frame| example.data[[frame, 0, 0, 0]]).collect();
    let expect = [20.0 / 255.0, 50.0 / 255.0, 80.0 / 255.0];
    reds.iter().zip(expect).for_each(|(&red, expect)| {
        approx::assert_abs_diff_eq!(red, expect, epsilon = 1e-6);
    });

    fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn corrupted_frames_fall_back_to_first_frame() -> Result<()> {
    let catalog = CatalogBuilder::default().build("vid1 0 2\n", "vid1 30\n")?;
    let loader = SyntheticLoader {
        corrupted: true,
        ..Default::default()
    };
    let dataset = TsnDatasetInit {
        new_length: 2,
        ..init(4)
    }
    .build_with_catalog(catalog, loader, red_values)?;

    let mut rng = StdRng::seed_from_u64(0);
    let example = dataset.nth_with_rng(0, &mut rng)?;
    assert_eq!(example.data, vec![1u8; 6]);
    assert_eq!(example.label.to_vec(), vec![0.0, 0.0, 1.0, 0.0]);
    Ok(())
}

#[test]
fn missing_video_is_substituted() -> Result<()> {
    let catalog = CatalogBuilder::default().build("bad 0\ngood 1\n", "bad 10\ngood 12\n")?;
    let loader = SyntheticLoader {
        missing: ["bad".to_owned()].into_iter().collect(),
        ..Default::default()
    };
    let dataset = init(2).build_with_catalog(catalog, loader, red_values)?;

    let mut rng = StdRng::seed_from_u64(1);
    let example = dataset.nth_with_rng(0, &mut rng)?;
    assert_eq!(example.path, "good");
    assert_eq!(example.label.to_vec(), vec![0.0, 1.0]);

    let resolution = dataset.resolve(0, &mut rng)?;
    assert_eq!(resolution.requested.path, "bad");
    assert_eq!(resolution.record.path, "good");
    assert!(resolution.substitutions >= 1);

    let resolution = dataset.resolve(1, &mut rng)?;
    assert_eq!(resolution.record.path, "good");
    assert_eq!(resolution.substitutions, 0);
    Ok(())
}

#[test]
fn fully_missing_dataset_is_an_error() -> Result<()> {
    let catalog = CatalogBuilder::default().build("a 0\nb 0\n", "a 10\nb 10\n")?;
    let loader = SyntheticLoader {
        missing: ["a".to_owned(), "b".to_owned()].into_iter().collect(),
        ..Default::default()
    };
    let dataset = TsnDatasetInit {
        max_fallback_attempts: 8,
        ..init(1)
    }
    .build_with_catalog(catalog, loader, red_values)?;

    let mut rng = StdRng::seed_from_u64(2);
    assert!(dataset.nth_with_rng(1, &mut rng).is_err());
    assert!(dataset.nth_with_rng(2, &mut rng).is_err());
    Ok(())
}

#[test]
fn flow_and_diff_frame_counts() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(3);

    let catalog = CatalogBuilder::default().build("vid1 0\n", "vid1 40\n")?;
    let dataset = TsnDatasetInit {
        modality: Modality::Flow,
        new_length: 5,
        random_shift: false,
        ..init(1)
    }
    .build_with_catalog(catalog.clone(), SyntheticLoader::default(), red_values)?;
    assert_eq!(dataset.sample_mode(), SampleMode::Validation);
    let example = dataset.nth_with_rng(0, &mut rng)?;
    // 3 segments, 5 positions each, 2 flow components per position
    assert_eq!(example.data.len(), 30);
    // validation tick is 12, so the first segment starts at frame 7,
    // read from the stored flow file 1 + 6 * 5
    assert_eq!(&example.data[0..4], &[31u8, 0, 36, 0]);

    let dataset = TsnDatasetInit {
        modality: Modality::RgbDiff,
        ..init(1)
    }
    .build_with_catalog(catalog, SyntheticLoader::default(), red_values)?;
    assert_eq!(dataset.sampler().new_length(), 2);
    let example = dataset.nth_with_rng(0, &mut rng)?;
    assert_eq!(example.data.len(), 6);
    Ok(())
}

#[test]
fn labels_must_fit_num_class() -> Result<()> {
    let catalog = CatalogBuilder::default().build("vid1 7\n", "vid1 10\n")?;
    let result = init(5).build_with_catalog(catalog, SyntheticLoader::default(), red_values);
    assert!(result.is_err());
    Ok(())
}

#[test]
fn init_from_json5_defaults() -> Result<()> {
    let init: TsnDatasetInit = json5::from_str(
        r#"{
            root_path: "/frames",
            list_file: "list.txt",
            num_file: "num.txt",
            num_class: 101,
            modality: "Flow",
        }"#,
    )?;
    assert_eq!(init.num_segments, 3);
    assert_eq!(init.new_length, 1);
    assert_eq!(init.modality, Modality::Flow);
    assert_eq!(init.image_tmpl, "img_{1:05d}.jpg");
    assert!(init.random_shift);
    assert!(!init.test_mode);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn stream_is_reproducible() -> Result<()> {
    let labels = "a 0\nb 1\nc 2\nd 3\n";
    let counts = "a 30\nb 31\nc 32\nd 33\n";

    let collect = |seed: u64| async move {
        let catalog = CatalogBuilder::default().build(labels, counts)?;
        let dataset = init(4).build_with_catalog(catalog, SyntheticLoader::default(), red_values)?;
        let examples: Vec<_> = RandomAccessStream::new(dataset)
            .shuffle(true)
            .num_workers(NonZeroUsize::new(3).unwrap())
            .stream(seed)?
            .try_collect()
            .await?;
        anyhow::Ok(examples)
    };

    let first = collect(5).await?;
    let second = collect(5).await?;

    assert_eq!(first.len(), 4);
    let mut paths: Vec<_> = first.iter().map(|example| example.path.clone()).collect();
    paths.sort();
    assert_eq!(paths, vec!["a", "b", "c", "d"]);
    assert_eq!(first, second);
    Ok(())
}
