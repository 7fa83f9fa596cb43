use crate::common::*;

/// A video frame directory with its frame count and class labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoRecord {
    /// The directory name of the video under the frame root.
    pub path: String,
    pub num_frames: usize,
    pub labels: BTreeSet<usize>,
}

impl VideoRecord {
    /// Build the multi-hot label vector of length `num_class`.
    pub fn label_vector(&self, num_class: usize) -> Result<Array1<f32>> {
        let mut vector = Array1::zeros(num_class);
        self.labels.iter().try_for_each(|&label| {
            ensure!(
                label < num_class,
                "label {} of '{}' exceeds num_class {}",
                label,
                self.path,
                num_class
            );
            vector[label] = 1.0;
            Ok(())
        })?;
        Ok(vector)
    }
}

/// A sampled example.
#[derive(Debug, Clone, PartialEq)]
pub struct Example<T> {
    pub data: T,
    /// The multi-hot label vector.
    pub label: Array1<f32>,
    /// The key of the record the example is sampled from. It differs from
    /// the requested record when its frames are missing.
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_hot_label() {
        let record = VideoRecord {
            path: "vid1".into(),
            num_frames: 10,
            labels: [2, 5].into_iter().collect(),
        };
        let vector = record.label_vector(10).unwrap();
        assert_eq!(vector.len(), 10);
        assert_eq!(vector.sum(), 2.0);
        assert_eq!(vector[2], 1.0);
        assert_eq!(vector[5], 1.0);
        assert!(record.label_vector(5).is_err());
    }
}
