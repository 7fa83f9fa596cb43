//! Per-access sampling profile. Timings are collected and reported only
//! when the `profiling` feature is enabled.

use crate::{common::*, dataset::Resolution, processor::Modality};

#[cfg(feature = "profiling")]
lazy_static::lazy_static! {
    static ref PROFILING_CONFIG: ProfilingConfig = {
        match envy::prefixed("TSN_PROFILING_").from_env() {
            Ok(config) => config,
            Err(err) => {
                warn!("ignore invalid TSN_PROFILING_* variables: {:?}", err);
                ProfilingConfig::default()
            }
        }
    };
    /// Substitutions accumulated per requested video key.
    static ref SUBSTITUTED_VIDEOS: dashmap::DashMap<String, usize> = dashmap::DashMap::new();
}

/// Selects which accesses are reported.
///
/// Loaded from `TSN_PROFILING_MODALITIES` (comma separated, e.g. `RGB,Flow`)
/// and `TSN_PROFILING_SUBSTITUTED_ONLY`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilingConfig {
    pub modalities: Option<HashSet<Modality>>,
    #[serde(default)]
    pub substituted_only: bool,
}

impl ProfilingConfig {
    pub fn accepts(&self, profile: &AccessProfile<'_>) -> bool {
        let modality_ok = self
            .modalities
            .as_ref()
            .map(|modalities| modalities.contains(&profile.modality))
            .unwrap_or(true);
        modality_ok && (!self.substituted_only || profile.substitutions() > 0)
    }
}

/// The stages and segment loads of one dataset access.
#[derive(Debug)]
pub struct AccessProfile<'a> {
    modality: Modality,
    resolution: Option<Resolution<'a>>,
    #[cfg(feature = "profiling")]
    stage_instant: Instant,
    #[cfg(feature = "profiling")]
    segment_instant: Instant,
    #[cfg(feature = "profiling")]
    stages: Vec<(&'static str, Duration)>,
    #[cfg(feature = "profiling")]
    segments: Vec<Duration>,
}

impl<'a> AccessProfile<'a> {
    pub fn start(modality: Modality) -> Self {
        #[cfg(feature = "profiling")]
        {
            let now = Instant::now();
            Self {
                modality,
                resolution: None,
                stage_instant: now,
                segment_instant: now,
                stages: vec![],
                segments: vec![],
            }
        }

        #[cfg(not(feature = "profiling"))]
        {
            Self {
                modality,
                resolution: None,
            }
        }
    }

    pub fn modality(&self) -> Modality {
        self.modality
    }

    pub fn resolution(&self) -> Option<&Resolution<'a>> {
        self.resolution.as_ref()
    }

    pub fn substitutions(&self) -> usize {
        self.resolution
            .as_ref()
            .map(|resolution| resolution.substitutions)
            .unwrap_or(0)
    }

    /// Record the chosen video and close the "resolve record" stage.
    pub fn set_resolution(&mut self, resolution: Resolution<'a>) {
        self.resolution = Some(resolution);
        self.set_stage("resolve record");
    }

    /// Close the current stage under `name` and start the next one.
    pub fn set_stage(&mut self, name: &'static str) {
        #[cfg(feature = "profiling")]
        {
            let now = Instant::now();
            self.stages.push((name, now - self.stage_instant));
            self.stage_instant = now;
            self.segment_instant = now;
        }

        #[cfg(not(feature = "profiling"))]
        let _ = name;
    }

    /// Mark that all frames of the current segment are loaded.
    pub fn segment_loaded(&mut self) {
        #[cfg(feature = "profiling")]
        {
            let now = Instant::now();
            self.segments.push(now - self.segment_instant);
            self.segment_instant = now;
        }
    }

    pub fn report(&self) {
        #[cfg(feature = "profiling")]
        {
            if !PROFILING_CONFIG.accepts(self) {
                return;
            }

            let resolution = match &self.resolution {
                Some(resolution) => resolution,
                None => return,
            };

            info!(
                "profiling '{}' ({}, {} segments)",
                resolution.record.path,
                self.modality,
                self.segments.len()
            );

            if resolution.substitutions > 0 {
                let total = {
                    let mut count = SUBSTITUTED_VIDEOS
                        .entry(resolution.requested.path.clone())
                        .or_insert(0);
                    *count += resolution.substitutions;
                    *count
                };
                info!(
                    "- substituted for '{}' after {} attempts, {} so far",
                    resolution.requested.path, resolution.substitutions, total
                );
            }

            self.stages.iter().for_each(|(name, elapsed)| {
                info!("- {}\t{:?}", name, elapsed);
            });
            self.segments
                .iter()
                .enumerate()
                .for_each(|(index, elapsed)| {
                    info!("- segment {}\t{:?}", index, elapsed);
                });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::VideoRecord;

    fn record(path: &str) -> VideoRecord {
        VideoRecord {
            path: path.to_owned(),
            num_frames: 8,
            labels: BTreeSet::from([0]),
        }
    }

    #[test]
    fn substitutions_follow_resolution() {
        let missing = record("missing");
        let good = record("good");

        let mut profile = AccessProfile::start(Modality::Flow);
        assert!(profile.resolution().is_none());
        assert_eq!(profile.substitutions(), 0);

        profile.set_resolution(Resolution {
            requested: &missing,
            record: &good,
            substitutions: 2,
        });
        profile.set_stage("sample indices");
        profile.segment_loaded();
        profile.report();

        assert_eq!(profile.substitutions(), 2);
        assert_eq!(profile.resolution().unwrap().requested.path, "missing");
        assert_eq!(profile.resolution().unwrap().record.path, "good");
    }

    #[test]
    fn config_filters_accesses() {
        let video = record("vid1");
        let direct = Resolution {
            requested: &video,
            record: &video,
            substitutions: 0,
        };

        let mut flow = AccessProfile::start(Modality::Flow);
        flow.set_resolution(direct);
        let mut rgb = AccessProfile::start(Modality::Rgb);
        rgb.set_resolution(Resolution {
            substitutions: 1,
            ..direct
        });

        let config = ProfilingConfig::default();
        assert!(config.accepts(&flow));
        assert!(config.accepts(&rgb));

        let config = ProfilingConfig {
            modalities: Some(HashSet::from([Modality::Rgb])),
            substituted_only: false,
        };
        assert!(!config.accepts(&flow));
        assert!(config.accepts(&rgb));

        let config = ProfilingConfig {
            modalities: None,
            substituted_only: true,
        };
        assert!(!config.accepts(&flow));
        assert!(config.accepts(&rgb));
    }
}
