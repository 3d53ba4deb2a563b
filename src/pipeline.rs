//! Session → backdrop → cluster → representative pipeline.

use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use replayscope_backdrop_corpus::{
    extract_session, Corpus, CorpusAssembler, SessionRecord, SessionSource,
};
use replayscope_cluster_sampler::{
    sample_representatives, KMeansEngine, KMeansPolicy, Partition, Representative,
};
use replayscope_core_types::RunId;
use replayscope_dom_vector::FeatureDictionary;

use crate::config::{Config, ConfigError};
use crate::errors::{PipelineError, PipelineResult};
use crate::metrics::{LoadCounters, RunStats};
use crate::source::load_all;
use crate::stack::spawn_deep;

#[derive(Clone, Debug, PartialEq)]
pub struct RunOptions {
    pub policy: KMeansPolicy,
    pub session_sample_rate: f64,
    pub max_sessions: usize,
    pub concurrency: usize,
    pub seed: Option<u64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl RunOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            policy: config.sampler.kmeans_policy(),
            session_sample_rate: config.sampler.session_sample_rate,
            max_sessions: config.sampler.max_sessions,
            concurrency: config.source.concurrency,
            seed: config.sampler.seed,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.policy.clusters == 0 {
            return Err(ConfigError::ZeroClusters);
        }
        if self.policy.max_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        if !(0.0..=1.0).contains(&self.session_sample_rate) {
            return Err(ConfigError::SampleRate(self.session_sample_rate));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }
}

/// Dictionary and padded corpus built from one batch of sessions.
#[derive(Debug)]
pub struct CorpusBuild {
    pub dictionary: FeatureDictionary,
    pub corpus: Corpus,
    pub stats: RunStats,
}

impl CorpusBuild {
    /// Total occurrences of each feature across the corpus, by feature index.
    pub fn feature_occurrences(&self) -> Vec<u64> {
        let mut totals = vec![0u64; self.corpus.dimension()];
        for vector in self.corpus.vectors() {
            for (total, &count) in totals.iter_mut().zip(vector) {
                *total += u64::from(count);
            }
        }
        totals
    }
}

#[derive(Debug)]
pub struct RunOutcome {
    pub run_id: RunId,
    pub seed: u64,
    pub dictionary: FeatureDictionary,
    pub corpus: Corpus,
    pub partition: Partition,
    pub representatives: Vec<Representative>,
    pub stats: RunStats,
}

pub struct SamplingPipeline {
    source: Arc<dyn SessionSource>,
    options: RunOptions,
}

impl SamplingPipeline {
    pub fn new(source: Arc<dyn SessionSource>, options: RunOptions) -> Self {
        Self { source, options }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Runs the whole pipeline with a fresh dictionary scoped to this run.
    pub async fn run(&self) -> PipelineResult<RunOutcome> {
        self.options.validate()?;
        let started = Instant::now();
        let run_id = RunId::new();
        let seed = self.options.seed.unwrap_or_else(rand::random);
        info!(run = %run_id, seed, source = %self.source.describe(), "sampling run started");
        let mut rng = StdRng::seed_from_u64(seed);

        let CorpusBuild {
            dictionary,
            corpus,
            mut stats,
        } = self.build_corpus(&mut rng).await?;

        let engine = KMeansEngine::new(self.options.policy.clone());
        let partition = engine.cluster(&corpus, &mut rng)?;
        let representatives = sample_representatives(&corpus, &partition, &mut rng);

        stats.clusters = partition.len();
        stats.iterations = partition.iterations;
        stats.converged = partition.converged;
        stats.inertia = partition.inertia;
        stats.elapsed_ms = started.elapsed().as_millis() as u64;
        stats.log();

        Ok(RunOutcome {
            run_id,
            seed,
            dictionary,
            corpus,
            partition,
            representatives,
            stats,
        })
    }

    /// Lists, samples and loads sessions, then vectorizes them in session-id
    /// order against one dictionary.
    pub async fn build_corpus<R>(&self, rng: &mut R) -> PipelineResult<CorpusBuild>
    where
        R: Rng + ?Sized,
    {
        let mut stats = RunStats::default();
        let records = self.collect_records(rng, &mut stats).await?;

        let (dictionary, corpus) = spawn_deep("replayscope-extract", move || {
            let mut dictionary = FeatureDictionary::new();
            let mut assembler = CorpusAssembler::new();
            for record in records {
                assembler.push(extract_session(record, &mut dictionary));
            }
            let corpus = assembler.finish(&dictionary);
            (dictionary, corpus)
        })
        .await
        .map_err(PipelineError::Worker)?;
        let corpus = corpus?;

        stats.sessions_without_url = corpus.stats().sessions_without_url;
        stats.backdrops = corpus.len();
        stats.dimension = corpus.dimension();
        Ok(CorpusBuild {
            dictionary,
            corpus,
            stats,
        })
    }

    async fn collect_records<R>(
        &self,
        rng: &mut R,
        stats: &mut RunStats,
    ) -> PipelineResult<Vec<SessionRecord>>
    where
        R: Rng + ?Sized,
    {
        let mut ids = self.source.list().await?;
        stats.listed = ids.len();
        ids.truncate(self.options.max_sessions);
        let rate = self.options.session_sample_rate;
        ids.retain(|_| rng.gen_bool(rate));
        stats.sampled = ids.len();
        debug!(listed = stats.listed, sampled = stats.sampled, rate, "sessions sampled");

        let counters = LoadCounters::default();
        let records = load_all(
            Arc::clone(&self.source),
            ids,
            self.options.concurrency,
            &counters,
        )
        .await?;
        stats.loaded = counters.loaded() as usize;
        stats.failed = counters.failed() as usize;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replayscope_backdrop_corpus::{MemorySessionSource, RecordedEvent};
    use replayscope_dom_vector::SnapshotNode;

    fn record(id: &str, tag: &str, n: usize) -> SessionRecord {
        let node = SnapshotNode::element("body")
            .with_children((0..n).map(|_| SnapshotNode::element(tag)));
        SessionRecord::new(
            id,
            Some(format!("https://replays.test/{id}")),
            vec![RecordedEvent::full_snapshot(10, &node)],
        )
    }

    fn pipeline(records: Vec<SessionRecord>, options: RunOptions) -> SamplingPipeline {
        SamplingPipeline::new(Arc::new(MemorySessionSource::new(records)), options)
    }

    fn all_sessions() -> RunOptions {
        RunOptions {
            session_sample_rate: 1.0,
            seed: Some(5),
            ..RunOptions::default()
        }
    }

    #[tokio::test]
    async fn zero_sample_rate_yields_empty_run() {
        let options = RunOptions {
            session_sample_rate: 0.0,
            ..all_sessions()
        };
        let outcome = pipeline(vec![record("a", "div", 2)], options)
            .run()
            .await
            .unwrap();
        assert_eq!(outcome.stats.listed, 1);
        assert_eq!(outcome.stats.sampled, 0);
        assert!(outcome.corpus.is_empty());
        assert!(outcome.representatives.is_empty());
    }

    #[tokio::test]
    async fn max_sessions_caps_the_listing() {
        let options = RunOptions {
            max_sessions: 2,
            ..all_sessions()
        };
        let records = vec![record("a", "p", 1), record("b", "p", 2), record("c", "p", 3)];
        let outcome = pipeline(records, options).run().await.unwrap();
        assert_eq!(outcome.stats.listed, 3);
        assert_eq!(outcome.stats.sampled, 2);
        assert_eq!(outcome.corpus.len(), 2);
    }

    #[tokio::test]
    async fn failed_sessions_are_counted_and_skipped() {
        let records = vec![
            record("a", "div", 1),
            SessionRecord::failed("b", Some("https://replays.test/b".into())),
        ];
        let outcome = pipeline(records, all_sessions()).run().await.unwrap();
        assert_eq!(outcome.stats.loaded, 1);
        assert_eq!(outcome.stats.failed, 1);
        assert_eq!(outcome.corpus.len(), 1);
    }

    #[tokio::test]
    async fn occurrences_sum_over_the_corpus() {
        let source = pipeline(vec![record("a", "li", 3), record("b", "li", 4)], all_sessions());
        let mut rng = StdRng::seed_from_u64(1);
        let build = source.build_corpus(&mut rng).await.unwrap();
        assert_eq!(build.feature_occurrences(), vec![2, 7]);
    }

    #[tokio::test]
    async fn invalid_options_are_rejected() {
        let options = RunOptions {
            session_sample_rate: 2.0,
            ..all_sessions()
        };
        assert!(pipeline(Vec::new(), options).run().await.is_err());
    }
}
