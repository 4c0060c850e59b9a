use extract::TextMiner;
use ingest::{DiscussionSource, parse_submission_id};
use places::PlacesDirectory;
use tracing::info;

use crate::category::Category;
use crate::error::PipelineError;
use crate::scorer::{CommunityScorer, SourceItem};
use crate::schema::ValidatedLocation;
use crate::validator::Validator;

/// Result of one pipeline run with the counts the service reports.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub locations: Vec<ValidatedLocation>,
    pub source_items: usize,
    pub mentions_mined: usize,
    pub candidates_ranked: usize,
}

/// Discussion in, ranked and directory-confirmed locations out.
///
/// Holds no per-run state; every call builds its own candidate collections.
pub struct LocationPipeline<S, D> {
    source: S,
    scorer: CommunityScorer,
    validator: Validator<D>,
}

impl<S: DiscussionSource, D: PlacesDirectory> LocationPipeline<S, D> {
    pub fn new(source: S, directory: D) -> Self {
        Self {
            source,
            scorer: CommunityScorer::default(),
            validator: Validator::new(directory),
        }
    }

    pub fn with_miner(mut self, miner: TextMiner) -> Self {
        self.scorer = CommunityScorer::new(miner);
        self
    }

    pub fn directory(&self) -> &D {
        self.validator.directory()
    }

    pub async fn extract_top_locations(
        &self,
        reference: &str,
        city: &str,
        category: &str,
        target_count: usize,
    ) -> Result<Vec<ValidatedLocation>, PipelineError> {
        Ok(self.run(reference, city, category, target_count).await?.locations)
    }

    pub async fn run(
        &self,
        reference: &str,
        city: &str,
        category: &str,
        target_count: usize,
    ) -> Result<PipelineRun, PipelineError> {
        let category: Category = category.parse()?;
        let submission_id = parse_submission_id(reference)
            .ok_or_else(|| PipelineError::InvalidReference(reference.to_string()))?;

        info!(%submission_id, city, %category, target_count, "Extracting locations");

        let discussion = self
            .source
            .fetch(&submission_id)
            .await
            .map_err(PipelineError::SourceUnavailable)?;

        let items = SourceItem::from_discussion(&discussion);
        let ranking = self.scorer.rank(&items, target_count);
        let candidates_ranked = ranking.candidates.len();

        let locations = self
            .validator
            .validate(ranking.candidates, city, category)
            .await
            .into_iter()
            .map(|location| location.with_source_url(reference))
            .collect::<Vec<_>>();

        info!(
            %submission_id,
            mentions = ranking.mentions_mined,
            ranked = candidates_ranked,
            validated = locations.len(),
            "Extraction complete"
        );

        Ok(PipelineRun {
            locations,
            source_items: items.len(),
            mentions_mined: ranking.mentions_mined,
            candidates_ranked,
        })
    }
}
