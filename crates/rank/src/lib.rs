pub mod category;
pub mod error;
pub mod pipeline;
pub mod schema;
pub mod scorer;
pub mod scoring;
pub mod validator;

pub use category::Category;
pub use error::PipelineError;
pub use pipeline::{LocationPipeline, PipelineRun};
pub use schema::ValidatedLocation;
pub use scorer::{CommunityScorer, Ranking, SourceItem, SourceKind};
pub use validator::{Validator, Verdict, judge};
