pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod normalize;

pub use config::{AnalyticsSettings, AppConfig, ConfigError, LoadOptions, LogFormat, LoggingConfig};
pub use domain::commitment::{resolve_performer, Commitment, NO_COMMITMENT};
pub use domain::opportunity::Opportunity;
pub use domain::record::{AnalyticRecord, CoverageGapRecord};
pub use domain::RawRecord;
pub use engine::{
    FilterValues, PipelineEngine, PipelineReport, PipelineSummary,
};
pub use errors::EngineError;
pub use normalize::{
    clean, parse_close_date, parse_currency, parse_probability, sequence_number, ParsedDate,
    Probability,
};
