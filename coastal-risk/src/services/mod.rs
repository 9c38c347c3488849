//! Observation scoring services and external condition sources

pub mod conditions;
pub mod indigenous_aggregator;
pub mod observation_validator;

pub use conditions::{
    conditions_source, ConditionsSource, CurrentConditions, FallbackConditions, FileConditions,
    FixedConditions,
};
pub use indigenous_aggregator::{AggregateScoreResult, IndigenousScoreAggregator};
pub use observation_validator::{ObservationValidator, RecentObservationsQuery, Submission};
