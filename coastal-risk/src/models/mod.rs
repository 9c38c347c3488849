//! Domain records for community observations

pub mod category;
pub mod observation;
pub mod observer;

pub use category::{ObservationCategory, Severity};
pub use observation::{
    NewObservation, Observation, ValidationRecord, ValidationResult, ValidationState,
    ANONYMOUS_OBSERVER_NAME,
};
pub use observer::{Observer, ObserverRole, DEFAULT_ACCURACY_SCORE};
