//! Sequential Bayesian evidence aggregation with multi-criteria stopping
//! rules.
//!
//! The crate turns a stream of heterogeneous, imperfectly-reliable evidence
//! into an updated probability estimate with a full audit trail, and uses a
//! declarative, composable stopping policy to decide when enough evidence
//! has been gathered. Quality judgment and likelihood estimation are
//! external collaborators injected through the [`assessor`] traits.

pub mod assessment;
pub mod assessor;
pub mod bayes;
pub mod collection;
pub mod config;
pub mod controller;
pub mod error;
pub mod evidence;
pub mod stopping;
pub mod weight;

pub use assessment::{LikelihoodAssessment, QualityAssessment};
pub use assessor::{EvidenceQualityAssessor, LikelihoodEstimator};
pub use bayes::{BayesianUpdateEngine, BeliefState, BeliefUpdate};
pub use collection::CollectionState;
pub use config::{
    CombinationStrategy, ConsultationMode, ControllerConfig, RuleKind, StoppingConstraints,
};
pub use controller::{
    AggregationController, AggregationOutcome, AggregationResult, AggregationRun, CancelHandle,
    EvidenceRecord,
};
pub use error::{AssessorError, CredenceError, Result};
pub use evidence::{Evidence, EvidenceType};
pub use stopping::{DecisionTrace, RuleSignal, StoppingDecision, StoppingRuleEngine};
pub use weight::EvidenceWeightCalculator;
