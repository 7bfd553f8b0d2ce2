mod constraints;
mod controller;

pub use constraints::{CombinationStrategy, RuleKind, StoppingConstraints};
pub use controller::{ConsultationMode, ControllerConfig};
