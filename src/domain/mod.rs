pub mod feature;
pub mod prediction;
pub mod response;
pub mod state;

pub use feature::*;
pub use prediction::*;
pub use response::{detail_message, LabelPolicy, ResultIssue, DEFAULT_LABEL_KEYS};
pub use state::*;
