pub mod contest;
pub mod creator;
pub mod payment;
pub mod submission;
pub mod user;

pub use contest::*;
pub use creator::*;
pub use payment::*;
pub use submission::*;
pub use user::*;

use serde::Serialize;

/// Outcome of a filtered update; a zero `matched_count` means the filter did not hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
}

impl UpdateOutcome {
    pub fn matched(&self) -> bool {
        self.matched_count > 0
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub success: bool,
    pub inserted_id: String,
}

impl InsertOutcome {
    pub fn new(inserted_id: String) -> Self {
        Self {
            success: true,
            inserted_id,
        }
    }
}
