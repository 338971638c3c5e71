//! Label-level disposition.
//!
//! How per-field statuses roll up into approve / reject / needs-correction is
//! decided by the reviewing organisation, not by this crate. Callers plug a
//! [`DispositionPolicy`] into the matcher; without one no disposition is
//! produced.

use serde::{Deserialize, Serialize};

use crate::{fields::BeverageType, MatchStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelStatus {
    Approved,
    Rejected,
    NeedsCorrection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disposition {
    pub status: LabelStatus,
    /// Days the applicant has to correct the label, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_days: Option<u32>,
}

/// Per-field statuses in comparison order, as handed to a policy.
#[derive(Debug, Clone, Copy)]
pub struct FieldStatus<'a> {
    pub field_name: &'a str,
    pub status: MatchStatus,
}

pub trait DispositionPolicy: Send + Sync {
    fn decide(
        &self,
        statuses: &[FieldStatus<'_>],
        beverage_type: Option<BeverageType>,
        container_ml: Option<f64>,
    ) -> Disposition;
}

