use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Trigger record shapes
// ---------------------------------------------------------------------------

/// What kind of contractual change a variation represents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VariationCategory {
    ScopeChange,
    UnforeseenConditions,
    ComplianceChange,
    #[default]
    Other,
}

/// A contract variation (change order).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    pub reference: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: VariationCategory,
    #[serde(default)]
    pub estimated_value: f64,
    /// Work-area terms the variation is declared against.
    #[serde(default)]
    pub work_areas: Vec<String>,
}

/// A risk or early-warning notice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskNotice {
    pub reference: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub affected_areas: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResourceChangeKind {
    /// The resource cannot be used for `delay_days`.
    Unavailable,
    /// A more productive resource replaces the current one.
    Upgrade,
    /// Extra capacity; informational only.
    Added,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceChange {
    #[serde(default)]
    pub reference: String,
    pub resource_name: String,
    pub change_type: ResourceChangeKind,
    #[serde(default)]
    pub delay_days: i64,
}

/// A delay originating outside the contract (weather, authorities, utilities).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExternalDelay {
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub description: String,
    pub delay_days: i64,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub work_areas: Vec<String>,
}

/// One externally sourced event that may require a schedule edit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
    Variation(Variation),
    RiskNotice(RiskNotice),
    ResourceChange(ResourceChange),
    ExternalDelay(ExternalDelay),
}

impl Trigger {
    pub fn reference(&self) -> &str {
        match self {
            Trigger::Variation(v) => &v.reference,
            Trigger::RiskNotice(r) => &r.reference,
            Trigger::ResourceChange(r) => &r.reference,
            Trigger::ExternalDelay(d) => &d.reference,
        }
    }
}

// ---------------------------------------------------------------------------
// Bundle
// ---------------------------------------------------------------------------

/// The four trigger lists handed to a change run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TriggerBundle {
    pub variations: Vec<Variation>,
    pub risk_notices: Vec<RiskNotice>,
    pub resource_changes: Vec<ResourceChange>,
    pub external_delays: Vec<ExternalDelay>,
}

impl TriggerBundle {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.variations.len()
            + self.risk_notices.len()
            + self.resource_changes.len()
            + self.external_delays.len()
    }

    /// Triggers in processing order: variations, risk notices, resource
    /// changes, external delays; input order within each group.
    pub fn triggers(&self) -> impl Iterator<Item = Trigger> + '_ {
        self.variations
            .iter()
            .cloned()
            .map(Trigger::Variation)
            .chain(self.risk_notices.iter().cloned().map(Trigger::RiskNotice))
            .chain(
                self.resource_changes
                    .iter()
                    .cloned()
                    .map(Trigger::ResourceChange),
            )
            .chain(
                self.external_delays
                    .iter()
                    .cloned()
                    .map(Trigger::ExternalDelay),
            )
    }
}
