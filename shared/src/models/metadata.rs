//! Typed metadata blobs
//!
//! Approvals and ledger entries carry free-form structured data coming from
//! operation templates. Known fields are typed; anything else lands in the
//! flattened `extra` map and round-trips untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Configuration captured when an approval request is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalConfigSnapshot {
    pub require_approver: bool,
    pub default_approver_id: Option<String>,
    pub captured_at: i64,
}

/// Metadata attached to an approval request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApprovalMetadata {
    /// Operation template field values filled in by the applicant
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub template_fields: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_snapshot: Option<ApprovalConfigSnapshot>,
    /// New owner / holder of the asset after approval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_user_id: Option<String>,
    /// Name for the asset created by a purchase with no existing asset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_category: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Metadata attached to an asset or consumable ledger entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationMetadata {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub template_fields: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicant_id: Option<String>,
    /// Approval that materialized this entry at decision time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_approval_id: Option<i64>,
    /// Purchase approval this follow-up inbound entry was generated from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_generated_from_approval_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OperationMetadata {
    /// Carry an approval's template data over to a ledger entry
    pub fn from_approval(
        approval_id: i64,
        reason: Option<String>,
        applicant_id: &str,
        meta: &ApprovalMetadata,
    ) -> Self {
        Self {
            template_fields: meta.template_fields.clone(),
            target_user_id: meta.target_user_id.clone(),
            reason,
            applicant_id: Some(applicant_id.to_string()),
            source_approval_id: Some(approval_id),
            auto_generated_from_approval_id: None,
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_keys_land_in_extra() {
        let meta: ApprovalMetadata = serde_json::from_value(json!({
            "template_fields": { "vendor": "ACME" },
            "target_user_id": "u-7",
            "cost_center": "R&D"
        }))
        .unwrap();
        assert_eq!(meta.target_user_id.as_deref(), Some("u-7"));
        assert_eq!(meta.template_fields["vendor"], "ACME");
        assert_eq!(meta.extra["cost_center"], "R&D");

        let back = serde_json::to_value(&meta).unwrap();
        assert_eq!(back["cost_center"], "R&D");
        assert!(back.get("asset_name").is_none());
    }

    #[test]
    fn from_approval_copies_template() {
        let mut meta = ApprovalMetadata::default();
        meta.template_fields.insert("qty".into(), json!(3));
        meta.target_user_id = Some("u-1".into());

        let op = OperationMetadata::from_approval(11, Some("need it".into()), "u-2", &meta);
        assert_eq!(op.source_approval_id, Some(11));
        assert_eq!(op.applicant_id.as_deref(), Some("u-2"));
        assert_eq!(op.template_fields["qty"], 3);
        assert_eq!(op.target_user_id.as_deref(), Some("u-1"));
        assert!(op.auto_generated_from_approval_id.is_none());
    }
}
