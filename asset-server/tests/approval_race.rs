//! 并发审批: 同一采购单被同时批准多次，只生成一条入库记录

use std::sync::Arc;

use asset_server::alerts::{AlertPropagator, StockAlertService};
use asset_server::approvals::ApprovalService;
use asset_server::core::config::ApprovalConfig;
use asset_server::db::DbService;
use asset_server::ledger::AssetLedger;
use asset_server::notify::OutboxHandle;
use shared::error::ErrorCode;
use shared::models::{
    ApprovalAction, ApprovalCreate, ApprovalDecision, ApprovalMetadata, ApprovalType,
    AssetCreate, AssetOperationType, OperationQuery, OperationStatus,
};

#[tokio::test]
async fn concurrent_purchase_approvals_create_one_inbound() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("assets.db");
    let db = DbService::new(path.to_str().expect("utf-8 path"))
        .await
        .expect("open database");
    let alerts: Arc<dyn AlertPropagator> = Arc::new(StockAlertService::new(db.pool.clone()));
    let approvals = ApprovalService::new(
        db.pool.clone(),
        ApprovalConfig::default(),
        alerts,
        OutboxHandle::new(),
    );
    let assets = AssetLedger::new(db.pool.clone());

    let laptop = assets
        .create_asset(AssetCreate {
            name: "Laptop".into(),
            category: Some("it".into()),
            status: None,
            owner_id: None,
        })
        .await
        .expect("create asset");
    let purchase = approvals
        .create(ApprovalCreate {
            approval_type: ApprovalType::Purchase,
            title: "Buy laptop".into(),
            reason: None,
            applicant_id: "alice".into(),
            approver_id: Some("boss".into()),
            asset_id: Some(laptop.id),
            consumable_id: None,
            asset_operation_id: None,
            consumable_operation_id: None,
            external_todo_id: None,
            metadata: ApprovalMetadata::default(),
        })
        .await
        .expect("create approval");

    let approval_id = purchase.id;
    let mut handles = Vec::new();
    for i in 0..6 {
        let approvals = approvals.clone();
        handles.push(tokio::spawn(async move {
            approvals
                .decide(
                    approval_id,
                    ApprovalDecision {
                        action: ApprovalAction::Approve,
                        actor_id: format!("boss-{i}"),
                        comment: None,
                    },
                )
                .await
        }));
    }

    let mut approved = 0;
    for handle in handles {
        match handle.await.expect("join") {
            Ok(_) => approved += 1,
            Err(e) => assert_eq!(e.code, ErrorCode::ApprovalNotPending),
        }
    }
    assert_eq!(approved, 1, "exactly one decision should commit");

    let ops = assets
        .list_operations(laptop.id, &OperationQuery::default())
        .await
        .expect("list operations");
    assert_eq!(ops.total, 1);
    assert_eq!(ops.items[0].op_type, AssetOperationType::Inbound);
    assert_eq!(ops.items[0].status, OperationStatus::Pending);
    assert_eq!(ops.items[0].generated_from_approval_id, Some(approval_id));

    db.pool.close().await;
}
