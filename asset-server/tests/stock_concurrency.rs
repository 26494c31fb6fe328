//! 并发出库: 文件数据库 (WAL) 上两个同时提交的出库只能成功一个

use std::sync::Arc;

use asset_server::alerts::StockAlertService;
use asset_server::db::DbService;
use asset_server::ledger::ConsumableLedger;
use shared::error::ErrorCode;
use shared::models::{
    ConsumableCreate, ConsumableOperationCreate, ConsumableOperationType, OperationMetadata,
    OperationStatus,
};

fn outbound(quantity: i64, actor: &str) -> ConsumableOperationCreate {
    ConsumableOperationCreate {
        op_type: ConsumableOperationType::Outbound,
        status: OperationStatus::Done,
        quantity_delta: -quantity,
        reserved_delta: 0,
        actor_id: actor.into(),
        note: None,
        metadata: OperationMetadata::default(),
    }
}

#[tokio::test]
async fn concurrent_outbound_never_overdraws() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("assets.db");
    let db = DbService::new(path.to_str().expect("utf-8 path"))
        .await
        .expect("open database");
    let ledger = ConsumableLedger::new(
        db.pool.clone(),
        Arc::new(StockAlertService::new(db.pool.clone())),
    );

    let toner = ledger
        .create_consumable(ConsumableCreate {
            name: "Toner".into(),
            category: Some("printing".into()),
            unit: Some("box".into()),
            keeper_id: None,
            safety_stock: 0,
            initial_quantity: 10,
            actor_id: "admin".into(),
        })
        .await
        .expect("create consumable");

    let id = toner.id;
    let (a, b) = {
        let la = ledger.clone();
        let lb = ledger.clone();
        let ta = tokio::spawn(async move { la.create_operation(id, outbound(8, "alice")).await });
        let tb = tokio::spawn(async move { lb.create_operation(id, outbound(8, "bob")).await });
        (ta.await.expect("join"), tb.await.expect("join"))
    };

    let results = [a, b];
    let ok = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(ok, 1, "exactly one outbound should commit");
    let err = results
        .iter()
        .find_map(|r| r.as_ref().err())
        .expect("one outbound fails");
    assert_eq!(err.code, ErrorCode::InsufficientStock);

    let after = ledger.get_consumable(id).await.expect("reload");
    assert_eq!(after.quantity, 2);

    db.pool.close().await;
}

#[tokio::test]
async fn many_small_outbounds_add_up() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("assets.db");
    let db = DbService::new(path.to_str().expect("utf-8 path"))
        .await
        .expect("open database");
    let ledger = ConsumableLedger::new(
        db.pool.clone(),
        Arc::new(StockAlertService::new(db.pool.clone())),
    );

    let pens = ledger
        .create_consumable(ConsumableCreate {
            name: "Pens".into(),
            category: None,
            unit: None,
            keeper_id: None,
            safety_stock: 0,
            initial_quantity: 20,
            actor_id: "admin".into(),
        })
        .await
        .expect("create consumable");

    let id = pens.id;
    let mut handles = Vec::new();
    for i in 0..10 {
        let ledger = ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger
                .create_operation(id, outbound(1, &format!("u-{i}")))
                .await
        }));
    }
    for handle in handles {
        handle.await.expect("join").expect("outbound");
    }

    let after = ledger.get_consumable(id).await.expect("reload");
    assert_eq!(after.quantity, 10);

    db.pool.close().await;
}
