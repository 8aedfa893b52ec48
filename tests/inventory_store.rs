use inventory_store::{
    ChangeKind, Column, Config, Database, Field, InventoryProvider, InventoryStore, ItemValues,
    ResourceKind, Selection, SortOrder, SqlValue, StoreError, Target,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

struct TestDb {
    path: PathBuf,
    database: Arc<Database>,
    store: InventoryStore,
}

// Helper function to setup a test database in its own file
fn setup_test_db() -> TestDb {
    let path = std::env::temp_dir().join(format!("inventory_test_{}.db", Uuid::new_v4()));
    let config = Config {
        database_url: format!("sqlite://{}", path.display()),
        ..Config::default()
    };

    let database = Arc::new(Database::new(config));
    let store = InventoryStore::new(database.clone());

    TestDb {
        path,
        database,
        store,
    }
}

// Helper function to clean up test database
async fn teardown_test_db(db: TestDb) {
    db.database.close().await;

    for suffix in ["", "-wal", "-shm", "-journal"] {
        let file = format!("{}{}", db.path.display(), suffix);
        if Path::new(&file).exists() {
            fs::remove_file(&file).expect("Failed to remove test database");
        }
    }
}

fn kraken() -> ItemValues {
    ItemValues::new()
        .name("Kraken V2")
        .price(20)
        .quantity(1)
        .supplier_name("Razer")
}

#[tokio::test]
async fn test_insert_defaults_supplier_phone() {
    let db = setup_test_db();

    let id = db.store.insert(&kraken()).await.expect("insert");
    let rows = db
        .store
        .query(Target::item(id), &[], None, None)
        .await
        .expect("query");

    assert_eq!(rows.len(), 1);
    let row = rows.first().unwrap();
    assert_eq!(row.id, Some(id));
    assert_eq!(row.name.as_deref(), Some("Kraken V2"));
    assert_eq!(row.price, Some(20));
    assert_eq!(row.quantity, Some(1));
    assert_eq!(row.supplier_name.as_deref(), Some("Razer"));
    assert_eq!(row.supplier_phone, Some(0));

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_insert_rejects_invalid_fields() {
    let db = setup_test_db();

    let cases = [
        (kraken().name(""), Field::Name),
        (kraken().price(-1), Field::Price),
        (kraken().quantity(-3), Field::Quantity),
        (kraken().supplier_name(""), Field::SupplierName),
        (kraken().with(Field::Price, SqlValue::Null), Field::Price),
    ];

    for (values, expected) in cases {
        match db.store.insert(&values).await {
            Err(StoreError::Validation(field)) => assert_eq!(field, expected),
            other => panic!("expected validation error on {}, got {:?}", expected, other),
        }
    }

    let rows = db
        .store
        .query(Target::collection(), &[], None, None)
        .await
        .unwrap();
    assert!(rows.is_empty());

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_ids_are_unique_and_never_reused() {
    let db = setup_test_db();

    let first = db.store.insert(&kraken()).await.unwrap();
    let second = db.store.insert(&kraken()).await.unwrap();
    assert_ne!(first, second);

    db.store.delete(Target::item(second), None).await.unwrap();
    let third = db.store.insert(&kraken()).await.unwrap();

    assert!(third > second);

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_update_item_target_ignores_selection() {
    let db = setup_test_db();

    let kraken_id = db.store.insert(&kraken()).await.unwrap();
    let other_id = db
        .store
        .insert(&kraken().name("BlackShark").supplier_name("Razer"))
        .await
        .unwrap();

    // The selection would match both rows, the item target narrows it to one
    let selection = Selection::new("supplierName = ?").bind("Razer");
    let rows = db
        .store
        .update(Target::item(kraken_id), &ItemValues::new().price(35), Some(selection))
        .await
        .unwrap();
    assert_eq!(rows, 1);

    let kraken = db.store.get_item(kraken_id).await.unwrap().unwrap();
    let other = db.store.get_item(other_id).await.unwrap().unwrap();
    assert_eq!(kraken.price, 35);
    assert_eq!(other.price, 20);

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_query_item_target_ignores_selection() {
    let db = setup_test_db();

    let kraken_id = db.store.insert(&kraken()).await.unwrap();
    db.store.insert(&kraken().name("BlackShark")).await.unwrap();
    db.store.insert(&kraken().name("Barracuda")).await.unwrap();

    // Matches every other row but not the addressed one
    let selection = Selection::new("id <> ?").bind(kraken_id);
    let rows = db
        .store
        .query(Target::item(kraken_id), &[], Some(selection), None)
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    let row = rows.first().unwrap();
    assert_eq!(row.id, Some(kraken_id));
    assert_eq!(row.name.as_deref(), Some("Kraken V2"));

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_update_coerces_negative_quantity() {
    let db = setup_test_db();
    let id = db.store.insert(&kraken()).await.unwrap();

    let rows = db
        .store
        .update(Target::item(id), &ItemValues::new().quantity(-5), None)
        .await
        .unwrap();

    assert_eq!(rows, 1);
    let item = db.store.get_item(id).await.unwrap().unwrap();
    assert_eq!(item.quantity, 0);
    assert_eq!(item.name, "Kraken V2");

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_update_rejects_blank_name() {
    let db = setup_test_db();
    let id = db.store.insert(&kraken()).await.unwrap();

    let result = db
        .store
        .update(Target::item(id), &ItemValues::new().name("  "), None)
        .await;
    assert!(matches!(result, Err(StoreError::Validation(Field::Name))));

    let item = db.store.get_item(id).await.unwrap().unwrap();
    assert_eq!(item.name, "Kraken V2");

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_empty_update_writes_nothing() {
    let db = setup_test_db();
    let id = db.store.insert(&kraken()).await.unwrap();
    let mut subscription = db.store.subscribe(Target::collection()).await;

    let rows = db
        .store
        .update(Target::item(id), &ItemValues::new(), None)
        .await
        .unwrap();

    assert_eq!(rows, 0);
    assert!(subscription.try_recv().is_none());

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_collection_update_with_selection() {
    let db = setup_test_db();

    db.store.insert(&kraken().quantity(0)).await.unwrap();
    db.store.insert(&kraken().quantity(4)).await.unwrap();
    db.store.insert(&kraken().quantity(9)).await.unwrap();

    let rows = db
        .store
        .update(
            Target::collection(),
            &ItemValues::new().price(15),
            Some(Selection::new("quantity > ?").bind(0)),
        )
        .await
        .unwrap();
    assert_eq!(rows, 2);

    let discounted = db
        .store
        .query(
            Target::collection(),
            &[Column::Quantity],
            Some(Selection::new("price = ?").bind(15)),
            Some(&SortOrder::asc(Column::Quantity)),
        )
        .await
        .unwrap();
    let quantities: Vec<_> = discounted.iter().filter_map(|row| row.quantity).collect();
    assert_eq!(quantities, vec![4, 9]);

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_query_projection_and_sort() {
    let db = setup_test_db();

    db.store.insert(&kraken().name("Beta")).await.unwrap();
    db.store.insert(&kraken().name("Alpha")).await.unwrap();

    let rows = db
        .store
        .query(
            Target::collection(),
            &[Column::Name],
            None,
            Some(&SortOrder::asc(Column::Name)),
        )
        .await
        .unwrap();

    let names: Vec<_> = rows.iter().filter_map(|row| row.name.clone()).collect();
    assert_eq!(names, vec!["Alpha", "Beta"]);
    assert!(rows.iter().all(|row| row.id.is_none() && row.price.is_none()));

    // Scanning twice yields the same rows
    assert_eq!(rows.iter().count(), rows.iter().count());

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_delete_then_query_is_empty() {
    let db = setup_test_db();
    let id = db.store.insert(&kraken()).await.unwrap();

    let rows = db.store.delete(Target::item(id), None).await.unwrap();
    assert_eq!(rows, 1);

    let remaining = db
        .store
        .query(Target::item(id), &[], None, None)
        .await
        .unwrap();
    assert!(remaining.is_empty());

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_delete_missing_item_is_silent() {
    let db = setup_test_db();
    let mut subscription = db.store.subscribe(Target::collection()).await;

    let rows = db.store.delete(Target::item(404), None).await.unwrap();

    assert_eq!(rows, 0);
    assert!(subscription.try_recv().is_none());

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_notifications_follow_writes() {
    let db = setup_test_db();
    let mut all_items = db.store.subscribe(Target::collection()).await;

    let id = db.store.insert(&kraken()).await.unwrap();
    let mut one_item = db.store.subscribe(Target::item(id)).await;

    db.store
        .update(Target::item(id), &ItemValues::new().quantity(3), None)
        .await
        .unwrap();
    db.store.delete(Target::item(id), None).await.unwrap();

    let inserted = all_items.recv().await.unwrap();
    assert_eq!(inserted.kind, ChangeKind::Inserted { id });
    assert_eq!(inserted.target, Target::Collection);

    let updated = all_items.recv().await.unwrap();
    assert_eq!(updated.kind, ChangeKind::Updated);
    assert_eq!(updated.target, Target::item(id));

    let deleted = all_items.recv().await.unwrap();
    assert_eq!(deleted.kind, ChangeKind::Deleted);

    assert_eq!(one_item.recv().await.unwrap().kind, ChangeKind::Updated);
    assert_eq!(one_item.recv().await.unwrap().kind, ChangeKind::Deleted);

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_unsubscribed_handle_receives_nothing() {
    let db = setup_test_db();
    let mut subscription = db.store.subscribe(Target::collection()).await;

    db.store.unsubscribe(&subscription).await.unwrap();
    db.store.insert(&kraken()).await.unwrap();

    assert!(subscription.try_recv().is_none());
    assert_eq!(db.store.notifier().subscriber_count().await, 0);

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_sell_and_restock() {
    let db = setup_test_db();
    let id = db.store.insert(&kraken()).await.unwrap();

    assert_eq!(db.store.sell_item(id).await.unwrap(), 0);
    assert!(matches!(
        db.store.sell_item(id).await,
        Err(StoreError::OutOfStock(out)) if out == id
    ));

    assert_eq!(db.store.restock_item(id, 5).await.unwrap(), 5);
    assert_eq!(db.store.restock_item(id, -10).await.unwrap(), 0);

    assert!(matches!(
        db.store.sell_item(999).await,
        Err(StoreError::ItemNotFound(999))
    ));

    teardown_test_db(db).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_sales_never_oversell() {
    let db = setup_test_db();

    for _ in 0..10 {
        let id = db.store.insert(&kraken()).await.unwrap();

        let (first, second) = tokio::join!(db.store.sell_item(id), db.store.sell_item(id));
        let sold = [&first, &second].iter().filter(|result| result.is_ok()).count();
        assert_eq!(sold, 1, "one unit sold twice: {:?} / {:?}", first, second);

        let failed = if first.is_ok() { second } else { first };
        assert!(matches!(failed, Err(StoreError::OutOfStock(out)) if out == id));

        let item = db.store.get_item(id).await.unwrap().unwrap();
        assert_eq!(item.quantity, 0);
    }

    teardown_test_db(db).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_restocks_add_up() {
    let db = setup_test_db();
    let id = db.store.insert(&kraken().quantity(0)).await.unwrap();

    for round in 1..=10 {
        let (first, second) = tokio::join!(
            db.store.restock_item(id, 5),
            db.store.restock_item(id, 5)
        );
        first.unwrap();
        second.unwrap();

        let item = db.store.get_item(id).await.unwrap().unwrap();
        assert_eq!(item.quantity, round * 10);
    }

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_stock_changes_notify_item_observers() {
    let db = setup_test_db();
    let id = db.store.insert(&kraken()).await.unwrap();
    let mut subscription = db.store.subscribe(Target::item(id)).await;

    db.store.sell_item(id).await.unwrap();
    assert!(db.store.sell_item(id).await.is_err());
    assert_eq!(db.store.restock_item(id, 1).await.unwrap(), 1);
    assert_eq!(db.store.restock_item(id, i64::MAX).await.unwrap(), i64::MAX);

    for _ in 0..3 {
        let event = subscription.try_recv().expect("stock change event");
        assert_eq!(event.target, Target::item(id));
        assert_eq!(event.kind, ChangeKind::Updated);
    }
    // The refused sale wrote nothing
    assert!(subscription.try_recv().is_none());

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_delete_all_and_sample_item() {
    let db = setup_test_db();

    let id = db.store.insert_sample_item().await.unwrap();
    db.store.insert_sample_item().await.unwrap();

    let sample = db.store.get_item(id).await.unwrap().unwrap();
    assert_eq!(sample.name, "Kraken V2");
    assert_eq!(sample.supplier_name, "Razer");

    assert_eq!(db.store.delete_all().await.unwrap(), 2);
    assert!(db.store.list_items().await.unwrap().is_empty());

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_resource_kind() {
    let db = setup_test_db();

    assert_eq!(
        db.store.resource_kind(Target::collection()),
        ResourceKind::Collection
    );
    assert_eq!(db.store.resource_kind(Target::item(1)), ResourceKind::Item);

    let parsed = "inventory/abc".parse::<Target>();
    assert!(matches!(parsed, Err(StoreError::UnsupportedTarget(_))));

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_schema_survives_reopen_and_resets_on_upgrade() {
    let db = setup_test_db();
    db.store.insert(&kraken()).await.unwrap();
    db.database.close().await;

    let url = format!("sqlite://{}", db.path.display());

    // Same version: rows are kept
    let reopened = Arc::new(Database::new(Config {
        database_url: url.clone(),
        ..Config::default()
    }));
    let store = InventoryStore::new(reopened.clone());
    assert_eq!(store.list_items().await.unwrap().len(), 1);
    reopened.close().await;

    // Newer version: table is dropped and recreated
    let upgraded = Arc::new(Database::new(Config {
        database_url: url,
        schema_version: 2,
        ..Config::default()
    }));
    let store = InventoryStore::new(upgraded.clone());
    assert!(store.list_items().await.unwrap().is_empty());
    assert_eq!(upgraded.schema_version().await.unwrap(), 2);
    upgraded.close().await;

    teardown_test_db(db).await;
}

#[tokio::test]
async fn test_closed_database_reports_storage_error() {
    let db = setup_test_db();
    db.store.insert(&kraken()).await.unwrap();
    db.database.close().await;

    let result = db.store.insert(&kraken()).await;
    assert!(matches!(result, Err(StoreError::Storage(_))));

    let result = db.store.delete(Target::collection(), None).await;
    assert!(matches!(result, Err(StoreError::Storage(_))));

    teardown_test_db(db).await;
}
