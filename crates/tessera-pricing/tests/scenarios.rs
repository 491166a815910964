//! End-to-end pricing scenarios over an in-memory SQLite database.

use std::sync::Arc;

use tessera_core::transfer::{decode_payload, CsvFormat};
use tessera_core::{
    CalculationContext, ChangeAttribution, CoreError, Currency, HistoryFilter, PriceCreateInput,
    RegionalFilter, VariantListQuery, VariantSummary, MAX_HISTORY_ENTRIES,
};
use tessera_db::{Database, DbConfig};
use tessera_pricing::{
    ExportFilter, PricingEngine, PricingError, PricingPorts, VariantPriceUpdate,
};

async fn setup() -> (Database, PricingEngine) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    for (id, sku) in [("variant_1", "SHIRT-M"), ("variant_2", "SHIRT-L"), ("variant_3", "BELT")] {
        db.catalog()
            .upsert(&VariantSummary {
                id: id.to_string(),
                product_id: "prod_1".to_string(),
                product_title: "Linen Shirt".to_string(),
                title: id.to_string(),
                sku: Some(sku.to_string()),
            })
            .await
            .unwrap();
    }

    let ports = PricingPorts {
        catalog: Arc::new(db.catalog()),
        price_reader: Arc::new(db.prices()),
        price_writer: Arc::new(db.prices()),
        regional: Arc::new(db.regional_prices()),
        history: Arc::new(db.price_history()),
        records: Arc::new(db.clone()),
    };
    let (engine, worker) = PricingEngine::new(ports, 256);
    tokio::spawn(worker.run());

    (db, engine)
}

fn attribution() -> ChangeAttribution {
    ChangeAttribution::new("user_1", "test")
}

#[tokio::test]
async fn ensure_price_set_is_idempotent() {
    let (_db, engine) = setup().await;

    let first = engine.store.ensure_price_set("variant_1").await.unwrap();
    let second = engine.store.ensure_price_set("variant_1").await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn bulk_set_creates_then_updates() {
    let (_db, engine) = setup().await;
    let inputs = [PriceCreateInput::new("eur", 2999), PriceCreateInput::new("usd", 3299)];

    let first = engine
        .store
        .bulk_set_variant_prices("variant_1", &inputs, &attribution())
        .await
        .unwrap();
    assert_eq!((first.created, first.updated), (2, 0));
    assert_eq!(engine.store.get_variant_prices("variant_1").await.unwrap().len(), 2);

    let second = engine
        .store
        .bulk_set_variant_prices("variant_1", &inputs, &attribution())
        .await
        .unwrap();
    assert_eq!((second.created, second.updated), (0, 2));
    assert_eq!(engine.store.get_variant_prices("variant_1").await.unwrap().len(), 2);
}

#[tokio::test]
async fn bulk_set_is_fail_fast_on_validation() {
    let (_db, engine) = setup().await;
    let inputs = [PriceCreateInput::new("eur", 100), PriceCreateInput::new("zzz", 100)];

    let err = engine
        .store
        .bulk_set_variant_prices("variant_1", &inputs, &attribution())
        .await
        .unwrap_err();

    assert!(matches!(err, PricingError::Core(CoreError::InvalidPrice(_))));
    assert!(engine.store.get_variant_prices("variant_1").await.unwrap().is_empty());
}

#[tokio::test]
async fn same_currency_twice_in_one_batch_creates_once() {
    let (_db, engine) = setup().await;
    let inputs = [PriceCreateInput::new("eur", 100), PriceCreateInput::new("eur", 200)];

    let result = engine
        .store
        .bulk_set_variant_prices("variant_1", &inputs, &attribution())
        .await
        .unwrap();

    assert_eq!((result.created, result.updated), (1, 1));
    let prices = engine.store.get_variant_prices("variant_1").await.unwrap();
    assert_eq!(prices.len(), 1);
    assert_eq!(prices[0].amount, 200);
}

#[tokio::test]
async fn unknown_variant_cannot_be_priced() {
    let (_db, engine) = setup().await;

    let err = engine
        .store
        .set_variant_price("variant_404", "eur", 100)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(engine.store.get_variant_prices("variant_404").await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_keeps_empty_price_set() {
    let (_db, engine) = setup().await;
    let set_id = engine.store.ensure_price_set("variant_1").await.unwrap();
    engine.store.set_variant_price("variant_1", "eur", 2999).await.unwrap();
    engine.store.set_variant_price("variant_1", "gbp", 2599).await.unwrap();

    assert_eq!(engine.store.delete_variant_prices("variant_1").await.unwrap(), 2);
    assert!(engine.store.get_variant_prices("variant_1").await.unwrap().is_empty());
    assert_eq!(engine.store.ensure_price_set("variant_1").await.unwrap(), set_id);
}

#[tokio::test]
async fn history_keeps_newest_entries_only() {
    let (_db, engine) = setup().await;

    for amount in 1..=(MAX_HISTORY_ENTRIES as i64 + 5) {
        engine
            .store
            .set_variant_price("variant_1", "eur", amount)
            .await
            .unwrap();
    }
    engine.history.flush().await.unwrap();

    let history = engine
        .history
        .get_price_history("variant_1", &HistoryFilter::default())
        .await
        .unwrap();

    assert_eq!(history.len(), MAX_HISTORY_ENTRIES as usize);
    assert_eq!(history[0].new_amount, MAX_HISTORY_ENTRIES as i64 + 5);
    assert!(history.iter().all(|e| e.new_amount > 5));
}

#[tokio::test]
async fn unchanged_amount_records_no_history() {
    let (_db, engine) = setup().await;
    let inputs = [PriceCreateInput::new("eur", 2999)];

    engine.store.bulk_set_variant_prices("variant_1", &inputs, &attribution()).await.unwrap();
    engine.store.bulk_set_variant_prices("variant_1", &inputs, &attribution()).await.unwrap();
    engine.history.flush().await.unwrap();

    let trail = engine.audit_trail("variant_1").await.unwrap();
    assert_eq!(trail.total_changes, 1);
    assert_eq!(trail.variant_title.as_deref(), Some("variant_1"));
    assert_eq!(trail.history[0].changed_by.as_deref(), Some("user_1"));
    assert_eq!(trail.history[0].old_amount, None);
}

#[tokio::test]
async fn regional_override_layers_over_base_price() {
    let (_db, engine) = setup().await;
    engine.store.set_variant_price("variant_1", "eur", 2999).await.unwrap();
    engine
        .regional
        .set_regional_price("variant_1", "reg_fr", "eur", 3499, &attribution())
        .await
        .unwrap();

    // Base resolution ignores overrides.
    let base = engine
        .resolver
        .calculate_price(&CalculationContext::new("variant_1", Currency::Eur))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(base.amount, 2999);

    let overrides = engine
        .regional
        .get_regional_prices(
            "variant_1",
            &RegionalFilter {
                region_id: Some("reg_fr".to_string()),
                currency_code: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(overrides.len(), 1);
    assert_eq!(overrides[0].amount, 3499);

    let in_france = engine
        .resolver
        .effective_price(&CalculationContext::new("variant_1", Currency::Eur).in_region("reg_fr"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(in_france.amount, 3499);
    assert_eq!(in_france.original_amount, Some(2999));

    let in_germany = engine
        .resolver
        .effective_price(&CalculationContext::new("variant_1", Currency::Eur).in_region("reg_de"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(in_germany.amount, 2999);
    assert!(!in_germany.is_override);
}

#[tokio::test]
async fn regional_write_is_recorded_with_region() {
    let (_db, engine) = setup().await;
    engine
        .regional
        .set_regional_price("variant_1", "reg_fr", "eur", 3499, &attribution())
        .await
        .unwrap();
    engine.history.flush().await.unwrap();

    let history = engine
        .history
        .get_price_history("variant_1", &HistoryFilter::default())
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].region_id.as_deref(), Some("reg_fr"));
}

#[tokio::test]
async fn delete_missing_override_is_false() {
    let (_db, engine) = setup().await;
    let deleted = engine
        .regional
        .delete_regional_price("variant_1", "reg_fr", Currency::Eur)
        .await
        .unwrap();
    assert!(!deleted);
}

#[tokio::test]
async fn quantity_tiers_bound_resolution() {
    let (_db, engine) = setup().await;
    engine
        .store
        .bulk_set_variant_prices(
            "variant_2",
            &[PriceCreateInput::new("eur", 2500).with_tier(Some(10), Some(49))],
            &attribution(),
        )
        .await
        .unwrap();

    let small = engine
        .resolver
        .calculate_price(&CalculationContext::new("variant_2", Currency::Eur).with_quantity(5))
        .await
        .unwrap();
    assert!(small.is_none());

    let bulk = engine
        .resolver
        .calculate_price(&CalculationContext::new("variant_2", Currency::Eur).with_quantity(10))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bulk.amount, 2500);
    assert_eq!(bulk.min_quantity, Some(10));
}

#[tokio::test]
async fn bulk_update_isolates_failing_variants() {
    let (_db, engine) = setup().await;
    let updates = vec![
        VariantPriceUpdate {
            variant_id: "variant_1".to_string(),
            prices: vec![PriceCreateInput::new("eur", 2999)],
        },
        VariantPriceUpdate {
            variant_id: "variant_404".to_string(),
            prices: vec![PriceCreateInput::new("eur", 2999)],
        },
        VariantPriceUpdate {
            variant_id: "variant_2".to_string(),
            prices: vec![PriceCreateInput::new("xyz", 2999)],
        },
    ];

    let result = engine.reconciler.bulk_update(&updates, &attribution()).await;

    assert_eq!(result.created, 1);
    assert_eq!(result.errors.len(), 2);
    assert_eq!(result.errors[0].variant_id, "variant_404");
    assert_eq!(result.errors[1].variant_id, "variant_2");
}

#[tokio::test]
async fn csv_import_isolates_bad_rows() {
    let (_db, engine) = setup().await;
    let csv = "variant_id,sku,currency_code,amount\nvariant_1,,eur,\nvariant_1,,usd,3299\n";

    let result = engine
        .reconciler
        .import_csv(csv, false, &attribution())
        .await
        .unwrap();

    assert_eq!(result.total_rows, 2);
    assert_eq!(result.failed, 1);
    assert_eq!(result.successful, 1);
    assert_eq!(result.errors[0].row, 2);

    let prices = engine.store.get_variant_prices("variant_1").await.unwrap();
    assert_eq!(prices.len(), 1);
    assert_eq!(prices[0].currency_code, Currency::Usd);
}

#[tokio::test]
async fn csv_import_resolves_skus_and_regions() {
    let (_db, engine) = setup().await;
    let csv = "variant_id,sku,currency_code,amount,region_id\n\
               ,SHIRT-L,EUR,1999,\n\
               ,NOPE,eur,1999,\n\
               variant_3,,eur,4999,reg_fr\n";

    let result = engine
        .reconciler
        .import_csv(csv, false, &attribution())
        .await
        .unwrap();

    assert_eq!(result.successful, 2);
    assert_eq!(result.failed, 1);
    assert_eq!(result.errors[0].error, "Variant not found for SKU: NOPE");

    assert_eq!(engine.store.get_variant_prices("variant_2").await.unwrap()[0].amount, 1999);
    let overrides = engine
        .regional
        .get_regional_prices("variant_3", &RegionalFilter::default())
        .await
        .unwrap();
    assert_eq!(overrides[0].key(), "reg_fr_eur");
}

#[tokio::test]
async fn csv_dry_run_writes_nothing_but_validates() {
    let (_db, engine) = setup().await;
    let csv = "variant_id,sku,currency_code,amount\nvariant_1,,eur,2999\nvariant_404,,eur,2999\nvariant_2,,eur,-5\n";

    let result = engine
        .reconciler
        .import_csv(csv, true, &attribution())
        .await
        .unwrap();

    assert_eq!(result.successful, 1);
    assert_eq!(result.failed, 2);
    assert!(engine.store.get_variant_prices("variant_1").await.unwrap().is_empty());
}

#[tokio::test]
async fn csv_import_without_required_headers_fails() {
    let (_db, engine) = setup().await;
    let payload = decode_payload("variant_id,price\nv,1\n", CsvFormat::Text)
        .unwrap();

    let err = engine
        .reconciler
        .import_csv(&payload, false, &attribution())
        .await
        .unwrap_err();
    assert!(matches!(err, PricingError::Core(CoreError::Csv(_))));
}

#[tokio::test]
async fn export_includes_placeholder_rows() {
    let (_db, engine) = setup().await;
    engine.store.set_variant_price("variant_1", "eur", 2999).await.unwrap();
    engine.store.set_variant_price("variant_1", "usd", 3299).await.unwrap();

    let csv = engine
        .reconciler
        .export_csv(&ExportFilter::default(), 5000)
        .await
        .unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(
        lines[0],
        "variant_id,sku,variant_title,product_title,currency_code,amount,formatted_amount,region_id,min_quantity,max_quantity"
    );
    // 2 priced rows for variant_1, one placeholder each for variant_2 and variant_3
    assert_eq!(lines.len(), 5);
    assert!(lines.iter().any(|l| l.starts_with("variant_2,SHIRT-L,variant_2,Linen Shirt,eur,0,")));
}

#[tokio::test]
async fn region_export_adds_override_rows_and_round_trips() {
    let (_db, engine) = setup().await;
    engine.store.set_variant_price("variant_1", "eur", 2999).await.unwrap();
    engine
        .regional
        .set_regional_price("variant_1", "reg_fr", "eur", 3499, &attribution())
        .await
        .unwrap();
    // Override in a currency without a base price.
    engine
        .regional
        .set_regional_price("variant_3", "reg_fr", "usd", 4599, &attribution())
        .await
        .unwrap();

    let filter = ExportFilter {
        region_id: Some("reg_fr".to_string()),
        ..ExportFilter::default()
    };
    let csv = engine.reconciler.export_csv(&filter, 5000).await.unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    // header, variant_1 base + override, variant_2 placeholder, variant_3 override
    assert_eq!(lines.len(), 5);
    assert!(lines.contains(&"variant_1,SHIRT-M,variant_1,Linen Shirt,eur,2999,29.99 €,,,"));
    assert!(lines.contains(&"variant_1,SHIRT-M,variant_1,Linen Shirt,eur,3499,34.99 €,reg_fr,,"));
    assert!(lines.contains(&"variant_3,BELT,variant_3,Linen Shirt,usd,4599,$45.99,reg_fr,,"));
    assert!(lines
        .iter()
        .any(|l| l.starts_with("variant_2,SHIRT-L,variant_2,Linen Shirt,eur,0,") && l.ends_with(",reg_fr,,")));

    let result = engine
        .reconciler
        .import_csv(&csv, true, &attribution())
        .await
        .unwrap();
    assert_eq!(result.failed, 0);
    assert_eq!(result.successful, 4);
}

#[tokio::test]
async fn tiered_update_never_inverts_stored_bounds() {
    let (_db, engine) = setup().await;
    engine
        .store
        .bulk_set_variant_prices(
            "variant_1",
            &[PriceCreateInput::new("eur", 3000).with_tier(Some(1), Some(9))],
            &attribution(),
        )
        .await
        .unwrap();

    let result = engine
        .store
        .bulk_set_variant_prices(
            "variant_1",
            &[PriceCreateInput::new("eur", 2500).with_tier(Some(10), None)],
            &attribution(),
        )
        .await
        .unwrap();
    assert_eq!((result.created, result.updated), (1, 0));

    let mut tiers: Vec<_> = engine
        .store
        .get_variant_prices("variant_1")
        .await
        .unwrap()
        .iter()
        .map(|p| (p.amount, p.min_quantity, p.max_quantity))
        .collect();
    tiers.sort();
    assert_eq!(tiers, vec![(2500, Some(10), None), (3000, Some(1), Some(9))]);

    let bulk = engine
        .resolver
        .calculate_price(&CalculationContext::new("variant_1", Currency::Eur).with_quantity(15))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bulk.amount, 2500);

    let single = engine
        .resolver
        .calculate_price(&CalculationContext::new("variant_1", Currency::Eur).with_quantity(5))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(single.amount, 3000);
}

#[tokio::test]
async fn exported_tiers_import_back_unchanged() {
    let (_db, engine) = setup().await;
    engine
        .store
        .bulk_set_variant_prices(
            "variant_1",
            &[
                PriceCreateInput::new("eur", 3000).with_tier(Some(1), Some(9)),
                PriceCreateInput::new("eur", 2500).with_tier(Some(10), None),
            ],
            &attribution(),
        )
        .await
        .unwrap();

    let tiers = |prices: Vec<tessera_core::Price>| {
        let mut tiers: Vec<_> = prices
            .iter()
            .map(|p| (p.currency_code, p.amount, p.min_quantity, p.max_quantity))
            .collect();
        tiers.sort_by_key(|t| (t.2, t.3));
        tiers
    };
    let before = tiers(engine.store.get_variant_prices("variant_1").await.unwrap());

    let csv = engine
        .reconciler
        .export_csv(&ExportFilter::default(), 5000)
        .await
        .unwrap();
    let result = engine
        .reconciler
        .import_csv(&csv, false, &attribution())
        .await
        .unwrap();
    assert_eq!(result.failed, 0);

    let after = tiers(engine.store.get_variant_prices("variant_1").await.unwrap());
    assert_eq!(after.len(), 2);
    assert_eq!(after, before);
}

#[tokio::test]
async fn list_variants_with_prices_filters_currency() {
    let (_db, engine) = setup().await;
    engine.store.set_variant_price("variant_1", "eur", 2999).await.unwrap();
    engine.store.set_variant_price("variant_1", "usd", 3299).await.unwrap();

    let query = VariantListQuery {
        currency_code: Some(Currency::Usd),
        ..VariantListQuery::default()
    };
    let variants = engine.reconciler.list_variants_with_prices(&query).await.unwrap();

    assert_eq!(variants.len(), 3);
    let first = variants.iter().find(|v| v.id == "variant_1").unwrap();
    assert_eq!(first.prices.len(), 1);
    assert_eq!(first.prices[0].formatted_amount, "$32.99");
    assert!(first.price_set_id.is_some());
}

#[tokio::test]
async fn backfill_prices_unpriced_variants() {
    let (_db, engine) = setup().await;
    engine.store.set_variant_price("variant_1", "eur", 2999).await.unwrap();

    let preview = engine.backfill().run(false).await.unwrap();
    assert_eq!(preview.total_variants, 3);
    assert_eq!(preview.with_prices, 1);
    assert_eq!(preview.without_prices, 2);
    assert_eq!(preview.created_prices, 0);
    assert!(engine.store.get_variant_prices("variant_2").await.unwrap().is_empty());

    let applied = engine.backfill().run(true).await.unwrap();
    assert_eq!(applied.created_prices, 2);
    assert_eq!(engine.store.get_variant_prices("variant_2").await.unwrap()[0].amount, 2999);
}
