// ==========================================
// 库存导入端到端测试
// ==========================================
// 测试目标: CSV 文件 → 分析 → 创建缺失仓库 → 去重 → 写入 SQLite → 汇总
// ==========================================

mod helpers;

use helpers::counting_session::CountingSession;
use rust_decimal_macros::dec;
use service_center_inventory::config::{config_keys, ConfigManager, ImportConfigReader};
use service_center_inventory::domain::ImportPhase;
use service_center_inventory::importer::{
    ImportError, InventoryImporter, InventoryImporterImpl, SessionRefresher,
};
use service_center_inventory::logging;
use service_center_inventory::repository::{
    FacilityRepository, FacilityRepositoryImpl, InventoryRepository, InventoryRepositoryImpl,
};
use std::sync::Arc;
use test_helpers::{create_test_db, insert_test_config, insert_test_facility, write_csv};

type SqliteImporter =
    InventoryImporterImpl<FacilityRepositoryImpl, InventoryRepositoryImpl, dyn SessionRefresher>;

struct Fixture {
    importer: SqliteImporter,
    facilities: Arc<FacilityRepositoryImpl>,
    inventory: Arc<InventoryRepositoryImpl>,
    _db: tempfile::NamedTempFile,
}

async fn fixture_with(setup: impl FnOnce(&str)) -> Fixture {
    logging::init_test();
    let (db, db_path) = create_test_db().unwrap();
    setup(&db_path);

    let config = ConfigManager::new(&db_path).unwrap();
    let settings = config.load_import_settings().await.unwrap();

    let facilities = Arc::new(FacilityRepositoryImpl::new(&db_path).unwrap());
    let inventory = Arc::new(InventoryRepositoryImpl::new(&db_path).unwrap());
    let session: Arc<dyn SessionRefresher> = Arc::new(CountingSession::default());
    let importer =
        InventoryImporterImpl::new(facilities.clone(), inventory.clone(), session, settings);

    Fixture {
        importer,
        facilities,
        inventory,
        _db: db,
    }
}

async fn fixture() -> Fixture {
    fixture_with(|_| {}).await
}

#[tokio::test]
async fn test_equivalent_codes_collapse_after_creation() {
    let mut fx = fixture().await;
    let csv = write_csv("SKU,CS,CANTIDAD\nA1,8,10\nA1,08,20\n");

    // 分析：两个原始值，均映射 B008，均未解析
    let summary = fx.importer.load_file(csv.path()).await.unwrap();
    assert_eq!(summary.len(), 2);
    assert!(summary.iter().all(|e| e.canonical_code == "B008"));
    assert!(summary.iter().all(|e| !e.is_resolved()));
    assert_eq!(summary.iter().map(|e| e.row_count).sum::<usize>(), 2);

    // 创建 B008
    let created = fx.importer.create_missing_facilities().await.unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].code, "B008");
    assert_eq!(created[0].name, "Bodega B008");
    let preview = fx.importer.state().preview().unwrap();
    assert!(preview.summary.iter().all(|e| e.is_resolved()));

    // 导入：一行 (B008, A1, "") 数量 20，重复 1
    let report = fx.importer.run_import().await.unwrap();
    assert_eq!(fx.importer.phase(), ImportPhase::Done);
    assert_eq!(report.total_rows, 2);
    assert_eq!(report.valid_rows, 1);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.imported, 1);
    assert_eq!(report.errors, 0);
    assert_eq!(report.duplicate_details.len(), 1);

    let stored = fx
        .inventory
        .find_inventory_row(&created[0].facility_id, "A1", "")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.quantity, 20);
    assert_eq!(stored.bin_code, "B008");
    assert_eq!(fx.inventory.count_inventory_rows().await.unwrap(), 1);
}

#[tokio::test]
async fn test_permissive_quantity_parsing() {
    let mut fx = fixture_with(|db| insert_test_facility(db, "fac-3", "B003", true).unwrap()).await;
    let csv = write_csv(
        "Código,Centro de Servicio,Cantidad,Costo Unitario\n\
         A1,3,\"1,234\",\"$1,500.25\"\n\
         A2,3,abc,\n",
    );

    fx.importer.load_file(csv.path()).await.unwrap();
    let report = fx.importer.run_import().await.unwrap();

    assert_eq!(report.valid_rows, 2);
    assert_eq!(report.skipped_rows, 0);
    assert_eq!(report.defaulted_quantity, 1);

    let a1 = fx
        .inventory
        .find_inventory_row("fac-3", "A1", "")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(a1.quantity, 1234);
    assert_eq!(a1.unit_cost, dec!(1500.25));

    let a2 = fx
        .inventory
        .find_inventory_row("fac-3", "A2", "")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(a2.quantity, 0);
}

#[tokio::test]
async fn test_missing_columns_returns_to_idle() {
    let mut fx = fixture().await;
    let csv = write_csv("SKU,DESCRIPCION\nA1,Filtro\n");

    let result = fx.importer.load_file(csv.path()).await;

    match result {
        Err(ImportError::MissingColumns(cols)) => {
            assert_eq!(cols, vec!["CANTIDAD".to_string(), "CS".to_string()]);
        }
        other => panic!("expected MissingColumns, got {:?}", other),
    }
    assert_eq!(fx.importer.phase(), ImportPhase::Idle);
}

#[tokio::test]
async fn test_header_only_file_is_empty() {
    let mut fx = fixture().await;
    let csv = write_csv("SKU,CS,CANTIDAD\n");

    let result = fx.importer.load_file(csv.path()).await;

    assert!(matches!(result, Err(ImportError::EmptyFile)));
    assert_eq!(fx.importer.phase(), ImportPhase::Idle);
}

#[tokio::test]
async fn test_unresolved_rows_skipped_and_reported() {
    let mut fx = fixture_with(|db| insert_test_facility(db, "fac-1", "B001", true).unwrap()).await;
    let csv = write_csv(
        "SKU,CS,CANTIDAD,UBICACION\n\
         A1,1,5,R1\n\
         A1,1,6,R2\n\
         A2,77,1,\n\
         A3,77,1,\n\
         ,1,9,\n",
    );

    fx.importer.load_file(csv.path()).await.unwrap();
    // 不创建仓库，直接导入
    let report = fx.importer.run_import().await.unwrap();

    assert_eq!(report.total_rows, 5);
    assert_eq!(report.skipped_no_item_code, 1);
    assert_eq!(report.skipped_no_facility, 2);
    assert_eq!(report.skipped_rows, 3);
    assert_eq!(report.valid_rows, 2);
    assert_eq!(report.valid_rows, report.total_rows - report.skipped_rows);
    assert_eq!(report.duplicates, 0);
    assert_eq!(report.unresolved_facilities.len(), 1);
    assert_eq!(report.unresolved_facilities[0].raw_value, "77");
    assert_eq!(report.unresolved_facilities[0].row_count, 2);
    assert_eq!(fx.inventory.count_inventory_rows().await.unwrap(), 2);
}

#[tokio::test]
async fn test_reimport_overwrites_existing_rows() {
    let mut fx = fixture_with(|db| insert_test_facility(db, "fac-8", "B008", true).unwrap()).await;

    let first = write_csv("SKU,CS,CANTIDAD\nA1,8,10\nA2,8,5\n");
    fx.importer.load_file(first.path()).await.unwrap();
    fx.importer.run_import().await.unwrap();

    let second = write_csv("SKU,CS,CANTIDAD\nA1,CS-8,99\n");
    fx.importer.load_file(second.path()).await.unwrap();
    let report = fx.importer.run_import().await.unwrap();
    assert_eq!(report.imported, 1);

    assert_eq!(fx.inventory.count_inventory_rows().await.unwrap(), 2);
    let a1 = fx
        .inventory
        .find_inventory_row("fac-8", "A1", "")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(a1.quantity, 99);
}

#[tokio::test]
async fn test_creation_then_reanalysis_has_no_unresolved() {
    let mut fx = fixture().await;
    let csv = write_csv("SKU,CS,CANTIDAD\nA1,4,1\nA2,12,1\nA3,CS-4,1\nA4,SIN CODIGO,1\n");

    fx.importer.load_file(csv.path()).await.unwrap();
    fx.importer.create_missing_facilities().await.unwrap();

    // 重新分析同一文件
    fx.importer.reset().unwrap();
    let summary = fx.importer.load_file(csv.path()).await.unwrap();
    let unresolved: Vec<&str> = summary
        .iter()
        .filter(|e| !e.is_resolved())
        .map(|e| e.raw_value.as_str())
        .collect();
    // 无数字的标识无法创建
    assert_eq!(unresolved, vec!["SIN CODIGO"]);

    let listed = fx.facilities.list_facilities(true).await.unwrap();
    let mut codes: Vec<String> = listed.into_iter().map(|f| f.code).collect();
    codes.sort();
    assert_eq!(codes, vec!["B004".to_string(), "B012".to_string()]);
}

#[tokio::test]
async fn test_deselected_codes_are_not_created() {
    let mut fx = fixture().await;
    let csv = write_csv("SKU,CS,CANTIDAD\nA1,4,1\nA2,12,1\n");

    fx.importer.load_file(csv.path()).await.unwrap();
    fx.importer.toggle_selection("12").unwrap();
    let created = fx.importer.create_missing_facilities().await.unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].code, "B004");
    let preview = fx.importer.state().preview().unwrap();
    assert!(preview.selected_for_creation.contains("12"));
}

#[tokio::test]
async fn test_config_overrides_are_loaded() {
    let (_db, db_path) = create_test_db().unwrap();
    insert_test_config(&db_path, config_keys::BATCH_SIZE, "2").unwrap();
    insert_test_config(&db_path, config_keys::SUB_BATCH_SIZE, "0").unwrap();

    let config = ConfigManager::new(&db_path).unwrap();
    let settings = config.load_import_settings().await.unwrap();

    assert_eq!(settings.batch_size, 2);
    // 非正数回退默认值
    assert_eq!(settings.sub_batch_size, 50);
    assert_eq!(settings.keepalive_interval_secs, 30);
}

#[tokio::test]
async fn test_leading_zero_variants_create_one_facility() {
    let mut fx = fixture().await;
    let csv = write_csv("SKU,CS,CANTIDAD\nA1,8,1\nA2,0008,1\nA3,CS-008,1\n");

    let summary = fx.importer.load_file(csv.path()).await.unwrap();
    assert_eq!(summary.len(), 3);
    assert!(summary.iter().all(|e| e.canonical_code == "B008"));

    let created = fx.importer.create_missing_facilities().await.unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].code, "B008");

    let report = fx.importer.run_import().await.unwrap();
    assert_eq!(report.imported, 3);
    assert_eq!(report.skipped_no_facility, 0);
}

#[tokio::test]
async fn test_delimiter_bearing_keys_are_both_stored() {
    let mut fx = fixture_with(|db| insert_test_facility(db, "fac-8", "B008", true).unwrap()).await;
    let csv = write_csv("SKU,CS,CANTIDAD,UBICACION\nA|B,8,1,\nA,8,2,B|\n");

    fx.importer.load_file(csv.path()).await.unwrap();
    let report = fx.importer.run_import().await.unwrap();

    assert_eq!(report.duplicates, 0);
    assert_eq!(report.imported, 2);
    assert_eq!(fx.inventory.count_inventory_rows().await.unwrap(), 2);
    let piped = fx
        .inventory
        .find_inventory_row("fac-8", "A", "B|")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(piped.quantity, 2);
}
