mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{TestWorkspace, fixture_path};
use predicates::str::contains;

#[test]
fn convert_emits_products_with_quoted_commas_intact() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("small.csv", "No,型式,商品名\n1,\"ABC-123, v2\",Widget\n\n");
    let output_dir = workspace.path().join("sql");

    cargo_bin_cmd!("catalog-migrate")
        .args([
            "convert",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output_dir.to_str().unwrap(),
        ])
        .assert()
        .success();

    let script = workspace.read("sql/01_products.sql");
    let mut lines = script.lines();
    assert_eq!(lines.next(), Some("-- product data"));
    assert_eq!(lines.next(), Some("USE electronics_inventory;"));
    assert_eq!(lines.next(), Some(""));
    assert!(lines.next().unwrap().starts_with("INSERT INTO products (product_id, product_name, model_number,"));
    assert_eq!(
        lines.next(),
        Some("(1, 'Widget', 'ABC-123, v2', 1, 1, 0.0, 0.0, '', '', '', '', '2023-01-01', 1, '');")
    );
    assert!(script.ends_with(";\n"));
    assert!(!output_dir.join("02_inventory.sql").exists());
}

#[test]
fn convert_full_catalog_with_source_inventory() {
    let workspace = TestWorkspace::new();
    let output_dir = workspace.path().join("sql_import");
    let rejects = workspace.path().join("rejects.csv");

    cargo_bin_cmd!("catalog-migrate")
        .args([
            "convert",
            "-i",
            fixture_path("catalog_sample.csv").to_str().unwrap(),
            "-o",
            output_dir.to_str().unwrap(),
            "--inventory",
            "source",
            "--rejects",
            rejects.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stderr(contains("Row 6 skipped"));

    let products = workspace.read("sql_import/01_products.sql");
    let tuples: Vec<&str> = products.lines().skip(4).collect();
    assert_eq!(
        tuples,
        vec![
            "(1, 'ソニー テレビ プレミアム 55インチ ブラック', 'MD-テレ231234', 1, 1, 128000.0, 55.0, 'インチ', 'ブラック', '高画質', 'プレミアム', '2023-05-01', 3, '★★★★'),",
            "(2, '象印 炊飯器 エコ 5合 ホワイト', 'HM-炊飯229876', 12, 25, 24000.0, 5.0, '合', 'ホワイト', '省エネ', 'エコ', '2022-09-15', 1, '★★★'),",
            "(3, 'Acme Robot, Deluxe', 'AP-O''NEIL-1', 1, 1, 9999.5, 1.0, '台', 'レッド', '防水', 'デラックス', '2024-01-01', 5, '★');",
        ]
    );

    let inventory = workspace.read("sql_import/02_inventory.sql");
    assert!(inventory.contains(
        "INSERT INTO inventory (product_id, warehouse_id, current_stock, stock_status) VALUES\n\
         (1, 'TK01', 12, '在庫あり'),\n\
         (2, 'OS02', 30, '在庫あり'),\n\
         (3, 'NG03', 3, '残りわずか');\n"
    ));

    let incoming = workspace.read("sql_import/03_incoming_shipments.sql");
    assert!(incoming.contains("(1, 40, '2024-01-10'),\n(2, 30, '2024-03-02'),\n(3, 5, '2024-04-01');"));
    let outgoing = workspace.read("sql_import/04_outgoing_shipments.sql");
    assert!(outgoing.contains("(1, 28, '2024-02-01'),\n(3, 2, '2024-04-20');"));

    let mut reader = csv::Reader::from_path(&rejects).expect("rejects csv");
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.expect("record")).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "5");
    assert_eq!(&rows[0][1], "expected 24 field(s) but found 4");
    assert_eq!(&rows[1][0], "6");
    assert!(rows[1][1].contains("要問合せ"));
}

#[test]
fn convert_synthetic_inventory_uses_config_placeholders() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("catalog.csv", "No,型式,カテゴリ\n10,A-1,ロボット\n11,B-2,テレビ\n");
    let config = workspace.write(
        "migrate.yml",
        "database: shop\nwarehouse_code: OS02\nplaceholder_stock: 5\ncategories:\n  ロボット: 3\n",
    );
    let output_dir = workspace.path().join("out");

    cargo_bin_cmd!("catalog-migrate")
        .args([
            "convert",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output_dir.to_str().unwrap(),
            "-c",
            config.to_str().unwrap(),
            "--inventory",
            "synthetic",
        ])
        .assert()
        .success();

    let products = workspace.read("out/01_products.sql");
    assert!(products.contains("USE shop;"));
    assert!(products.contains("(10, '', 'A-1', 3, 1,"));
    assert!(products.contains("(11, '', 'B-2', 1, 1,"));
    let inventory = workspace.read("out/02_inventory.sql");
    assert!(inventory.contains("(10, 'OS02', 5),\n(11, 'OS02', 5);"));
    assert!(!output_dir.join("03_incoming_shipments.sql").exists());
}

#[test]
fn convert_decodes_declared_shift_jis_input() {
    let workspace = TestWorkspace::new();
    let (encoded, _, _) = encoding_rs::SHIFT_JIS.encode("No,型式,商品名\n1,MD-1,テレビ\n");
    let input = workspace.write_bytes("sjis.csv", &encoded);
    let output_dir = workspace.path().join("out");

    cargo_bin_cmd!("catalog-migrate")
        .args([
            "convert",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output_dir.to_str().unwrap(),
            "--input-encoding",
            "cp932",
        ])
        .assert()
        .success();

    assert!(workspace.read("out/01_products.sql").contains("(1, 'テレビ', 'MD-1',"));
}

#[test]
fn convert_header_only_file_emits_empty_batch() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("header.csv", "No,型式\n");
    let output_dir = workspace.path().join("out");

    cargo_bin_cmd!("catalog-migrate")
        .args([
            "convert",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output_dir.to_str().unwrap(),
        ])
        .assert()
        .success();

    assert_eq!(
        workspace.read("out/01_products.sql"),
        "-- product data\nUSE electronics_inventory;\n\n-- no rows\n"
    );
}

#[test]
fn convert_missing_input_fails_without_output() {
    let workspace = TestWorkspace::new();
    let output_dir = workspace.path().join("out");

    cargo_bin_cmd!("catalog-migrate")
        .args([
            "convert",
            "-i",
            workspace.path().join("absent.csv").to_str().unwrap(),
            "-o",
            output_dir.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("Input file not found"));

    assert!(!output_dir.exists());
}

#[test]
fn convert_rejects_unsafe_database_name() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("small.csv", "No,型式\n1,A\n");

    cargo_bin_cmd!("catalog-migrate")
        .args([
            "convert",
            "-i",
            input.to_str().unwrap(),
            "-o",
            workspace.path().join("out").to_str().unwrap(),
            "--database",
            "x; DROP TABLE products",
        ])
        .assert()
        .failure()
        .stderr(contains("Invalid configuration"));
}

#[test]
fn convert_rejects_report_creates_its_directory() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("bad.csv", "No,型式,価格\n1,A-1,abc\n2,B-2,10\n");
    let rejects = workspace.path().join("reports").join("nested").join("rejects.csv");

    cargo_bin_cmd!("catalog-migrate")
        .args([
            "convert",
            "-i",
            input.to_str().unwrap(),
            "-o",
            workspace.path().join("sql").to_str().unwrap(),
            "--rejects",
            rejects.to_str().unwrap(),
        ])
        .assert()
        .success();

    let report = workspace.read("reports/nested/rejects.csv");
    let mut lines = report.lines();
    assert_eq!(lines.next(), Some("line,reason,raw"));
    assert!(lines.next().unwrap().starts_with("2,"));
    assert_eq!(lines.next(), None);
}
