//! Integration tests for the comparison matrix
//!
//! These tests load a realistic matrix from disk and verify that parsing,
//! column reconciliation and row filtering agree with each other.

use matrix_stats::app::capability::{Markers, SupportLevel, Variant};
use matrix_stats::app::*;
use tempfile::TempDir;

const MATRIX: &str = r#"Feature,Description,CampaignBay,Acme Free,Acme Pro,Widgets (Pro Only),Gadget Free
Coupons,"Discount codes, with ""limits""",✅,✅,✅,❌,❌
Bundles,Buy items together,✅,❌,✅,✅,
Gift cards,Send store credit,✅ Upcoming,❌,❌,❌ Missing,❌
Analytics,Campaign reports,✅,🟡 Partial,✅,Coming Soon,
Scheduling,,✅,,,,
"#;

async fn load(content: &str) -> (TempDir, ParsedTable) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("matrix.csv");
    tokio::fs::write(&path, content).await.unwrap();
    let table = ParsedTable::from_path(&path).await.unwrap();
    (temp_dir, table)
}

#[tokio::test]
async fn test_matrix_from_disk() {
    let (_dir, table) = load(MATRIX).await;

    assert_eq!(table.headers.len(), 7);
    assert_eq!(table.rows.len(), 5);
    assert_eq!(table.rows[0][1], r#"Discount codes, with "limits""#);
    // Trailing empty cells are preserved
    assert_eq!(table.rows[1].len(), 7);
    assert_eq!(table.rows[1][6], "");
}

#[tokio::test]
async fn test_capability_map_for_matrix() {
    let (_dir, table) = load(MATRIX).await;
    let config = ReconcilerConfig::default();
    let map = build_capability_map(&table.headers, &[], &config);

    assert_eq!(map.len(), 3);
    let acme = map.get("Acme").unwrap();
    assert_eq!(acme.free, Some(3));
    assert_eq!(acme.pro, Some(4));
    let widgets = map.get("Widgets").unwrap();
    assert_eq!(widgets.free, None);
    assert_eq!(widgets.pro, Some(5));
    assert_eq!(map.get("Gadget").unwrap().free, Some(6));
    assert!(map.get("CampaignBay").is_none());

    let columns = config.describe_columns(&table.headers);
    assert_eq!(columns.len(), 4);
    assert_eq!(columns[2].product, "Widgets");
    assert_eq!(columns[2].variant, Variant::Pro);
}

#[tokio::test]
async fn test_ratios_for_matrix() {
    let (_dir, table) = load(MATRIX).await;
    let config = ReconcilerConfig::default();
    let map = build_capability_map(&table.headers, &[], &config);

    let ratios: Vec<SupportRatio> = table
        .rows
        .iter()
        .map(|row| compute_ratio(row, &map, &config.markers))
        .collect();

    // Coupons: Acme free. Bundles: Acme pro, Widgets pro.
    assert_eq!(ratios[0], SupportRatio { free: 1, pro: 0 });
    assert_eq!(ratios[1], SupportRatio { free: 0, pro: 2 });
    assert_eq!(ratios[2], SupportRatio { free: 0, pro: 0 });
    // Partial marker does not count as supported
    assert_eq!(ratios[3], SupportRatio { free: 0, pro: 1 });
    assert_eq!(ratios[4], SupportRatio::default());
}

#[tokio::test]
async fn test_hiding_columns_changes_map_and_visibility() {
    let (_dir, table) = load(MATRIX).await;
    let config = ReconcilerConfig::default();
    let hidden = vec!["Acme Free".to_string()];

    let map = build_capability_map(&table.headers, &hidden, &config);
    let acme = map.get("Acme").unwrap();
    assert_eq!(acme.free, None);
    // Without its free column Acme's pro support now counts
    assert_eq!(
        compute_ratio(&table.rows[0], &map, &config.markers),
        SupportRatio { free: 0, pro: 1 }
    );

    let view = ComparisonView::build(&table, "", &hidden, &config);
    assert_eq!(view.visibility.to_string(), "4/5");
    assert!(!view.columns.contains(&"Acme Free".to_string()));
}

#[tokio::test]
async fn test_view_filters_rows() {
    let (_dir, table) = load(MATRIX).await;
    let config = ReconcilerConfig::default();

    let view = ComparisonView::build(&table, "", &[], &config);
    let features: Vec<&str> = view.rows.iter().map(|r| r.feature.as_str()).collect();
    // Gift cards only has "Upcoming" as meaningful data in the first-party column
    assert_eq!(
        features,
        vec!["Coupons", "Bundles", "Gift cards", "Analytics", "Scheduling"]
    );

    // Hiding the first-party column leaves gift cards with only ❌ cells
    // and scheduling with only blanks
    let hidden = vec!["CampaignBay".to_string()];
    let view = ComparisonView::build(&table, "", &hidden, &config);
    let features: Vec<&str> = view.rows.iter().map(|r| r.feature.as_str()).collect();
    assert_eq!(features, vec!["Coupons", "Bundles", "Analytics"]);

    let view = ComparisonView::build(&table, "REPORTS", &[], &config);
    assert_eq!(view.len(), 1);
    assert_eq!(view.rows[0].feature, "Analytics");
}

#[tokio::test]
async fn test_row_visibility_against_markers() {
    let (_dir, table) = load(MATRIX).await;
    let markers = Markers::default();
    let visible = visible_comparison_columns(&table.headers, &[]);
    assert_eq!(visible, vec![2, 3, 4, 5, 6]);

    assert!(is_row_visible(&table.rows[0], "limits", &visible, &markers));
    assert!(!is_row_visible(&table.rows[0], "bundles", &visible, &markers));
    assert!(is_row_visible(&table.rows[4], "", &visible, &markers));
    assert!(!is_row_visible(&table.rows[4], "", &visible[1..], &markers));
}

#[tokio::test]
async fn test_cell_classification() {
    let (_dir, table) = load(MATRIX).await;
    let markers = Markers::default();
    let levels: Vec<SupportLevel> = table.rows[2][2..]
        .iter()
        .map(|cell| markers.classify(cell))
        .collect();

    assert_eq!(
        levels,
        vec![
            SupportLevel::Upcoming,
            SupportLevel::Unsupported,
            SupportLevel::Unsupported,
            SupportLevel::Missing,
            SupportLevel::Unsupported,
        ]
    );
    assert_eq!(markers.classify(&table.rows[3][5]), SupportLevel::Other);
    assert_eq!(markers.classify(&table.rows[3][3]), SupportLevel::Partial);
    assert_eq!(markers.classify(""), SupportLevel::Blank);
}

#[tokio::test]
async fn test_csv_round_trip_through_disk() {
    let (_dir, table) = load(MATRIX).await;
    let (_dir2, reloaded) = load(&table.to_csv_string()).await;
    assert_eq!(reloaded, table);
}

#[tokio::test]
async fn test_missing_file_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let result = ParsedTable::from_path(&temp_dir.path().join("absent.csv")).await;
    let error = result.unwrap_err();
    assert!(error.to_string().contains("absent.csv"));
}
