use footprint::app::{Dashboard, Selection};
use footprint::config::DashboardConfig;
use footprint::downloader::to_csv;
use footprint::loader::{CAPITA_FILE, DataLoadError, KCAL_FILE, load, load_dir};
use footprint::observation::{Metric, Scenario};
use footprint::saving::{load_table, save_table};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const HEADER: &str = ",mc_run_id,grouping,diet_group,sex,age_group,mean_ghgs,mean_land,mean_watscar,mean_eut,mean_ghgs_ch4,mean_ghgs_n2o,mean_bio,mean_watuse,mean_acid,n_participants";

// Write the two result files the way the published dataset lays them out
fn write_dataset(dir: &Path) {
    let capita = format!(
        "{}\n\
         0,1,vegan_female_20-29,vegan,female,20-29,3.0,4.0,1,1,1,1,1,1,1,100\n\
         1,2,vegan_female_20-29,vegan,female,20-29,5.0,6.0,1,1,1,1,1,1,1,100\n\
         2,1,meat100_male_50-59,meat100,male,50-59,12.0,30.0,2,2,2,2,2,2,2,80\n",
        HEADER
    );
    let kcal = format!(
        "{}\n\
         0,1,vegan_female_20-29,vegan,female,20-29,1.5,2.0,1,1,1,1,1,1,1,100\n\
         1,1,meat100_male_50-59,meat100,male,50-59,4.0,9.0,2,2,2,2,2,2,2,80\n",
        HEADER
    );
    fs::write(dir.join(CAPITA_FILE), capita).unwrap();
    fs::write(dir.join(KCAL_FILE), kcal).unwrap();
}

#[test]
fn loads_and_tags_both_files() {
    let dir = tempdir().unwrap();
    write_dataset(dir.path());

    let table = load_dir(dir.path()).unwrap();
    assert_eq!(table.len(), 5);
    assert_eq!(table.count(Scenario::PerCapita), 3);
    assert_eq!(table.count(Scenario::Per1000Kcal), 2);
    // kcal rows first
    assert_eq!(table.rows()[0].scenario, Scenario::Per1000Kcal);
    assert_eq!(table.rows()[4].scenario, Scenario::PerCapita);
    assert_eq!(table.diet_groups(), vec!["vegan", "meat100"]);
}

#[test]
fn missing_file_aborts_startup() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(KCAL_FILE), format!("{}\n", HEADER)).unwrap();

    let err = load(dir.path().join(CAPITA_FILE), dir.path().join(KCAL_FILE)).unwrap_err();
    assert!(matches!(err, DataLoadError::Io { .. }));

    let config = DashboardConfig {
        data_dir: dir.path().to_path_buf(),
        ..DashboardConfig::default()
    };
    assert!(Dashboard::startup(&config).is_err());
}

#[test]
fn schema_mismatch_aborts_startup() {
    let dir = tempdir().unwrap();
    write_dataset(dir.path());
    fs::write(
        dir.path().join(KCAL_FILE),
        "diet_group,age_group,sex,mean_ghgs\nvegan,20-29,female,1.0\n",
    )
    .unwrap();

    match load_dir(dir.path()) {
        Err(DataLoadError::MissingColumn { column, .. }) => assert_eq!(column, "mean_land"),
        other => panic!("expected MissingColumn, got {:?}", other.map(|t| t.len())),
    }
}

#[test]
fn snapshot_restores_the_same_table() {
    let dir = tempdir().unwrap();
    write_dataset(dir.path());
    let table = load_dir(dir.path()).unwrap();

    let snapshot = dir.path().join("table.bin.gz");
    save_table(&table, &snapshot).unwrap();
    let restored = load_table(&snapshot).unwrap();
    assert_eq!(restored, table);

    fs::write(&snapshot, b"not a snapshot").unwrap();
    assert!(load_table(&snapshot).is_err());
}

#[test]
fn startup_writes_then_prefers_snapshot() {
    let dir = tempdir().unwrap();
    write_dataset(dir.path());
    let snapshot = dir.path().join("cache.bin.gz");
    let config = DashboardConfig {
        data_dir: dir.path().to_path_buf(),
        snapshot: Some(snapshot.clone()),
        ..DashboardConfig::default()
    };

    let first = Dashboard::startup(&config).unwrap();
    assert!(snapshot.exists());

    // with the CSVs gone only the snapshot can satisfy startup
    fs::remove_file(dir.path().join(CAPITA_FILE)).unwrap();
    fs::remove_file(dir.path().join(KCAL_FILE)).unwrap();
    let second = Dashboard::startup(&config).unwrap();
    assert_eq!(**second.table(), **first.table());
}

#[test]
fn refresh_produces_chart_for_session() {
    let dir = tempdir().unwrap();
    write_dataset(dir.path());
    let config = DashboardConfig {
        data_dir: dir.path().to_path_buf(),
        ..DashboardConfig::default()
    };
    let dashboard = Dashboard::startup(&config).unwrap();
    assert!(dashboard.chart("web-1").is_none());

    let mut selection = Selection::from_config(&config);
    selection.scenario = Scenario::PerCapita;
    let result = dashboard.refresh("web-1", &selection).unwrap();
    assert_eq!(result.len(), 2);
    let vegan = result.rows.iter().find(|r| r.diet_group == "vegan").unwrap();
    assert_eq!(vegan.value(Metric::Ghgs), 4.0);
    assert_eq!(vegan.count, 2);

    let chart = dashboard.chart("web-1").unwrap();
    assert_eq!(chart.leaves().count(), 2);
    assert_eq!(chart.color_range, Some((5.0, 30.0)));
    let leaf = chart.node("vegan/20-29/female").unwrap();
    assert_eq!(leaf.value, 4.0);
    assert!(leaf.hover.contains("4.0000"));

    selection.keyword = Some("nobody".to_string());
    let empty = dashboard.refresh("web-1", &selection).unwrap();
    assert!(empty.is_empty());
    let chart = dashboard.chart("web-1").unwrap();
    assert!(chart.nodes.is_empty());
    assert_eq!(chart.color_range, None);
    assert_eq!(to_csv(&empty).lines().count(), 1);

    dashboard.end_session("web-1");
    assert!(dashboard.chart("web-1").is_none());
}
