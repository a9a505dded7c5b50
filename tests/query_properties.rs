use footprint::loader::load_from_readers;
use footprint::observation::{METRIC_COUNT, Metric, Observation, Scenario};
use footprint::query::{filter_rows, query, query_named};
use footprint::table::UnifiedTable;
use std::collections::HashSet;

const HEADER: &str = "diet_group,age_group,sex,mean_ghgs,mean_land,mean_watscar,mean_eut,mean_ghgs_ch4,mean_ghgs_n2o,mean_bio,mean_watuse,mean_acid";

fn obs(diet: &str, age: &str, sex: &str, scenario: Scenario, ghgs: f64) -> Observation {
    let mut metrics = [1.0; METRIC_COUNT];
    metrics[Metric::Ghgs.index()] = ghgs;
    Observation {
        diet_group: diet.to_string(),
        age_group: age.to_string(),
        sex: sex.to_string(),
        metrics,
        scenario,
    }
}

// A small dataset in both scenarios with repeated groups
fn sample_table() -> UnifiedTable {
    let mut capita = String::from(HEADER);
    let mut kcal = String::from(HEADER);
    let groups = [
        ("meat100", "20-29", "male"),
        ("meat", "30-39", "female"),
        ("meat50", "40-49", "male"),
        ("fish", "50-59", "female"),
        ("veggie", "60-69", "male"),
        ("vegan", "70-79", "female"),
    ];
    for run in 0..3 {
        for (i, (diet, age, sex)) in groups.iter().enumerate() {
            let base = (i + 1) as f64 + run as f64 * 0.5;
            capita.push_str(&format!(
                "\n{},{},{},{},{},1,1,1,1,1,1,1",
                diet,
                age,
                sex,
                base,
                base * 2.0
            ));
            kcal.push_str(&format!(
                "\n{},{},{},{},{},2,2,2,2,2,2,2",
                diet,
                age,
                sex,
                base / 10.0,
                base
            ));
        }
    }
    load_from_readers(capita.as_bytes(), kcal.as_bytes()).unwrap()
}

#[test]
fn four_row_example_end_to_end() {
    let table = UnifiedTable::new(vec![
        obs("meat", "young", "male", Scenario::PerCapita, 1.0),
        obs("meat", "young", "male", Scenario::PerCapita, 3.0),
        obs("vegan", "old", "female", Scenario::PerCapita, 5.0),
        obs("meat", "young", "male", Scenario::Per1000Kcal, 9.0),
    ]);
    let result = query(&table, Scenario::PerCapita, Metric::Ghgs, Metric::Ghgs, None);

    assert_eq!(result.len(), 2);
    let meat = &result.rows[0];
    assert_eq!(meat.diet_group, "meat");
    assert_eq!(meat.diet_label, Some("Medium meat-eaters"));
    assert_eq!((meat.age_group.as_str(), meat.sex.as_str()), ("young", "male"));
    assert_eq!(meat.value(Metric::Ghgs), 2.0);

    let vegan = &result.rows[1];
    assert_eq!(vegan.diet_label, Some("Vegans"));
    assert_eq!((vegan.age_group.as_str(), vegan.sex.as_str()), ("old", "female"));
    assert_eq!(vegan.value(Metric::Ghgs), 5.0);

    assert_eq!(result.color_range(), Some((2.0, 5.0)));
}

#[test]
fn mean_of_two_and_four_is_three() {
    let table = UnifiedTable::new(vec![
        obs("fish", "a", "b", Scenario::Per1000Kcal, 2.0),
        obs("fish", "a", "b", Scenario::Per1000Kcal, 4.0),
    ]);
    let result = query(&table, Scenario::Per1000Kcal, Metric::Ghgs, Metric::Land, None);
    assert_eq!(result.rows[0].value(Metric::Ghgs), 3.0);
}

#[test]
fn scenarios_partition_the_table() {
    let table = sample_table();
    let capita = table.count(Scenario::PerCapita);
    let kcal = table.count(Scenario::Per1000Kcal);
    assert_eq!(capita, 18);
    assert_eq!(kcal, 18);
    assert_eq!(capita + kcal, table.len());

    for scenario in Scenario::ALL {
        let rows = filter_rows(&table, scenario, None);
        assert!(rows.iter().all(|r| r.scenario == scenario));
    }
}

#[test]
fn query_only_uses_selected_scenario() {
    let table = sample_table();
    let capita = query(&table, Scenario::PerCapita, Metric::Ghgs, Metric::Land, None);
    let kcal = query(&table, Scenario::Per1000Kcal, Metric::Ghgs, Metric::Land, None);
    // capita meat100 runs: 1.0, 1.5, 2.0; kcal is a tenth of that
    let capita_meat100 = capita.rows.iter().find(|r| r.diet_group == "meat100").unwrap();
    assert_eq!(capita_meat100.value(Metric::Ghgs), 1.5);
    let kcal_meat100 = kcal.rows.iter().find(|r| r.diet_group == "meat100").unwrap();
    assert!((kcal_meat100.value(Metric::Ghgs) - 0.15).abs() < 1e-12);
    assert_eq!(kcal_meat100.value(Metric::WatScar), 2.0);
    assert_eq!(capita.rows[0].value(Metric::WatScar), 1.0);
}

#[test]
fn keyword_rows_contain_keyword_in_some_field() {
    let table = sample_table();
    for keyword in ["MEAT", "male", "fem", "9", "5", "ish", "zzz"] {
        let needle = keyword.to_lowercase();
        let rows = filter_rows(&table, Scenario::PerCapita, Some(keyword));
        for row in &rows {
            assert!(
                row.diet_group.to_lowercase().contains(&needle)
                    || row.age_group.to_lowercase().contains(&needle)
                    || row.sex.to_lowercase().contains(&needle),
                "row {:?} does not contain '{}'",
                row,
                keyword
            );
        }
        // nothing that matches is dropped
        let expected = table
            .scenario_rows(Scenario::PerCapita)
            .filter(|r| r.matches_keyword(&needle))
            .count();
        assert_eq!(rows.len(), expected);
    }

    // OR across fields: "male" hits the sex column of all six groups
    let result = query(&table, Scenario::PerCapita, Metric::Ghgs, Metric::Land, Some("male"));
    assert_eq!(result.len(), 6);
    let fish = query(&table, Scenario::PerCapita, Metric::Ghgs, Metric::Land, Some("Fish"));
    assert_eq!(fish.len(), 1);
    assert_eq!(fish.rows[0].diet_label, Some("Fish-eaters"));
}

#[test]
fn blank_keywords_do_not_filter() {
    let table = sample_table();
    let none = query(&table, Scenario::PerCapita, Metric::Ghgs, Metric::Land, None);
    for blank in ["", "   ", "\t"] {
        let result = query(&table, Scenario::PerCapita, Metric::Ghgs, Metric::Land, Some(blank));
        assert_eq!(result, none);
    }
    assert_eq!(none.len(), 6);
}

#[test]
fn no_match_gives_empty_result() {
    let table = sample_table();
    let result = query(
        &table,
        Scenario::PerCapita,
        Metric::Ghgs,
        Metric::Land,
        Some("carnivore"),
    );
    assert!(result.is_empty());
    assert_eq!(result.color_range(), None);
}

#[test]
fn group_keys_are_unique() {
    let table = sample_table();
    for scenario in Scenario::ALL {
        let result = query(&table, scenario, Metric::Eut, Metric::Bio, None);
        let keys: HashSet<_> = result
            .rows
            .iter()
            .map(|r| (r.diet_group.clone(), r.age_group.clone(), r.sex.clone()))
            .collect();
        assert_eq!(keys.len(), result.len());
        assert_eq!(result.rows.iter().map(|r| r.count).sum::<usize>(), 18);
    }
}

#[test]
fn repeated_queries_are_bit_identical() {
    let table = sample_table();
    let a = query(&table, Scenario::Per1000Kcal, Metric::Ghgs, Metric::Land, Some("e"));
    let b = query(&table, Scenario::Per1000Kcal, Metric::Ghgs, Metric::Land, Some("e"));
    assert_eq!(a.len(), b.len());
    for (x, y) in a.rows.iter().zip(b.rows.iter()) {
        for m in Metric::ALL {
            assert_eq!(x.value(m).to_bits(), y.value(m).to_bits());
        }
    }
}

#[test]
fn named_query_matches_typed_query() {
    let table = sample_table();
    let named =
        query_named(&table, "Per 1000 kcal", "mean_watuse", "mean_acid", Some("veg")).unwrap();
    let typed = query(&table, Scenario::Per1000Kcal, Metric::WatUse, Metric::Acid, Some("veg"));
    assert_eq!(named, typed);
    // veggie and vegan
    assert_eq!(named.len(), 2);
}
