//! Typed sorting tests
//!
//! Covers ordering per sort type, reversal and the header selection state.

use fluxgraph::table::{Field, SortKey, SortType, TableSort, sort_rows};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Row {
    name: String,
    replicas: serde_json::Value,
    created: String,
    suspended: bool,
}

fn row(name: &str, replicas: serde_json::Value, created: &str, suspended: bool) -> Row {
    Row {
        name: name.to_string(),
        replicas,
        created: created.to_string(),
        suspended,
    }
}

fn names(rows: &[&Row]) -> Vec<String> {
    rows.iter().map(|r| r.name.clone()).collect()
}

fn fields() -> Vec<Field<Row>> {
    vec![
        Field::named("Name", "name").sort_type(SortType::String),
        Field::named("Replicas", "replicas").sort_type(SortType::Number),
        Field::named("Created", "created").sort_type(SortType::Date),
        Field::named("Suspended", "suspended").sort_type(SortType::Bool),
        Field::computed("Summary", |r: &Row| format!("{} ({})", r.name, r.replicas)),
    ]
}

fn sample() -> Vec<Row> {
    vec![
        row("web", serde_json::json!(3), "2024-03-01T10:00:00Z", true),
        row("api", serde_json::json!("10"), "2023-12-24T08:30:00Z", false),
        row("Cache", serde_json::json!(1.5), "2024-03-01", true),
        row("batch", serde_json::json!("n/a"), "not a date", false),
        row("db", serde_json::json!(-2), "2024-01-15T00:00:00+02:00", false),
    ]
}

#[test]
fn test_bool_sort_false_before_true() {
    let rows = vec![
        row("a", serde_json::json!(0), "", true),
        row("b", serde_json::json!(0), "", false),
        row("c", serde_json::json!(0), "", true),
    ];
    let sorted = sort_rows(&rows, &fields()[3]);
    let flags: Vec<bool> = sorted.iter().map(|r| r.suspended).collect();
    assert_eq!(flags, vec![false, true, true]);
    // Ties keep input order
    assert_eq!(names(&sorted), vec!["b", "a", "c"]);
}

#[test]
fn test_number_sort_parses_text_and_puts_garbage_last() {
    let rows = sample();
    let sorted = sort_rows(&rows, &fields()[1]);
    assert_eq!(names(&sorted), vec!["db", "Cache", "web", "api", "batch"]);
}

#[test]
fn test_number_sort_is_numeric_not_lexical() {
    let rows: Vec<Row> = ["9", "10", "100", "2"]
        .iter()
        .map(|n| row(n, serde_json::json!(n), "", false))
        .collect();
    let sorted = sort_rows(&rows, &fields()[1]);
    assert_eq!(names(&sorted), vec!["2", "9", "10", "100"]);
}

#[test]
fn test_date_sort_mixed_formats() {
    let rows = sample();
    let sorted = sort_rows(&rows, &fields()[2]);
    // 2024-01-15T00:00:00+02:00 is 2024-01-14T22:00Z
    assert_eq!(names(&sorted), vec!["api", "db", "Cache", "web", "batch"]);
}

#[test]
fn test_string_sort_ignores_case() {
    let rows = sample();
    let sorted = sort_rows(&rows, &fields()[0]);
    assert_eq!(names(&sorted), vec!["api", "batch", "Cache", "db", "web"]);
}

#[test]
fn test_string_sort_case_variants_lowercase_first() {
    let rows: Vec<Row> = ["B", "a", "b", "A"]
        .iter()
        .map(|n| row(n, serde_json::json!(0), "", false))
        .collect();
    let sorted = sort_rows(&rows, &fields()[0]);
    assert_eq!(names(&sorted), vec!["a", "A", "b", "B"]);
}

#[test]
fn test_string_sort_collates_accented_letters() {
    let rows: Vec<Row> = ["zeta", "éclair", "eagle", "fig", "Émile"]
        .iter()
        .map(|n| row(n, serde_json::json!(0), "", false))
        .collect();
    let sorted = sort_rows(&rows, &fields()[0]);
    assert_eq!(names(&sorted), vec!["eagle", "éclair", "Émile", "fig", "zeta"]);
}

#[test]
fn test_sort_is_independent_of_input_order() {
    let rows = sample();
    // Bool has ties, which keep input order, so it is left out
    for column in 0..3 {
        let expected = names(&sort_rows(&rows, &fields()[column]));

        let mut reversed = rows.clone();
        reversed.reverse();
        let mut rotated = rows.clone();
        rotated.rotate_left(2);

        for permuted in [reversed, rotated] {
            let actual = names(&sort_rows(&permuted, &fields()[column]));
            assert_eq!(actual, expected, "column {}", column);
        }
    }
}

#[test]
fn test_sorted_output_is_ordered() {
    let rows: Vec<Row> = [5.0, -1.0, 3.25, 3.25, 0.0, 42.0, -7.5]
        .iter()
        .enumerate()
        .map(|(i, n)| row(&i.to_string(), serde_json::json!(n), "", false))
        .collect();
    let sorted = sort_rows(&rows, &fields()[1]);
    let values: Vec<f64> = sorted.iter().map(|r| r.replicas.as_f64().unwrap()).collect();
    assert!(values.windows(2).all(|w| w[0] <= w[1]), "{:?}", values);
}

#[test]
fn test_sort_value_overrides_rendered_text() {
    let field = Field::computed("Age", |r: &Row| format!("{}d", r.replicas))
        .sort_type(SortType::Number)
        .sort_value(|r: &Row| SortKey::from(&r.replicas));
    let rows: Vec<Row> = [10, 9, 100]
        .iter()
        .map(|n| row(&n.to_string(), serde_json::json!(n), "", false))
        .collect();
    assert_eq!(names(&sort_rows(&rows, &field)), vec!["9", "10", "100"]);
}

#[test]
fn test_computed_bool_with_sort_value() {
    let field = Field::computed("Paused", |r: &Row| {
        let text = if r.suspended { "yes" } else { "no" };
        text.to_string()
    })
    .sort_type(SortType::Bool)
    .sort_value(|r: &Row| SortKey::from(r.suspended));
    let rows = sample();
    let sorted = sort_rows(&rows, &field);
    assert_eq!(names(&sorted), vec!["api", "batch", "db", "web", "Cache"]);
}

#[test]
#[should_panic(expected = "sort_value")]
fn test_computed_bool_without_sort_value_panics() {
    let field =
        Field::computed("Paused", |r: &Row| r.suspended.to_string()).sort_type(SortType::Bool);
    sort_rows(&sample(), &field);
}

#[test]
fn test_reversed_is_exact_reverse() {
    let rows = sample();
    let fields = fields();
    for column in 0..4 {
        let mut sort = TableSort::new(column);
        let ascending = names(&sort.apply(&rows, &fields));
        sort.set_reversed(true);
        let mut descending = names(&sort.apply(&rows, &fields));
        descending.reverse();
        assert_eq!(ascending, descending, "column {}", column);
    }
}

#[test]
fn test_header_selection_state_machine() {
    let rows = sample();
    let fields = fields();
    let mut sort = TableSort::new(0);
    let original = names(&sort.apply(&rows, &fields));

    // Same column toggles direction
    assert!(sort.select(&fields, 0));
    assert!(sort.is_reversed());
    assert!(sort.select(&fields, 0));
    assert!(!sort.is_reversed());
    assert_eq!(names(&sort.apply(&rows, &fields)), original);

    // A new column starts ascending
    sort.select(&fields, 0);
    assert!(sort.select(&fields, 1));
    assert_eq!(sort.column(), 1);
    assert!(!sort.is_reversed());

    // Unsortable and missing columns are ignored
    assert!(!sort.select(&fields, 4));
    assert!(!sort.select(&fields, 99));
    assert_eq!(sort.column(), 1);
    assert!(!sort.is_reversed());
}
