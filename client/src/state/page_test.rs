use super::*;
use serde_json::json;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_owned()).collect()
}

#[test]
fn replace_options_sorts_and_selects_first() {
    let mut view = PageView::default();
    view.replace_options(names(&["Weather", "Loot", "Encounters"]));
    assert_eq!(view.table_names, names(&["Encounters", "Loot", "Weather"]));
    assert_eq!(view.selected.as_deref(), Some("Encounters"));
}

#[test]
fn replace_options_keeps_listed_selection() {
    let mut view = PageView { selected: Some("Loot".into()), ..PageView::default() };
    view.replace_options(names(&["Weather", "Loot"]));
    assert_eq!(view.selected.as_deref(), Some("Loot"));
}

#[test]
fn replace_options_drops_stale_entries_and_duplicates() {
    let mut view = PageView::default();
    view.replace_options(names(&["A", "B", "C"]));
    view.selected = Some("C".into());
    view.replace_options(names(&["B", "D", "B"]));
    assert_eq!(view.table_names, names(&["B", "D"]));
    assert_eq!(view.selected.as_deref(), Some("B"));
}

#[test]
fn replace_options_with_nothing_clears_selection() {
    let mut view = PageView { selected: Some("Loot".into()), ..PageView::default() };
    view.replace_options(Vec::new());
    assert!(view.table_names.is_empty());
    assert_eq!(view.selected, None);
}

#[test]
fn replace_entries_renders_ranges() {
    let entries: Vec<TableEntry> = serde_json::from_value(json!([
        { "min_roll": 3, "max_roll": 3, "target": "Orc" },
        { "type": "document", "min_roll": 2, "max_roll": 5, "target": "Weather" },
        { "min_roll": 6, "max_roll": 6, "target": 42 }
    ]))
    .unwrap();

    let mut view = PageView::default();
    view.replace_entries(&entries);
    assert_eq!(
        view.entries,
        vec![
            EntryRow { range: "3".into(), target: "Orc".into() },
            EntryRow { range: "2-5".into(), target: "Weather".into() },
            EntryRow { range: "6".into(), target: "42".into() },
        ]
    );
}

#[test]
fn tickets_accept_only_newer_responses() {
    let mut tickets = Tickets::default();
    let first = tickets.issue(Element::Result);
    let second = tickets.issue(Element::Result);

    assert!(tickets.accept(second));
    assert!(!tickets.accept(first));
}

#[test]
fn tickets_accept_in_order_responses() {
    let mut tickets = Tickets::default();
    let first = tickets.issue(Element::Result);
    let second = tickets.issue(Element::Result);

    assert!(tickets.accept(first));
    assert!(tickets.accept(second));
}

#[test]
fn tickets_are_independent_per_element() {
    let mut tickets = Tickets::default();
    let options = tickets.issue(Element::Options);
    let result = tickets.issue(Element::Result);
    let entries = tickets.issue(Element::Entries);

    assert!(tickets.accept(result));
    assert!(tickets.accept(entries));
    assert!(tickets.accept(options));
}

#[test]
fn result_is_failure_matches_fixed_texts() {
    let mut view = PageView { result: "Result: Gold".into(), ..PageView::default() };
    assert!(!view.result_is_failure());
    for text in [ERROR_FETCHING_DATA, INVALID_JSON_FORMAT, ERROR_ADDING_TABLE, ERROR_FETCHING_TABLES, ERROR_FETCHING_ENTRIES] {
        view.result = text.into();
        assert!(view.result_is_failure(), "{text}");
    }
}
