use std::collections::VecDeque;
use std::sync::Mutex;

use futures::poll;
use serde_json::json;
use tokio::sync::oneshot;

use super::*;
use crate::net::api::ApiError;
use crate::net::types::TableEntry;
use crate::state::page::EntryRow;

type Reply = Result<Value, ApiError>;

/// Scripted API double. Every call records itself and takes the next
/// scripted reply, which may still be pending.
#[derive(Default)]
struct MockApi {
    calls: Mutex<Vec<String>>,
    replies: Mutex<VecDeque<oneshot::Receiver<Reply>>>,
}

impl MockApi {
    fn reply(&self, reply: Reply) {
        let (tx, rx) = oneshot::channel();
        tx.send(reply).unwrap();
        self.replies.lock().unwrap().push_back(rx);
    }

    fn pending(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push_back(rx);
        tx
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn next(&self, call: String) -> Reply {
        self.calls.lock().unwrap().push(call);
        let rx = self.replies.lock().unwrap().pop_front().expect("unscripted call");
        rx.await.unwrap()
    }
}

fn row(range: &str, target: &str) -> EntryRow {
    EntryRow { range: range.into(), target: target.into() }
}

fn offline() -> ApiError {
    ApiError::Transport("connection refused".into())
}

#[async_trait::async_trait]
impl TablesApi for MockApi {
    async fn tables(&self) -> Result<Vec<String>, ApiError> {
        let value = self.next("GET /tables".into()).await?;
        Ok(serde_json::from_value(value).unwrap())
    }

    async fn draw(&self, table: &str) -> Result<Value, ApiError> {
        self.next(format!("GET /draw/{table}")).await
    }

    async fn formatted_draw(&self, table: &str) -> Result<Value, ApiError> {
        self.next(format!("GET /formatted_draw/{table}")).await
    }

    async fn table_entries(&self, table: &str) -> Result<Vec<TableEntry>, ApiError> {
        let value = self.next(format!("GET /table_entries/{table}")).await?;
        Ok(serde_json::from_value(value).unwrap())
    }

    async fn add_table(&self, table: Value) -> Result<String, ApiError> {
        let body = json!({ "table": table });
        let value = self.next(format!("POST /addTable {body}")).await?;
        Ok(value.as_str().unwrap().to_owned())
    }

    async fn health(&self) -> Result<(), ApiError> {
        self.next("GET /healthz".into()).await.map(|_| ())
    }
}

const WEATHER: &str = r#"{"name":"Weather","formula":"1d2","results":[{"text":"Rain","range":[1,1]},{"text":"Sun","range":[2,2]}]}"#;

/// Page with `Loot` and `Weather` listed and `Loot` selected.
async fn loaded_page() -> TablePage<MockApi> {
    let page = TablePage::new(MockApi::default());
    page.api().reply(Ok(json!(["Weather", "Loot"])));
    page.api().reply(Ok(json!([{ "min_roll": 1, "max_roll": 1, "target": "Gold" }])));
    page.load().await;
    page
}

// =============================================================================
// LOAD / TABLE LIST
// =============================================================================

#[tokio::test]
async fn load_sorts_options_and_lists_selected_entries() {
    let page = loaded_page().await;
    let view = page.view();
    assert_eq!(view.table_names, vec!["Loot", "Weather"]);
    assert_eq!(view.selected.as_deref(), Some("Loot"));
    assert_eq!(view.entries, vec![row("1", "Gold")]);
    assert_eq!(page.api().calls(), vec!["GET /tables", "GET /table_entries/Loot"]);
}

#[tokio::test]
async fn refresh_replaces_every_option() {
    let page = loaded_page().await;
    page.api().reply(Ok(json!(["Names", "Loot", "Loot"])));
    page.refresh_tables().await;
    assert_eq!(page.view().table_names, vec!["Loot", "Names"]);
}

#[tokio::test]
async fn refresh_failure_keeps_options_and_reports() {
    let page = loaded_page().await;
    page.api().reply(Err(offline()));
    page.refresh_tables().await;
    let view = page.view();
    assert_eq!(view.table_names, vec!["Loot", "Weather"]);
    assert_eq!(view.result, "Error fetching tables");
}

#[tokio::test]
async fn load_with_no_tables_skips_entries() {
    let page = TablePage::new(MockApi::default());
    page.api().reply(Ok(json!([])));
    page.load().await;
    assert_eq!(page.view().selected, None);
    assert_eq!(page.api().calls(), vec!["GET /tables"]);
}

// =============================================================================
// DRAW
// =============================================================================

#[tokio::test]
async fn draw_renders_result_line() {
    let page = loaded_page().await;
    page.api().reply(Ok(json!("Gold")));
    page.draw().await;
    assert_eq!(page.view().result, "Result: Gold");
    assert_eq!(page.api().calls().last().unwrap(), "GET /draw/Loot");
}

#[tokio::test]
async fn draw_stringifies_structured_results() {
    let page = loaded_page().await;
    page.api().reply(Ok(json!({ "result": "Gold", "roll": 1 })));
    page.draw().await;
    assert_eq!(page.view().result, r#"Result: {"result":"Gold","roll":1}"#);
}

#[tokio::test]
async fn formatted_draw_renders_prefixed_line() {
    let page = loaded_page().await;
    page.api().reply(Ok(json!("1 : Gold")));
    page.formatted_draw().await;
    assert_eq!(page.view().result, "Formatted Result: 1 : Gold");
    assert_eq!(page.api().calls().last().unwrap(), "GET /formatted_draw/Loot");
}

#[tokio::test]
async fn draw_failure_renders_fixed_text() {
    let page = loaded_page().await;
    page.api().reply(Err(ApiError::Status { status: 404, message: "Table not found".into() }));
    page.draw().await;
    assert_eq!(page.view().result, "Error fetching data");

    page.api().reply(Err(offline()));
    page.formatted_draw().await;
    assert_eq!(page.view().result, "Error fetching data");
}

#[tokio::test]
async fn draw_without_selection_sends_nothing() {
    let page = TablePage::new(MockApi::default());
    page.draw().await;
    assert_eq!(page.view().result, "Error fetching data");
    assert!(page.api().calls().is_empty());
}

// =============================================================================
// ENTRIES
// =============================================================================

#[tokio::test]
async fn select_table_rebuilds_entry_rows() {
    let page = loaded_page().await;
    page.api().reply(Ok(json!([
        { "min_roll": 1, "max_roll": 1, "target": "Rain" },
        { "type": "text", "min_roll": 2, "max_roll": 5, "target": "Sun" }
    ])));
    page.select_table("Weather").await;

    let view = page.view();
    assert_eq!(view.selected.as_deref(), Some("Weather"));
    assert_eq!(view.entries, vec![row("1", "Rain"), row("2-5", "Sun")]);
}

#[tokio::test]
async fn entries_failure_clears_rows() {
    let page = loaded_page().await;
    page.api().reply(Err(offline()));
    page.select_table("Weather").await;

    let view = page.view();
    assert!(view.entries.is_empty());
    assert_eq!(view.result, "Error fetching entries");
}

// =============================================================================
// ADD TABLE
// =============================================================================

#[tokio::test]
async fn submit_posts_parsed_table_and_refreshes() {
    let page = loaded_page().await;
    page.set_table_json(WEATHER);
    page.api().reply(Ok(json!("Tables added successfully")));
    page.api().reply(Ok(json!(["Loot", "Weather", "Names"])));
    page.submit_table().await;

    let expected_body = json!({ "table": serde_json::from_str::<Value>(WEATHER).unwrap() });
    let calls = page.api().calls();
    assert_eq!(calls[2..], [format!("POST /addTable {expected_body}"), "GET /tables".to_owned()]);

    let view = page.view();
    assert_eq!(view.result, "Tables added successfully");
    assert_eq!(view.table_names, vec!["Loot", "Names", "Weather"]);
}

#[tokio::test]
async fn submit_malformed_text_sends_nothing() {
    let page = loaded_page().await;
    let before = page.api().calls().len();

    for text in ["{ not json", "[1, 2]", r#"{"name":"Bad","formula":"1d6","results":[{"text":"x","range":[5,1]}]}"#] {
        page.set_table_json(text);
        page.submit_table().await;
        assert_eq!(page.view().result, "Invalid JSON format", "{text}");
    }
    assert_eq!(page.api().calls().len(), before);
}

#[tokio::test]
async fn submit_failure_renders_fixed_text_without_refresh() {
    let page = loaded_page().await;
    page.set_table_json(WEATHER);
    page.api().reply(Err(ApiError::Status { status: 400, message: "invalid table definition".into() }));
    page.submit_table().await;

    assert_eq!(page.view().result, "Error adding table");
    assert!(page.api().calls().last().unwrap().starts_with("POST /addTable "));
    assert_eq!(page.api().calls().len(), 3);
}

#[test]
fn validate_table_json_returns_value_as_typed() {
    let value = validate_table_json(WEATHER).unwrap();
    assert_eq!(value["results"][1]["text"], "Sun");
    assert!(matches!(validate_table_json("nope"), Err(TableJsonError::Syntax(_))));
    assert!(matches!(validate_table_json(r#"{"name":"x"}"#), Err(TableJsonError::Shape(_))));
    assert!(matches!(
        validate_table_json(r#"{"name":"x","formula":"d","results":[]}"#),
        Err(TableJsonError::Table(_))
    ));
}

// =============================================================================
// OVERLAPPING REQUESTS
// =============================================================================

#[tokio::test]
async fn latest_draw_wins_when_older_response_arrives_last() {
    let page = loaded_page().await;
    let slow = page.api().pending();
    let fast = page.api().pending();

    let mut first = Box::pin(page.draw());
    assert!(poll!(first.as_mut()).is_pending());
    let mut second = Box::pin(page.draw());
    assert!(poll!(second.as_mut()).is_pending());

    fast.send(Ok(json!("new"))).unwrap();
    second.await;
    assert_eq!(page.view().result, "Result: new");

    slow.send(Ok(json!("old"))).unwrap();
    first.await;
    assert_eq!(page.view().result, "Result: new");
}

#[tokio::test]
async fn stale_failure_does_not_overwrite_newer_result() {
    let page = loaded_page().await;
    let slow = page.api().pending();
    let fast = page.api().pending();

    let mut first = Box::pin(page.formatted_draw());
    assert!(poll!(first.as_mut()).is_pending());
    let mut second = Box::pin(page.draw());
    assert!(poll!(second.as_mut()).is_pending());

    fast.send(Ok(json!("Gold"))).unwrap();
    second.await;
    slow.send(Err(offline())).unwrap();
    first.await;
    assert_eq!(page.view().result, "Result: Gold");
}

#[tokio::test]
async fn latest_table_list_wins() {
    let page = loaded_page().await;
    let slow = page.api().pending();
    let fast = page.api().pending();

    let mut first = Box::pin(page.refresh_tables());
    assert!(poll!(first.as_mut()).is_pending());
    let mut second = Box::pin(page.refresh_tables());
    assert!(poll!(second.as_mut()).is_pending());

    fast.send(Ok(json!(["Fresh"]))).unwrap();
    second.await;
    slow.send(Ok(json!(["Stale", "Older"]))).unwrap();
    first.await;
    assert_eq!(page.view().table_names, vec!["Fresh"]);
}

#[tokio::test]
async fn latest_entries_win() {
    let page = loaded_page().await;
    let slow = page.api().pending();
    let fast = page.api().pending();

    let mut first = Box::pin(page.select_table("Loot"));
    assert!(poll!(first.as_mut()).is_pending());
    let mut second = Box::pin(page.select_table("Weather"));
    assert!(poll!(second.as_mut()).is_pending());

    fast.send(Ok(json!([{ "min_roll": 1, "max_roll": 2, "target": "Rain" }]))).unwrap();
    second.await;
    slow.send(Ok(json!([{ "min_roll": 1, "max_roll": 1, "target": "Gold" }]))).unwrap();
    first.await;

    let view = page.view();
    assert_eq!(view.selected.as_deref(), Some("Weather"));
    assert_eq!(view.entries, vec![row("1-2", "Rain")]);
}

#[tokio::test]
async fn older_list_failure_does_not_overwrite_newer_draw() {
    let page = loaded_page().await;
    let list = page.api().pending();
    let draw = page.api().pending();

    let mut refresh = Box::pin(page.refresh_tables());
    assert!(poll!(refresh.as_mut()).is_pending());
    let mut drawing = Box::pin(page.draw());
    assert!(poll!(drawing.as_mut()).is_pending());

    draw.send(Ok(json!("Gold"))).unwrap();
    drawing.await;
    list.send(Err(offline())).unwrap();
    refresh.await;
    assert_eq!(page.view().result, "Result: Gold");
}

#[tokio::test]
async fn older_entries_failure_does_not_overwrite_newer_draw() {
    let page = loaded_page().await;
    let entries = page.api().pending();
    let draw = page.api().pending();

    let mut select = Box::pin(page.select_table("Weather"));
    assert!(poll!(select.as_mut()).is_pending());
    let mut drawing = Box::pin(page.draw());
    assert!(poll!(drawing.as_mut()).is_pending());

    draw.send(Ok(json!("Rain"))).unwrap();
    drawing.await;
    entries.send(Err(offline())).unwrap();
    select.await;

    let view = page.view();
    assert_eq!(view.result, "Result: Rain");
    assert!(view.entries.is_empty());
}

#[tokio::test]
async fn newer_list_failure_beats_older_draw() {
    let page = loaded_page().await;
    let draw = page.api().pending();
    let list = page.api().pending();

    let mut drawing = Box::pin(page.draw());
    assert!(poll!(drawing.as_mut()).is_pending());
    let mut refresh = Box::pin(page.refresh_tables());
    assert!(poll!(refresh.as_mut()).is_pending());

    list.send(Err(offline())).unwrap();
    refresh.await;
    draw.send(Ok(json!("Gold"))).unwrap();
    drawing.await;
    assert_eq!(page.view().result, "Error fetching tables");
}
