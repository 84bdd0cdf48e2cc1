//! In-process fake SolrCloud node for integration tests
//!
//! Serves the collections/configs admin APIs plus `select` and `update` for
//! any collection, backed by an in-memory store. Queries understand `*:*`,
//! `field:value` and `field:[lo TO hi]`, which is enough for facets, JSON
//! facets, grouping, stats and cursor paging over small fixtures.

#![allow(dead_code)]

use std::cmp::Ordering;
use std::net::TcpListener as StdTcpListener;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use tokio::sync::oneshot;

pub const SOLR_USER: &str = "solr";
pub const SOLR_PASSWORD: &str = "SolrRocks";
/// `Authorization` value for `solr:SolrRocks`
pub const SOLR_BASIC_HEADER: &str = "Basic c29scjpTb2xyUm9ja3M=";

pub type Params = Vec<(String, String)>;

/// One request as the fake server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub params: Params,
    pub authorization: Option<String>,
}

impl RecordedRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        param(&self.params, key)
    }
}

#[derive(Default)]
struct Store {
    /// Config name to uploaded archive size
    configs: IndexMap<String, usize>,
    collections: IndexMap<String, Vec<Value>>,
    aliases: IndexMap<String, Vec<String>>,
}

impl Store {
    /// Collection names behind a collection or alias name.
    fn resolve(&self, name: &str) -> Option<Vec<String>> {
        if self.collections.contains_key(name) {
            return Some(vec![name.to_string()]);
        }
        self.aliases.get(name).cloned()
    }

    fn docs(&self, name: &str) -> Option<Vec<Value>> {
        let names = self.resolve(name)?;
        Some(
            names
                .iter()
                .filter_map(|n| self.collections.get(n))
                .flatten()
                .cloned()
                .collect(),
        )
    }
}

#[derive(Default)]
struct FakeState {
    store: Mutex<Store>,
    requests: Mutex<Vec<RecordedRequest>>,
    delay_ms: AtomicU64,
    html: AtomicBool,
}

/// Handle to a running fake node. Dropping it stops the server.
pub struct FakeSolr {
    pub address: String,
    state: Arc<FakeState>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl FakeSolr {
    /// Start on `127.0.0.1:0` with its own runtime thread, so blocking
    /// callers on the test thread cannot starve it.
    pub fn start() -> Self {
        let state = Arc::new(FakeState::default());
        let app = router(state.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let (addr_tx, addr_rx) = std::sync::mpsc::channel();

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(4)
                .enable_all()
                .build()
                .expect("fake solr runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind fake solr");
                addr_tx
                    .send(listener.local_addr().expect("fake solr address"))
                    .expect("report fake solr address");
                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await
                    .expect("fake solr serve");
            });
        });

        let addr = addr_rx.recv().expect("fake solr did not start");
        Self {
            address: format!("http://{}", addr),
            state,
            shutdown: Some(shutdown_tx),
        }
    }

    /// Every answer waits this long first.
    pub fn set_delay(&self, delay: Duration) {
        self.state
            .delay_ms
            .store(delay.as_millis() as u64, AtomicOrdering::SeqCst);
    }

    /// Answer every request with `200 text/html`, like a misrouted proxy.
    pub fn serve_html(&self, enabled: bool) {
        self.state.html.store(enabled, AtomicOrdering::SeqCst);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("requests lock").clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().expect("requests lock").len()
    }

    /// Create a collection with `docs` without going through HTTP.
    pub fn seed(&self, collection: &str, docs: Vec<Value>) {
        let mut store = self.state.store.lock().expect("store lock");
        store.collections.insert(collection.to_string(), docs);
    }

    pub fn config_size(&self, name: &str) -> Option<usize> {
        let store = self.state.store.lock().expect("store lock");
        store.configs.get(name).copied()
    }
}

impl Drop for FakeSolr {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

/// Address nobody listens on.
pub fn dead_address() -> String {
    let listener = StdTcpListener::bind("127.0.0.1:0").expect("bind probe");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{}", addr)
}

/// Six documents whose `count` totals 1000, 750 of it below age 60.
pub fn population() -> Vec<Value> {
    vec![
        json!({"id": "p1", "age": 20, "count": 100, "gender": "F", "interests": ["cars", "music"]}),
        json!({"id": "p2", "age": 40, "count": 200, "gender": "M", "interests": ["cars"]}),
        json!({"id": "p3", "age": 20, "count": 250, "gender": "M", "interests": ["music"]}),
        json!({"id": "p4", "age": 40, "count": 200, "gender": "F", "interests": ["sports"]}),
        json!({"id": "p5", "age": 60, "count": 125, "gender": "F", "interests": ["cars"]}),
        json!({"id": "p6", "age": 60, "count": 125, "gender": "M", "interests": ["music", "sports"]}),
    ]
}

fn router(state: Arc<FakeState>) -> Router {
    Router::new()
        .route("/solr/admin/configs", any(configs_handler))
        .route("/solr/admin/collections", any(collections_handler))
        .route("/solr/:collection/:handler", any(core_handler))
        .with_state(state)
}

// ============================================================================
// Request plumbing
// ============================================================================

fn parse_params(raw: Option<String>) -> Params {
    let raw = raw.unwrap_or_default();
    match reqwest::Url::parse(&format!("http://fake/?{}", raw)) {
        Ok(url) => url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
        Err(_) => Vec::new(),
    }
}

fn param<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

fn params_all<'a>(params: &'a Params, key: &str) -> Vec<&'a str> {
    params
        .iter()
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .collect()
}

fn param_usize(params: &Params, key: &str, default: usize) -> usize {
    param(params, key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Record the request, apply the delay, and short-circuit in HTML mode.
async fn prelude(
    state: &FakeState,
    method: &Method,
    path: String,
    headers: &HeaderMap,
    params: &Params,
) -> Option<Response> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    state
        .requests
        .lock()
        .expect("requests lock")
        .push(RecordedRequest {
            method: method.to_string(),
            path,
            params: params.clone(),
            authorization,
        });

    let delay = state.delay_ms.load(AtomicOrdering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    if state.html.load(AtomicOrdering::SeqCst) {
        return Some(
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html;charset=utf-8")],
                "<html><body><h1>Solr Admin</h1></body></html>",
            )
                .into_response(),
        );
    }
    None
}

fn json_response(status: StatusCode, body: Value) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json;charset=utf-8")],
        body.to_string(),
    )
        .into_response()
}

fn ok(fields: Map<String, Value>) -> Response {
    let mut body = Map::new();
    body.insert(
        "responseHeader".to_string(),
        json!({"zkConnected": true, "status": 0, "QTime": 1}),
    );
    body.extend(fields);
    json_response(StatusCode::OK, Value::Object(body))
}

fn solr_error(status: StatusCode, msg: impl Into<String>) -> Response {
    let code = status.as_u16();
    json_response(
        status,
        json!({
            "responseHeader": {"status": code, "QTime": 0},
            "error": {
                "metadata": ["error-class", "org.apache.solr.common.SolrException"],
                "msg": msg.into(),
                "code": code
            }
        }),
    )
}

// ============================================================================
// Admin APIs
// ============================================================================

async fn configs_handler(
    State(state): State<Arc<FakeState>>,
    method: Method,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Response {
    let params = parse_params(raw);
    if let Some(response) = prelude(&state, &method, "/solr/admin/configs".into(), &headers, &params).await {
        return response;
    }
    let mut store = state.store.lock().expect("store lock");
    let name = param(&params, "name").map(String::from);

    match (param(&params, "action"), name) {
        (Some("UPLOAD"), Some(name)) => {
            if method != Method::POST || !body.starts_with(b"PK") {
                return solr_error(StatusCode::BAD_REQUEST, "Upload must be a POSTed zip archive");
            }
            if store.configs.contains_key(&name) {
                return solr_error(
                    StatusCode::BAD_REQUEST,
                    format!("The configuration {} already exists in zookeeper", name),
                );
            }
            store.configs.insert(name, body.len());
            ok(Map::new())
        }
        (Some("LIST"), _) => {
            let names: Vec<&String> = store.configs.keys().collect();
            ok(Map::from_iter([("configSets".to_string(), json!(names))]))
        }
        (Some("DELETE"), Some(name)) => match store.configs.shift_remove(&name) {
            Some(_) => ok(Map::new()),
            None => solr_error(StatusCode::BAD_REQUEST, format!("Config {} not found", name)),
        },
        (action, _) => solr_error(
            StatusCode::BAD_REQUEST,
            format!("Unsupported configs action {:?}", action),
        ),
    }
}

async fn collections_handler(
    State(state): State<Arc<FakeState>>,
    method: Method,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    let params = parse_params(raw);
    if let Some(response) =
        prelude(&state, &method, "/solr/admin/collections".into(), &headers, &params).await
    {
        return response;
    }
    let mut store = state.store.lock().expect("store lock");
    let name = param(&params, "name").map(String::from);

    match (param(&params, "action"), name) {
        (Some("CREATE"), Some(name)) => {
            let config = param(&params, "collection.configName").unwrap_or_default();
            if !store.configs.contains_key(config) {
                return solr_error(
                    StatusCode::BAD_REQUEST,
                    format!("Can not find the specified config set: {}", config),
                );
            }
            if store.collections.contains_key(&name) {
                return solr_error(
                    StatusCode::BAD_REQUEST,
                    format!("collection already exists: {}", name),
                );
            }
            store.collections.insert(name, Vec::new());
            ok(Map::from_iter([("success".to_string(), json!({}))]))
        }
        (Some("LIST"), _) => {
            let names: Vec<&String> = store.collections.keys().collect();
            ok(Map::from_iter([("collections".to_string(), json!(names))]))
        }
        (Some("DELETE"), Some(name)) => match store.collections.shift_remove(&name) {
            Some(_) => ok(Map::new()),
            None => solr_error(
                StatusCode::BAD_REQUEST,
                format!("Could not find collection : {}", name),
            ),
        },
        (Some("CREATEALIAS"), Some(name)) => {
            let targets: Vec<String> = param(&params, "collections")
                .unwrap_or_default()
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
            if let Some(missing) = targets.iter().find(|c| !store.collections.contains_key(*c)) {
                return solr_error(
                    StatusCode::BAD_REQUEST,
                    format!("Can't create collection alias for collections='{}', '{}' is not an existing collection or alias", targets.join(","), missing),
                );
            }
            store.aliases.insert(name, targets);
            ok(Map::new())
        }
        (Some("LISTALIASES"), _) => {
            let aliases: Map<String, Value> = store
                .aliases
                .iter()
                .map(|(name, targets)| (name.clone(), json!(targets.join(","))))
                .collect();
            ok(Map::from_iter([
                ("aliases".to_string(), Value::Object(aliases)),
                ("properties".to_string(), json!({})),
            ]))
        }
        (Some("DELETEALIAS"), Some(name)) => {
            store.aliases.shift_remove(&name);
            ok(Map::new())
        }
        (action, _) => solr_error(
            StatusCode::BAD_REQUEST,
            format!("Unsupported collections action {:?}", action),
        ),
    }
}

// ============================================================================
// Collection handlers
// ============================================================================

async fn core_handler(
    State(state): State<Arc<FakeState>>,
    Path((collection, handler)): Path<(String, String)>,
    method: Method,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Response {
    let params = parse_params(raw);
    let path = format!("/solr/{}/{}", collection, handler);
    if let Some(response) = prelude(&state, &method, path, &headers, &params).await {
        return response;
    }
    match handler.as_str() {
        "select" => {
            let store = state.store.lock().expect("store lock");
            match store.docs(&collection) {
                Some(docs) => select(docs, &params),
                None => solr_error(
                    StatusCode::NOT_FOUND,
                    format!("Collection not found: {}", collection),
                ),
            }
        }
        "update" => {
            let mut store = state.store.lock().expect("store lock");
            update(&mut store, &collection, &body)
        }
        other => solr_error(
            StatusCode::NOT_FOUND,
            format!("Unknown request handler: /{}", other),
        ),
    }
}

fn update(store: &mut Store, collection: &str, body: &[u8]) -> Response {
    let target = match store.resolve(collection).and_then(|names| names.into_iter().next()) {
        Some(target) => target,
        None => {
            return solr_error(
                StatusCode::NOT_FOUND,
                format!("Collection not found: {}", collection),
            )
        }
    };
    let body: Value = match serde_json::from_slice(body) {
        Ok(body) => body,
        Err(e) => return solr_error(StatusCode::BAD_REQUEST, format!("Cannot parse JSON: {}", e)),
    };
    let docs = store.collections.entry(target).or_default();

    match body {
        Value::Array(incoming) => {
            for doc in incoming {
                if !doc.is_object() {
                    return solr_error(StatusCode::BAD_REQUEST, "Document is not a JSON object");
                }
                let id = doc.get("id").cloned();
                docs.retain(|existing| id.is_none() || existing.get("id") != id.as_ref());
                docs.push(doc);
            }
            ok(Map::new())
        }
        Value::Object(command) => {
            let deletes = command
                .get("delete")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            for delete in deletes {
                match delete {
                    Value::String(id) => docs.retain(|d| d.get("id") != Some(&Value::String(id.clone()))),
                    Value::Object(q) => {
                        let query = q.get("query").and_then(Value::as_str).unwrap_or_default();
                        docs.retain(|d| !matches_query(d, query));
                    }
                    _ => return solr_error(StatusCode::BAD_REQUEST, "Unsupported delete"),
                }
            }
            ok(Map::new())
        }
        _ => solr_error(StatusCode::BAD_REQUEST, "Unsupported update body"),
    }
}

// ============================================================================
// Query evaluation
// ============================================================================

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn field_values<'a>(doc: &'a Value, field: &str) -> Vec<&'a Value> {
    match doc.get(field) {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(value) => vec![value],
    }
}

fn bound(raw: &str) -> Option<f64> {
    if raw == "*" {
        None
    } else {
        raw.parse().ok()
    }
}

fn matches_query(doc: &Value, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() || query == "*:*" {
        return true;
    }
    let Some((field, expr)) = query.split_once(':') else {
        return false;
    };
    let values = field_values(doc, field);
    if expr == "*" {
        return !values.is_empty();
    }
    if let Some(range) = expr.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        let Some((lo, hi)) = range.split_once(" TO ") else {
            return false;
        };
        let (lo, hi) = (bound(lo.trim()), bound(hi.trim()));
        return values.iter().any(|v| match v.as_f64() {
            Some(x) => lo.map_or(true, |l| x >= l) && hi.map_or(true, |h| x <= h),
            None => false,
        });
    }
    let expr = expr.trim_matches('"');
    values.iter().any(|v| render(v) == expr)
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => render(a).cmp(&render(b)),
    }
}

fn sort_docs(docs: &mut [Value], sort: &str) {
    let clauses: Vec<(String, bool)> = sort
        .split(',')
        .filter_map(|clause| {
            let mut parts = clause.split_whitespace();
            let field = parts.next()?.to_string();
            let descending = parts.next() == Some("desc");
            Some((field, descending))
        })
        .collect();
    docs.sort_by(|a, b| {
        for (field, descending) in &clauses {
            let left = a.get(field).unwrap_or(&Value::Null);
            let right = b.get(field).unwrap_or(&Value::Null);
            let ordering = compare_values(left, right);
            let ordering = if *descending { ordering.reverse() } else { ordering };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn project(doc: &Value, fl: &[String]) -> Value {
    if fl.is_empty() || fl.iter().any(|f| f == "*") {
        return doc.clone();
    }
    match doc.as_object() {
        Some(object) => Value::Object(
            object
                .iter()
                .filter(|(k, _)| fl.contains(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        None => doc.clone(),
    }
}

fn doc_list(docs: &[Value], start: usize, limit: usize, fl: &[String]) -> Value {
    json!({
        "numFound": docs.len(),
        "start": start,
        "numFoundExact": true,
        "docs": docs.iter().skip(start).take(limit).map(|d| project(d, fl)).collect::<Vec<_>>()
    })
}

fn select(docs: Vec<Value>, params: &Params) -> Response {
    let mut filters: Vec<&str> = vec![param(params, "q").unwrap_or("*:*")];
    filters.extend(params_all(params, "fq"));
    let mut matched: Vec<Value> = docs
        .into_iter()
        .filter(|doc| filters.iter().all(|f| matches_query(doc, f)))
        .collect();
    let sort = param(params, "sort");
    if let Some(sort) = sort {
        sort_docs(&mut matched, sort);
    }
    let rows = param_usize(params, "rows", 10);
    let fl: Vec<String> = param(params, "fl")
        .map(|f| f.split(',').map(|s| s.trim().to_string()).collect())
        .unwrap_or_default();

    let mut body = Map::new();

    if param(params, "group") == Some("true") {
        body.insert("grouped".to_string(), grouped(&matched, params, &fl));
    } else if let Some(mark) = param(params, "cursorMark") {
        if !sort.map_or(false, |s| s.split(',').any(|c| c.trim().starts_with("id "))) {
            return solr_error(
                StatusCode::BAD_REQUEST,
                "Cursor functionality requires a sort containing a uniqueKey field tie breaker",
            );
        }
        let offset = if mark == "*" {
            0
        } else {
            match mark.strip_prefix("cursor:").and_then(|n| n.parse::<usize>().ok()) {
                Some(offset) => offset,
                None => {
                    return solr_error(
                        StatusCode::BAD_REQUEST,
                        format!("Unable to parse 'cursorMark' after totem: value={}", mark),
                    )
                }
            }
        };
        let page: Vec<Value> = matched.iter().skip(offset).take(rows).map(|d| project(d, &fl)).collect();
        let next = if page.is_empty() {
            mark.to_string()
        } else {
            format!("cursor:{}", offset + page.len())
        };
        body.insert(
            "response".to_string(),
            json!({"numFound": matched.len(), "start": 0, "numFoundExact": true, "docs": page}),
        );
        body.insert("nextCursorMark".to_string(), json!(next));
    } else {
        let start = param_usize(params, "start", 0);
        body.insert("response".to_string(), doc_list(&matched, start, rows, &fl));
    }

    if param(params, "facet") == Some("true") {
        body.insert("facet_counts".to_string(), facet_counts(&matched, params));
    }
    if let Some(spec) = param(params, "json.facet") {
        match serde_json::from_str::<Value>(spec) {
            Ok(spec) => {
                body.insert("facets".to_string(), json_facets(&matched, &spec));
            }
            Err(e) => {
                return solr_error(StatusCode::BAD_REQUEST, format!("Expected JSON facet: {}", e))
            }
        }
    }
    if param(params, "stats") == Some("true") {
        body.insert("stats".to_string(), stats(&matched, params));
    }
    ok(body)
}

fn grouped(matched: &[Value], params: &Params, fl: &[String]) -> Value {
    let limit = param_usize(params, "group.limit", 1);
    let with_ngroups = param(params, "group.ngroups") == Some("true");
    let mut out = Map::new();

    for field in params_all(params, "group.field") {
        let mut groups: IndexMap<String, (Value, Vec<Value>)> = IndexMap::new();
        for doc in matched {
            let value = doc.get(field).cloned().unwrap_or(Value::Null);
            groups
                .entry(render(&value))
                .or_insert_with(|| (value.clone(), Vec::new()))
                .1
                .push(doc.clone());
        }
        let entries: Vec<Value> = groups
            .values()
            .map(|(value, docs)| json!({"groupValue": value, "doclist": doc_list(docs, 0, limit, fl)}))
            .collect();
        let mut group = Map::new();
        group.insert("matches".to_string(), json!(matched.len()));
        if with_ngroups {
            group.insert("ngroups".to_string(), json!(entries.len()));
        }
        group.insert("groups".to_string(), Value::Array(entries));
        out.insert(field.to_string(), Value::Object(group));
    }

    for query in params_all(params, "group.query") {
        let docs: Vec<Value> = matched.iter().filter(|d| matches_query(d, query)).cloned().collect();
        out.insert(
            query.to_string(),
            json!({"matches": matched.len(), "doclist": doc_list(&docs, 0, limit, fl)}),
        );
    }
    Value::Object(out)
}

/// Distinct values of `field` with their counts, most frequent first.
fn count_values<'a>(docs: impl Iterator<Item = &'a Value>, field: &str) -> Vec<(Value, Vec<&'a Value>)> {
    let mut counts: IndexMap<String, (Value, Vec<&'a Value>)> = IndexMap::new();
    for doc in docs {
        for value in field_values(doc, field) {
            counts
                .entry(render(value))
                .or_insert_with(|| (value.clone(), Vec::new()))
                .1
                .push(doc);
        }
    }
    let mut counts: Vec<(Value, Vec<&Value>)> = counts.into_values().collect();
    counts.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| compare_values(&a.0, &b.0)));
    counts
}

fn facet_counts(matched: &[Value], params: &Params) -> Value {
    let mut queries = Map::new();
    for query in params_all(params, "facet.query") {
        let count = matched.iter().filter(|d| matches_query(d, query)).count();
        queries.insert(query.to_string(), json!(count));
    }

    let mut fields = Map::new();
    for field in params_all(params, "facet.field") {
        let min_count = param(params, &format!("f.{}.facet.mincount", field))
            .or_else(|| param(params, "facet.mincount"))
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);
        let flat: Vec<Value> = count_values(matched.iter(), field)
            .into_iter()
            .filter(|(_, docs)| docs.len() >= min_count)
            .flat_map(|(value, docs)| [json!(render(&value)), json!(docs.len())])
            .collect();
        fields.insert(field.to_string(), Value::Array(flat));
    }

    let mut pivots = Map::new();
    for pivot in params_all(params, "facet.pivot") {
        let path: Vec<&str> = pivot.split(',').map(str::trim).collect();
        let docs: Vec<&Value> = matched.iter().collect();
        pivots.insert(pivot.to_string(), Value::Array(pivot_level(&docs, &path)));
    }

    json!({
        "facet_queries": queries,
        "facet_fields": fields,
        "facet_ranges": {},
        "facet_intervals": {},
        "facet_heatmaps": {},
        "facet_pivot": pivots
    })
}

fn pivot_level(docs: &[&Value], path: &[&str]) -> Vec<Value> {
    let Some((field, rest)) = path.split_first() else {
        return Vec::new();
    };
    count_values(docs.iter().copied(), field)
        .into_iter()
        .map(|(value, subset)| {
            let mut node = Map::new();
            node.insert("field".to_string(), json!(field));
            node.insert("value".to_string(), value);
            node.insert("count".to_string(), json!(subset.len()));
            if !rest.is_empty() {
                node.insert("pivot".to_string(), Value::Array(pivot_level(&subset, rest)));
            }
            Value::Object(node)
        })
        .collect()
}

fn json_facets(matched: &[Value], spec: &Value) -> Value {
    let docs: Vec<&Value> = matched.iter().collect();
    let mut out = Map::new();
    out.insert("count".to_string(), json!(docs.len()));
    evaluate_children(&docs, Some(spec), &mut out);
    Value::Object(out)
}

fn evaluate_children(docs: &[&Value], facets: Option<&Value>, out: &mut Map<String, Value>) {
    let Some(facets) = facets.and_then(Value::as_object) else {
        return;
    };
    for (name, facet) in facets {
        match facet {
            Value::String(stat) => {
                if let Some(value) = stat_value(docs, stat) {
                    out.insert(name.clone(), value);
                }
            }
            Value::Object(def) => {
                out.insert(name.clone(), evaluate_facet(docs, def));
            }
            _ => {}
        }
    }
}

fn evaluate_facet(docs: &[&Value], def: &Map<String, Value>) -> Value {
    let mut out = Map::new();
    match def.get("type").and_then(Value::as_str) {
        Some("query") => {
            let query = def.get("q").and_then(Value::as_str).unwrap_or("*:*");
            let filters: Vec<&str> = match def.get("fq") {
                Some(Value::String(fq)) => vec![fq.as_str()],
                Some(Value::Array(fqs)) => fqs.iter().filter_map(Value::as_str).collect(),
                _ => Vec::new(),
            };
            let subset: Vec<&Value> = docs
                .iter()
                .copied()
                .filter(|d| matches_query(d, query) && filters.iter().all(|f| matches_query(d, f)))
                .collect();
            out.insert("count".to_string(), json!(subset.len()));
            evaluate_children(&subset, def.get("facet"), &mut out);
        }
        Some("terms") => {
            let field = def.get("field").and_then(Value::as_str).unwrap_or_default();
            let limit = def.get("limit").and_then(Value::as_u64).unwrap_or(10) as usize;
            let offset = def.get("offset").and_then(Value::as_u64).unwrap_or(0) as usize;
            let min_count = def.get("mincount").and_then(Value::as_u64).unwrap_or(1) as usize;
            let counted: Vec<(Value, Vec<&Value>)> = count_values(docs.iter().copied(), field)
                .into_iter()
                .filter(|(_, subset)| subset.len() >= min_count)
                .collect();
            if def.get("numBuckets").and_then(Value::as_bool) == Some(true) {
                out.insert("numBuckets".to_string(), json!(counted.len()));
            }
            let buckets: Vec<Value> = counted
                .into_iter()
                .skip(offset)
                .take(limit)
                .map(|(value, subset)| {
                    let mut bucket = Map::new();
                    bucket.insert("val".to_string(), value);
                    bucket.insert("count".to_string(), json!(subset.len()));
                    evaluate_children(&subset, def.get("facet"), &mut bucket);
                    Value::Object(bucket)
                })
                .collect();
            out.insert("buckets".to_string(), Value::Array(buckets));
        }
        _ => {}
    }
    Value::Object(out)
}

fn numbers(docs: &[&Value], field: &str) -> Vec<f64> {
    docs.iter()
        .flat_map(|d| field_values(d, field))
        .filter_map(Value::as_f64)
        .collect()
}

/// `sum(f)`, `avg(f)`, `min(f)`, `max(f)` and `unique(f)`.
fn stat_value(docs: &[&Value], expr: &str) -> Option<Value> {
    let (function, rest) = expr.trim().split_once('(')?;
    let field = rest.strip_suffix(')')?.trim();
    let values = numbers(docs, field);
    let result = match function {
        "sum" => values.iter().sum::<f64>(),
        "avg" if !values.is_empty() => values.iter().sum::<f64>() / values.len() as f64,
        "min" => values.iter().copied().reduce(f64::min)?,
        "max" => values.iter().copied().reduce(f64::max)?,
        "unique" => {
            let distinct: std::collections::BTreeSet<String> = docs
                .iter()
                .flat_map(|d| field_values(d, field))
                .map(render)
                .collect();
            return Some(json!(distinct.len()));
        }
        _ => return None,
    };
    Some(json!(result))
}

fn stats(matched: &[Value], params: &Params) -> Value {
    let docs: Vec<&Value> = matched.iter().collect();
    let mut fields = Map::new();
    for field in params_all(params, "stats.field") {
        let values = numbers(&docs, field);
        let missing = docs.iter().filter(|d| field_values(d, field).is_empty()).count();
        if values.is_empty() {
            fields.insert(field.to_string(), json!({"count": 0, "missing": missing}));
            continue;
        }
        let count = values.len() as f64;
        let sum: f64 = values.iter().sum();
        let sum_of_squares: f64 = values.iter().map(|v| v * v).sum();
        let mean = sum / count;
        let stddev = if values.len() > 1 {
            ((sum_of_squares - sum * sum / count) / (count - 1.0)).sqrt()
        } else {
            0.0
        };
        fields.insert(
            field.to_string(),
            json!({
                "min": values.iter().copied().fold(f64::INFINITY, f64::min),
                "max": values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                "count": values.len(),
                "missing": missing,
                "sum": sum,
                "sumOfSquares": sum_of_squares,
                "mean": mean,
                "stddev": stddev
            }),
        );
    }
    json!({"stats_fields": fields})
}
