use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const BASE_PATH: &str = "/rest/bpm/wle/v1";

/// Accepted Basic-Auth credentials. Only `admin` may read system details.
pub const CREDENTIALS: &[(&str, &str)] = &[("admin", "admin"), ("viewer", "viewer")];

/// Timestamp stamped on every instance and task the server creates.
pub const CREATED_AT: &str = "2019-11-13T10:09:00Z";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstanceState {
    Running,
    Suspended,
    Terminated,
    Failed,
}

impl InstanceState {
    fn labels(self) -> (&'static str, &'static str) {
        match self {
            InstanceState::Running => ("STATE_RUNNING", "Active"),
            InstanceState::Suspended => ("STATE_SUSPENDED", "Suspended"),
            InstanceState::Terminated => ("STATE_TERMINATED", "Terminated"),
            InstanceState::Failed => ("STATE_FAILED", "Failed"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Token {
    pub token_id: String,
    pub flow_object_id: String,
    pub timer: bool,
}

#[derive(Clone, Debug)]
pub struct Instance {
    pub piid: String,
    pub bpd_id: String,
    pub process_app_id: String,
    pub state: InstanceState,
    pub variables: Value,
    pub tokens: Vec<Token>,
}

impl Instance {
    /// The full server-side representation, including fields clients drop.
    pub fn to_json(&self) -> Value {
        let (state, execution_state) = self.state.labels();
        let children: Vec<Value> = self
            .tokens
            .iter()
            .map(|t| json!({"tokenId": t.token_id, "flowObjectId": t.flow_object_id}))
            .collect();
        json!({
            "piid": self.piid,
            "name": format!("Onboarding:{}", self.piid),
            "state": state,
            "executionState": execution_state,
            "bpdName": "Onboarding",
            "bpdId": self.bpd_id,
            "processAppID": self.process_app_id,
            "processAppName": "Hiring Sample",
            "processAppAcronym": "HSS",
            "snapshotName": "v1.0",
            "creationTime": CREATED_AT,
            "lastModificationTime": CREATED_AT,
            "dueDate": "",
            "closeDate": null,
            "variables": self.variables,
            "diagram": {"step": []},
            "executionTree": {"root": {"children": children}},
            "tasks": [{
                "tkiid": format!("{}01", self.piid),
                "name": "Review request",
                "status": "Received",
                "state": "STATE_READY",
                "owner": "admin",
                "originator": "user.admin",
                "assignedTo": "admin",
                "assignedToType": "user",
                "priority": "Normal",
                "startTime": CREATED_AT,
                "dueTime": "",
                "completionTime": null,
                "lastModificationTime": CREATED_AT,
                "data": {"variables": {}},
                "processData": {"internal": true}
            }]
        })
    }
}

#[derive(Debug, Default)]
pub struct Store {
    instances: HashMap<String, Instance>,
    next_id: u64,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone, Debug)]
struct Caller(String);

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store {
        instances: HashMap::new(),
        next_id: 50,
    }));
    let api = Router::new()
        .route("/users", get(list_users))
        .route("/user/{id}", get(get_user))
        .route("/groups", get(list_groups))
        .route("/group/{name}", get(get_group))
        .route("/process", post(post_process).put(bulk_action))
        .route("/process/{id}", get(get_instance).put(instance_action))
        .route("/systems", get(system_details));
    Router::new()
        .nest(BASE_PATH, api)
        .layer(middleware::from_fn(require_auth))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

async fn require_auth(mut req: Request, next: Next) -> Response {
    let caller = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(authenticate);
    match caller {
        Some(caller) => {
            req.extensions_mut().insert(caller);
            next.run(req).await
        }
        None => fail(StatusCode::UNAUTHORIZED, "CWTBG0001E", "Authentication required"),
    }
}

fn authenticate(header: &str) -> Option<Caller> {
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = String::from_utf8(STANDARD.decode(encoded).ok()?).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    CREDENTIALS
        .iter()
        .any(|(u, p)| *u == user && *p == pass)
        .then(|| Caller(user.to_string()))
}

// --- response helpers ---

fn ok(data: Value) -> Response {
    Json(json!({"status": "200", "data": data})).into_response()
}

fn fail(status: StatusCode, number: &str, message: &str) -> Response {
    let body = json!({
        "status": "error",
        "Data": {
            "status": "error",
            "errorNumber": number,
            "errorMessage": message,
            "errorMessageParameters": [],
            "programmersDetails": "mock"
        }
    });
    (status, Json(body)).into_response()
}

// --- users & groups ---

fn users() -> Vec<Value> {
    [(1, "admin", "Administrator"), (9, "tw_admin", "TW Admin"), (12, "tw_user", "TW User")]
        .into_iter()
        .map(|(id, name, full)| {
            json!({
                "userID": id,
                "userName": name,
                "fullName": full,
                "emailAddress": format!("{name}@example.com"),
                "isDisabled": false,
                "memberships": ["tw_allusers"],
                "userPreferences": {"Locale": "en"},
                "internalID": format!("u-{id}")
            })
        })
        .collect()
}

fn groups() -> Vec<Value> {
    [(2, "tw_allusers", "All users"), (3, "Team Leads", "Team leads")]
        .into_iter()
        .map(|(id, name, description)| {
            json!({
                "groupID": id,
                "groupName": name,
                "displayName": name,
                "description": description,
                "managerGroupName": null,
                "deleted": false,
                "members": ["admin"],
                "securityRealm": "defaultWIMFileBasedRealm"
            })
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub filter: Option<String>,
    pub max_count: Option<usize>,
}

fn matches_filter(name: &str, filter: Option<&str>) -> bool {
    match filter {
        None => true,
        Some(f) => name.starts_with(f.trim_end_matches('*')),
    }
}

async fn list_users(Query(query): Query<ListQuery>) -> Response {
    let mut found: Vec<Value> = users()
        .into_iter()
        .filter(|u| matches_filter(u["userName"].as_str().unwrap_or(""), query.filter.as_deref()))
        .collect();
    if let Some(max) = query.max_count {
        found.truncate(max);
    }
    ok(json!({"users": found, "total": found.len()}))
}

async fn get_user(Path(id): Path<String>) -> Response {
    users()
        .into_iter()
        .find(|u| u["userName"] == id.as_str() || u["userID"].to_string() == id)
        .map(ok)
        .unwrap_or_else(|| fail(StatusCode::NOT_FOUND, "CWTBG0017E", "User not found"))
}

async fn list_groups(Query(query): Query<ListQuery>) -> Response {
    let found: Vec<Value> = groups()
        .into_iter()
        .filter(|g| matches_filter(g["groupName"].as_str().unwrap_or(""), query.filter.as_deref()))
        .collect();
    ok(json!({"groups": found}))
}

async fn get_group(Path(name): Path<String>) -> Response {
    groups()
        .into_iter()
        .find(|g| g["groupName"] == name.as_str())
        .map(ok)
        .unwrap_or_else(|| fail(StatusCode::NOT_FOUND, "CWTBG0018E", "Group not found"))
}

// --- process instances ---

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ActionQuery {
    pub action: Option<String>,
    pub bpd_id: Option<String>,
    pub process_app_id: Option<String>,
    pub params: Option<String>,
    pub message: Option<String>,
    pub instance_ids: Option<String>,
    pub timer_token_id: Option<String>,
    pub token_id: Option<String>,
    pub target: Option<String>,
    pub resume: Option<bool>,
}

async fn post_process(State(db): State<Db>, Query(query): Query<ActionQuery>) -> Response {
    match query.action.as_deref() {
        Some("start") => start_instance(db, query).await,
        Some("sendMessage") => send_message(query),
        _ => fail(StatusCode::BAD_REQUEST, "CWTBG0004E", "Unsupported action"),
    }
}

async fn start_instance(db: Db, query: ActionQuery) -> Response {
    let (Some(bpd_id), Some(process_app_id)) = (query.bpd_id, query.process_app_id) else {
        return fail(StatusCode::BAD_REQUEST, "CWTBG0005E", "bpdId and processAppId are required");
    };
    let variables: Value = match query.params.as_deref().map(serde_json::from_str::<Value>).transpose() {
        Ok(params) => params.unwrap_or_else(|| json!({})),
        Err(_) => return fail(StatusCode::BAD_REQUEST, "CWTBG0006E", "params is not valid JSON"),
    };
    let state = if variables["fail"] == true {
        InstanceState::Failed
    } else {
        InstanceState::Running
    };

    let mut store = db.write().await;
    store.next_id += 1;
    let piid = store.next_id.to_string();
    let instance = Instance {
        tokens: vec![
            Token {
                token_id: format!("{piid}.1"),
                flow_object_id: "bpdid:step1".to_string(),
                timer: false,
            },
            Token {
                token_id: format!("{piid}.2"),
                flow_object_id: "bpdid:timer1".to_string(),
                timer: true,
            },
        ],
        piid: piid.clone(),
        bpd_id,
        process_app_id,
        state,
        variables,
    };
    let body = instance.to_json();
    store.instances.insert(piid, instance);
    ok(body)
}

fn send_message(query: ActionQuery) -> Response {
    match query.message {
        Some(xml) if xml.starts_with("<eventmsg>") && xml.ends_with("</eventmsg>") => {
            ok(json!({"messageSent": true, "length": xml.len()}))
        }
        _ => fail(StatusCode::BAD_REQUEST, "CWTBG0007E", "Malformed event message"),
    }
}

async fn get_instance(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let store = db.read().await;
    match store.instances.get(&id) {
        Some(instance) => ok(instance.to_json()),
        None => not_found(&id),
    }
}

fn not_found(id: &str) -> Response {
    fail(
        StatusCode::NOT_FOUND,
        "CWTBG0019E",
        &format!("Process instance {id} not found"),
    )
}

fn conflict(action: &str) -> Response {
    fail(
        StatusCode::CONFLICT,
        "CWTBG0020E",
        &format!("Action {action} is not allowed in the current state"),
    )
}

/// Apply a control verb; `Ok(None)` means the instance was deleted.
fn apply(store: &mut Store, id: &str, action: &str) -> Result<Option<Value>, Response> {
    let Some(instance) = store.instances.get_mut(id) else {
        return Err(not_found(id));
    };
    use InstanceState::*;
    let next = match (action, instance.state) {
        ("suspend", Running) => Suspended,
        ("resume", Suspended) => Running,
        ("terminate", Running | Suspended | Failed) => Terminated,
        ("retry", Failed) => Running,
        ("delete", Terminated) => {
            store.instances.remove(id);
            return Ok(None);
        }
        ("suspend" | "resume" | "terminate" | "retry" | "delete", _) => return Err(conflict(action)),
        _ => return Err(fail(StatusCode::BAD_REQUEST, "CWTBG0004E", "Unsupported action")),
    };
    instance.state = next;
    Ok(Some(instance.to_json()))
}

async fn instance_action(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(query): Query<ActionQuery>,
) -> Response {
    let mut store = db.write().await;
    let action = query.action.clone().unwrap_or_default();
    let result = match action.as_str() {
        "fireTimer" => fire_timer(&mut store, &id, &query),
        "moveToken" | "deleteToken" => token_action(&mut store, &id, &action, &query),
        _ => apply(&mut store, &id, &action),
    };
    match result {
        Ok(Some(body)) => ok(body),
        Ok(None) => ok(json!({"piid": id, "deleted": true})),
        Err(response) => response,
    }
}

fn fire_timer(store: &mut Store, id: &str, query: &ActionQuery) -> Result<Option<Value>, Response> {
    let instance = store.instances.get_mut(id).ok_or_else(|| not_found(id))?;
    let timer_id = query.timer_token_id.as_deref().unwrap_or_default();
    let index = instance
        .tokens
        .iter()
        .position(|t| t.timer && t.token_id == timer_id)
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "CWTBG0021E", "Timer token not found"))?;
    if instance.state != InstanceState::Running {
        return Err(conflict("fireTimer"));
    }
    instance.tokens.remove(index);
    Ok(Some(instance.to_json()))
}

fn token_action(
    store: &mut Store,
    id: &str,
    action: &str,
    query: &ActionQuery,
) -> Result<Option<Value>, Response> {
    let instance = store.instances.get_mut(id).ok_or_else(|| not_found(id))?;
    if instance.state != InstanceState::Suspended {
        return Err(conflict(action));
    }
    let token_id = query.token_id.as_deref().unwrap_or_default();
    let index = instance
        .tokens
        .iter()
        .position(|t| t.token_id == token_id)
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "CWTBG0022E", "Token not found"))?;
    if action == "moveToken" {
        let Some(target) = query.target.clone() else {
            return Err(fail(StatusCode::BAD_REQUEST, "CWTBG0023E", "target is required"));
        };
        instance.tokens[index].flow_object_id = target;
    } else {
        instance.tokens.remove(index);
    }
    if query.resume.unwrap_or(false) {
        instance.state = InstanceState::Running;
    }
    Ok(Some(instance.to_json()))
}

async fn bulk_action(State(db): State<Db>, Query(query): Query<ActionQuery>) -> Response {
    let Some(action) = query.action.as_deref() else {
        return fail(StatusCode::BAD_REQUEST, "CWTBG0004E", "Unsupported action");
    };
    if !matches!(action, "suspend" | "resume" | "terminate" | "retry" | "delete") {
        return fail(StatusCode::BAD_REQUEST, "CWTBG0004E", "Unsupported action");
    }
    let ids = query.instance_ids.as_deref().unwrap_or_default();

    let mut store = db.write().await;
    let mut succeeded = Vec::new();
    let mut failed = Vec::new();
    for id in ids.split(',').map(str::trim).filter(|id| !id.is_empty()) {
        match apply(&mut store, id, action) {
            Ok(Some(body)) => succeeded.push(json!({"instanceId": id, "state": body["state"]})),
            Ok(None) => succeeded.push(json!({"instanceId": id})),
            Err(_) => failed.push(json!({
                "instanceId": id,
                "errorNumber": "CWTBG0020E",
                "errorMessage": format!("Action {action} failed for instance {id}")
            })),
        }
    }
    ok(json!({"succeeded": succeeded, "failed": failed, "requestedAction": action}))
}

// --- system ---

async fn system_details(Extension(caller): Extension<Caller>) -> Response {
    if caller.0 != "admin" {
        return fail(StatusCode::FORBIDDEN, "CWTBG0561E", "User is not an administrator");
    }
    ok(json!({
        "systems": [{
            "systemID": "6b8a8e3e-0b7a-4c3e-9f9e-1e6a6c2f0001",
            "systemType": "SYSTEM_TYPE_WLE",
            "version": "8.6.0.0",
            "hostname": "localhost",
            "buildLevel": "BPM8600-20170918",
            "capabilities": {"extensions": []}
        }]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(state: InstanceState) -> Instance {
        Instance {
            piid: "7".to_string(),
            bpd_id: "25.x".to_string(),
            process_app_id: "2066.y".to_string(),
            state,
            variables: json!({}),
            tokens: vec![Token {
                token_id: "7.1".to_string(),
                flow_object_id: "bpdid:step1".to_string(),
                timer: false,
            }],
        }
    }

    fn store_with(state: InstanceState) -> Store {
        let mut store = Store::default();
        store.instances.insert("7".to_string(), instance(state));
        store
    }

    #[test]
    fn instance_json_carries_extra_fields() {
        let json = instance(InstanceState::Suspended).to_json();
        assert_eq!(json["state"], "STATE_SUSPENDED");
        assert_eq!(json["executionState"], "Suspended");
        assert_eq!(json["tasks"][0]["originator"], "user.admin");
        assert!(json.get("variables").is_some());
        assert_eq!(json["executionTree"]["root"]["children"][0]["tokenId"], "7.1");
    }

    #[test]
    fn authenticate_accepts_known_credentials() {
        assert!(authenticate(&basic_auth("admin", "admin")).is_some());
        assert!(authenticate(&basic_auth("admin", "wrong")).is_none());
        assert!(authenticate("Bearer abc").is_none());
        assert!(authenticate("Basic !!!").is_none());
    }

    #[test]
    fn state_transitions() {
        let mut store = store_with(InstanceState::Running);
        assert!(apply(&mut store, "7", "resume").is_err());
        assert!(apply(&mut store, "7", "suspend").unwrap().is_some());
        assert!(apply(&mut store, "7", "resume").unwrap().is_some());
        assert!(apply(&mut store, "7", "delete").is_err());
        assert!(apply(&mut store, "7", "terminate").unwrap().is_some());
        assert!(apply(&mut store, "7", "delete").unwrap().is_none());
        assert!(apply(&mut store, "7", "suspend").is_err());
    }

    #[test]
    fn retry_only_from_failed() {
        let mut store = store_with(InstanceState::Running);
        assert!(apply(&mut store, "7", "retry").is_err());
        let mut store = store_with(InstanceState::Failed);
        let body = apply(&mut store, "7", "retry").unwrap().unwrap();
        assert_eq!(body["state"], "STATE_RUNNING");
    }

    #[test]
    fn filter_matches_prefix() {
        assert!(matches_filter("tw_admin", Some("tw_*")));
        assert!(!matches_filter("admin", Some("tw_*")));
        assert!(matches_filter("admin", None));
    }
}
