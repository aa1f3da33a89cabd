//! End-to-end run of every endpoint against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `BpmSession` over real
//! HTTP with `UreqTransport`. Validates that request building, classification
//! and field filtering line up with what the server actually sends.

use std::net::SocketAddr;

use bpm_core::{
    ApiError, BpmClient, BpmSession, ClientConfig, Envelope, GroupQuery, InstanceAction, ProcessInstance,
    StartProcess, SystemDetails, TriggerMessage, UreqTransport, UserList, UserQuery,
};
use serde_json::json;

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });
    addr
}

fn session(addr: SocketAddr, user: &str, pass: &str) -> BpmSession<UreqTransport> {
    let config = ClientConfig::new(&format!("http://{addr}{}", mock_server::BASE_PATH), user, pass);
    BpmSession::connect(&config).unwrap()
}

#[test]
fn users_and_groups() {
    let addr = start_server();
    let bpm = session(addr, "admin", "admin");

    let env = bpm
        .list_users(&UserQuery {
            filter: Some("tw_*".into()),
            ..UserQuery::default()
        })
        .unwrap();
    assert_eq!(env.status, "200");
    assert_eq!(env.message, "OK");
    // `total` is not on the list allow-list, `userPreferences` not on the user one.
    assert!(env.data.get("total").is_none());
    assert!(env.data["users"][0].get("userPreferences").is_none());
    let users: Envelope<UserList> = env.into_typed().unwrap();
    let names: Vec<&str> = users.data.users.iter().map(|u| u.user_name.as_str()).collect();
    assert_eq!(names, ["tw_admin", "tw_user"]);

    let env = bpm.get_user("tw_admin").unwrap();
    assert_eq!(
        env.data,
        json!({
            "userID": 9,
            "userName": "tw_admin",
            "fullName": "TW Admin",
            "emailAddress": "tw_admin@example.com",
            "isDisabled": false,
            "memberships": ["tw_allusers"]
        })
    );

    let err = bpm.get_user("ghost").unwrap_err();
    assert_eq!(err.status(), 404);
    assert_eq!(err.message(), "Not Found");
    assert_eq!(err.data().unwrap()["Data"]["errorNumber"], "CWTBG0017E");

    let env = bpm.list_groups(&GroupQuery::default()).unwrap();
    assert_eq!(env.data["groups"].as_array().unwrap().len(), 2);
    assert!(env.data["groups"][0].get("securityRealm").is_none());

    let env = bpm.get_group("Team Leads").unwrap();
    assert_eq!(env.data["groupID"], 3);
}

#[test]
fn bad_credentials_are_unauthorized() {
    let addr = start_server();
    let bpm = session(addr, "admin", "wrong");
    let err = bpm.list_users(&UserQuery::default()).unwrap_err();
    assert!(matches!(err, ApiError::Status { .. }));
    assert_eq!(err.status(), 401);
    assert_eq!(err.message(), "Unauthorized Access");
}

#[test]
fn instance_lifecycle() {
    let addr = start_server();
    let bpm = session(addr, "admin", "admin");

    // Step 1: start an instance.
    let env = bpm
        .start_instance(&StartProcess::new("25.abc", "2066.def").param("amount", 10))
        .unwrap();
    assert!(env.data.get("variables").is_none());
    assert!(env.data.get("diagram").is_none());
    assert_eq!(env.data["dueDate"], serde_json::Value::Null);
    assert_eq!(env.data["tasks"][0]["originator"], "admin");
    assert!(env.data["tasks"][0].get("processData").is_none());
    let started: ProcessInstance = env.into_typed().unwrap().data;
    assert_eq!(started.state.as_deref(), Some("STATE_RUNNING"));
    assert_eq!(
        started.creation_time.unwrap().to_rfc3339(),
        "2019-11-13T10:09:00+00:00"
    );
    let id = started.piid.clone();

    // Step 2: details round-trip to the same filtered shape.
    let fetched: ProcessInstance = bpm.get_instance(&id).unwrap().into_typed().unwrap().data;
    assert_eq!(fetched, started);

    // Step 3: resume while running is a conflict.
    let err = bpm.resume_instance(&id).unwrap_err();
    assert_eq!(err.status(), 409);
    assert_eq!(err.message(), "Conflict");

    // Step 4: suspend, move a token and resume in one call.
    let env = bpm.suspend_instance(&id).unwrap();
    assert_eq!(env.data["state"], "STATE_SUSPENDED");
    let env = bpm
        .move_token(&id, &format!("{id}.1"), "bpdid:step2", true)
        .unwrap();
    assert_eq!(env.data["state"], "STATE_RUNNING");
    assert_eq!(
        env.data["executionTree"]["root"]["children"][0]["flowObjectId"],
        "bpdid:step2"
    );

    // Step 5: fire the timer; an unknown timer is not found.
    let env = bpm.fire_timer(&id, &format!("{id}.2")).unwrap();
    assert_eq!(
        env.data["executionTree"]["root"]["children"].as_array().unwrap().len(),
        1
    );
    let err = bpm.fire_timer(&id, "nope").unwrap_err();
    assert_eq!(err.status(), 404);

    // Step 6: suspend again and delete the remaining token without resuming.
    bpm.suspend_instance(&id).unwrap();
    let env = bpm.delete_token(&id, &format!("{id}.1"), false).unwrap();
    assert_eq!(env.data["state"], "STATE_SUSPENDED");
    assert!(env.data["executionTree"]["root"]["children"]
        .as_array()
        .unwrap()
        .is_empty());

    // Step 7: terminate, then delete.
    let env = bpm.terminate_instance(&id).unwrap();
    assert_eq!(env.data["state"], "STATE_TERMINATED");
    let env = bpm.delete_instance(&id).unwrap();
    assert_eq!(env.data["deleted"], true);

    // Step 8: gone.
    let err = bpm.get_instance(&id).unwrap_err();
    assert_eq!(err.status(), 404);
    let err = bpm.delete_instance(&id).unwrap_err();
    assert_eq!(err.status(), 404);
}

#[test]
fn retry_failed_instance() {
    let addr = start_server();
    let bpm = session(addr, "admin", "admin");

    let env = bpm
        .start_instance(&StartProcess::new("25.abc", "2066.def").param("fail", true))
        .unwrap();
    assert_eq!(env.data["state"], "STATE_FAILED");
    let id = env.data["piid"].as_str().unwrap().to_string();

    let env = bpm.retry_instance(&id).unwrap();
    assert_eq!(env.data["state"], "STATE_RUNNING");
    let err = bpm.retry_instance(&id).unwrap_err();
    assert_eq!(err.status(), 409);
}

#[test]
fn bulk_actions() {
    let addr = start_server();
    let bpm = session(addr, "admin", "admin");

    let mut ids = Vec::new();
    for _ in 0..2 {
        let env = bpm
            .start_instance(&StartProcess::new("25.abc", "2066.def"))
            .unwrap();
        ids.push(env.data["piid"].as_str().unwrap().to_string());
    }
    let mut targets: Vec<&str> = ids.iter().map(String::as_str).collect();
    targets.push("404404");

    let env = bpm.bulk_action(InstanceAction::Suspend, &targets).unwrap();
    assert!(env.data.get("requestedAction").is_none());
    let result: bpm_core::BulkResult = env.into_typed().unwrap().data;
    assert_eq!(result.succeeded.len(), 2);
    assert_eq!(result.succeeded[0].state.as_deref(), Some("STATE_SUSPENDED"));
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].instance_id, "404404");

    let env = bpm.bulk_action(InstanceAction::Terminate, &targets[..2]).unwrap();
    assert_eq!(env.data["succeeded"].as_array().unwrap().len(), 2);
    let env = bpm.bulk_action(InstanceAction::Delete, &targets[..2]).unwrap();
    assert_eq!(env.data["succeeded"].as_array().unwrap().len(), 2);
    assert!(bpm.get_instance(targets[0]).is_err());
}

#[test]
fn send_message() {
    let addr = start_server();
    let bpm = session(addr, "admin", "admin");

    let message = TriggerMessage::new("HSS", "StartOnboarding", "hire")
        .snapshot("v1.0")
        .parameter("candidate", "Ada & co");
    let env = bpm.send_message(&message).unwrap();
    assert_eq!(env.data["messageSent"], true);
    assert_eq!(env.data["length"], message.to_xml().unwrap().len());
}

#[test]
fn system_details() {
    let addr = start_server();

    let env = session(addr, "admin", "admin").system_details().unwrap();
    assert!(env.data["systems"][0].get("buildLevel").is_none());
    let details: SystemDetails = env.into_typed().unwrap().data;
    assert_eq!(details.systems[0].version.as_deref(), Some("8.6.0.0"));

    let err = session(addr, "viewer", "viewer").system_details().unwrap_err();
    assert_eq!(err.status(), 403);
    assert_eq!(err.message(), "Forbidden");
    assert_eq!(
        err.data(),
        Some(&json!({
            "errorNumber": "CWTBG0561E",
            "errorMessage": "User is not an administrator"
        }))
    );
}

// The transport path surfaces the raw error instead of a Status wrapper.
#[test]
fn unreachable_server_is_request_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let bpm = session(addr, "admin", "admin");
    let err = bpm.system_details().unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(err.status(), 0);
    assert_eq!(err.message(), "Request Error");
    assert!(!err.to_string().is_empty());
}

#[test]
fn oversized_body_is_a_transport_failure() {
    let addr = start_server();
    let config = ClientConfig::new(&format!("http://{addr}{}", mock_server::BASE_PATH), "admin", "admin");
    let client = BpmClient::new(&config).unwrap();

    let capped = BpmSession::new(client.clone(), UreqTransport::new().body_limit(16));
    let err = capped.list_users(&UserQuery::default()).unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(err.status(), 0);

    let roomy = BpmSession::new(client, UreqTransport::new());
    assert_eq!(roomy.list_users(&UserQuery::default()).unwrap().status, "200");
}
