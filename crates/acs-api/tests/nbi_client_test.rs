#![allow(clippy::unwrap_used)]
// Integration tests for `NbiClient` using wiremock.

use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use acs_api::{
    Collection, Delivery, Error, FileType, FileUpload, NbiClient, ParameterAssignment, Preset,
    Query, TaskOutcome, TaskRequest, XsdType,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, NbiClient) {
    let server = MockServer::start().await;
    let client = NbiClient::with_client(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

fn device(id: &str, model: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "_lastInform": "2024-05-01T10:00:00.000Z",
        "Device": {
            "_object": true,
            "DeviceInfo": {
                "ModelName": { "_value": model, "_type": "xsd:string", "_writable": false }
            }
        }
    })
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

// ── Devices ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_devices_by_id_sends_exact_filter() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/devices/"))
        .and(query_param("query", r#"{"_id":"202BC1-BM632w-000001"}"#))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([device("202BC1-BM632w-000001", "BM632w")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let devices = client.devices_by_id("202BC1-BM632w-000001").await.unwrap();

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].id, "202BC1-BM632w-000001");
    assert_eq!(devices[0].last_inform.as_deref(), Some("2024-05-01T10:00:00.000Z"));
}

#[tokio::test]
async fn test_devices_by_id_drops_other_ids() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/devices/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            device("D1", "A"),
            device("D10", "B"),
        ])))
        .mount(&server)
        .await;

    let devices = client.devices_by_id("D1").await.unwrap();

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].id, "D1");
}

#[tokio::test]
async fn test_devices_by_id_no_match_is_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/devices/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    assert!(client.devices_by_id("missing").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_filter_equals_list_all() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/devices/"))
        .and(query_param("query", "{}"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([device("D1", "A"), device("D2", "B")])),
        )
        .expect(2)
        .mount(&server)
        .await;

    let filtered = client.find_devices(&Query::all()).await.unwrap();
    let listed = client.list_devices().await.unwrap();

    let ids = |d: &[acs_api::DeviceRecord]| d.iter().map(|r| r.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&filtered[..]), ids(&listed[..]));
    assert_eq!(ids(&listed[..]), vec!["D1".to_string(), "D2".to_string()]);
}

#[tokio::test]
async fn test_find_devices_with_comparison() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/devices/"))
        .and(query_param(
            "query",
            r#"{"_lastInform":{"$lt":"2024-05-01T00:00:00.000Z"}}"#,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([device("D1", "A")])))
        .expect(1)
        .mount(&server)
        .await;

    let at = chrono::DateTime::parse_from_rfc3339("2024-05-01T00:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let devices = client
        .find_devices(&Query::new().before("_lastInform", at))
        .await
        .unwrap();

    assert_eq!(devices.len(), 1);
}

#[tokio::test]
async fn test_device_projection_joins_paths() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/devices/"))
        .and(query_param(
            "projection",
            "Device.DeviceInfo.Manufacturer,Device.DeviceInfo.ModelName",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([device("D1", "A")])))
        .expect(1)
        .mount(&server)
        .await;

    let devices = client
        .device_projection(
            "D1",
            &["Device.DeviceInfo.Manufacturer", "Device.DeviceInfo.ModelName"],
        )
        .await
        .unwrap();

    assert_eq!(devices.len(), 1);
}

#[tokio::test]
async fn test_delete_device() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/devices/D1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_device("D1").await.unwrap();
}

#[tokio::test]
async fn test_delete_unknown_device_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/devices/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_string("No such device"))
        .mount(&server)
        .await;

    let err = client.delete_device("ghost").await.unwrap_err();

    assert!(err.is_not_found());
    match err {
        Error::NotFound { collection, id } => {
            assert_eq!(collection, Collection::Devices);
            assert_eq!(id, "ghost");
        }
        other => panic!("expected NotFound, got: {other:?}"),
    }
}

// ── Task submission ─────────────────────────────────────────────────

#[tokio::test]
async fn test_empty_device_id_never_reaches_backend() {
    let (server, client) = setup().await;

    let result = client
        .submit_task("", &TaskRequest::Reboot, Delivery::Queued)
        .await;

    assert!(
        matches!(result, Err(Error::EmptyIdentifier { field: "device id" })),
        "expected EmptyIdentifier, got: {result:?}"
    );
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_queued_task_has_no_connection_request() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devices/D1/tasks"))
        .and(query_param_is_missing("connection_request"))
        .and(query_param_is_missing("timeout"))
        .and(body_json(json!({ "name": "factoryReset" })))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "_id": "6630f1c2a1b2c3d4e5f60718",
            "name": "factoryReset",
            "device": "D1",
            "timestamp": "2024-05-01T10:00:00.000Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client
        .submit_task("D1", &TaskRequest::FactoryReset, Delivery::Queued)
        .await
        .unwrap();

    assert!(outcome.is_pending());
    assert_eq!(outcome.task().id.as_deref(), Some("6630f1c2a1b2c3d4e5f60718"));
    assert_eq!(outcome.task().device.as_deref(), Some("D1"));
}

#[tokio::test]
async fn test_connection_request_reboot_accepted_is_pending() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devices/D1/tasks"))
        .and(query_param("connection_request", ""))
        .and(query_param("timeout", "5"))
        .and(body_json(json!({ "name": "reboot" })))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "_id": "t-1",
            "name": "reboot",
            "device": "D1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client
        .submit_task(
            "D1",
            &TaskRequest::Reboot,
            Delivery::connection_request(Duration::from_millis(5)),
        )
        .await
        .unwrap();

    assert!(matches!(outcome, TaskOutcome::Pending(_)));
    assert_eq!(outcome.into_task().name, "reboot");
}

#[tokio::test]
async fn test_completed_task() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devices/D1/tasks"))
        .and(query_param("timeout", "3000"))
        .and(body_json(json!({
            "name": "getParameterValues",
            "parameterNames": ["Device.DeviceInfo.UpTime"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "t-2",
            "name": "getParameterValues",
            "device": "D1",
            "parameterNames": ["Device.DeviceInfo.UpTime"]
        })))
        .mount(&server)
        .await;

    let outcome = client
        .submit_task(
            "D1",
            &TaskRequest::get_parameter_values(["Device.DeviceInfo.UpTime"]),
            Delivery::connection_request(Delivery::DEFAULT_CONNECTION_TIMEOUT),
        )
        .await
        .unwrap();

    assert!(outcome.is_completed());
    let task = outcome.task();
    assert_eq!(task.id.as_deref(), Some("t-2"));
    assert_eq!(task.extra["parameterNames"], json!(["Device.DeviceInfo.UpTime"]));
}

#[tokio::test]
async fn test_set_parameter_values_payload() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devices/D1/tasks"))
        .and(body_json(json!({
            "name": "setParameterValues",
            "parameterValues": [
                ["Device.ManagementServer.PeriodicInformInterval", "300", "xsd:unsignedInt"],
                ["Device.Time.Enable", "true", "xsd:boolean"]
            ]
        })))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({ "_id": "t-3" })))
        .expect(1)
        .mount(&server)
        .await;

    let request = TaskRequest::set_parameter_values([
        ParameterAssignment::new("Device.ManagementServer.PeriodicInformInterval", "300")
            .with_type(XsdType::UnsignedInt),
        ParameterAssignment::new("Device.Time.Enable", "true").with_type(XsdType::Boolean),
    ]);
    let outcome = client
        .submit_task("D1", &request, Delivery::Queued)
        .await
        .unwrap();

    assert!(outcome.is_pending());
}

#[tokio::test]
async fn test_accepted_without_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devices/D1/tasks"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    let outcome = client
        .submit_task("D1", &TaskRequest::Reboot, Delivery::Queued)
        .await
        .unwrap();

    let task = outcome.into_task();
    assert_eq!(task.id, None);
    assert_eq!(task.name, "reboot");
    assert_eq!(task.device.as_deref(), Some("D1"));
}

#[tokio::test]
async fn test_rejected_task_exposes_status() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devices/D1/tasks"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Device is offline"))
        .mount(&server)
        .await;

    let result = client
        .submit_task("D1", &TaskRequest::Reboot, Delivery::Queued)
        .await;

    match result {
        Err(Error::TaskRejected {
            ref device_id,
            task,
            status,
            ref message,
        }) => {
            assert_eq!(device_id, "D1");
            assert_eq!(task, "reboot");
            assert_eq!(status, 500);
            assert_eq!(message, "Device is offline");
        }
        other => panic!("expected TaskRejected, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_other_success_status_is_still_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devices/D1/tasks"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let err = client
        .submit_task("D1", &TaskRequest::Reboot, Delivery::Queued)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(204));
}

#[tokio::test]
async fn test_transport_timeout_propagates() {
    let server = MockServer::start().await;
    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let client = NbiClient::with_client(&server.uri(), http).unwrap();

    Mock::given(method("POST"))
        .and(path("/devices/D1/tasks"))
        .respond_with(ResponseTemplate::new(202).set_delay(Duration::from_millis(500)))
        .expect(1)
        .mount(&server)
        .await;

    let err = client
        .submit_task("D1", &TaskRequest::Reboot, Delivery::Queued)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(ref e) if e.is_timeout()), "got: {err:?}");
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_wrapped_client_timeout_bounds_connection_request() {
    let server = MockServer::start().await;
    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let client = NbiClient::with_client(&server.uri(), http).unwrap();

    Mock::given(method("POST"))
        .and(path("/devices/D1/tasks"))
        .and(query_param("timeout", "5"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(1500)))
        .expect(1)
        .mount(&server)
        .await;

    let started = Instant::now();
    let err = client
        .submit_task(
            "D1",
            &TaskRequest::Reboot,
            Delivery::connection_request(Duration::from_millis(5)),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(ref e) if e.is_timeout()), "got: {err:?}");
    assert!(started.elapsed() < Duration::from_millis(1000));
}

#[tokio::test]
async fn test_declared_timeout_extends_connection_request() {
    let server = MockServer::start().await;
    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let client = NbiClient::with_client(&server.uri(), http)
        .unwrap()
        .with_timeout(Duration::from_millis(50));

    Mock::given(method("POST"))
        .and(path("/devices/D1/tasks"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(150)))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client
        .submit_task(
            "D1",
            &TaskRequest::Reboot,
            Delivery::connection_request(Duration::from_millis(2000)),
        )
        .await
        .unwrap();

    assert!(outcome.is_completed());
}

#[tokio::test]
async fn test_sub_millisecond_timeout_rounds_up() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devices/D1/tasks"))
        .and(query_param("timeout", "1"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client
        .submit_task(
            "D1",
            &TaskRequest::Reboot,
            Delivery::connection_request(Duration::from_micros(500)),
        )
        .await
        .unwrap();

    assert!(outcome.is_pending());
}

// ── Task administration ─────────────────────────────────────────────

#[tokio::test]
async fn test_retry_task() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/tasks/t-1/retry"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.retry_task("t-1").await.unwrap();
}

#[tokio::test]
async fn test_retry_unknown_task_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/tasks/nope/retry"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.retry_task("nope").await.unwrap_err();

    assert!(matches!(
        err,
        Error::NotFound { collection: Collection::Tasks, ref id } if id == "nope"
    ));
}

#[tokio::test]
async fn test_delete_task() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/tasks/t-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_task("t-1").await.unwrap();
}

#[tokio::test]
async fn test_delete_task_server_error() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/tasks/t-1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db unavailable"))
        .mount(&server)
        .await;

    match client.delete_task("t-1").await {
        Err(Error::Api {
            operation,
            ref target,
            status,
            ref message,
        }) => {
            assert_eq!(operation, "delete task");
            assert_eq!(target, "t-1");
            assert_eq!(status, 500);
            assert_eq!(message, "db unavailable");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_tasks_for_device() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .and(query_param("query", r#"{"device":"D1"}"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "t-1", "name": "reboot", "device": "D1", "retries": 2,
              "fault": { "code": "cwmp.9002", "message": "Internal error" } }
        ])))
        .mount(&server)
        .await;

    let tasks = client.tasks_for_device("D1").await.unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].retries, Some(2));
    assert!(tasks[0].has_fault());
}

// ── Tags, presets, files ────────────────────────────────────────────

#[tokio::test]
async fn test_assign_and_remove_tag() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devices/D1/tags/lab"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/devices/D1/tags/lab"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.assign_tag("D1", "lab").await.unwrap();
    client.remove_tag("D1", "lab").await.unwrap();
}

#[tokio::test]
async fn test_empty_tag_is_rejected() {
    let (server, client) = setup().await;

    let err = client.assign_tag("D1", "").await.unwrap_err();

    assert!(matches!(err, Error::EmptyIdentifier { field: "tag" }));
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_put_preset() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/presets/inform-interval"))
        .and(body_json(json!({
            "weight": 5,
            "channel": "default",
            "events": { "0 BOOTSTRAP": true },
            "provision": "inform-interval"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let preset = Preset {
        weight: 5,
        events: [("0 BOOTSTRAP".to_string(), true)].into_iter().collect(),
        provision: Some("inform-interval".into()),
        ..Preset::default()
    };
    client.put_preset("inform-interval", &preset).await.unwrap();
}

#[tokio::test]
async fn test_delete_preset() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/presets/inform-interval"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_preset("inform-interval").await.unwrap();
}

#[tokio::test]
async fn test_upload_file_sends_metadata_headers() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/files/fw-2.1.bin"))
        .and(header("fileType", "1 Firmware Upgrade Image"))
        .and(header("oui", "202BC1"))
        .and(header("productClass", "BM632w"))
        .and(header("version", "2.1"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let meta = FileUpload {
        file_type: FileType::FirmwareUpgradeImage,
        oui: "202BC1".into(),
        product_class: "BM632w".into(),
        version: "2.1".into(),
    };
    client
        .upload_file("fw-2.1.bin", b"\x7fELF firmware".to_vec(), &meta)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].body, b"\x7fELF firmware".to_vec());
}

#[tokio::test]
async fn test_list_and_get_files() {
    let (server, client) = setup().await;

    let record = json!({
        "_id": "fw-2.1.bin",
        "length": 13,
        "uploadDate": "2024-05-01T10:00:00.000Z",
        "metadata": {
            "fileType": "1 Firmware Upgrade Image",
            "oui": "202BC1",
            "productClass": "BM632w",
            "version": "2.1"
        }
    });

    Mock::given(method("GET"))
        .and(path("/files/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([record.clone()])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/fw-2.1.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&record))
        .mount(&server)
        .await;

    let files = client.list_files().await.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].metadata.file_type(), Some(FileType::FirmwareUpgradeImage));

    let file = client.get_file("fw-2.1.bin").await.unwrap();
    assert_eq!(file.length, Some(13));
    assert_eq!(file.metadata.product_class.as_deref(), Some("BM632w"));
}

#[tokio::test]
async fn test_get_missing_file_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/files/none.bin"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.get_file("none.bin").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_file() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/files/fw-2.1.bin"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_file("fw-2.1.bin").await.unwrap();
}

#[tokio::test]
async fn test_malformed_search_response() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/devices/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let err = client.list_devices().await.unwrap_err();

    match err {
        Error::Deserialization { ref body, .. } => assert_eq!(body, "<html>proxy error</html>"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}
