//! End-to-end tests of the facade over an in-memory transport.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use rstest::rstest;
use serde_json::{Value, json};
use slurm_client::*;

fn client(version: ApiVersion, mock: &MockTransport) -> SlurmClient {
    client_with(version, mock, ClientConfig::new("http://localhost:6820"))
}

fn client_with(version: ApiVersion, mock: &MockTransport, config: ClientConfig) -> SlurmClient {
    SlurmClient::builder(config.with_version(version.as_str()))
        .with_transport(Arc::new(mock.clone()))
        .build()
        .unwrap()
}

fn slurm(version: ApiVersion, resource: &str) -> String {
    version.path(Api::Slurm, resource)
}

fn slurmdb(version: ApiVersion, resource: &str) -> String {
    version.path(Api::Slurmdb, resource)
}

fn cancelled() -> Context {
    let ctx = Context::background();
    ctx.cancel();
    ctx
}

// ============== Conversion ==============

#[rstest]
#[case(ApiVersion::V0_0_40)]
#[case(ApiVersion::V0_0_41)]
#[case(ApiVersion::V0_0_42)]
#[case(ApiVersion::V0_0_43)]
#[case(ApiVersion::V0_0_44)]
#[tokio::test]
async fn test_empty_records_convert_to_defaults(#[case] version: ApiVersion) {
    let mock = MockTransport::new();
    let empty = |field: &str| -> Value { json!({ field: [{}] }) };
    mock.on(Method::Get, slurm(version, "jobs"), 200, empty("jobs"));
    mock.on(Method::Get, slurm(version, "nodes"), 200, empty("nodes"));
    mock.on(Method::Get, slurm(version, "partitions"), 200, empty("partitions"));
    mock.on(Method::Get, slurm(version, "reservations"), 200, empty("reservations"));
    mock.on(Method::Get, slurmdb(version, "qos"), 200, empty("qos"));
    mock.on(Method::Get, slurmdb(version, "accounts"), 200, empty("accounts"));
    mock.on(Method::Get, slurmdb(version, "users"), 200, empty("users"));
    mock.on(Method::Get, slurmdb(version, "associations"), 200, empty("associations"));
    mock.on(Method::Get, slurmdb(version, "clusters"), 200, empty("clusters"));
    mock.on(Method::Get, slurmdb(version, "wckeys"), 200, empty("wckeys"));
    mock.on(Method::Get, slurmdb(version, "tres"), 200, empty("TRES"));

    let client = client(version, &mock);
    let ctx = Context::background();

    let jobs = client.jobs().list(&ctx, &JobListOptions::default()).await.unwrap();
    assert_eq!(jobs.items, vec![Job::default()]);
    assert_eq!(jobs.items[0].id, 0);

    if client.capabilities().supports(Entity::Node, Operation::List) {
        let nodes = client.nodes().list(&ctx, &NodeListOptions::default()).await.unwrap();
        assert_eq!(nodes.items, vec![Node::default()]);
    }

    let partitions = client
        .partitions()
        .list(&ctx, &PartitionListOptions::default())
        .await
        .unwrap();
    assert_eq!(partitions.items, vec![Partition::default()]);

    let reservations = client
        .reservations()
        .list(&ctx, &ReservationListOptions::default())
        .await
        .unwrap();
    assert_eq!(reservations.items, vec![Reservation::default()]);

    let qos = client.qos().list(&ctx, &QoSListOptions::default()).await.unwrap();
    assert_eq!(qos.items, vec![QoS::default()]);

    let accounts = client.accounts().list(&ctx, &AccountListOptions::default()).await.unwrap();
    assert_eq!(accounts.items, vec![Account::default()]);

    let users = client.users().list(&ctx, &UserListOptions::default()).await.unwrap();
    assert_eq!(users.items, vec![User::default()]);

    let associations = client
        .associations()
        .list(&ctx, &AssociationListOptions::default())
        .await
        .unwrap();
    assert_eq!(associations.items, vec![Association::default()]);

    let clusters = client.clusters().list(&ctx, &ClusterListOptions::default()).await.unwrap();
    assert_eq!(clusters.items, vec![Cluster::default()]);

    let wckeys = client.wckeys().list(&ctx, &WCKeyListOptions::default()).await.unwrap();
    assert_eq!(wckeys.items, vec![WCKey::default()]);

    let tres = client.tres(&ctx).await.unwrap();
    assert_eq!(tres.items, vec![Tres::default()]);
}

#[rstest]
#[case(ApiVersion::V0_0_40, json!({"job_id": 42, "job_state": ["RUNNING"], "state_reason": "None"}))]
#[case(ApiVersion::V0_0_41, json!({"job_id": 42, "job_state": ["RUNNING"], "state_reason": "None"}))]
#[case(ApiVersion::V0_0_42, json!({"job_id": 42, "state": {"current": ["RUNNING"], "reason": "None"}}))]
#[case(ApiVersion::V0_0_43, json!({"job_id": 42, "state": {"current": ["RUNNING"], "reason": "None"}}))]
#[case(ApiVersion::V0_0_44, json!({"job_id": 42, "state": {"current": ["RUNNING"], "reason": "None"}}))]
#[tokio::test]
async fn test_job_state_shape_per_version(#[case] version: ApiVersion, #[case] record: Value) {
    let mock = MockTransport::new();
    mock.on(Method::Get, slurm(version, "job/42"), 200, json!({"jobs": [record]}));
    let client = client(version, &mock);

    let job = client.jobs().get(&Context::background(), 42).await.unwrap();
    assert_eq!(job.id, 42);
    assert_eq!(job.state, JobState::Running);
    assert_eq!(job.state_reason, "None");
}

#[rstest]
#[case(ApiVersion::V0_0_40, true)]
#[case(ApiVersion::V0_0_41, true)]
#[case(ApiVersion::V0_0_42, false)]
#[case(ApiVersion::V0_0_43, false)]
#[case(ApiVersion::V0_0_44, false)]
#[tokio::test]
async fn test_submit_script_placement(#[case] version: ApiVersion, #[case] top_level: bool) {
    let mock = MockTransport::new();
    mock.on(
        Method::Post,
        slurm(version, "job/submit"),
        200,
        json!({"job_id": 1001, "step_id": "batch"}),
    );
    let client = client(version, &mock);

    let job = JobCreate::new("hello", "#!/bin/bash\nhostname").with_partition("debug");
    let submitted = client.jobs().create(&Context::background(), &job).await.unwrap();
    assert_eq!(submitted.job_id, 1001);

    let body = mock.calls()[0].body.clone().unwrap();
    assert_eq!(body.get("script").is_some(), top_level);
    assert_eq!(body["job"].get("script").is_some(), !top_level);
    assert_eq!(body["job"]["partition"], "debug");
}

// ============== Listing ==============

#[tokio::test]
async fn test_offset_past_end_keeps_filtered_total() {
    let version = ApiVersion::V0_0_43;
    let mock = MockTransport::new();
    mock.on(
        Method::Get,
        slurm(version, "jobs"),
        200,
        json!({"jobs": [
            {"job_id": 1, "user_name": "alice", "state": {"current": ["RUNNING"]}},
            {"job_id": 2, "user_name": "bob", "state": {"current": ["PENDING"]}},
            {"job_id": 3, "user_name": "alice", "state": {"current": ["PENDING"]}},
            {"job_id": 4, "user_name": "carol", "state": {"current": ["COMPLETED"]}}
        ]}),
    );
    mock.on(
        Method::Get,
        slurmdb(version, "users"),
        200,
        json!({"users": [{"name": "alice"}, {"name": "bob"}]}),
    );
    let client = client(version, &mock);
    let ctx = Context::background();

    let opts = JobListOptions {
        users: vec!["alice".into()],
        offset: 5,
        ..JobListOptions::default()
    };
    let page = client.jobs().list(&ctx, &opts).await.unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total, 2);

    let opts = JobListOptions {
        states: vec![JobState::Pending],
        offset: 1,
        limit: Some(10),
        ..JobListOptions::default()
    };
    let page = client.jobs().list(&ctx, &opts).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, 3);

    let opts = UserListOptions {
        offset: 2,
        ..UserListOptions::default()
    };
    let page = client.users().list(&ctx, &opts).await.unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total, 2);
}

// ============== Validation ==============

#[tokio::test]
async fn test_empty_updates_rejected_everywhere() {
    let mock = MockTransport::new();
    let client = client(ApiVersion::V0_0_44, &mock);
    let ctx = Context::background();
    let key = AssociationKey::new("physics", "alice");

    let errors = [
        client.jobs().update(&ctx, 1, &JobUpdate::default()).await,
        client.nodes().update(&ctx, "c001", &NodeUpdate::default()).await,
        client
            .reservations()
            .update(&ctx, "maint", &ReservationUpdate::default())
            .await,
        client.qos().update(&ctx, "normal", &QoSUpdate::default()).await,
        client.accounts().update(&ctx, "physics", &AccountUpdate::default()).await,
        client.users().update(&ctx, "alice", &UserUpdate::default()).await,
        client
            .associations()
            .update(&ctx, &key, &AssociationUpdate::default())
            .await,
    ];
    for result in errors {
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert!(err.to_string().contains("at least one field"), "{err}");
    }
    assert_eq!(mock.call_count(), 0);
}

#[rstest]
#[case("", "linux")]
#[case("gpu-cluster", "gpu-cluster")]
#[tokio::test]
async fn test_association_cluster_default(#[case] cluster: &str, #[case] expected: &str) {
    let version = ApiVersion::V0_0_43;
    let mock = MockTransport::new();
    mock.on(Method::Post, slurmdb(version, "associations"), 200, json!({}));
    let config = ClientConfig::new("http://localhost:6820").with_default_cluster("linux");
    let client = client_with(version, &mock, config);

    let association = AssociationCreate {
        account: "physics".into(),
        user: "alice".into(),
        cluster: cluster.into(),
        ..AssociationCreate::default()
    };
    let key = client
        .associations()
        .create(&Context::background(), &association)
        .await
        .unwrap();
    assert_eq!(key.cluster, expected);

    let body = mock.calls()[0].body.clone().unwrap();
    assert_eq!(body["associations"][0]["cluster"], expected);
}

// ============== Preconditions ==============

#[rstest]
#[case(ApiVersion::V0_0_40)]
#[case(ApiVersion::V0_0_41)]
#[case(ApiVersion::V0_0_44)]
#[tokio::test]
async fn test_cancelled_context_never_reaches_wire(#[case] version: ApiVersion) {
    let mock = MockTransport::new();
    let client = client(version, &mock);
    let ctx = cancelled();

    let mut errors = vec![
        client.jobs().list(&ctx, &JobListOptions::default()).await.map(|_| ()),
        client.jobs().get(&ctx, 1).await.map(|_| ()),
        client.partitions().get(&ctx, "debug").await.map(|_| ()),
        client
            .reservations()
            .list(&ctx, &ReservationListOptions::default())
            .await
            .map(|_| ()),
        client.qos().get(&ctx, "normal").await.map(|_| ()),
        client.accounts().delete(&ctx, "physics").await,
        client.users().get(&ctx, "alice").await.map(|_| ()),
        client
            .associations()
            .get(&ctx, &AssociationKey::new("physics", "alice"))
            .await
            .map(|_| ()),
        client.clusters().get(&ctx, "linux").await.map(|_| ()),
        client.wckeys().get(&ctx, 1).await.map(|_| ()),
        client.tres(&ctx).await.map(|_| ()),
        client.ping(&ctx).await.map(|_| ()),
    ];
    if client.capabilities().supports(Entity::Node, Operation::Get) {
        errors.push(client.nodes().get(&ctx, "c001").await.map(|_| ()));
    }

    for result in errors {
        assert_eq!(result.unwrap_err().kind(), ErrorKind::ContextRequired);
    }
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_expired_deadline_is_context_required() {
    let mock = MockTransport::new();
    let client = client(ApiVersion::V0_0_42, &mock);
    let ctx = Context::with_deadline_in(Duration::ZERO);

    let err = client.jobs().get(&ctx, 7).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ContextRequired);
    assert_eq!(mock.call_count(), 0);
}

#[rstest]
#[case(ApiVersion::V0_0_40)]
#[case(ApiVersion::V0_0_41)]
#[case(ApiVersion::V0_0_42)]
#[tokio::test]
async fn test_unsupported_operations_skip_network(#[case] version: ApiVersion) {
    let mock = MockTransport::new();
    let client = client(version, &mock);
    // Even a cancelled context and empty input report the capability gap first.
    let ctx = cancelled();

    let start = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
    let reservation = ReservationCreate {
        name: "maint".into(),
        start_time: Some(start),
        end_time: Some(start + chrono::Duration::hours(2)),
        ..ReservationCreate::default()
    };

    let errors = [
        client.reservations().create(&ctx, &reservation).await.map(|_| ()),
        client.reservations().delete(&ctx, "").await,
        client.clusters().create(&ctx, &ClusterCreate::default()).await.map(|_| ()),
        client.clusters().delete(&ctx, "linux").await,
        client
            .wckeys()
            .create(&ctx, &WCKeyCreate::default())
            .await
            .map(|_| ()),
        client.wckeys().delete(&ctx, 0).await,
    ];
    for result in errors {
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
        assert!(err.to_string().ends_with(version.as_str()), "{err}");
    }
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_v41_refuses_every_node_operation() {
    let mock = MockTransport::new();
    let client = client(ApiVersion::V0_0_41, &mock);
    let ctx = Context::background();

    assert!(client.capabilities().operations(Entity::Node).is_empty());
    let errors = [
        client.nodes().list(&ctx, &NodeListOptions::default()).await.map(|_| ()),
        client.nodes().get(&ctx, "c001").await.map(|_| ()),
        client
            .nodes()
            .update(
                &ctx,
                "c001",
                &NodeUpdate {
                    state: Some(NodeState::Resume),
                    ..NodeUpdate::default()
                },
            )
            .await,
        client.nodes().delete(&ctx, "c001").await,
    ];
    for result in errors {
        assert_eq!(result.unwrap_err().kind(), ErrorKind::UnsupportedOperation);
    }
    assert_eq!(mock.call_count(), 0);
}

// ============== Response normalization ==============

#[rstest]
#[case(404, Value::Null, ErrorKind::NotFound, "HTTP 404 Not Found")]
#[case(409, json!({"errors": [{"description": "already exists"}]}), ErrorKind::Conflict, "HTTP 409: already exists")]
#[case(401, Value::Null, ErrorKind::Unauthorized, "HTTP 401 Unauthorized")]
#[case(403, json!({"errors": [{"error": "Access denied"}]}), ErrorKind::Unauthorized, "HTTP 403: Access denied")]
#[case(422, json!({"errors": [{"description": "bad partition"}]}), ErrorKind::ValidationError, "HTTP 422: bad partition")]
#[case(502, Value::Null, ErrorKind::ServerError, "HTTP 502 Bad Gateway")]
#[case(200, json!({"jobs": [], "errors": [{"description": "slurmctld timeout"}]}), ErrorKind::ServerError, "HTTP 200: slurmctld timeout")]
#[tokio::test]
async fn test_status_normalization(
    #[case] status: u16,
    #[case] body: Value,
    #[case] kind: ErrorKind,
    #[case] message: &str,
) {
    let version = ApiVersion::V0_0_42;
    let mock = MockTransport::new();
    mock.on(Method::Get, slurm(version, "job/9"), status, body);
    let client = client(version, &mock);

    let err = client.jobs().get(&Context::background(), 9).await.unwrap_err();
    assert_eq!(err.kind(), kind);
    assert!(err.to_string().contains(message), "{err}");
    assert_eq!(err.status(), Some(status));
}

#[tokio::test]
async fn test_malformed_list_fails_whole_call() {
    let version = ApiVersion::V0_0_44;
    let mock = MockTransport::new();
    mock.on(
        Method::Get,
        slurm(version, "partitions"),
        200,
        json!({"partitions": [{"name": "debug"}, {"name": 17}]}),
    );
    let client = client(version, &mock);

    let err = client
        .partitions()
        .list(&Context::background(), &PartitionListOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServerError);
    assert!(matches!(err, SlurmError::InvalidResponse(_)));
}

// ============== Watch ==============

#[tokio::test(start_paused = true)]
async fn test_watch_jobs_added_then_modified() {
    let version = ApiVersion::V0_0_44;
    let path = slurm(version, "jobs");
    let mock = MockTransport::new();
    mock.on(
        Method::Get,
        path.clone(),
        200,
        json!({"jobs": [{"job_id": 1, "state": {"current": ["PENDING"]}}]}),
    );
    let client = client(version, &mock);
    let ctx = Context::background();

    let mut events = client
        .jobs()
        .watch(
            &ctx,
            &JobListOptions::default(),
            WatchOptions::default().with_poll_interval(Duration::from_secs(2)),
        )
        .await
        .unwrap();

    while mock.call_count() == 0 {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    mock.on(
        Method::Get,
        path,
        200,
        json!({"jobs": [
            {"job_id": 1, "state": {"current": ["RUNNING"]}},
            {"job_id": 2, "state": {"current": ["PENDING"]}}
        ]}),
    );

    let first = events.recv().await.unwrap();
    assert!(matches!(&first, WatchEvent::Modified(job) if job.id == 1 && job.state == JobState::Running));
    let second = events.recv().await.unwrap();
    assert!(matches!(&second, WatchEvent::Added(job) if job.id == 2));

    ctx.cancel();
    assert!(events.recv().await.is_none());
}

#[tokio::test]
async fn test_watch_checks_preconditions_before_spawning() {
    let mock = MockTransport::new();
    let client = client(ApiVersion::V0_0_43, &mock);

    let err = client
        .partitions()
        .watch(&cancelled(), &PartitionListOptions::default(), WatchOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ContextRequired);
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_watch_rejects_zero_poll_interval() {
    let mock = MockTransport::new();
    let client = client(ApiVersion::V0_0_44, &mock);
    let ctx = Context::background();
    let options = WatchOptions::default().with_poll_interval(Duration::ZERO);

    let jobs = client.jobs().watch(&ctx, &JobListOptions::default(), options).await;
    let nodes = client.nodes().watch(&ctx, &NodeListOptions::default(), options).await;
    let partitions = client
        .partitions()
        .watch(&ctx, &PartitionListOptions::default(), options)
        .await;

    for err in [jobs.unwrap_err(), nodes.unwrap_err(), partitions.unwrap_err()] {
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert!(err.to_string().contains("poll interval"));
    }
    assert_eq!(mock.call_count(), 0);
}

// ============== Server information ==============

#[rstest]
#[case(ApiVersion::V0_0_40)]
#[case(ApiVersion::V0_0_42)]
#[case(ApiVersion::V0_0_44)]
#[tokio::test]
async fn test_server_version_and_info(#[case] version: ApiVersion) {
    let meta = json!({
        "plugin": {"data_parser": format!("data_parser/{version}")},
        "slurm": {
            "version": {"major": 24, "minor": 11, "micro": 1},
            "release": "24.11.1",
            "cluster": "linux"
        }
    });
    let mock = MockTransport::new();
    mock.on(Method::Get, slurm(version, "ping"), 200, json!({"meta": meta.clone(), "pings": []}));
    mock.on(
        Method::Get,
        slurm(version, "diag"),
        200,
        json!({"meta": meta, "statistics": {"jobs_submitted": 40, "jobs_failed": 1}}),
    );
    let client = client(version, &mock);
    let ctx = Context::background();

    let server = client.server_version(&ctx).await.unwrap();
    assert_eq!(server.api, version);
    assert_eq!(server.version, "24.11.1");
    assert_eq!(server.data_parser, format!("data_parser/{version}"));

    let info = client.info(&ctx).await.unwrap();
    assert_eq!(info.cluster_name, "linux");
    assert_eq!(info.version, server);
    assert_eq!(info.stats.jobs_submitted, 40);
    assert_eq!(info.stats.jobs_failed, 1);

    let err = client.info(&cancelled()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ContextRequired);
    assert_eq!(mock.call_count(), 2);
}
