//! Publish runs against a stub REST API.

use mosaic_publisher::{
    Credentials, MosaicPublisher, PublishConfig, PublishStep, StepOutcome,
};
use test_utils::{RecordedRequest, StubResponse, StubServer};

fn config(server: &StubServer, paths: &[&str]) -> PublishConfig {
    PublishConfig {
        rest_url: server.url("/geoserver/rest"),
        workspace: "hazards".to_string(),
        style: "flood_depth".to_string(),
        name_marker: Some("cp_cfhp".to_string()),
        paths: paths.iter().map(|p| p.to_string()).collect(),
    }
}

fn publisher(server: &StubServer, paths: &[&str]) -> MosaicPublisher {
    MosaicPublisher::new(config(server, paths), Credentials::new("admin", "geoserver")).unwrap()
}

/// A well-behaved REST API.
fn happy(req: &RecordedRequest) -> StubResponse {
    match (req.method.as_str(), req.path.as_str()) {
        ("POST", _) => StubResponse::status(201, "created"),
        ("PUT", p) if p.ends_with("/external.imagemosaic") => StubResponse::status(201, ""),
        ("PUT", p) if p.contains("/layers/") => StubResponse::status(200, ""),
        _ => StubResponse::status(404, "not found"),
    }
}

#[tokio::test]
async fn test_publish_issues_three_calls_in_order() {
    let server = StubServer::start(happy).await;
    let report = publisher(&server, &[])
        .publish_path("/data/cp_cfhp/2024/rp100")
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.store, "2024_rp100");

    let requests = server.requests();
    assert_eq!(requests.len(), 3);

    let create = &requests[0];
    assert_eq!(create.method, "POST");
    assert_eq!(create.path, "/geoserver/rest/workspaces/hazards/coveragestores");
    assert!(create.body.contains("<name>2024_rp100</name>"));
    assert!(create.body.contains("<url>/data/cp_cfhp/2024/rp100</url>"));

    let configure = &requests[1];
    assert_eq!(configure.method, "PUT");
    assert_eq!(
        configure.path,
        "/geoserver/rest/workspaces/hazards/coveragestores/2024_rp100/external.imagemosaic"
    );
    assert_eq!(configure.param("configure"), Some("first"));
    assert_eq!(configure.param("coverageName"), Some("2024_rp100"));
    assert_eq!(configure.body, "/data/cp_cfhp/2024/rp100");

    let style = &requests[2];
    assert_eq!(style.method, "PUT");
    assert_eq!(style.path, "/geoserver/rest/layers/hazards:2024_rp100");
    assert!(style.body.contains("<name>flood_depth</name>"));
}

#[tokio::test]
async fn test_requests_carry_auth_and_content_type() {
    let server = StubServer::start(happy).await;
    publisher(&server, &[])
        .publish_path("/data/cp_cfhp/rp10")
        .await
        .unwrap();

    for request in server.requests() {
        // base64("admin:geoserver")
        assert_eq!(request.header("authorization"), Some("Basic YWRtaW46Z2Vvc2VydmVy"));
        assert_eq!(request.header("content-type"), Some("text/xml"));
    }
}

#[tokio::test]
async fn test_store_name_stays_one_path_segment() {
    let server = StubServer::start(happy).await;
    let report = publisher(&server, &[])
        .publish_path("/data/cp_cfhp/rp#1?x%")
        .await
        .unwrap();

    assert_eq!(report.store, "rp#1?x%");
    assert!(report.is_success());

    let requests = server.requests();
    assert_eq!(
        requests[1].path,
        "/geoserver/rest/workspaces/hazards/coveragestores/rp%231%3Fx%25/external.imagemosaic"
    );
    assert_eq!(requests[1].param("coverageName"), Some("rp#1?x%"));
    assert_eq!(requests[2].path, "/geoserver/rest/layers/hazards:rp%231%3Fx%25");
}

#[tokio::test]
async fn test_failed_store_creation_does_not_short_circuit() {
    let server = StubServer::start(|req| {
        if req.method == "POST" {
            StubResponse::status(500, "Store already exists")
        } else {
            happy(req)
        }
    })
    .await;

    let report = publisher(&server, &[])
        .publish_path("/data/cp_cfhp/rp100")
        .await
        .unwrap();

    assert_eq!(server.requests().len(), 3);
    assert_eq!(
        report.outcome(PublishStep::CreateStore),
        Some(&StepOutcome::Rejected {
            status: 500,
            body: "Store already exists".to_string()
        })
    );
    assert_eq!(
        report.outcome(PublishStep::ConfigureMosaic),
        Some(&StepOutcome::Succeeded)
    );
    assert_eq!(report.outcome(PublishStep::AssignStyle), Some(&StepOutcome::Succeeded));
    assert!(!report.is_success());
}

#[tokio::test]
async fn test_wrong_success_code_is_rejected() {
    // 200 where 201 is expected
    let server = StubServer::start(|_| StubResponse::status(200, "")).await;
    let report = publisher(&server, &[])
        .publish_path("/data/cp_cfhp/rp100")
        .await
        .unwrap();

    assert!(matches!(
        report.outcome(PublishStep::CreateStore),
        Some(StepOutcome::Rejected { status: 200, .. })
    ));
    assert_eq!(report.outcome(PublishStep::AssignStyle), Some(&StepOutcome::Succeeded));
}

#[tokio::test]
async fn test_publish_all_continues_past_bad_paths() {
    let server = StubServer::start(happy).await;
    let reports = publisher(&server, &["/data/cp_cfhp/a", "/data/cp_cfhp/", "/data/cp_cfhp/b"])
        .publish_all()
        .await;

    let stores: Vec<&str> = reports.iter().map(|r| r.store.as_str()).collect();
    assert_eq!(stores, vec!["a", "b"]);
    assert_eq!(server.requests().len(), 6);
}

#[tokio::test]
async fn test_unreachable_server_is_recorded_as_failed() {
    let server = StubServer::start(happy).await;
    let config = PublishConfig {
        // Nothing listens on port 9 locally
        rest_url: "http://127.0.0.1:9/geoserver/rest".to_string(),
        ..config(&server, &[])
    };
    let report = MosaicPublisher::new(config, Credentials::new("u", "p"))
        .unwrap()
        .publish_path("/data/cp_cfhp/rp100")
        .await
        .unwrap();

    assert_eq!(report.steps.len(), 3);
    assert!(report
        .steps
        .iter()
        .all(|s| matches!(s.outcome, StepOutcome::Failed(_))));
}
