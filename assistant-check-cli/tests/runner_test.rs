use assistant_check::api::AssistantClient;
use assistant_check::checks::{Level, Outcome};
use assistant_check::config::{ApiConfig, Config};
use assistant_check::report::Reporter;
use assistant_check::runner::{Runner, Verdict};
use assistant_check::suites::Suite;
use mockito::{Matcher, Server};
use serde_json::{json, Value};
use std::time::Duration;

fn client_for(server: &Server) -> AssistantClient {
    let config = Config {
        api: ApiConfig {
            base_url: server.url(),
            timeout_seconds: 5,
            ..ApiConfig::default()
        },
        ..Config::default()
    };
    AssistantClient::new(&config).unwrap()
}

async fn reply_to(server: &mut Server, content: &str, status: usize, body: Value) -> mockito::Mock {
    server
        .mock("POST", "/api/admin-assistant")
        .match_body(Matcher::PartialJson(json!({
            "messages": [{"role": "user", "content": content}]
        })))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

fn quiet_reporter() -> Reporter<Vec<u8>> {
    colored::control::set_override(false);
    Reporter::new(Vec::new())
}

#[tokio::test]
async fn test_list_members_reports_found_member() {
    let mut server = Server::new_async().await;
    let _members = reply_to(
        &mut server,
        "Lista todos los socios",
        200,
        json!({"toolResults": {"t1": {"members": [{"name": "Said"}], "count": 1}}}),
    )
    .await;

    let client = client_for(&server);
    let suite = Suite::builtin("admin-assistant").unwrap().filter("List Members").unwrap();
    let runner = Runner::new(&client, Duration::ZERO, 0.75);

    let mut reporter = quiet_reporter();
    let (summary, verdict) = runner.run(&suite, &mut reporter).await;

    assert_eq!(verdict, Verdict::AllPassed);
    let result = &summary.results[0];
    assert_eq!(result.outcome, Outcome::Passed);
    assert!(result
        .findings
        .iter()
        .any(|f| f.level == Level::Success && f.text.contains("Said")));

    let output = String::from_utf8(reporter.into_inner()).unwrap();
    assert!(output.contains("TEST 1: LIST MEMBERS TOOL"));
    assert!(output.contains("Sending request: Lista todos los socios"));
    assert!(output.contains("Status Code: 200"));
}

#[tokio::test]
async fn test_failures_never_abort_the_run() {
    let mut server = Server::new_async().await;
    let _members = reply_to(
        &mut server,
        "Lista todos los socios",
        500,
        json!({"error": "Error del asistente"}),
    )
    .await;
    let _workouts = reply_to(
        &mut server,
        "Lista las rutinas disponibles",
        429,
        json!({"error": "Rate limit reached"}),
    )
    .await;
    let _activity = reply_to(
        &mut server,
        "Ver actividad física del socio Said de los últimos 7 días",
        200,
        json!({"message": "Said caminó 8000 pasos al día"}),
    )
    .await;

    let client = client_for(&server);
    let suite = Suite::builtin("new-tools").unwrap();
    let runner = Runner::new(&client, Duration::ZERO, 0.75);

    let mut reporter = quiet_reporter();
    let (summary, verdict) = runner.run(&suite, &mut reporter).await;

    let outcomes: Vec<Outcome> = summary.results.iter().map(|r| r.outcome).collect();
    assert_eq!(
        outcomes,
        vec![Outcome::Failed, Outcome::RateLimited, Outcome::Passed]
    );
    assert_eq!(verdict, Verdict::Failed);
    assert!(summary.results[0].details.contains("Error del asistente"));

    let output = String::from_utf8(reporter.into_inner()).unwrap();
    assert!(output.contains("Status Code: 500"));
    assert!(output.contains("Status Code: 429"));
    assert!(output.contains("MULTIPLE TESTS FAILED"));
}

#[tokio::test]
async fn test_rate_limited_cases_are_soft_passes() {
    let mut server = Server::new_async().await;
    let _members = reply_to(
        &mut server,
        "Lista todos los socios",
        200,
        json!({"message": "Tenemos 12 socios activos"}),
    )
    .await;
    let _workouts = reply_to(
        &mut server,
        "Lista las rutinas disponibles",
        429,
        json!({"error": "quota exceeded"}),
    )
    .await;
    let _activity = reply_to(
        &mut server,
        "Ver actividad física del socio Said de los últimos 7 días",
        200,
        json!({"error": "429 Too Many Requests"}),
    )
    .await;

    let client = client_for(&server);
    let suite = Suite::builtin("new-tools").unwrap();
    let runner = Runner::new(&client, Duration::ZERO, 0.75);

    let (summary, verdict) = runner.run(&suite, &mut quiet_reporter()).await;

    assert_eq!(summary.passed(), 1);
    assert_eq!(summary.rate_limited(), 2);
    assert_eq!(verdict, Verdict::PassedWithRateLimits);
    assert!(verdict.is_success());
}

#[tokio::test]
async fn test_cases_run_in_suite_order() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/admin-assistant")
        .with_status(200)
        .with_body(r#"{"message": "Listo"}"#)
        .expect(7)
        .create_async()
        .await;

    let client = client_for(&server);
    let suite = Suite::builtin("admin-assistant").unwrap();
    let runner = Runner::new(&client, Duration::ZERO, 0.75);

    let (summary, verdict) = runner.run(&suite, &mut quiet_reporter()).await;

    mock.assert_async().await;
    let names: Vec<&str> = summary.results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names[0], "Basic Chat");
    assert_eq!(names[6], "Get Member Activity Tool");
    // Only the greeting accepts any message
    assert_eq!(summary.passed(), 1);
    assert_eq!(verdict, Verdict::Failed);
}

#[tokio::test]
async fn test_delay_between_cases() {
    let mut server = Server::new_async().await;
    let _greeting = server
        .mock("POST", "/api/admin-assistant")
        .with_status(200)
        .with_body(r#"{"message": "Hola"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let suite = Suite::parse(
        r#"
        name = "greetings"

        [[cases]]
        name = "First"
        message = "Hola"
        accept_any_message = true

        [[cases]]
        name = "Second"
        message = "Buenas"
        accept_any_message = true
        "#,
    )
    .unwrap();
    let runner = Runner::new(&client, Duration::from_millis(1100), 0.75);

    let started = std::time::Instant::now();
    let mut reporter = quiet_reporter();
    let (_, verdict) = runner.run(&suite, &mut reporter).await;

    assert!(started.elapsed() >= Duration::from_millis(1100));
    assert_eq!(verdict, Verdict::AllPassed);
    let output = String::from_utf8(reporter.into_inner()).unwrap();
    assert_eq!(output.matches("Waiting 1 seconds").count(), 1);
}

#[tokio::test]
async fn test_structured_error_field_is_rate_limited() {
    let mut server = Server::new_async().await;
    let _workouts = reply_to(
        &mut server,
        "Lista las rutinas disponibles",
        200,
        json!({"error": {"message": "Rate limit reached", "code": "rate_limit_exceeded"}}),
    )
    .await;

    let client = client_for(&server);
    let suite = Suite::builtin("new-tools").unwrap().filter("List Workouts").unwrap();
    let runner = Runner::new(&client, Duration::ZERO, 0.75);

    let (summary, verdict) = runner.run(&suite, &mut quiet_reporter()).await;

    assert_eq!(summary.results[0].outcome, Outcome::RateLimited);
    assert_eq!(verdict, Verdict::PassedWithRateLimits);
}

#[tokio::test]
async fn test_timeout_fails_case_and_run_continues() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let config = Config {
        api: ApiConfig {
            base_url,
            timeout_seconds: 1,
            ..ApiConfig::default()
        },
        ..Config::default()
    };
    let client = AssistantClient::new(&config).unwrap();
    let suite = Suite::builtin("new-tools").unwrap();
    let runner = Runner::new(&client, Duration::ZERO, 0.75);

    let mut reporter = quiet_reporter();
    let (summary, verdict) = runner.run(&suite, &mut reporter).await;

    assert_eq!(summary.total(), 3);
    assert!(summary.results.iter().all(|r| r.outcome == Outcome::Failed));
    assert!(summary.results[0].details.contains("Request timed out after 1 seconds"));
    assert_eq!(verdict, Verdict::Failed);

    let output = String::from_utf8(reporter.into_inner()).unwrap();
    assert!(!output.contains("Status Code:"));
}
