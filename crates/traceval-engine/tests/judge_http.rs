// Integration tests for the external judge path against a local
// chat-completions stub. Each stub serves exactly one request and exits.
use std::thread::JoinHandle;
use tiny_http::{Header, Response, Server};
use traceval_engine::judge::{heuristic_correctness, CorrectnessJudge, JudgeConfig, Judgment};

fn spawn_stub(body: &'static str) -> (String, JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").expect("bind stub server");
    let port = server
        .server_addr()
        .to_ip()
        .expect("ip listener")
        .port();
    let api_base = format!("http://127.0.0.1:{}/v1", port);

    let handle = std::thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let header =
                Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
            let _ = request.respond(Response::from_string(body).with_header(header));
        }
    });

    (api_base, handle)
}

fn judge_for(api_base: String) -> CorrectnessJudge {
    CorrectnessJudge::new(JudgeConfig {
        api_base,
        api_key: Some("test-key".to_string()),
        model: "stub-model".to_string(),
    })
}

#[test]
fn percentage_response_is_corrected() {
    let (api_base, handle) = spawn_stub(r#"{"choices":[{"message":{"content":"75"}}]}"#);
    let judge = judge_for(api_base);

    let judgment = judge.evaluate("count the open tabs", "there are 12 open tabs");
    assert_eq!(judgment, Judgment::Scored(0.75));

    handle.join().unwrap();
}

#[test]
fn decimal_response_passes_through() {
    let (api_base, handle) = spawn_stub(r#"{"choices":[{"message":{"content":"0.9"}}]}"#);
    let judge = judge_for(api_base);

    let judgment = judge.evaluate("archive the invoice", "invoice archived");
    assert_eq!(judgment, Judgment::Scored(0.9));

    handle.join().unwrap();
}

#[test]
fn unparsable_response_degrades_to_heuristic() {
    let (api_base, handle) =
        spawn_stub(r#"{"choices":[{"message":{"content":"looks great to me"}}]}"#);
    let judge = judge_for(api_base);

    let request = "resize the browser window";
    let output = "the browser window was resized";
    let judgment = judge.evaluate(request, output);

    match judgment {
        Judgment::Degraded { score, reason } => {
            assert_eq!(score, heuristic_correctness(request, output));
            assert!(reason.contains("unparsable"), "unexpected reason: {reason}");
        }
        Judgment::Scored(_) => panic!("expected degraded judgment"),
    }

    handle.join().unwrap();
}

#[test]
fn unreachable_endpoint_degrades_to_heuristic() {
    // Nothing listens on the reserved port 9; the transport error must stay
    // inside the judge.
    let judge = judge_for("http://127.0.0.1:9/v1".to_string());

    let request = "open the calculator";
    let output = "calculator opened";
    let judgment = judge.evaluate(request, output);

    match judgment {
        Judgment::Degraded { score, .. } => {
            assert_eq!(score, heuristic_correctness(request, output));
        }
        Judgment::Scored(_) => panic!("expected degraded judgment"),
    }
}
