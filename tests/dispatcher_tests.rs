mod common;

use std::net::TcpListener;
use std::time::{Duration, Instant};

use birdlg::dispatcher::{backend_url, DispatchSettings, Dispatcher};
use birdlg::shared::{Endpoint, EMPTY_RESPONSE_PLACEHOLDER, INVALID_SERVER_RESPONSE, MAX_RESPONSE_BYTES};

use common::{spawn_proxy, FakeTransport};

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_backend_url_ipv4() {
    let settings = DispatchSettings::new(["1.1.1.1"]);
    let url = backend_url(&settings, "1.1.1.1", Endpoint::Bird, "cmd").unwrap();
    assert_eq!(url.as_str(), "http://1.1.1.1:8000/bird?q=cmd");
}

#[test]
fn test_backend_url_ipv6_is_bracketed() {
    let settings = DispatchSettings::new(["2001:db8::1"]);
    let url = backend_url(&settings, "2001:db8::1", Endpoint::Bird, "cmd").unwrap();
    assert_eq!(url.as_str(), "http://[2001:db8::1]:8000/bird?q=cmd");
}

#[test]
fn test_backend_url_domain_suffix_and_encoding() {
    let settings = DispatchSettings::new(["alpha"]).with_domain("suffix").with_proxy_port(8001);
    let url = backend_url(&settings, "alpha", Endpoint::Traceroute, "show route for 10.0.0.1/32 all").unwrap();
    assert_eq!(
        url.as_str(),
        "http://alpha.suffix:8001/traceroute?q=show+route+for+10.0.0.1%2F32+all"
    );
}

#[test]
fn test_results_keep_request_order() {
    // Slowest first, so completion order is the reverse of request order.
    let transport = FakeTransport::new()
        .with_backend("alpha", 300, "from alpha")
        .with_backend("beta", 150, "from beta")
        .with_backend("gamma", 0, "from gamma");
    let dispatcher = Dispatcher::with_transport(
        DispatchSettings::new(["alpha", "beta", "gamma"]),
        transport,
    );

    let backends = names(&["alpha", "beta", "gamma"]);
    let results = dispatcher.dispatch(&backends, Endpoint::Bird, "cmd");

    assert_eq!(results.len(), 3);
    for (i, (result, backend)) in results.iter().zip(&backends).enumerate() {
        assert_eq!(result.index, i);
        assert_eq!(&result.backend, backend);
        assert_eq!(result.text, format!("from {}", backend));
    }
}

#[test]
fn test_backends_are_queried_in_parallel() {
    let transport = FakeTransport::new()
        .with_backend("alpha", 300, "a")
        .with_backend("beta", 300, "b")
        .with_backend("gamma", 300, "c");
    let dispatcher = Dispatcher::with_transport(
        DispatchSettings::new(["alpha", "beta", "gamma"]),
        transport,
    );

    let start = Instant::now();
    dispatcher.dispatch(&names(&["alpha", "beta", "gamma"]), Endpoint::Bird, "cmd");
    assert!(start.elapsed() < Duration::from_millis(850));
}

#[test]
fn test_invalid_server_never_hits_network() {
    let transport = FakeTransport::new().with_backend("alpha", 0, "ok");
    let dispatcher = Dispatcher::with_transport(DispatchSettings::new(["alpha"]), transport);

    let results = dispatcher.dispatch(&names(&["invalid", "alpha"]), Endpoint::Bird, "cmd");

    assert_eq!(results[0].text, INVALID_SERVER_RESPONSE);
    assert_eq!(results[1].text, "ok");
    assert_eq!(dispatcher.transport().call_count(), 1);
    assert!(!dispatcher.transport().calls.lock().unwrap()[0].contains("invalid"));
}

#[test]
fn test_transport_failure_is_isolated() {
    // "beta" has no canned body, so the fake answers with a 502.
    let transport = FakeTransport::new()
        .with_backend("alpha", 0, "alpha ok")
        .with_backend("gamma", 0, "gamma ok");
    let dispatcher = Dispatcher::with_transport(
        DispatchSettings::new(["alpha", "beta", "gamma"]),
        transport,
    );

    let texts = dispatcher.dispatch_text(&names(&["alpha", "beta", "gamma"]), Endpoint::Bird, "cmd");

    assert_eq!(texts[0], "alpha ok");
    assert!(texts[1].starts_with("request failed: "));
    assert!(texts[1].ends_with('\n'));
    assert_eq!(texts[2], "gamma ok");
}

#[test]
fn test_empty_list_returns_empty() {
    let dispatcher = Dispatcher::with_transport(DispatchSettings::new(["alpha"]), FakeTransport::new());
    assert!(dispatcher.dispatch(&[], Endpoint::Bird, "cmd").is_empty());
}

#[test]
fn test_http_success() {
    let proxy = spawn_proxy("200 OK", "Mock Result");
    let dispatcher = Dispatcher::new(
        DispatchSettings::new(["127.0.0.1"]).with_proxy_port(proxy.port),
    )
    .unwrap();

    let texts = dispatcher.dispatch_text(&names(&["127.0.0.1"]), Endpoint::Bird, "show status");

    assert_eq!(texts, vec!["Mock Result".to_string()]);
    assert_eq!(
        proxy.requests.lock().unwrap().as_slice(),
        &["/bird?q=show+status".to_string()]
    );
}

#[test]
fn test_http_empty_body_gets_placeholder() {
    let proxy = spawn_proxy("200 OK", "");
    let dispatcher = Dispatcher::new(
        DispatchSettings::new(["127.0.0.1"]).with_proxy_port(proxy.port),
    )
    .unwrap();

    let texts = dispatcher.dispatch_text(&names(&["127.0.0.1"]), Endpoint::Bird, "cmd");

    assert_eq!(texts[0], EMPTY_RESPONSE_PLACEHOLDER);
}

#[test]
fn test_http_error_status_is_failure_text() {
    let proxy = spawn_proxy("500 Internal Server Error", "boom");
    let dispatcher = Dispatcher::new(
        DispatchSettings::new(["127.0.0.1"]).with_proxy_port(proxy.port),
    )
    .unwrap();

    let texts = dispatcher.dispatch_text(&names(&["127.0.0.1"]), Endpoint::Bird, "cmd");

    assert!(texts[0].starts_with("request failed: "));
    assert!(texts[0].contains("500"));
}

#[test]
fn test_http_no_content_is_failure_text() {
    let proxy = spawn_proxy("204 No Content", "");
    let dispatcher = Dispatcher::new(
        DispatchSettings::new(["127.0.0.1"]).with_proxy_port(proxy.port),
    )
    .unwrap();

    let texts = dispatcher.dispatch_text(&names(&["127.0.0.1"]), Endpoint::Bird, "cmd");

    assert!(texts[0].starts_with("request failed: "));
    assert!(texts[0].contains("204"));
}

#[test]
fn test_http_body_is_capped() {
    let body = "x".repeat(MAX_RESPONSE_BYTES + 4000);
    let proxy = spawn_proxy("200 OK", &body);
    let dispatcher = Dispatcher::new(
        DispatchSettings::new(["127.0.0.1"]).with_proxy_port(proxy.port),
    )
    .unwrap();

    let texts = dispatcher.dispatch_text(&names(&["127.0.0.1"]), Endpoint::Bird, "cmd");

    assert_eq!(texts[0].len(), MAX_RESPONSE_BYTES);
}

#[test]
fn test_http_connection_refused() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let dispatcher = Dispatcher::new(
        DispatchSettings::new(["127.0.0.1"])
            .with_proxy_port(port)
            .with_connect_timeout(Duration::from_secs(1))
            .with_timeout(Duration::from_secs(2)),
    )
    .unwrap();

    let texts = dispatcher.dispatch_text(&names(&["127.0.0.1"]), Endpoint::Bird, "cmd");

    assert!(texts[0].starts_with("request failed: "));
}
