//! Unit tests for endpoint resolution

use imagen_client::config::Settings;
use imagen_client::endpoint::{DeploymentContext, EndpointResolver};

fn resolve(host: &str) -> String {
    EndpointResolver::new(DeploymentContext::new(host), &Settings::default().backend)
        .resolve()
        .base_url
}

#[test]
fn test_vercel_host_resolves_to_loopback() {
    assert_eq!(resolve("myapp.vercel.app"), "http://localhost:8000");
}

#[test]
fn test_lan_host_kept_verbatim() {
    assert_eq!(resolve("192.168.1.5"), "http://192.168.1.5:8000");
}

#[test]
fn test_any_host_with_marker_resolves_to_loopback() {
    for host in [
        "vercel.app",
        "my-app-git-main-team.vercel.app",
        "x.vercel.app.internal",
        "prefixvercel.appsuffix",
    ] {
        assert_eq!(resolve(host), "http://localhost:8000", "host {}", host);
    }
}

#[test]
fn test_other_hosts_byte_for_byte() {
    for host in ["localhost", "127.0.0.1", "studio.local", "Vercel.App", "vercel-app.com"] {
        assert_eq!(resolve(host), format!("http://{}:8000", host));
    }
}

#[test]
fn test_context_is_retained() {
    let resolver = EndpointResolver::new(
        DeploymentContext::new("10.1.2.3"),
        &Settings::default().backend,
    );
    assert_eq!(resolver.context().host, "10.1.2.3");
    assert_eq!(resolver.resolve(), resolver.resolve_host("10.1.2.3"));
}
