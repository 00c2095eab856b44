use async_trait::async_trait;
use share_harvester::prober::{ProbeOutcome, ProbeResponse, ProbeTransport, ValidityProber};
use share_harvester::types::{HarvestError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const GOOD_URL: &str = "https://chatgpt.com/share/0123456789abcdef0123456789abcdef";

/// Stub transport that counts calls and replies with a canned response.
struct StubTransport {
    calls: AtomicUsize,
    response: Option<ProbeResponse>,
}

impl StubTransport {
    fn replying(status: u16, final_url: &str, body: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            response: Some(ProbeResponse {
                status,
                final_url: final_url.to_string(),
                body: body.to_string(),
            }),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            response: None,
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProbeTransport for StubTransport {
    async fn fetch(&self, _url: &str) -> Result<ProbeResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Some(response) => Ok(response.clone()),
            None => Err(HarvestError::General("connection refused".to_string())),
        }
    }
}

#[tokio::test]
async fn structurally_invalid_locator_skips_the_network() {
    let transport = StubTransport::replying(200, GOOD_URL, "chatgpt conversation");
    let prober = ValidityProber::new(transport.clone());

    let outcome = prober.probe("https://chatgpt.com/share/short").await;
    assert_eq!(outcome, ProbeOutcome::StructurallyInvalid);
    assert_eq!(transport.call_count(), 0);

    let outcome = prober.probe("https://example.com/whatever").await;
    assert_eq!(outcome, ProbeOutcome::StructurallyInvalid);
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn auth_redirect_classifies_as_requires_auth() {
    let transport = StubTransport::replying(
        200,
        "https://auth.openai.com/authorize?from=share",
        "chatgpt conversation message",
    );
    let prober = ValidityProber::new(transport);
    assert_eq!(prober.probe(GOOD_URL).await, ProbeOutcome::RequiresAuth);
}

#[tokio::test]
async fn status_codes_map_to_outcomes() {
    let cases = [
        (404, ProbeOutcome::NotFound),
        (403, ProbeOutcome::Forbidden),
        (500, ProbeOutcome::TransportError),
        (429, ProbeOutcome::TransportError),
    ];
    for (status, expected) in cases {
        let transport = StubTransport::replying(status, GOOD_URL, "");
        let prober = ValidityProber::new(transport);
        assert_eq!(prober.probe(GOOD_URL).await, expected, "status {}", status);
    }
}

#[tokio::test]
async fn private_conversation_banner_is_rejected() {
    let transport = StubTransport::replying(
        200,
        GOOD_URL,
        "ChatGPT — This Conversation Is Private. Ask the owner to share it.",
    );
    let prober = ValidityProber::new(transport);
    assert_eq!(prober.probe(GOOD_URL).await, ProbeOutcome::RequiresAuth);
}

#[tokio::test]
async fn too_few_positive_markers_is_not_a_conversation() {
    // Only one marker ("chatgpt") present.
    let transport = StubTransport::replying(200, GOOD_URL, "Welcome to ChatGPT marketing page");
    let prober = ValidityProber::new(transport);
    assert_eq!(prober.probe(GOOD_URL).await, ProbeOutcome::NotFound);
}

#[tokio::test]
async fn conversation_page_is_accessible() {
    let transport = StubTransport::replying(
        200,
        GOOD_URL,
        "<html><title>ChatGPT</title><body>A shared conversation. user: hi assistant: hello</body></html>",
    );
    let prober = ValidityProber::new(transport.clone());
    assert_eq!(prober.probe(GOOD_URL).await, ProbeOutcome::Accessible);
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn transport_failure_maps_to_transport_error() {
    let transport = StubTransport::failing();
    let prober = ValidityProber::new(transport);
    assert_eq!(prober.probe(GOOD_URL).await, ProbeOutcome::TransportError);
}
