//! Routing decision tests: full round-trip without a local runtime or a
//! live peer. The executor seams are replaced with counting fakes so every
//! branch of the fallback state machine is exercised deterministically.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use td_domain::chat::ChatMessage;
use td_domain::error::{Error, Result};
use td_domain::stream::StreamEvent;
use td_executor::fallback::{collect_stream, route, ExecutionSource, FallbackConfig};
use td_executor::traits::{ChatExecutor, RemoteEndpoint};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Fakes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Default)]
struct FakeLocal {
    calls: AtomicUsize,
}

#[async_trait]
impl ChatExecutor for FakeLocal {
    async fn execute(&self, _messages: &[ChatMessage]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("local reply".into())
    }
}

enum Health {
    Healthy,
    NotReady,
    Unreachable,
}

struct FakeRemote {
    health: Health,
    execute_ok: bool,
    probes: AtomicUsize,
    calls: AtomicUsize,
}

impl FakeRemote {
    fn new(health: Health, execute_ok: bool) -> Self {
        Self {
            health,
            execute_ok,
            probes: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ChatExecutor for FakeRemote {
    async fn execute(&self, _messages: &[ChatMessage]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.execute_ok {
            Ok("remote reply".into())
        } else {
            Err(Error::Remote("status 500: boom".into()))
        }
    }
}

#[async_trait]
impl RemoteEndpoint for FakeRemote {
    async fn available(&self) -> Result<bool> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        match self.health {
            Health::Healthy => Ok(true),
            Health::NotReady => Ok(false),
            Health::Unreachable => Err(Error::HealthCheck("timeout: probe".into())),
        }
    }
}

fn messages() -> Vec<ChatMessage> {
    vec![ChatMessage::user("hello")]
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Forced and unconfigured paths
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn local_only_never_probes_remote() {
    let cfg = FallbackConfig {
        local_only: true,
        remote_url: Some("http://peer".into()),
        ..Default::default()
    };
    let local = FakeLocal::default();
    let remote = FakeRemote::new(Health::Healthy, true);

    let result = route(&cfg, &local, Some(&remote), &messages()).await.unwrap();

    assert_eq!(result.source, ExecutionSource::Local);
    assert_eq!(result.reply, "local reply");
    assert_eq!(remote.probes.load(Ordering::SeqCst), 0);
    assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn local_only_wins_when_both_flags_set() {
    let cfg = FallbackConfig {
        local_only: true,
        remote_only: true,
        ..Default::default()
    };
    let local = FakeLocal::default();
    let remote = FakeRemote::new(Health::Healthy, true);

    let result = route(&cfg, &local, Some(&remote), &messages()).await.unwrap();
    assert_eq!(result.source, ExecutionSource::Local);
    assert_eq!(remote.probes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn no_remote_configured_runs_locally() {
    let cfg = FallbackConfig::default();
    let local = FakeLocal::default();

    let result = route(&cfg, &local, None, &messages()).await.unwrap();

    assert_eq!(result.source, ExecutionSource::Local);
    assert_eq!(local.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn remote_only_without_remote_is_a_config_error() {
    let cfg = FallbackConfig { remote_only: true, ..Default::default() };
    let local = FakeLocal::default();

    let err = route(&cfg, &local, None, &messages()).await.unwrap_err();

    assert!(matches!(err, Error::Config(_)), "{err}");
    assert_eq!(local.calls.load(Ordering::SeqCst), 0);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Remote probe and execution outcomes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn healthy_remote_serves_the_request() {
    let cfg = FallbackConfig { remote_url: Some("http://peer".into()), ..Default::default() };
    let local = FakeLocal::default();
    let remote = FakeRemote::new(Health::Healthy, true);

    let result = route(&cfg, &local, Some(&remote), &messages()).await.unwrap();

    assert_eq!(result.source, ExecutionSource::Remote);
    assert_eq!(result.reply, "remote reply");
    assert_eq!(local.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn remote_execute_failure_falls_back_to_local() {
    let cfg = FallbackConfig { remote_url: Some("http://peer".into()), ..Default::default() };
    let local = FakeLocal::default();
    let remote = FakeRemote::new(Health::Healthy, false);

    let result = route(&cfg, &local, Some(&remote), &messages()).await.unwrap();

    assert_eq!(result.source, ExecutionSource::Fallback);
    assert_eq!(result.reply, "local reply");
    assert_eq!(remote.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn remote_execute_failure_is_fatal_when_remote_only() {
    let cfg = FallbackConfig {
        remote_url: Some("http://peer".into()),
        remote_only: true,
        ..Default::default()
    };
    let local = FakeLocal::default();
    let remote = FakeRemote::new(Health::Healthy, false);

    let err = route(&cfg, &local, Some(&remote), &messages()).await.unwrap_err();

    assert!(matches!(err, Error::Remote(_)), "{err}");
    assert_eq!(local.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unreachable_remote_falls_back_to_local() {
    let cfg = FallbackConfig { remote_url: Some("http://peer".into()), ..Default::default() };
    let local = FakeLocal::default();
    let remote = FakeRemote::new(Health::Unreachable, true);

    let result = route(&cfg, &local, Some(&remote), &messages()).await.unwrap();

    assert_eq!(result.source, ExecutionSource::Fallback);
    assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unreachable_remote_is_fatal_when_remote_only() {
    let cfg = FallbackConfig {
        remote_url: Some("http://peer".into()),
        remote_only: true,
        ..Default::default()
    };
    let local = FakeLocal::default();
    let remote = FakeRemote::new(Health::Unreachable, true);

    let err = route(&cfg, &local, Some(&remote), &messages()).await.unwrap_err();

    assert!(matches!(err, Error::HealthCheck(_)), "{err}");
    assert_eq!(local.calls.load(Ordering::SeqCst), 0);
    assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn not_ready_peer_falls_back_without_execution() {
    let cfg = FallbackConfig { remote_url: Some("http://peer".into()), ..Default::default() };
    let local = FakeLocal::default();
    let remote = FakeRemote::new(Health::NotReady, true);

    let result = route(&cfg, &local, Some(&remote), &messages()).await.unwrap();

    assert_eq!(result.source, ExecutionSource::Fallback);
    assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn not_ready_peer_is_fatal_when_remote_only() {
    let cfg = FallbackConfig {
        remote_url: Some("http://peer".into()),
        remote_only: true,
        ..Default::default()
    };
    let local = FakeLocal::default();
    let remote = FakeRemote::new(Health::NotReady, true);

    let err = route(&cfg, &local, Some(&remote), &messages()).await.unwrap_err();
    assert!(matches!(err, Error::HealthCheck(_)), "{err}");
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Stream accumulation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn token_stream(
    fragments: Vec<&'static str>,
) -> td_domain::stream::BoxStream<'static, Result<StreamEvent>> {
    Box::pin(async_stream::stream! {
        for text in fragments {
            yield Ok(StreamEvent::Token { text: text.into() });
        }
        yield Ok(StreamEvent::Done);
    })
}

#[tokio::test]
async fn collect_stream_accumulates_fragments() {
    let mut seen = Vec::new();
    let full = collect_stream(token_stream(vec!["hel", "lo ", "there"]), |t| {
        seen.push(t.to_string());
        Ok(())
    })
    .await
    .unwrap();

    assert_eq!(full, "hello there");
    assert_eq!(seen, vec!["hel", "lo ", "there"]);
}

#[tokio::test]
async fn collect_stream_aborts_on_callback_error() {
    let mut count = 0;
    let err = collect_stream(token_stream(vec!["a", "b", "c"]), |_| {
        count += 1;
        if count == 2 {
            Err(Error::Other("sink closed".into()))
        } else {
            Ok(())
        }
    })
    .await
    .unwrap_err();

    assert!(matches!(err, Error::Other(_)));
    assert_eq!(count, 2);
}

#[tokio::test]
async fn collect_stream_surfaces_mid_stream_errors() {
    let stream: td_domain::stream::BoxStream<'static, Result<StreamEvent>> =
        Box::pin(async_stream::stream! {
            yield Ok(StreamEvent::Token { text: "partial".into() });
            yield Err(Error::Local("model exploded".into()));
        });

    let err = collect_stream(stream, |_| Ok(())).await.unwrap_err();
    assert!(matches!(err, Error::Local(_)));
}
