/**
 * Request Dispatcher
 * 把 (method, endpoint, body) 解析为对后端的完整 HTTP 调用
 *
 * 流程:
 * 1. 相同请求去重: 进行中的请求直接共享结果, 完成后保留一个短暂的宽限窗口
 * 2. 每次调用重新读取设置和密钥, 解析目标 URL, 决定是否附带认证头
 * 3. 单次请求超时; 仅对可重试的失败重试一次
 * 4. 所有结果统一为 NetworkResponse, 返回前移除密钥原文
 */

use crate::models::failure_kind::TransportFailure;
use crate::models::network::NetworkResponse;
use crate::models::retry_strategy::RetryStrategy;
use crate::models::settings::Settings;
use crate::services::retry_manager::RetryManager;
use crate::services::secrets::CredentialStore;
use crate::services::settings_store::SettingsStore;
use crate::services::transport::{HttpTransport, OutboundRequest, TransportResponse};
use crate::utils::constants::HEALTH_CHECK_PATH;
use crate::utils::redact::redact_secret;
use crate::utils::time::millis;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::time::Instant;

type PendingResponse = Shared<BoxFuture<'static, NetworkResponse>>;

/// 去重键: METHOD:endpoint[:body]
pub fn request_key(method: &str, endpoint: &str, body: Option<&Value>) -> String {
    match body {
        Some(body) if !body.is_null() => format!("{}:{}:{}", method, endpoint, body),
        _ => format!("{}:{}", method, endpoint),
    }
}

/// 解析后的请求目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub url: String,
    /// 是否附带认证头
    pub authenticate: bool,
}

/// 解析目标 URL
/// 配置缺失时返回配置错误响应, 不发起任何网络请求
pub fn resolve_target(
    settings: &Settings,
    endpoint: &str,
    secret: Option<&str>,
) -> Result<ResolvedTarget, NetworkResponse> {
    let base_url = settings.normalized_base_url();

    if is_absolute(endpoint) {
        let authenticate = base_url
            .map(|base| same_backend(endpoint, base))
            .unwrap_or(false);
        return Ok(ResolvedTarget {
            url: endpoint.to_string(),
            authenticate,
        });
    }

    let Some(base_url) = base_url else {
        return Err(NetworkResponse::config_error("Base URL not configured"));
    };

    let is_health_check = endpoint == HEALTH_CHECK_PATH;
    if secret.is_none() && !is_health_check {
        return Err(NetworkResponse::config_error("Webhook secret not configured"));
    }

    let url = if endpoint.starts_with('/') {
        format!("{}{}", base_url, endpoint)
    } else {
        format!("{}/{}", base_url, endpoint)
    };

    Ok(ResolvedTarget {
        url,
        authenticate: !is_health_check,
    })
}

fn is_absolute(endpoint: &str) -> bool {
    endpoint.starts_with("http://") || endpoint.starts_with("https://")
}

/// 绝对 URL 是否指向已配置的后端 (前缀匹配, 且在路径边界处结束)
fn same_backend(url: &str, base_url: &str) -> bool {
    match url.trim_end_matches('/').strip_prefix(base_url) {
        Some(rest) => rest.is_empty() || rest.starts_with(['/', '?', '#']),
        None => false,
    }
}

/// 组装出站请求
/// 认证头仅在需要认证且密钥非空时附带; 请求体仅用于 POST/PUT
pub fn build_request(
    method: &str,
    target: ResolvedTarget,
    settings: &Settings,
    secret: Option<&str>,
    body: Option<Value>,
) -> OutboundRequest {
    let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];

    if target.authenticate {
        if let Some(secret) = secret.filter(|secret| !secret.is_empty()) {
            headers.push((
                settings.effective_auth_header_name().to_string(),
                secret.to_string(),
            ));
        }
    }

    let body = match method {
        "POST" | "PUT" => body.filter(|body| !body.is_null()).map(|body| body.to_string()),
        _ => None,
    };

    OutboundRequest {
        method: method.to_string(),
        url: target.url,
        headers,
        body,
    }
}

/// 请求调度器
/// 克隆开销很小, 所有克隆共享同一个进行中请求表
#[derive(Clone)]
pub struct RequestDispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    settings: SettingsStore,
    credentials: Arc<CredentialStore>,
    transport: Arc<dyn HttpTransport>,
    strategy: RetryStrategy,
    retry_manager: RetryManager,
    in_flight: Mutex<HashMap<String, PendingResponse>>,
}

impl RequestDispatcher {
    pub fn new(
        settings: SettingsStore,
        credentials: Arc<CredentialStore>,
        transport: Arc<dyn HttpTransport>,
        strategy: RetryStrategy,
    ) -> Self {
        let retry_manager = RetryManager::new(strategy.clone());
        Self {
            inner: Arc::new(DispatcherInner {
                settings,
                credentials,
                transport,
                strategy,
                retry_manager,
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// 发起请求
    /// 相同 (method, endpoint, body) 的请求在进行中或宽限窗口内共享同一结果
    pub async fn dispatch(&self, method: &str, endpoint: &str, body: Option<Value>) -> NetworkResponse {
        let method = method.trim().to_ascii_uppercase();
        let key = request_key(&method, endpoint, body.as_ref());

        let pending = {
            let mut in_flight = self.inner.lock_in_flight();
            match in_flight.get(&key) {
                Some(existing) => {
                    log::debug!("复用进行中的请求: {} {}", method, endpoint);
                    existing.clone()
                }
                None => {
                    let inner = Arc::clone(&self.inner);
                    let endpoint = endpoint.to_string();
                    let pending = async move { inner.execute(&method, &endpoint, body).await }
                        .boxed()
                        .shared();
                    in_flight.insert(key.clone(), pending.clone());
                    self.schedule_release(key, pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    /// 请求完成并经过宽限窗口后移除去重键
    fn schedule_release(&self, key: String, pending: PendingResponse) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            pending.await;
            tokio::time::sleep(inner.strategy.dedup_window()).await;
            inner.lock_in_flight().remove(&key);
        });
    }

    /// 当前保留的去重键数量
    pub fn in_flight_count(&self) -> usize {
        self.inner.lock_in_flight().len()
    }

    pub fn strategy(&self) -> &RetryStrategy {
        &self.inner.strategy
    }
}

impl DispatcherInner {
    fn lock_in_flight(&self) -> MutexGuard<'_, HashMap<String, PendingResponse>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn execute(&self, method: &str, endpoint: &str, body: Option<Value>) -> NetworkResponse {
        // 每次调用都重新读取, 设置变更对下一次调用生效
        let settings = match self.settings.get() {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("读取设置失败: {}", e);
                return NetworkResponse::failure(format!("Failed to load settings: {}", e), None);
            }
        };
        let secret = self.credentials.get().secret.filter(|secret| !secret.is_empty());
        let secret = secret.as_deref();

        let target = match resolve_target(&settings, endpoint, secret) {
            Ok(target) => target,
            Err(response) => {
                log::warn!("请求未发出 {} {}: {}", method, endpoint, response.raw);
                return response.sanitized(secret);
            }
        };

        let request = build_request(method, target, &settings, secret, body);
        log::info!("{} {}", method, redact_secret(&request.url, secret));

        let response = self.send_with_retry(request, secret).await;
        if response.ok {
            log::info!(
                "请求成功 {} {} ({}ms)",
                method,
                endpoint,
                response.response_time_ms.unwrap_or_default()
            );
        }

        response.sanitized(secret)
    }

    async fn send_with_retry(&self, request: OutboundRequest, secret: Option<&str>) -> NetworkResponse {
        let started = Instant::now();
        let mut retries_done = 0;

        loop {
            match self.attempt(request.clone()).await {
                Ok(response) => {
                    return NetworkResponse::from_http(
                        response.status,
                        response.body,
                        millis(started.elapsed()),
                    );
                }
                Err(failure) => {
                    let detail = redact_secret(&failure.detail, secret);

                    if self.retry_manager.should_retry(failure.kind, retries_done) {
                        retries_done += 1;
                        log::warn!(
                            "请求失败 ({:?}), {}ms 后重试 ({}/{}): {}",
                            failure.kind,
                            self.strategy.retry_delay_ms,
                            retries_done,
                            self.strategy.max_retries,
                            detail
                        );
                        tokio::time::sleep(self.retry_manager.retry_delay()).await;
                        continue;
                    }

                    log::error!("请求最终失败 ({:?}): {}", failure.kind, detail);
                    return NetworkResponse::failure(
                        failure.user_message(self.strategy.request_timeout()),
                        Some(millis(started.elapsed())),
                    );
                }
            }
        }
    }

    /// 单次尝试, 超时即中止
    async fn attempt(&self, request: OutboundRequest) -> Result<TransportResponse, TransportFailure> {
        match tokio::time::timeout(self.strategy.request_timeout(), self.transport.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(TransportFailure::timeout()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{initialize_in_memory, DbPool};
    use crate::models::failure_kind::FailureKind;
    use crate::services::testing::{MockTransport, Step};
    use serde_json::json;
    use std::time::Duration;

    struct Fixture {
        dispatcher: RequestDispatcher,
        transport: Arc<MockTransport>,
        settings: SettingsStore,
    }

    fn fixture(base_url: &str, secret: Option<&str>, steps: Vec<Step>) -> Fixture {
        let pool = Arc::new(DbPool::new(initialize_in_memory().unwrap()));
        let settings = SettingsStore::new(pool);
        settings
            .set(&Settings {
                base_url: base_url.to_string(),
                ..Settings::default()
            })
            .unwrap();

        let credentials = Arc::new(CredentialStore::volatile());
        if let Some(secret) = secret {
            credentials.store(secret);
        }

        let transport = MockTransport::new(steps);
        let dispatcher = RequestDispatcher::new(
            settings.clone(),
            credentials,
            transport.clone(),
            RetryStrategy::default(),
        );

        Fixture {
            dispatcher,
            transport,
            settings,
        }
    }

    #[test]
    fn test_request_key() {
        assert_eq!(request_key("GET", "/leads", None), "GET:/leads");
        assert_eq!(request_key("GET", "/leads", Some(&Value::Null)), "GET:/leads");
        assert_eq!(
            request_key("POST", "/leads", Some(&json!({"q": "acme"}))),
            r#"POST:/leads:{"q":"acme"}"#
        );
    }

    #[test]
    fn test_same_backend_boundary() {
        assert!(same_backend("https://x.test", "https://x.test"));
        assert!(same_backend("https://x.test/", "https://x.test"));
        assert!(same_backend("https://x.test/webhook?a=1", "https://x.test"));
        assert!(!same_backend("https://x.test.evil.com/webhook", "https://x.test"));
        assert!(!same_backend("https://other.test/thing", "https://x.test"));
    }

    #[test]
    fn test_resolve_relative_without_slash() {
        let settings = Settings {
            base_url: "https://x.test/".to_string(),
            ..Settings::default()
        };
        let target = resolve_target(&settings, "leads", Some("s")).unwrap();
        assert_eq!(target.url, "https://x.test/leads");
        assert!(target.authenticate);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_identical_requests_share_one_call() {
        let fx = fixture(
            "https://x.test",
            Some("s3cr3t"),
            vec![Step::Stall(Duration::from_secs(1))],
        );

        let (a, b) = tokio::join!(
            fx.dispatcher.dispatch("GET", "/leads", None),
            fx.dispatcher.dispatch("get", "/leads", None)
        );

        assert_eq!(fx.transport.calls(), 1);
        assert!(a.ok);
        assert_eq!(a, b);
    }

    #[tokio::test(start_paused = true)]
    async fn test_different_bodies_are_not_deduplicated() {
        let fx = fixture("https://x.test", Some("s3cr3t"), vec![]);

        let _ = tokio::join!(
            fx.dispatcher.dispatch("POST", "/leads", Some(json!({"q": 1}))),
            fx.dispatcher.dispatch("POST", "/leads", Some(json!({"q": 2})))
        );

        assert_eq!(fx.transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_within_grace_window_collapses() {
        let fx = fixture("https://x.test", Some("s3cr3t"), vec![]);

        let first = fx.dispatcher.dispatch("GET", "/leads", None).await;
        let second = fx.dispatcher.dispatch("GET", "/leads", None).await;

        assert_eq!(fx.transport.calls(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_after_grace_window_dispatches_fresh() {
        let fx = fixture("https://x.test", Some("s3cr3t"), vec![]);

        fx.dispatcher.dispatch("GET", "/leads", None).await;
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(fx.dispatcher.in_flight_count(), 0);

        fx.dispatcher.dispatch("GET", "/leads", None).await;
        assert_eq!(fx.transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generic_failure_retried_once_after_delay() {
        let fx = fixture(
            "https://x.test",
            Some("s3cr3t"),
            vec![Step::Fail(FailureKind::Other, "connection reset by peer")],
        );

        let started = Instant::now();
        let response = fx.dispatcher.dispatch("GET", "/leads", None).await;

        assert!(response.ok);
        assert_eq!(fx.transport.calls(), 2);
        assert!(started.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_generic_failure_is_final() {
        let fx = fixture(
            "https://x.test",
            Some("s3cr3t"),
            vec![
                Step::Fail(FailureKind::Other, "connection reset by peer"),
                Step::Fail(FailureKind::Other, "connection reset by peer"),
            ],
        );

        let response = fx.dispatcher.dispatch("GET", "/leads", None).await;

        assert_eq!(fx.transport.calls(), 2);
        assert!(!response.ok);
        assert_eq!(response.status, 0);
        assert_eq!(response.error.as_deref(), Some("connection reset by peer"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_connection_refused_is_retried() {
        let fx = fixture(
            "https://x.test",
            Some("s3cr3t"),
            vec![
                Step::Fail(FailureKind::ConnectionRefused, "refused"),
                Step::Fail(FailureKind::ConnectionRefused, "refused"),
            ],
        );

        let response = fx.dispatcher.dispatch("GET", "/leads", None).await;

        assert_eq!(fx.transport.calls(), 2);
        assert_eq!(
            response.error.as_deref(),
            Some("Connection refused - server not reachable")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_not_retried() {
        let fx = fixture(
            "https://x.test",
            Some("s3cr3t"),
            vec![Step::Stall(Duration::from_secs(30))],
        );

        let response = fx.dispatcher.dispatch("GET", "/leads", None).await;

        assert_eq!(fx.transport.calls(), 1);
        assert_eq!(response.status, 0);
        assert_eq!(
            response.error.as_deref(),
            Some("Request timeout (20s exceeded)")
        );
        assert!(response.response_time_ms.unwrap_or_default() >= 20_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dns_failure_is_not_retried() {
        let fx = fixture(
            "https://x.test",
            Some("s3cr3t"),
            vec![Step::Fail(FailureKind::Dns, "dns error")],
        );

        let response = fx.dispatcher.dispatch("GET", "/leads", None).await;

        assert_eq!(fx.transport.calls(), 1);
        assert_eq!(
            response.error.as_deref(),
            Some("DNS lookup failed - check the URL")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_host_unreachable_is_not_retried() {
        let fx = fixture(
            "https://x.test",
            Some("s3cr3t"),
            vec![Step::Fail(FailureKind::HostUnreachable, "no route to host")],
        );

        fx.dispatcher.dispatch("GET", "/leads", None).await;
        assert_eq!(fx.transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_http_error_is_surfaced_without_retry() {
        let fx = fixture(
            "https://x.test",
            Some("s3cr3t"),
            vec![Step::Reply(500, "Internal Server Error")],
        );

        let response = fx.dispatcher.dispatch("POST", "/drafts", Some(json!({"n": 1}))).await;

        assert_eq!(fx.transport.calls(), 1);
        assert!(!response.ok);
        assert_eq!(response.status, 500);
        assert_eq!(response.body, Value::String("Internal Server Error".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_secret_is_redacted_from_response() {
        let fx = fixture(
            "https://x.test",
            Some("s3cr3t"),
            vec![Step::Reply(401, r#"{"error":"header value s3cr3t rejected"}"#)],
        );

        let response = fx.dispatcher.dispatch("GET", "/leads", None).await;

        assert!(!response.raw.contains("s3cr3t"));
        assert!(response.raw.contains("[SECRET]"));
        assert_eq!(response.body["error"], "header value [SECRET] rejected");
    }

    #[tokio::test(start_paused = true)]
    async fn test_secret_is_redacted_from_transport_error() {
        let fx = fixture(
            "https://x.test",
            Some("s3cr3t"),
            vec![
                Step::Fail(FailureKind::Other, "bad header s3cr3t"),
                Step::Fail(FailureKind::Other, "bad header s3cr3t"),
            ],
        );

        let response = fx.dispatcher.dispatch("GET", "/leads", None).await;

        let error = response.error.unwrap();
        assert!(!error.contains("s3cr3t"));
        assert!(error.contains("[SECRET]"));
        assert!(!response.raw.contains("s3cr3t"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_health_check_without_secret() {
        let fx = fixture("https://x.test", None, vec![]);

        let response = fx.dispatcher.dispatch("GET", "/healthz", None).await;

        assert!(response.ok);
        let requests = fx.transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://x.test/healthz");
        assert_eq!(requests[0].header("x-webhook-secret"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_health_check_never_carries_secret() {
        let fx = fixture("https://x.test", Some("s3cr3t"), vec![]);

        fx.dispatcher.dispatch("GET", "/healthz", None).await;

        assert_eq!(fx.transport.requests()[0].header("x-webhook-secret"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_secret_short_circuits() {
        let fx = fixture("https://x.test", None, vec![]);

        let response = fx.dispatcher.dispatch("GET", "/leads", None).await;

        assert_eq!(fx.transport.calls(), 0);
        assert_eq!(response.status, 0);
        assert!(response.raw.contains("not configured"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unconfigured_backend() {
        let fx = fixture("", Some("s3cr3t"), vec![]);

        let response = fx.dispatcher.dispatch("GET", "/leads", None).await;

        assert!(!response.ok);
        assert_eq!(response.status, 0);
        assert!(response.raw.contains("not configured"));
        assert_eq!(fx.transport.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_authenticated_relative_post() {
        let fx = fixture("https://x.test/", Some("s3cr3t"), vec![]);

        fx.dispatcher
            .dispatch("POST", "/webhook/foo", Some(json!({"a": 1})))
            .await;

        let requests = fx.transport.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, "POST");
        assert_eq!(request.url, "https://x.test/webhook/foo");
        assert_eq!(request.header("x-webhook-secret"), Some("s3cr3t"));
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.body.as_deref(), Some(r#"{"a":1}"#));
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_auth_header_name() {
        let fx = fixture("https://x.test", Some("s3cr3t"), vec![]);
        let mut settings = fx.settings.get().unwrap();
        settings.auth_header_name = "x-n8n-key".to_string();
        fx.settings.set(&settings).unwrap();

        fx.dispatcher.dispatch("GET", "/leads", None).await;

        let request = &fx.transport.requests()[0];
        assert_eq!(request.header("x-n8n-key"), Some("s3cr3t"));
        assert_eq!(request.header("x-webhook-secret"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_absolute_url_off_domain_has_no_auth() {
        let fx = fixture("https://x.test", Some("s3cr3t"), vec![]);

        fx.dispatcher
            .dispatch("GET", "https://other.test/thing", None)
            .await;

        let request = &fx.transport.requests()[0];
        assert_eq!(request.url, "https://other.test/thing");
        assert_eq!(request.header("x-webhook-secret"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_absolute_url_on_domain_is_authenticated() {
        let fx = fixture("https://x.test", Some("s3cr3t"), vec![]);

        fx.dispatcher
            .dispatch("GET", "https://x.test/webhook/status", None)
            .await;

        let request = &fx.transport.requests()[0];
        assert_eq!(request.header("x-webhook-secret"), Some("s3cr3t"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_absolute_url_without_secret_is_sent_unauthenticated() {
        let fx = fixture("https://x.test", None, vec![]);

        let response = fx
            .dispatcher
            .dispatch("GET", "https://x.test/webhook/status", None)
            .await;

        assert!(response.ok);
        assert_eq!(fx.transport.requests()[0].header("x-webhook-secret"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_never_sends_body() {
        let fx = fixture("https://x.test", Some("s3cr3t"), vec![]);

        fx.dispatcher
            .dispatch("GET", "/leads", Some(json!({"ignored": true})))
            .await;

        assert_eq!(fx.transport.requests()[0].body, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settings_change_applies_to_next_call() {
        let fx = fixture("https://x.test", Some("s3cr3t"), vec![]);

        fx.dispatcher.dispatch("GET", "/leads", None).await;

        let mut settings = fx.settings.get().unwrap();
        settings.base_url = "https://y.test".to_string();
        fx.settings.set(&settings).unwrap();

        fx.dispatcher.dispatch("GET", "/drafts", None).await;

        let requests = fx.transport.requests();
        assert_eq!(requests[0].url, "https://x.test/leads");
        assert_eq!(requests[1].url, "https://y.test/drafts");
    }
}
