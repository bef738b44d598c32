//! 测试用的脚本化传输层

use crate::app_state::AppState;
use crate::db::{initialize_in_memory, DbPool};
use crate::models::failure_kind::{FailureKind, TransportFailure};
use crate::models::retry_strategy::RetryStrategy;
use crate::services::secrets::CredentialStore;
use crate::services::transport::{HttpTransport, OutboundRequest, TransportResponse};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const DEFAULT_BODY: &str = r#"{"ok":true}"#;

/// 每次调用依次消耗一个步骤; 脚本用完后返回 200
pub enum Step {
    Reply(u16, &'static str),
    Fail(FailureKind, &'static str),
    /// 等待指定时长后返回 200
    Stall(Duration),
}

#[derive(Default)]
pub struct MockTransport {
    steps: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl MockTransport {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportFailure> {
        self.requests.lock().unwrap().push(request);
        let step = self.steps.lock().unwrap().pop_front();

        match step.unwrap_or(Step::Reply(200, DEFAULT_BODY)) {
            Step::Reply(status, body) => Ok(TransportResponse {
                status,
                body: body.to_string(),
            }),
            Step::Fail(kind, detail) => Err(TransportFailure::new(kind, detail)),
            Step::Stall(duration) => {
                tokio::time::sleep(duration).await;
                Ok(TransportResponse {
                    status: 200,
                    body: DEFAULT_BODY.to_string(),
                })
            }
        }
    }
}

/// 内存数据库 + 内存密钥 + 脚本化传输层
pub fn app_state(steps: Vec<Step>) -> (AppState, Arc<MockTransport>) {
    let pool = Arc::new(DbPool::new(initialize_in_memory().unwrap()));
    let transport = MockTransport::new(steps);
    let state = AppState::new(
        pool,
        Arc::new(CredentialStore::volatile()),
        transport.clone(),
        RetryStrategy::default(),
    );
    (state, transport)
}
