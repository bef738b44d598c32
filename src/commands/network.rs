use crate::app_state::AppState;
use crate::models::network::{NetworkRequestInput, NetworkResponse};

/// 向 webhook 后端发起请求
/// 所有失败都体现在返回的 NetworkResponse 中
pub async fn network_request(state: &AppState, input: NetworkRequestInput) -> NetworkResponse {
    state
        .dispatcher
        .dispatch(&input.method, &input.endpoint, input.body)
        .await
}
