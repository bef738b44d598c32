/**
 * JSON-lines IPC
 * 界面进程通过 stdin 逐行发送 {id, channel, payload}, 通过 stdout 接收 {id, ok, result | error}
 *
 * 每一行作为独立任务处理, 回复顺序不保证与请求顺序一致, 调用方按 id 对应
 */

use crate::app_state::AppState;
use crate::commands::{network, recent_runs, secrets, settings};
use crate::models::error::{AppError, AppResult, ErrorResponse};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

pub const SETTINGS_GET: &str = "settings.get";
pub const SETTINGS_SET: &str = "settings.set";
pub const SETTINGS_TEST_CONNECTION: &str = "settings.testConnection";
pub const SECRET_STORE: &str = "secret.store";
pub const SECRET_GET: &str = "secret.get";
pub const SECRET_CLEAR: &str = "secret.clear";
pub const NETWORK_REQUEST: &str = "network.request";
pub const RECENT_RUNS_LIST: &str = "recentRuns.list";
pub const RECENT_RUNS_ADD: &str = "recentRuns.add";
pub const RECENT_RUNS_DELETE: &str = "recentRuns.delete";
pub const RECENT_RUNS_CLEAR: &str = "recentRuns.clear";

#[derive(Debug, Deserialize)]
pub struct IpcRequest {
    #[serde(default)]
    pub id: Value,
    pub channel: String,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Serialize)]
pub struct IpcReply {
    pub id: Value,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

impl IpcReply {
    fn success(id: Value, result: Value) -> Self {
        Self {
            id,
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Value, error: AppError) -> Self {
        Self {
            id,
            ok: false,
            result: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Deserialize)]
struct SecretPayload {
    secret: String,
}

#[derive(Deserialize)]
struct IdPayload {
    id: String,
}

fn parse<T: DeserializeOwned>(payload: Value) -> AppResult<T> {
    serde_json::from_value(payload).map_err(|e| AppError::ValidationError {
        field: "payload".to_string(),
        message: e.to_string(),
    })
}

fn to_value<T: Serialize>(value: T) -> AppResult<Value> {
    Ok(serde_json::to_value(value)?)
}

/// 按通道分发到对应命令
pub async fn handle(state: &AppState, channel: &str, payload: Value) -> AppResult<Value> {
    match channel {
        SETTINGS_GET => to_value(settings::get_settings(state)?),
        SETTINGS_SET => to_value(settings::set_settings(state, parse(payload)?)?),
        SETTINGS_TEST_CONNECTION => to_value(settings::test_connection(state).await?),
        SECRET_STORE => {
            let SecretPayload { secret } = parse(payload)?;
            to_value(secrets::store_secret(state, secret)?)
        }
        SECRET_GET => to_value(secrets::get_secret(state)?),
        SECRET_CLEAR => to_value(secrets::clear_secret(state)?),
        NETWORK_REQUEST => to_value(network::network_request(state, parse(payload)?).await),
        RECENT_RUNS_LIST => to_value(recent_runs::list_recent_runs(state)?),
        RECENT_RUNS_ADD => to_value(recent_runs::add_recent_run(state, parse(payload)?)?),
        RECENT_RUNS_DELETE => {
            let IdPayload { id } = parse(payload)?;
            to_value(recent_runs::delete_recent_run(state, id)?)
        }
        RECENT_RUNS_CLEAR => to_value(recent_runs::clear_recent_runs(state)?),
        other => Err(AppError::ValidationError {
            field: "channel".to_string(),
            message: format!("未知的通道: {}", other),
        }),
    }
}

async fn process_line(state: &AppState, line: &str) -> IpcReply {
    let request: IpcRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            log::warn!("无法解析 IPC 请求: {}", e);
            return IpcReply::failure(Value::Null, e.into());
        }
    };

    match handle(state, &request.channel, request.payload).await {
        Ok(result) => IpcReply::success(request.id, result),
        Err(e) => {
            log::warn!("IPC 请求失败 [{}]: {}", request.channel, e);
            IpcReply::failure(request.id, e)
        }
    }
}

/// 处理请求流直到输入结束, 等待所有回复写出后返回
pub async fn serve<R, W>(state: Arc<AppState>, reader: R, mut writer: W) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let writer_task = tokio::spawn(async move {
        while let Some(mut line) = rx.recv().await {
            line.push('\n');
            if let Err(e) = writer.write_all(line.as_bytes()).await {
                log::error!("写入 IPC 回复失败: {}", e);
                break;
            }
            if let Err(e) = writer.flush().await {
                log::error!("写入 IPC 回复失败: {}", e);
                break;
            }
        }
    });

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await.map_err(|e| AppError::IoError {
        message: format!("读取 IPC 请求失败: {}", e),
    })? {
        if line.trim().is_empty() {
            continue;
        }

        let state = Arc::clone(&state);
        let tx = tx.clone();
        tokio::spawn(async move {
            let reply = process_line(&state, &line).await;
            match serde_json::to_string(&reply) {
                Ok(text) => {
                    let _ = tx.send(text);
                }
                Err(e) => log::error!("序列化 IPC 回复失败: {}", e),
            }
        });
    }

    log::info!("IPC 输入已关闭, 等待未完成的请求");
    drop(tx);
    writer_task.await.map_err(|e| AppError::SystemError {
        message: format!("IPC 写入任务异常退出: {}", e),
    })?;

    Ok(())
}

/// 在标准输入输出上提供 IPC
pub async fn serve_stdio(state: Arc<AppState>) -> AppResult<()> {
    log::info!("IPC 已就绪 (stdin/stdout)");
    serve(state, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}
