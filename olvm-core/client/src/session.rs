//! 令牌会话
//!
//! 缓存访问令牌，并把并发的令牌请求合并为一次进行中的交换。
//! 会话由客户端持有，只通过 [`TokenSession::ensure_token`] 对外提供令牌。

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, info, warn};

use crate::error::Result;

/// 令牌来源
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// 执行一次令牌交换
    async fn fetch_token(&self) -> Result<String>;
}

type PendingToken = Shared<BoxFuture<'static, Result<String>>>;

#[derive(Default)]
struct SessionState {
    /// 已缓存的令牌
    token: Option<String>,
    /// 进行中的令牌交换
    pending: Option<PendingToken>,
}

/// 令牌会话
///
/// - 已缓存令牌时直接返回，不发起网络请求
/// - 无缓存且无进行中的交换时发起一次交换
/// - 已有进行中的交换时，所有调用者共享同一个结果
///
/// 交换失败会同时清空缓存和进行中标记，下一次调用重新交换。
#[derive(Clone)]
pub struct TokenSession {
    source: Arc<dyn TokenSource>,
    state: Arc<Mutex<SessionState>>,
}

impl TokenSession {
    /// 创建新的令牌会话
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self {
            source,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    /// 获取令牌，必要时发起 (或加入) 令牌交换
    pub async fn ensure_token(&self) -> Result<String> {
        let pending = {
            let mut state = lock(&self.state);

            if let Some(token) = &state.token {
                return Ok(token.clone());
            }

            match &state.pending {
                Some(pending) => {
                    debug!("加入进行中的令牌交换");
                    pending.clone()
                }
                None => {
                    let pending = self.start_exchange();
                    state.pending = Some(pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    /// 当前缓存的令牌
    pub fn cached_token(&self) -> Option<String> {
        lock(&self.state).token.clone()
    }

    /// 清除缓存的令牌，进行中的交换不受影响
    pub fn invalidate(&self) {
        info!("清除缓存的访问令牌");
        lock(&self.state).token = None;
    }

    /// 仅当缓存的仍是 `stale` 时才清除
    ///
    /// 多个请求同时收到 401 时，避免后到者把刚换到的新令牌也清掉。
    pub fn invalidate_if(&self, stale: &str) -> bool {
        let mut state = lock(&self.state);
        if state.token.as_deref() == Some(stale) {
            warn!("访问令牌已失效，清除缓存");
            state.token = None;
            true
        } else {
            false
        }
    }

    fn start_exchange(&self) -> PendingToken {
        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);

        async move {
            info!("发起令牌交换");
            let result = source.fetch_token().await;

            let mut state = lock(&state);
            state.pending = None;
            match &result {
                Ok(token) => {
                    info!("令牌交换成功");
                    state.token = Some(token.clone());
                }
                Err(e) => {
                    warn!("令牌交换失败: {}", e);
                    state.token = None;
                }
            }
            result
        }
        .boxed()
        .shared()
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
