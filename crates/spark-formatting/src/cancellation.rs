use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// 协作式取消令牌，贯穿格式化读写与客户端请求的每个挂起点。
///
/// # 设计背景（Why）
/// - 读写请求体与发送请求都是可挂起的异步操作，调用方需要随时放弃，且放弃结果必须与
///   “成功/空值/畸形输入”区分；
/// - 仅靠轮询原子位会在挂起期间错过信号，因此额外携带 [`Notify`] 唤醒等待者。
///
/// # 逻辑解析（How）
/// - `flag` 记录是否已取消，`cancel` 通过 CAS 保证只有首次调用返回 `true`；
/// - 首次取消成功后调用 `notify_waiters` 唤醒所有正在 [`cancelled`](Self::cancelled) 上等待的任务；
/// - `cancelled` 先登记等待再检查标志位，避免“检查后、登记前”被取消而永久挂起。
///
/// # 契约说明（What）
/// - 克隆与 [`child`](Self::child) 共享同一状态，任一副本取消即全局可见；
/// - 令牌不会撤销，取消是单向的。
#[derive(Clone, Debug, Default)]
pub struct Cancellation {
    inner: Arc<CancellationState>,
}

#[derive(Debug, Default)]
struct CancellationState {
    flag: AtomicBool,
    notify: Notify,
}

impl Cancellation {
    /// 创建处于“未取消”状态的令牌。
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前是否已被取消。
    pub fn is_cancelled(&self) -> bool {
        self.inner.flag.load(Ordering::Acquire)
    }

    /// 标记取消；返回 `true` 表示本次调用首次触发取消。
    pub fn cancel(&self) -> bool {
        let first = self
            .inner
            .flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if first {
            self.inner.notify.notify_waiters();
        }
        first
    }

    /// 派生共享同一状态的子令牌。
    pub fn child(&self) -> Self {
        self.clone()
    }

    /// 等待直到令牌被取消；若已取消则立即返回。
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn cancel_reports_first_trigger_only() {
        let token = Cancellation::new();
        let child = token.child();
        assert!(!child.is_cancelled());
        assert!(child.cancel());
        assert!(!token.cancel());
        assert!(token.is_cancelled());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn waiters_wake_on_cancel() {
        let token = Cancellation::new();
        let waiter = {
            let token = token.child();
            tokio::spawn(async move { token.cancelled().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter must wake after cancel")
            .expect("waiter task must not panic");
    }

    #[tokio::test]
    async fn already_cancelled_returns_immediately() {
        let token = Cancellation::new();
        token.cancel();
        token.cancelled().await;
    }
}
