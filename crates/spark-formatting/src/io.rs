//! 可取消的请求体读写辅助函数。
//!
//! 所有格式化器的流操作都经由本模块，使取消检查、错误码映射与读取预算只有一处实现。

use std::future::Future;
use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::Cancellation;
use crate::error::{FormatterError, OperationKind};

/// 在保留取消语义的前提下执行 I/O Future。
///
/// # 逻辑解析（How）
/// - 进入前先检查令牌，已取消则不触碰流；
/// - 之后以 `biased` 的 `select!` 优先观察取消，保证取消与完成同时就绪时返回 `Cancelled`；
/// - I/O 错误按 `kind` 映射为带稳定错误码的 [`FormatterError::Io`]。
pub async fn run_with_cancellation<F, T>(
    cancellation: &Cancellation,
    kind: OperationKind,
    future: F,
) -> Result<T, FormatterError>
where
    F: Future<Output = io::Result<T>>,
{
    if cancellation.is_cancelled() {
        return Err(FormatterError::cancelled(kind));
    }

    let cancel = cancellation.cancelled();
    tokio::pin!(cancel);
    tokio::pin!(future);

    tokio::select! {
        biased;
        _ = &mut cancel => {
            tracing::debug!(operation = kind.name, "stream operation cancelled");
            Err(FormatterError::cancelled(kind))
        }
        result = &mut future => result.map_err(|err| FormatterError::io(kind, err)),
    }
}

/// 将流读取到结束，返回读到的全部字节。
///
/// 空结果由调用方解释为“无值”。`limit` 为 `Some(n)` 时最多接受 `n` 字节，多读一个字节即判定超限。
pub async fn read_body<R>(
    stream: &mut R,
    cancellation: &Cancellation,
    limit: Option<usize>,
) -> Result<Vec<u8>, FormatterError>
where
    R: AsyncRead + Unpin + Send + ?Sized,
{
    let mut buffer = Vec::new();
    match limit {
        Some(limit) => {
            let probe = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
            let mut bounded = (&mut *stream).take(probe);
            run_with_cancellation(
                cancellation,
                OperationKind::READ_BODY,
                bounded.read_to_end(&mut buffer),
            )
            .await?;
            if buffer.len() > limit {
                return Err(FormatterError::BodyTooLarge { limit });
            }
        }
        None => {
            run_with_cancellation(
                cancellation,
                OperationKind::READ_BODY,
                stream.read_to_end(&mut buffer),
            )
            .await?;
        }
    }
    Ok(buffer)
}

/// 写入完整负载并刷新；空负载不触发任何写调用。
pub async fn write_body<W>(
    stream: &mut W,
    payload: &[u8],
    cancellation: &Cancellation,
) -> Result<(), FormatterError>
where
    W: AsyncWrite + Unpin + Send + ?Sized,
{
    if payload.is_empty() {
        return Ok(());
    }
    run_with_cancellation(
        cancellation,
        OperationKind::WRITE_BODY,
        stream.write_all(payload),
    )
    .await?;
    run_with_cancellation(cancellation, OperationKind::FLUSH_BODY, stream.flush()).await
}
