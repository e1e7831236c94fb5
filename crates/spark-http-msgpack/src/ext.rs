use std::future::IntoFuture;

use futures::future::BoxFuture;
use serde::Serialize;
use spark_codec_msgpack::SharedOptions;
use spark_formatting::{Cancellation, DescribeType};

use crate::{ClientError, HttpResponse, HttpTransport, MsgPackRequest, RequestUri};

/// 为所有传输提供 `post_as_msgpack`/`put_as_msgpack`。
pub trait MsgPackClientExt: HttpTransport {
    /// 以 MessagePack 编码 `value` 并 POST 到 `uri`。
    fn post_as_msgpack<T>(&self, uri: impl Into<RequestUri>, value: T) -> BoundRequest<'_, Self, T>
    where
        T: DescribeType + Serialize + Send + Sync,
    {
        BoundRequest {
            client: self,
            request: MsgPackRequest::post(uri, value),
        }
    }

    /// 以 MessagePack 编码 `value` 并 PUT 到 `uri`。
    fn put_as_msgpack<T>(&self, uri: impl Into<RequestUri>, value: T) -> BoundRequest<'_, Self, T>
    where
        T: DescribeType + Serialize + Send + Sync,
    {
        BoundRequest {
            client: self,
            request: MsgPackRequest::put(uri, value),
        }
    }
}

impl<C> MsgPackClientExt for C where C: HttpTransport + ?Sized {}

/// 已绑定客户端的请求，可继续配置后直接 `.await`。
#[must_use = "requests do nothing until awaited"]
pub struct BoundRequest<'a, C: ?Sized, T> {
    client: &'a C,
    request: MsgPackRequest<T>,
}

impl<'a, C, T> BoundRequest<'a, C, T>
where
    C: HttpTransport + ?Sized,
    T: DescribeType + Serialize + Send + Sync,
{
    /// 指定序列化选项。
    pub fn options(mut self, options: SharedOptions) -> Self {
        self.request = self.request.options(options);
        self
    }

    /// 指定取消令牌。
    pub fn cancellation(mut self, cancellation: Cancellation) -> Self {
        self.request = self.request.cancellation(cancellation);
        self
    }
}

impl<'a, C, T> IntoFuture for BoundRequest<'a, C, T>
where
    C: HttpTransport + ?Sized,
    T: DescribeType + Serialize + Send + Sync,
{
    type Output = Result<HttpResponse, ClientError>;
    type IntoFuture = BoxFuture<'a, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.request.send(Some(self.client)).await })
    }
}
