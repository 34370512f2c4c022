//! hyper server loop.

use std::convert::Infallible;
use std::sync::Arc;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request as HyperRequest, Response as HyperResponse, StatusCode};
use hyper_util::rt::TokioIo;
use polycrud_exec::Pipeline;
use tokio::net::TcpListener;
use tracing::{debug, error, warn};

use super::{Method, Request, Response};
use crate::handler::handle;

/// Accepts connections forever, serving each on its own task.
///
/// Request bodies larger than `max_body_bytes` are answered with 413.
pub async fn serve(
    listener: TcpListener,
    pipeline: Arc<Pipeline>,
    max_body_bytes: usize,
) -> std::io::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        debug!(peer = %peer, "Accepted connection");
        let io = TokioIo::new(stream);
        let pipeline = Arc::clone(&pipeline);

        tokio::task::spawn(async move {
            let service = service_fn(move |req| {
                let pipeline = Arc::clone(&pipeline);
                async move { Ok::<_, Infallible>(dispatch(req, &pipeline, max_body_bytes).await) }
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                error!(peer = %peer, error = ?err, "Error serving connection");
            }
        });
    }
}

async fn dispatch(
    req: HyperRequest<Incoming>,
    pipeline: &Pipeline,
    max_body_bytes: usize,
) -> HyperResponse<Full<Bytes>> {
    let mut request = Request::new(Method::parse(req.method().as_str()), req.uri().path());
    for (key, value) in req.headers() {
        if let Ok(v) = value.to_str() {
            request.headers.insert(key.as_str().to_lowercase(), v.to_string());
        }
    }

    request.body = match read_body(req.into_body(), max_body_bytes).await {
        Ok(body) => body,
        Err(res) => return into_hyper(res.with_cors()),
    };

    into_hyper(handle(request, pipeline).await)
}

async fn read_body<B>(body: B, limit: usize) -> Result<Vec<u8>, Response>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes().to_vec()),
        Err(err) if err.is::<LengthLimitError>() => {
            warn!(limit, "Request body too large");
            Err(Response::payload_too_large())
        }
        Err(err) => {
            error!(error = %err, "Failed to read request body");
            Err(Response::internal_server_error())
        }
    }
}

fn into_hyper(res: Response) -> HyperResponse<Full<Bytes>> {
    let mut response = HyperResponse::new(Full::new(Bytes::from(res.body)));
    *response.status_mut() =
        StatusCode::from_u16(res.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    for (key, value) in res.headers {
        if let (Ok(name), Ok(value)) = (
            hyper::header::HeaderName::try_from(key),
            hyper::header::HeaderValue::try_from(value),
        ) {
            response.headers_mut().insert(name, value);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_body_within_limit() {
        let body = Full::new(Bytes::from_static(b"{\"table\": \"Test\"}"));
        let read = read_body(body, 64).await.unwrap();
        assert_eq!(read, b"{\"table\": \"Test\"}".to_vec());
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let body = Full::new(Bytes::from(vec![b'x'; 2048]));
        let res = read_body(body, 1024).await.unwrap_err();
        assert_eq!(res.status, 413);
    }
}
