//! Typed requests against the REST backend.

use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::{Error, ResponseError};

pub mod announcement;
pub mod auth;
pub mod exam;

#[async_trait::async_trait]
pub trait Request: Send {
    type Output;

    const METHOD: reqwest::Method = reqwest::Method::POST;

    /// Path segments of the endpoint, relative to the API base url.
    /// Each segment is percent-encoded, so ids may contain any character.
    fn path(&self) -> Vec<&str>;

    fn make_req(&self, req: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, Error> {
        Ok(req)
    }

    async fn parse_res(&mut self, response: reqwest::Response) -> Result<Self::Output, Error>;
}

/// Calls a [`Request`] and return its output.
///
/// The persisted token is attached as a bearer credential when present.
/// A `401` response tears the session down before the error is returned.
pub async fn call<T: Request>(
    mut req: T,
    cx: &crate::Context,
) -> Result<<T as Request>::Output, Error> {
    let url = endpoint(&cx.base_url, &req.path())?;
    let mut builder = cx.req_client.request(T::METHOD, url.clone());

    if let Some(token) = cx.token() {
        builder = builder.bearer_auth(token);
    }

    debug!("{} {url}", T::METHOD);
    let response = req.make_req(builder)?.send().await.map_err(|err| {
        warn!("network error on {url}: {err}");
        Error::Transport(err)
    })?;
    let status = response.status();

    if !status.is_success() {
        #[derive(serde::Deserialize)]
        struct ThrownError {
            #[serde(alias = "error")]
            message: Option<String>,
        }

        let message = response
            .json::<ThrownError>()
            .await
            .ok()
            .and_then(|body| body.message);

        match status {
            StatusCode::UNAUTHORIZED => cx.expire_session(),
            _ => warn!(
                "{url} responded {status}: {}",
                message.as_deref().unwrap_or("unknown error")
            ),
        }

        return Err(ResponseError { status, message }.into());
    }

    req.parse_res(response).await
}

/// Appends path segments to the base url.
fn endpoint(base: &url::Url, path: &[&str]) -> Result<url::Url, Error> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(path);
    Ok(url)
}
