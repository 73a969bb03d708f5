//! Async HTTP client for the Fio API.

use core::time::Duration;

use chrono::NaiveDate;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret as _, SecretString};
use tokio::io::{AsyncWrite, AsyncWriteExt as _};
use url::Url;

use super::{
    BY_ID, DEFAULT_BASE_URL, LAST, PERIODS, SET_LAST_DATE, SET_LAST_ID, build_url, format_date,
    sanitize_url,
};
use crate::context::Context;
use crate::error::{ApiError, ApiErrorKind, FioError, Result};
use crate::models::{ExportFormat, Statement, TransactionId};
use crate::parser::{parse_error_envelope, parse_statement_bytes};

/// `User-Agent` sent with every request.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Builder for constructing a [`FioClient`].
#[derive(Debug)]
pub struct FioClientBuilder {
    /// API token embedded in request paths.
    token: Option<SecretString>,
    /// Base URL override (for testing).
    base_url: Option<String>,
    /// Whole-request timeout for the default transport.
    timeout: Option<Duration>,
    /// Preconfigured transport.
    http: Option<reqwest::Client>,
}

impl FioClientBuilder {
    /// Sets the API token.
    #[inline]
    #[must_use]
    pub fn token<T: Into<String>>(mut self, token: T) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Overrides the base URL (useful for testing with a mock server).
    #[inline]
    #[must_use]
    pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets a whole-request timeout on the default transport.
    ///
    /// Ignored when a transport is supplied with
    /// [`FioClientBuilder::http_client`]. A timeout surfaces as
    /// [`FioError::Transport`]; use a [`Context`] deadline to get
    /// [`FioError::Cancelled`] instead.
    #[inline]
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Uses a preconfigured `reqwest` client as transport.
    #[inline]
    #[must_use]
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`FioError::MissingToken`] if no token (or an empty one) was
    /// provided, [`FioError::InvalidBaseUrl`] if the base URL does not parse
    /// as an absolute URL, and [`FioError::Transport`] if the default HTTP
    /// client fails to build.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub fn build(self) -> Result<FioClient> {
        let token = self.token.ok_or(FioError::MissingToken)?;
        if token.expose_secret().is_empty() {
            return Err(FioError::MissingToken);
        }
        let base_url = self
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_owned();
        let parsed = Url::parse(&base_url)?;
        if parsed.cannot_be_a_base() {
            return Err(FioError::InvalidBaseUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        tracing::debug!(base_url = %base_url, "building client");

        let http = if let Some(http) = self.http {
            http
        } else {
            let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
            if let Some(timeout) = self.timeout {
                builder = builder.timeout(timeout);
            }
            builder.build().map_err(transport)?
        };

        Ok(FioClient {
            http,
            token,
            base_url,
        })
    }
}

/// Async client for the Fio API.
///
/// Use [`FioClient::builder()`] to construct an instance. The client holds
/// no mutable state and can be shared between tasks.
///
/// The server allows one call per token roughly every 30 seconds and
/// answers faster calls with 409; see [`FioError::is_retryable`].
#[derive(Debug)]
pub struct FioClient {
    /// Underlying HTTP client.
    http: reqwest::Client,
    /// API token, also part of every request path.
    token: SecretString,
    /// API base URL without a trailing slash.
    base_url: String,
}

impl FioClient {
    /// Creates a new builder for configuring the client.
    #[inline]
    #[must_use]
    pub const fn builder() -> FioClientBuilder {
        FioClientBuilder {
            token: None,
            base_url: None,
            timeout: None,
            http: None,
        }
    }

    /// Fetches and parses the movements between `from` and `to`, inclusive.
    ///
    /// # Errors
    ///
    /// Returns an error if the context fires, the request fails, the server
    /// returns a non-success status, or the statement cannot be parsed.
    #[inline]
    #[tracing::instrument(skip_all, fields(from = %from, to = %to))]
    pub async fn transactions_by_period(
        &self,
        ctx: &Context,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Statement> {
        let url = self.period_url(from, to, ExportFormat::Xml);
        ctx.run(self.fetch_statement(&url)).await?
    }

    /// Streams the movements between `from` and `to` into `sink` as `format`.
    ///
    /// Returns the number of bytes written. The bytes are copied unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the context fires, the request fails, the server
    /// returns a non-success status, or writing to `sink` fails.
    #[inline]
    #[tracing::instrument(skip_all, fields(from = %from, to = %to, format = %format))]
    pub async fn export_by_period<W>(
        &self,
        ctx: &Context,
        from: NaiveDate,
        to: NaiveDate,
        format: ExportFormat,
        sink: &mut W,
    ) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let url = self.period_url(from, to, format);
        ctx.run(self.stream_to(&url, sink)).await?
    }

    /// Fetches and parses official statement number `id` of `year`.
    ///
    /// # Errors
    ///
    /// Returns an error if the context fires, the request fails, the server
    /// returns a non-success status, or the statement cannot be parsed.
    #[inline]
    #[tracing::instrument(skip_all, fields(year = year, id = id))]
    pub async fn statement(&self, ctx: &Context, year: i32, id: u32) -> Result<Statement> {
        let url = self.statement_url(year, id, ExportFormat::Xml);
        ctx.run(self.fetch_statement(&url)).await?
    }

    /// Streams official statement number `id` of `year` into `sink`.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if the context fires, the request fails, the server
    /// returns a non-success status, or writing to `sink` fails.
    #[inline]
    #[tracing::instrument(skip_all, fields(year = year, id = id, format = %format))]
    pub async fn export_statement<W>(
        &self,
        ctx: &Context,
        year: i32,
        id: u32,
        format: ExportFormat,
        sink: &mut W,
    ) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let url = self.statement_url(year, id, format);
        ctx.run(self.stream_to(&url, sink)).await?
    }

    /// Fetches the movements recorded after the server-side cursor.
    ///
    /// The server advances the cursor past the returned movements.
    ///
    /// # Errors
    ///
    /// Returns an error if the context fires, the request fails, the server
    /// returns a non-success status, or the statement cannot be parsed.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub async fn transactions_since_last_download(&self, ctx: &Context) -> Result<Statement> {
        let url = self.url(LAST, &[ExportFormat::Xml.segment().as_str()]);
        ctx.run(self.fetch_statement(&url)).await?
    }

    /// Streams the movements after the server-side cursor into `sink`.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if the context fires, the request fails, the server
    /// returns a non-success status, or writing to `sink` fails.
    #[inline]
    #[tracing::instrument(skip_all, fields(format = %format))]
    pub async fn export_since_last_download<W>(
        &self,
        ctx: &Context,
        format: ExportFormat,
        sink: &mut W,
    ) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let url = self.url(LAST, &[format.segment().as_str()]);
        ctx.run(self.stream_to(&url, sink)).await?
    }

    /// Moves the server-side cursor to movement `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the context fires, the request fails, or the
    /// server returns a non-success status.
    #[inline]
    #[tracing::instrument(skip_all, fields(id = %id))]
    pub async fn set_last_download_id(&self, ctx: &Context, id: TransactionId) -> Result<()> {
        let url = self.url(SET_LAST_ID, &[id.to_string().as_str(), ""]);
        ctx.run(self.execute(&url)).await?
    }

    /// Moves the server-side cursor to the last movement before `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the context fires, the request fails, or the
    /// server returns a non-success status.
    #[inline]
    #[tracing::instrument(skip_all, fields(date = %date))]
    pub async fn set_last_download_date(&self, ctx: &Context, date: NaiveDate) -> Result<()> {
        let url = self.url(SET_LAST_DATE, &[format_date(date).as_str(), ""]);
        ctx.run(self.execute(&url)).await?
    }

    /// Builds a request URL for `operation`.
    fn url(&self, operation: &str, segments: &[&str]) -> String {
        build_url(
            &self.base_url,
            operation,
            self.token.expose_secret(),
            segments,
        )
    }

    /// URL of a date-range query.
    fn period_url(&self, from: NaiveDate, to: NaiveDate, format: ExportFormat) -> String {
        self.url(
            PERIODS,
            &[
                format_date(from).as_str(),
                format_date(to).as_str(),
                format.segment().as_str(),
            ],
        )
    }

    /// URL of an official statement.
    fn statement_url(&self, year: i32, id: u32, format: ExportFormat) -> String {
        self.url(
            BY_ID,
            &[
                year.to_string().as_str(),
                id.to_string().as_str(),
                format.segment().as_str(),
            ],
        )
    }

    /// Downloads and parses an XML statement.
    async fn fetch_statement(&self, url: &str) -> Result<Statement> {
        let response = self.send(url).await?;
        let body = response.bytes().await.map_err(transport)?;
        tracing::trace!(body_len = body.len(), "parsing statement");
        parse_statement_bytes(&body).map_err(FioError::from)
    }

    /// Copies a response body into `sink` chunk by chunk, then flushes.
    async fn stream_to<W>(&self, url: &str, sink: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let mut response = self.send(url).await?;
        let mut written = 0_u64;
        while let Some(chunk) = response.chunk().await.map_err(transport)? {
            sink.write_all(&chunk).await?;
            written = written.saturating_add(chunk.len() as u64);
        }
        sink.flush().await?;
        tracing::trace!(bytes = written, "export written");
        Ok(written)
    }

    /// Performs a call whose success body carries nothing of interest.
    async fn execute(&self, url: &str) -> Result<()> {
        self.send(url).await.map(drop)
    }

    /// Sends a GET request and turns non-success statuses into errors.
    async fn send(&self, url: &str) -> Result<reqwest::Response> {
        let safe_url = sanitize_url(self.token.expose_secret(), url);
        tracing::debug!(url = %safe_url, "sending GET request");
        let response = self.http.get(url).send().await.map_err(transport)?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");
        if status.is_success() {
            Ok(response)
        } else {
            Err(api_error(response, safe_url).await)
        }
    }
}

/// Wraps a transport failure, dropping the URL it carries.
fn transport(err: reqwest::Error) -> FioError {
    FioError::Transport(err.without_url())
}

/// Classifies a non-success response and releases its body.
async fn api_error(response: reqwest::Response, url: String) -> FioError {
    let status = response.status();
    let is_xml = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("text/xml"));
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR && is_xml {
        envelope_message(response).await
    } else {
        drop(response);
        None
    };
    tracing::debug!(status = status.as_u16(), url = %url, "API error");
    FioError::Api(ApiError {
        method: Method::GET.as_str().to_owned(),
        url,
        status: status.as_u16(),
        kind: ApiErrorKind::from_status(status.as_u16()),
        message,
    })
}

/// Reads the XML error envelope and returns its message, if any.
async fn envelope_message(response: reqwest::Response) -> Option<String> {
    let body = match response.bytes().await {
        Ok(body) => body,
        Err(err) => {
            tracing::debug!(error = %err.without_url(), "failed to read error body");
            return None;
        }
    };
    match parse_error_envelope(&*body) {
        Ok(envelope) => Some(envelope.message).filter(|message| !message.is_empty()),
        Err(err) => {
            tracing::debug!(error = %err, "undecodable error envelope");
            None
        }
    }
}
