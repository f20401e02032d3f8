//! Paged feeds.
//!
//! A query whose results do not fit one response is read page by page through
//! a [`FeedCursor`]. [`drain_feed`] is the standard consumer: it reads every
//! page, sums the request charge, keeps the first page's diagnostics and stops
//! at the first page that did not succeed.
//!
//! ```ignore
//! let mut feed = container.query_items_stream(&query, options)?;
//! let summary = drain_feed(&mut feed, &cancel).await?;
//! println!("{} pages, {} RU", summary.pages, summary.total_charge);
//! ```

use http::StatusCode;

use crate::handler::BoxFuture;
use crate::pipeline::Pipeline;
use crate::{CancellationToken, ClientError, Diagnostics, RequestMessage, ResponseMessage};

/// A lazy, finite, non-restartable sequence of response pages.
pub trait FeedCursor: Send {
    /// Whether another page can be read.
    fn has_more_results(&self) -> bool;

    /// Read the next page.
    ///
    /// The caller owns the returned page and releases it by dropping it.
    fn read_next<'a>(
        &'a mut self,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<ResponseMessage, ClientError>>;
}

impl<C> FeedCursor for Box<C>
where
    C: FeedCursor + ?Sized,
{
    fn has_more_results(&self) -> bool {
        (**self).has_more_results()
    }

    fn read_next<'a>(
        &'a mut self,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<ResponseMessage, ClientError>> {
        (**self).read_next(cancel)
    }
}

/// Totals of a fully drained feed.
#[derive(Debug, Clone, Default)]
pub struct FeedSummary {
    /// Sum of every page's request charge.
    pub total_charge: f64,
    /// Number of pages read.
    pub pages: usize,
    /// Diagnostics of the first page. Later pages' diagnostics are not kept.
    pub first_diagnostics: Option<Diagnostics>,
}

/// Read every page of `cursor`.
///
/// Each page must come back `200 OK`. The first page that does not aborts the
/// drain with [`ClientError::Page`], whose `accumulated_charge` covers only
/// the pages before it. Every page is released before the next one is read,
/// and the failing page is released before the error is returned.
pub async fn drain_feed<C>(cursor: &mut C, cancel: &CancellationToken) -> Result<FeedSummary, ClientError>
where
    C: FeedCursor + ?Sized,
{
    let mut summary = FeedSummary::default();

    while cursor.has_more_results() {
        let page = cursor.read_next(cancel).await?;
        let page_number = summary.pages + 1;

        if page.status() != StatusCode::OK {
            tracing::debug!(
                page = page_number,
                status = page.status().as_u16(),
                "feed page failed"
            );
            return Err(ClientError::Page {
                status: page.status(),
                page: page_number,
                accumulated_charge: summary.total_charge,
            });
        }

        summary.total_charge += page.headers().request_charge();
        if page_number == 1 {
            summary.first_diagnostics = Some(page.diagnostics().clone());
        }
        summary.pages = page_number;
        tracing::trace!(
            page = page_number,
            total_charge = summary.total_charge,
            "feed page read"
        );
    }

    Ok(summary)
}

#[derive(Debug, Clone)]
enum FeedState {
    Started,
    Continuation(String),
    Done,
}

/// A feed that reads each page through a [`Pipeline`].
///
/// The first page is requested without a continuation; every later page uses
/// the `x-ms-continuation` token of the page before. The feed ends when a
/// page carries no token, does not succeed, or fails to arrive.
#[derive(Debug)]
pub struct PipelineFeed {
    pipeline: Pipeline,
    request: RequestMessage,
    state: FeedState,
}

impl PipelineFeed {
    /// Create a feed issuing `request` (and its continuations) through `pipeline`.
    pub fn new(pipeline: Pipeline, request: RequestMessage) -> Self {
        Self {
            pipeline,
            request,
            state: FeedState::Started,
        }
    }

    /// The continuation token the next page will be read with.
    pub fn continuation(&self) -> Option<&str> {
        match &self.state {
            FeedState::Continuation(token) => Some(token.as_str()),
            _ => None,
        }
    }

    async fn next_page(&mut self, cancel: &CancellationToken) -> Result<ResponseMessage, ClientError> {
        let request = match std::mem::replace(&mut self.state, FeedState::Done) {
            FeedState::Started => self.request.clone(),
            FeedState::Continuation(token) => self.request.renewed().with_continuation(token),
            FeedState::Done => {
                return Err(ClientError::Protocol("feed has no more results".into()));
            }
        };

        let response = self.pipeline.send(&request, cancel).await?;
        if response.is_success() {
            if let Some(token) = response.headers().continuation().filter(|t| !t.is_empty()) {
                self.state = FeedState::Continuation(token.to_owned());
            }
        }
        Ok(response)
    }
}

impl FeedCursor for PipelineFeed {
    fn has_more_results(&self) -> bool {
        !matches!(self.state, FeedState::Done)
    }

    fn read_next<'a>(
        &'a mut self,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<ResponseMessage, ClientError>> {
        Box::pin(self.next_page(cancel))
    }
}
