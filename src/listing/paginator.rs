//! Pagination
//!
//! Turns a listing endpoint into a lazy, budgeted stream of pages.

use crate::api::{Page, Query};
use crate::client::http::{ApiRequest, HttpClient};
use crate::error::Result;
use async_stream::try_stream;
use futures::{pin_mut, Stream, StreamExt};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Most items the API returns for one request
pub const SERVER_PAGE_CAP: usize = 200;

/// Drives listing endpoints that follow a server-issued `next` URL
#[derive(Clone, Copy)]
pub struct Paginator<'a> {
    http: &'a HttpClient,
}

impl<'a> Paginator<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    /// Fetch a single page of at most `count` (capped at 200) items
    pub async fn first_page<T: DeserializeOwned>(
        &self,
        target: &str,
        query: Query,
        count: usize,
    ) -> Result<Page<T>> {
        let request = ApiRequest::get(target)
            .with_query(query)
            .with_param("count", count.min(SERVER_PAGE_CAP));
        self.http.execute_json(&request).await
    }

    /// Stream pages until `budget` items were produced or the server has no next page.
    ///
    /// The first request asks for `min(budget, 200)` items. Later pages are
    /// requested from the server's `next` URL exactly as given, with no
    /// further parameters. Pages are truncated so the total never exceeds
    /// `budget`, and an empty page ends the stream. A zero budget issues no
    /// request.
    pub fn pages<T>(
        &self,
        target: &str,
        query: Query,
        budget: usize,
    ) -> impl Stream<Item = Result<Vec<T>>> + 'a
    where
        T: DeserializeOwned + 'a,
    {
        let http = self.http;
        let target = target.to_string();

        try_stream! {
            let mut remaining = budget;
            let mut request = ApiRequest::get(target.as_str())
                .with_query(query)
                .with_param("count", remaining.min(SERVER_PAGE_CAP));

            while remaining > 0 {
                let page: Page<T> = http.execute_json(&request).await?;

                let mut list = page.list;
                list.truncate(remaining);
                remaining -= list.len();

                debug!(
                    target = %target,
                    received = list.len(),
                    remaining,
                    has_next = page.next.is_some(),
                    "Fetched page"
                );

                if list.is_empty() {
                    break;
                }
                yield list;

                match page.next {
                    Some(next) if remaining > 0 => request = ApiRequest::get(next),
                    _ => break,
                }
            }
        }
    }

    /// Stream individual items, see [`Paginator::pages`]
    pub fn items<T>(
        &self,
        target: &str,
        query: Query,
        budget: usize,
    ) -> impl Stream<Item = Result<T>> + 'a
    where
        T: DeserializeOwned + 'a,
    {
        let pages = self.pages::<T>(target, query, budget);

        try_stream! {
            pin_mut!(pages);
            while let Some(page) = pages.next().await {
                for item in page? {
                    yield item;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Replay;
    use crate::config::ClientConfig;
    use crate::error::BallchasingError;
    use futures::TryStreamExt;
    use mockito::Matcher;
    use std::time::Duration;

    fn replays_json(prefix: &str, n: usize, next: Option<String>) -> String {
        let list: Vec<serde_json::Value> = (0..n)
            .map(|i| serde_json::json!({"id": format!("{}-{}", prefix, i)}))
            .collect();
        serde_json::json!({"count": 10_000, "list": list, "next": next}).to_string()
    }

    fn client(url: &str) -> HttpClient {
        HttpClient::new(
            &ClientConfig::new("test-key")
                .with_base_url(url)
                .with_sleep_on_rate_limit(Duration::ZERO),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_small_budget_single_request() {
        let mut server = mockito::Server::new_async().await;
        let next = format!("{}/replays?after=p2&count=200", server.url());
        let mock = server
            .mock("GET", "/replays")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("uploader".into(), "76561197960409023".into()),
                Matcher::UrlEncoded("count".into(), "3".into()),
            ]))
            .with_status(200)
            .with_body(replays_json("r", 200, Some(next)))
            .expect(1)
            .create_async()
            .await;

        let http = client(&server.url());
        let query = vec![("uploader".to_string(), "76561197960409023".to_string())];
        let replays: Vec<Replay> = Paginator::new(&http)
            .items("/replays", query, 3)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(replays.len(), 3);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_follows_next_url_verbatim() {
        let mut server = mockito::Server::new_async().await;
        let next = format!("{}/replays?after=p2&player-id=steam:1&count=200", server.url());
        let first = server
            .mock("GET", "/replays")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("uploader".into(), "me".into()),
                Matcher::UrlEncoded("count".into(), "5".into()),
            ]))
            .with_status(200)
            .with_body(replays_json("a", 2, Some(next)))
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/replays")
            .match_query(Matcher::Regex("^after=p2&player-id=steam:1&count=200$".into()))
            .with_status(200)
            .with_body(replays_json("b", 200, None))
            .expect(1)
            .create_async()
            .await;

        let http = client(&server.url());
        let query = vec![("uploader".to_string(), "me".to_string())];
        let ids: Vec<String> = Paginator::new(&http)
            .items::<Replay>("/replays", query, 5)
            .map_ok(|r| r.id)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(ids, vec!["a-0", "a-1", "b-0", "b-1", "b-2"]);
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_zero_budget_issues_no_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/replays")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let http = client(&server.url());
        let replays: Vec<Replay> = Paginator::new(&http)
            .items("/replays", Query::new(), 0)
            .try_collect()
            .await
            .unwrap();

        assert!(replays.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_stops_without_next() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/groups/")
            .match_query(Matcher::UrlEncoded("count".into(), "200".into()))
            .with_status(200)
            .with_body(r#"{"list": [{"id": "g1"}, {"id": "g2"}], "next": null}"#)
            .expect(1)
            .create_async()
            .await;

        let http = client(&server.url());
        let groups: Vec<crate::api::Group> = Paginator::new(&http)
            .items("/groups/", Query::new(), usize::MAX)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(groups.len(), 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_page_error_ends_stream() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/replays")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let http = client(&server.url());
        let result: Result<Vec<Replay>> = Paginator::new(&http)
            .items("/replays", Query::new(), 10)
            .try_collect()
            .await;

        assert!(matches!(result, Err(BallchasingError::Remote { .. })));
    }

    #[tokio::test]
    async fn test_page_without_list_is_validation_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/replays")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"detail": "maintenance"}"#)
            .create_async()
            .await;

        let http = client(&server.url());
        let result: Result<Vec<Replay>> = Paginator::new(&http)
            .items("/replays", Query::new(), 10)
            .try_collect()
            .await;

        assert!(matches!(result, Err(BallchasingError::Validation { .. })));
    }
}
