use std::time::Duration;

use chrono::Local;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::models::{Post, RemotePost};

pub const DEFAULT_AUTHOR: &str = "Dr. Angela Yu";
pub const DEFAULT_IMAGE: &str = "default.jpg";
pub const REMOTE_DATE_FORMAT: &str = "%b %d, %Y %I:%M%p";

/// Checked in order; the first keyword found in the lowercased title wins.
const IMAGE_RULES: &[(&str, &str)] = &[
    ("explore", "explore.jpg"),
    ("heart", "heart2.jpg"),
    ("science", "science.jpg"),
    ("failure", "failure.jpg"),
];

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("endpoint answered with status {0}")]
    Status(StatusCode),
    #[error("payload is not a JSON array of posts: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Where remote posts come from.
#[derive(Debug, Clone)]
pub struct PostSource {
    pub endpoint: String,
    pub timeout: Option<Duration>,
}

pub fn static_posts() -> Vec<Post> {
    vec![Post {
        title: "All About Llamas".to_string(),
        subtitle: Some("One of the South American members of Camelidae".to_string()),
        author: "Mojo Jojo".to_string(),
        date: "2023-09-24".to_string(),
        image: "llama.jpg".to_string(),
        body: "your body goes here... no, not THAT body.".to_string(),
    }]
}

pub fn image_for_title(title: &str) -> &'static str {
    let title = title.to_lowercase();
    IMAGE_RULES
        .iter()
        .find(|(keyword, _)| title.contains(*keyword))
        .map_or(DEFAULT_IMAGE, |&(_, image)| image)
}

/// Static posts followed by whatever the remote endpoint yields.
///
/// Never fails: a remote problem is logged and the static posts are returned
/// on their own.
pub async fn fetch_posts(client: &Client, source: &PostSource) -> Vec<Post> {
    let mut posts = static_posts();
    match fetch_remote_posts(client, source).await {
        Ok(remote) => posts.extend(remote),
        Err(e) => error!("Failed to retrieve blog data from {}: {}", source.endpoint, e),
    }
    posts
}

pub async fn fetch_remote_posts(client: &Client, source: &PostSource) -> Result<Vec<Post>, FetchError> {
    let mut request = client.get(&source.endpoint);
    if let Some(timeout) = source.timeout {
        request = request.timeout(timeout);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let bytes = response.bytes().await?;
    let records: Vec<Value> = serde_json::from_slice(&bytes)?;
    debug!(count = records.len(), "Fetched remote post records");

    let date = Local::now().format(REMOTE_DATE_FORMAT).to_string();
    Ok(records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| decode_record(index, record))
        .map(|record| enrich(record, &date))
        .collect())
}

fn decode_record(index: usize, record: Value) -> Option<RemotePost> {
    match serde_json::from_value::<RemotePost>(record) {
        Ok(post) if post.title.trim().is_empty() => {
            warn!(index, "Skipping remote post with a blank title");
            None
        }
        Ok(post) => Some(post),
        Err(e) => {
            warn!(index, "Skipping malformed remote post: {}", e);
            None
        }
    }
}

fn enrich(record: RemotePost, date: &str) -> Post {
    let image = image_for_title(&record.title).to_string();
    Post {
        author: record.author.unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        date: date.to_string(),
        image,
        title: record.title,
        subtitle: record.subtitle,
        body: record.body.unwrap_or_default(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::{http::StatusCode as AxumStatus, routing::get, Router};
    use chrono::NaiveDateTime;
    use tokio::net::TcpListener;

    /// Serves `router` on an ephemeral local port and returns its base URL.
    pub(crate) async fn spawn_endpoint(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// A URL on a local port that nothing listens on.
    pub(crate) async fn closed_endpoint() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}/posts")
    }

    fn source(endpoint: String) -> PostSource {
        PostSource {
            endpoint,
            timeout: Some(Duration::from_secs(5)),
        }
    }

    async fn json_endpoint(payload: &'static str) -> String {
        let router = Router::new().route(
            "/posts",
            get(move || async move { ([("content-type", "application/json")], payload) }),
        );
        format!("{}/posts", spawn_endpoint(router).await)
    }

    #[test]
    fn images_follow_keyword_order() {
        assert_eq!(image_for_title("Explore the World"), "explore.jpg");
        assert_eq!(image_for_title("The Heart of SCIENCE"), "heart2.jpg");
        assert_eq!(image_for_title("Learning from Failure"), "failure.jpg");
        assert_eq!(image_for_title("The Life of Cactus"), DEFAULT_IMAGE);
    }

    #[tokio::test]
    async fn unreachable_endpoint_keeps_static_post() {
        let posts = fetch_posts(&Client::new(), &source(closed_endpoint().await)).await;
        assert_eq!(posts, static_posts());
    }

    #[tokio::test]
    async fn error_status_keeps_static_post() {
        let router = Router::new().route("/posts", get(|| async { AxumStatus::INTERNAL_SERVER_ERROR }));
        let endpoint = format!("{}/posts", spawn_endpoint(router).await);

        let err = fetch_remote_posts(&Client::new(), &source(endpoint.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status(s) if s.as_u16() == 500));

        let posts = fetch_posts(&Client::new(), &source(endpoint)).await;
        assert_eq!(posts.len(), 1);
    }

    #[tokio::test]
    async fn non_array_payload_is_a_decode_error() {
        let endpoint = json_endpoint(r#"{"title": "not a list"}"#).await;
        let err = fetch_remote_posts(&Client::new(), &source(endpoint))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn remote_posts_are_enriched_and_appended() {
        let endpoint = json_endpoint(
            r#"[
                {"id": 1, "title": "Explore the World", "subtitle": "Go outside", "body": "Walk."},
                {"id": 2, "title": "The Life of Cactus", "author": "Prickly Pete", "body": "Spines."}
            ]"#,
        )
        .await;

        let posts = fetch_posts(&Client::new(), &source(endpoint)).await;
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].title, "All About Llamas");

        let explore = &posts[1];
        assert_eq!(explore.image, "explore.jpg");
        assert_eq!(explore.author, DEFAULT_AUTHOR);
        assert_eq!(explore.subtitle.as_deref(), Some("Go outside"));
        assert!(NaiveDateTime::parse_from_str(&explore.date, REMOTE_DATE_FORMAT).is_ok());

        let cactus = &posts[2];
        assert_eq!(cactus.image, DEFAULT_IMAGE);
        assert_eq!(cactus.author, "Prickly Pete");
        assert_eq!(cactus.date, explore.date);
    }

    #[tokio::test]
    async fn malformed_records_are_skipped() {
        let endpoint = json_endpoint(
            r#"[
                {"body": "no title here"},
                {"title": "   "},
                {"title": 42},
                {"title": "Heartfelt"}
            ]"#,
        )
        .await;

        let remote = fetch_remote_posts(&Client::new(), &source(endpoint)).await.unwrap();
        assert_eq!(remote.len(), 1);
        assert_eq!(remote[0].title, "Heartfelt");
        assert_eq!(remote[0].image, "heart2.jpg");
        assert_eq!(remote[0].body, "");
    }

    #[tokio::test]
    async fn null_optional_fields_are_tolerated() {
        let endpoint = json_endpoint(
            r#"[{"title": "Explore", "subtitle": null, "author": null, "body": null}]"#,
        )
        .await;

        let remote = fetch_remote_posts(&Client::new(), &source(endpoint)).await.unwrap();
        assert_eq!(remote.len(), 1);
        assert_eq!(remote[0].title, "Explore");
        assert_eq!(remote[0].subtitle, None);
        assert_eq!(remote[0].author, DEFAULT_AUTHOR);
        assert_eq!(remote[0].body, "");
    }

    #[tokio::test]
    async fn slow_endpoint_times_out_to_static_posts() {
        let router = Router::new().route(
            "/posts",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "[]"
            }),
        );
        let source = PostSource {
            endpoint: format!("{}/posts", spawn_endpoint(router).await),
            timeout: Some(Duration::from_millis(100)),
        };

        let err = fetch_remote_posts(&Client::new(), &source).await.unwrap_err();
        assert!(matches!(err, FetchError::Request(ref e) if e.is_timeout()), "{err}");

        let posts = fetch_posts(&Client::new(), &source).await;
        assert_eq!(posts, static_posts());
    }
}
