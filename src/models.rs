use serde::Deserialize;

/// One record as served by the remote posts endpoint.
#[derive(Deserialize, Debug, Clone)]
pub struct RemotePost {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub title: String,
    pub subtitle: Option<String>,
    pub author: String,
    pub date: String,
    pub image: String,
    pub body: String,
}
