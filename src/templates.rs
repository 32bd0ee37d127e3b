use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use chrono::{Datelike, Local};
use htmlescape::encode_minimal;
use regex::{Captures, Regex};
use tokio::fs;
use tracing::{error, info};

use crate::markdown::render_markdown_to_html;
use crate::models::Post;
use crate::slug::slugify;
use crate::state::AppState;

const HOT_RELOAD_SCRIPT: &str = r#"
<script>
    const socket = new WebSocket("ws://" + window.location.host + "/ws");
    socket.onmessage = (event) => {
        if (event.data === "reload") {
            window.location.reload();
        }
    };
</script>
"#;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{ (\w+) \}\}").expect("valid placeholder pattern"));

/// Values every rendered page can reference.
#[derive(Debug, Clone)]
pub struct SiteContext {
    pub owner_name: String,
    pub current_year: i32,
}

impl SiteContext {
    pub fn now(owner_name: &str) -> Self {
        Self {
            owner_name: owner_name.to_string(),
            current_year: Local::now().year(),
        }
    }
}

/// Pages rendered from a template with no post data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticPage {
    About,
    Contact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Post,
    About,
    Contact,
}

#[derive(Debug, Clone)]
pub struct Templates {
    pub layout: String,
    pub index: String,
    pub post: String,
    pub about: String,
    pub contact: String,
}

impl Templates {
    pub async fn load(dir: &Path) -> Result<Self, std::io::Error> {
        Ok(Self {
            layout: read(dir, "layout.html").await?,
            index: read(dir, "index.html").await?,
            post: read(dir, "post.html").await?,
            about: read(dir, "about.html").await?,
            contact: read(dir, "contact.html").await?,
        })
    }
}

async fn read(dir: &Path, name: &str) -> Result<String, std::io::Error> {
    fs::read_to_string(dir.join(name)).await
}

pub async fn reload_templates(app_state: &AppState, dir: PathBuf) {
    info!("Reloading templates...");
    match Templates::load(&dir).await {
        Ok(templates) => {
            *app_state.templates.write().await = templates;
            info!("Templates successfully reloaded.");
        }
        Err(e) => {
            error!("Failed to reload templates from {}: {}", dir.display(), e);
        }
    }
}

/// Fills every `{{ name }}` in a single pass, so inserted values are never
/// scanned for placeholders themselves. Unknown names are left as written.
fn fill(template: &str, site: &SiteContext, values: &[(&str, &str)]) -> String {
    let owner_name = encode_minimal(&site.owner_name);
    let current_year = site.current_year.to_string();

    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let value = match &caps[1] {
                "owner_name" => Some(owner_name.as_str()),
                "current_year" => Some(current_year.as_str()),
                name => values.iter().find(|(key, _)| *key == name).map(|(_, v)| *v),
            };
            value.unwrap_or(&caps[0]).to_string()
        })
        .into_owned()
}

fn render_with_layout(
    layout: &str,
    title: &str,
    content: &str,
    page: Page,
    site: &SiteContext,
    is_development: bool,
) -> String {
    let active = |p: Page| if p == page { "active" } else { "" };
    let title = encode_minimal(title);

    let mut rendered = fill(
        layout,
        site,
        &[
            ("title", title.as_str()),
            ("home_active", active(Page::Home)),
            ("about_active", active(Page::About)),
            ("contact_active", active(Page::Contact)),
            ("content", content),
        ],
    );

    if is_development {
        if let Some(at) = rendered.rfind("</body>") {
            rendered.insert_str(at, HOT_RELOAD_SCRIPT);
        }
    }

    rendered
}

pub fn render_home(templates: &Templates, posts: &[Post], site: &SiteContext, is_development: bool) -> String {
    let mut list_items = String::new();
    for post in posts {
        let subtitle = post
            .subtitle
            .as_deref()
            .map(|s| format!("<h3 class=\"post-subtitle\">{}</h3>", encode_minimal(s)))
            .unwrap_or_default();
        list_items.push_str(&format!(
            "<div class=\"post-preview\"><a href=\"/post/{}\"><h2 class=\"post-title\">{}</h2>{}</a>\
             <p class=\"post-meta\">Posted by {} on {}</p></div>",
            encode_minimal(&slugify(&post.title)),
            encode_minimal(&post.title),
            subtitle,
            encode_minimal(&post.author),
            encode_minimal(&post.date),
        ));
    }

    let content = fill(&templates.index, site, &[("posts", list_items.as_str())]);
    render_with_layout(&templates.layout, "Home", &content, Page::Home, site, is_development)
}

pub fn render_post(templates: &Templates, post: &Post, site: &SiteContext, is_development: bool) -> String {
    let image = encode_minimal(&post.image);
    let subtitle = encode_minimal(post.subtitle.as_deref().unwrap_or(""));
    let author = encode_minimal(&post.author);
    let date = encode_minimal(&post.date);
    let title = encode_minimal(&post.title);
    let body = render_markdown_to_html(&post.body);

    let content = fill(
        &templates.post,
        site,
        &[
            ("image", image.as_str()),
            ("subtitle", subtitle.as_str()),
            ("author", author.as_str()),
            ("date", date.as_str()),
            ("post_title", title.as_str()),
            ("body", body.as_str()),
        ],
    );
    render_with_layout(&templates.layout, &post.title, &content, Page::Post, site, is_development)
}

pub fn render_static(templates: &Templates, page: StaticPage, site: &SiteContext, is_development: bool) -> String {
    let (title, body, nav) = match page {
        StaticPage::About => ("About", &templates.about, Page::About),
        StaticPage::Contact => ("Contact", &templates.contact, Page::Contact),
    };
    let content = fill(body, site, &[]);
    render_with_layout(&templates.layout, title, &content, nav, site, is_development)
}
