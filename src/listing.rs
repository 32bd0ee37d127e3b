use std::cmp::Reverse;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::config::DateOrder;
use crate::content_loader::REMOTE_DATE_FORMAT;
use crate::models::Post;
use crate::slug::slugify;

const STATIC_DATE_FORMAT: &str = "%Y-%m-%d";

/// Orders posts newest first for the home page.
///
/// `Lexical` compares the `date` strings as-is, so the static `YYYY-MM-DD`
/// dates and the remote `Mon DD, YYYY hh:mmAM` dates interleave by their
/// first characters rather than by time.
pub fn sort_for_home(posts: &mut [Post], order: DateOrder) {
    match order {
        DateOrder::Lexical => posts.sort_by(|a, b| b.date.cmp(&a.date)),
        DateOrder::Chronological => posts.sort_by_key(|post| Reverse(parse_date(&post.date))),
    }
}

fn parse_date(date: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(date, REMOTE_DATE_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(date, STATIC_DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// First post whose title slugifies to `slug`.
pub fn find_by_slug<'a>(posts: &'a [Post], slug: &str) -> Option<&'a Post> {
    let mut matches = posts.iter().filter(|post| slugify(&post.title) == slug);
    let found = matches.next()?;
    for shadowed in matches {
        warn!(
            slug,
            served = %found.title,
            shadowed = %shadowed.title,
            "Slug collision, later post is unreachable"
        );
    }
    Some(found)
}
