//! Display metadata for an article page.
//!
//! The metadata fetch doubles as verification: a candidate whose page does
//! not answer with a non-empty 200 is dropped before it reaches the
//! notification or the seen-set. A page that loads but has no usable tags
//! is still announced, with a generated title.

use crate::fetcher::{Fetch, fetch_ok};
use crate::models::{ArticleMeta, ArticleReference, NotificationItem};
use crate::utils::{collapse_whitespace, truncate_chars};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{info, instrument};

const MAX_DESCRIPTION_CHARS: usize = 280;

static OG_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:title"]"#).unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static OG_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:description"]"#).unwrap());
static META_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="description"]"#).unwrap());

/// Fetch an article page and read its metadata.
///
/// # Arguments
///
/// * `fetcher` - Transport used for the single GET
/// * `url` - Absolute article URL
///
/// # Returns
///
/// `Some` with whatever title and description the page carries, or `None`
/// when the page could not be fetched, did not answer 200, or came back
/// empty. `None` means the candidate is not a real article.
#[instrument(level = "info", skip_all, fields(url = %url))]
pub async fn fetch_meta(fetcher: &dyn Fetch, url: &str) -> Option<ArticleMeta> {
    match fetch_ok(fetcher, url).await {
        Ok(body) => Some(parse_meta(&body)),
        Err(e) => {
            info!(error = %e, "Article page unavailable; dropping candidate");
            None
        }
    }
}

/// Read `og:title` (else `<title>`) and `og:description` (else
/// `meta[name=description]`) from an HTML document.
///
/// Descriptions have their whitespace collapsed and are cut to 280
/// characters. Blank values count as absent.
pub fn parse_meta(html: &str) -> ArticleMeta {
    let document = Html::parse_document(html);

    let content = |selector: &Selector| {
        document
            .select(selector)
            .filter_map(|el| el.value().attr("content"))
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
    };

    let title = content(&*OG_TITLE).or_else(|| {
        document
            .select(&TITLE)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
    });

    let description = content(&*OG_DESCRIPTION)
        .or_else(|| content(&*META_DESCRIPTION))
        .map(|d| truncate_chars(&collapse_whitespace(&d), MAX_DESCRIPTION_CHARS))
        .filter(|d| !d.is_empty());

    ArticleMeta { title, description }
}

/// Turn a reference plus its metadata into a notification entry.
pub fn to_item(reference: &ArticleReference, meta: ArticleMeta) -> NotificationItem {
    NotificationItem {
        title: meta
            .title
            .unwrap_or_else(|| format!("Surfit Article {}", reference.identifier)),
        url: reference.url.clone(),
        description: meta.description,
    }
}
