use regex::Regex;

use crate::{
    error::ResolveError,
    http::{HttpClient, HttpRequest, HttpResponse},
};

// When all else fails, Google it. Uses the regular web interface, the image
// search APIs either can't match an exact size or are capped at 100 searches a day.
const SEARCH_URL: &str = "https://www.google.com.br/search";

/// Only banners are searched for, so the size is the old banner size.
const BANNER_WIDTH: u32 = 460;
const BANNER_HEIGHT: u32 = 215;

// Without a browser user agent Google either blocks us or serves a simple
// page without direct image links.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.3; WOW64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/39.0.2171.71 Safari/537.36";

/// Known result markups, tried in order.
const RESULT_PATTERNS: [&str; 2] = [
    r"imgurl=(.+?\.(jpeg|jpg|png))&amp;imgrefurl=",
    r#""ou":"(.+?)",""#,
];

pub fn search_url(name: &str) -> String {
    let query: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
    format!(
        "{}?tbs=isz%3Aex%2Ciszw%3A{}%2Ciszh%3A{}&tbm=isch&num=5&q={}",
        SEARCH_URL, BANNER_WIDTH, BANNER_HEIGHT, query
    )
}

/// Best effort image search, results are low confidence.
#[derive(Debug, Clone)]
pub struct GoogleSearch {
    patterns: Vec<Regex>,
}

impl Default for GoogleSearch {
    fn default() -> Self {
        GoogleSearch {
            patterns: RESULT_PATTERNS
                .iter()
                .filter_map(|pattern| Regex::new(pattern).ok())
                .collect(),
        }
    }
}

impl GoogleSearch {
    pub async fn candidate<C: HttpClient>(
        &self,
        client: &C,
        name: &str,
    ) -> Result<Option<String>, ResolveError> {
        if name.is_empty() {
            return Ok(None);
        }
        let url = search_url(name);
        let request = HttpRequest::get(&url).header("User-Agent", USER_AGENT);
        let response = client.send(request).await?;
        match response.status() {
            404 => return Ok(None),
            status if status >= 400 => return Err(ResolveError::Status { url, status }),
            _ => {}
        }
        let page = response.bytes().await?;
        Ok(self.first_image(&String::from_utf8_lossy(&page)))
    }

    pub fn first_image(&self, page: &str) -> Option<String> {
        self.patterns.iter().find_map(|pattern| {
            pattern
                .captures(page)
                .and_then(|captures| captures.get(1))
                .map(|m| m.as_str().to_string())
        })
    }
}
