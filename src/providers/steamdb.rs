use regex::Regex;

use crate::http::{try_download, HttpClient, HttpResponse};

const STEAMDB_URL: &str = "https://steamdb.info/app";

/// Get the game name from SteamDB as a last resort. Any failure just means no name.
pub async fn lookup_name<C: HttpClient>(client: &C, app_id: &str) -> Option<String> {
    let url = format!("{}/{}", STEAMDB_URL, app_id);
    let response = match try_download(client, &url).await {
        Ok(Some(response)) => response,
        Ok(None) => return None,
        Err(err) => {
            tracing::debug!(app_id, %err, "SteamDB lookup failed");
            return None;
        }
    };
    let page = response.bytes().await.ok()?;
    parse_name(&String::from_utf8_lossy(&page))
}

fn parse_name(page: &str) -> Option<String> {
    let pattern = Regex::new(r#"<tr>\n<td>Name</td>\s*<td itemprop="name">(.*?)</td>"#).ok()?;
    pattern
        .captures(page)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|name| !name.is_empty())
}
