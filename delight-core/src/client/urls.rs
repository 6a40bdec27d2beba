use reqwest::Url;

use crate::error::{DelightError, DelightResult};

const WEBHOOK_PATH: &str = "/webhook/webwidget";

/// `{base_url}/webhook/webwidget/{webhook_id}/`
pub fn webhook_url(base_url: &str, webhook_id: &str) -> DelightResult<Url> {
    validate_webhook_id(webhook_id)?;
    let raw = format!(
        "{}{}/{}/",
        base_url.trim_end_matches('/'),
        WEBHOOK_PATH,
        webhook_id
    );
    parse_http_url(&raw)
}

/// Resolve a server-supplied poll path against the base URL.
pub fn poll_url(base_url: &str, poll_path: &str) -> DelightResult<Url> {
    let poll_path = poll_path.trim();
    if poll_path.is_empty() {
        return Err(DelightError::InvalidUrl("poll path is empty".to_string()));
    }

    let base = base_url.trim_end_matches('/');
    let raw = if poll_path.starts_with('/') {
        format!("{}{}", base, poll_path)
    } else {
        format!("{}/{}", base, poll_path)
    };
    parse_http_url(&raw)
}

fn validate_webhook_id(webhook_id: &str) -> DelightResult<()> {
    if webhook_id.is_empty() {
        return Err(DelightError::InvalidUrl("webhook id is empty".to_string()));
    }

    if let Some(c) = webhook_id
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | '?' | '#' | '%' | '\\'))
    {
        return Err(DelightError::InvalidUrl(format!(
            "webhook id '{}' contains reserved character {:?}",
            webhook_id.escape_debug(),
            c
        )));
    }

    if webhook_id.chars().all(|c| c == '.') {
        return Err(DelightError::InvalidUrl(format!(
            "webhook id '{}' is a dot segment",
            webhook_id
        )));
    }

    Ok(())
}

fn parse_http_url(raw: &str) -> DelightResult<Url> {
    let url = Url::parse(raw).map_err(|e| DelightError::InvalidUrl(format!("{}: {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(DelightError::InvalidUrl(format!(
            "{}: expected an http(s) URL with a host",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_url() {
        let url = webhook_url("https://qa.delight.global", "agent-42").unwrap();
        assert_eq!(
            url.as_str(),
            "https://qa.delight.global/webhook/webwidget/agent-42/"
        );
    }

    #[test]
    fn test_webhook_url_trailing_slash_base() {
        let url = webhook_url("http://localhost:8080/", "abc").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/webhook/webwidget/abc/");
    }

    #[test]
    fn test_webhook_url_rejects_malformed_ids() {
        for id in ["", "a b", "a/b", "a?b", "a#b", "100%", "tab\tid", "line\nid", ".", ".."] {
            let err = webhook_url("https://qa.delight.global", id).unwrap_err();
            assert!(matches!(err, DelightError::InvalidUrl(_)), "id {:?}", id);
        }
    }

    #[test]
    fn test_webhook_url_keeps_dotted_ids() {
        let url = webhook_url("https://qa.delight.global", "v1.agent").unwrap();
        assert_eq!(
            url.as_str(),
            "https://qa.delight.global/webhook/webwidget/v1.agent/"
        );
    }

    #[test]
    fn test_malformed_base_url() {
        assert!(matches!(
            webhook_url("not a url", "abc"),
            Err(DelightError::InvalidUrl(_))
        ));
        assert!(matches!(
            webhook_url("mailto:someone@example.com", "abc"),
            Err(DelightError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_poll_url() {
        let url = poll_url("https://qa.delight.global", "/webhook/poll/123?x=1").unwrap();
        assert_eq!(url.as_str(), "https://qa.delight.global/webhook/poll/123?x=1");

        let url = poll_url("https://qa.delight.global/", "webhook/poll/123").unwrap();
        assert_eq!(url.as_str(), "https://qa.delight.global/webhook/poll/123");
    }

    #[test]
    fn test_poll_url_empty_path() {
        assert!(matches!(
            poll_url("https://qa.delight.global", "  "),
            Err(DelightError::InvalidUrl(_))
        ));
    }
}
