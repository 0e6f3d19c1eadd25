//! Fetching the source page and extracting its content regions.

use std::collections::HashSet;

use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::types::RagError;

/// Extracted text of the source page, ready for splitting.
#[derive(Debug, Clone)]
pub struct Document {
    pub source: Url,
    pub content: String,
}

/// Fetches the raw HTML behind `url`.
pub async fn fetch_page(client: &Client, url: &Url) -> Result<String, RagError> {
    let response = client.get(url.clone()).send().await?.error_for_status()?;
    Ok(response.text().await?)
}

/// Extracts the text of elements carrying any of the given CSS classes, in
/// document order.
///
/// Elements nested inside another matching element are skipped so their text
/// is not emitted twice (e.g. a `post-title` heading inside a `post-header`
/// wrapper). A page matching none of the classes is an error.
pub fn extract_content(html: &str, classes: &[String]) -> Result<String, RagError> {
    if classes.is_empty() {
        return Err(RagError::InvalidDocument(
            "no content classes configured".to_string(),
        ));
    }

    let selector_source = classes
        .iter()
        .map(|class| format!(".{class}"))
        .collect::<Vec<_>>()
        .join(", ");
    let selector = Selector::parse(&selector_source)
        .map_err(|err| RagError::InvalidDocument(err.to_string()))?;

    let document = Html::parse_document(html);
    let matched: Vec<ElementRef> = document.select(&selector).collect();
    let matched_ids: HashSet<_> = matched.iter().map(|element| element.id()).collect();

    let mut regions = Vec::new();
    for element in &matched {
        let nested = element
            .ancestors()
            .any(|ancestor| matched_ids.contains(&ancestor.id()));
        if nested {
            continue;
        }
        let text: String = element.text().collect();
        let text = text.trim();
        if !text.is_empty() {
            regions.push(text.to_string());
        }
    }

    if regions.is_empty() {
        return Err(RagError::InvalidDocument(format!(
            "no text matched content classes [{}]",
            classes.join(", ")
        )));
    }

    Ok(regions.join("\n"))
}

/// Fetches `url` and extracts its configured content regions.
pub async fn load_document(
    client: &Client,
    url: &Url,
    classes: &[String],
) -> Result<Document, RagError> {
    let html = fetch_page(client, url).await?;
    tracing::debug!(bytes = html.len(), url = %url, "fetched source page");
    let content = extract_content(&html, classes)?;
    tracing::debug!(chars = content.chars().count(), "extracted content regions");
    Ok(Document {
        source: url.clone(),
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_string()).collect()
    }

    const PAGE: &str = r#"<!DOCTYPE html>
<html><body>
    <nav>Site navigation to ignore</nav>
    <header class="post-header"><h1 class="post-title">Agents</h1></header>
    <div class="post-content">
        <p>First paragraph about planning.</p>
        <p>Second paragraph about memory.</p>
    </div>
    <footer>Footer to ignore</footer>
</body></html>"#;

    #[test]
    fn extracts_only_configured_regions() {
        let text =
            extract_content(PAGE, &classes(&["post-content", "post-title", "post-header"]))
                .unwrap();
        assert!(text.contains("Agents"));
        assert!(text.contains("planning"));
        assert!(text.contains("memory"));
        assert!(!text.contains("navigation"));
        assert!(!text.contains("Footer"));
    }

    #[test]
    fn nested_matches_are_not_duplicated() {
        let text =
            extract_content(PAGE, &classes(&["post-content", "post-title", "post-header"]))
                .unwrap();
        assert_eq!(text.matches("Agents").count(), 1);
    }

    #[test]
    fn regions_keep_document_order() {
        let text = extract_content(PAGE, &classes(&["post-content", "post-header"])).unwrap();
        let header_at = text.find("Agents").unwrap();
        let body_at = text.find("planning").unwrap();
        assert!(header_at < body_at);
    }

    #[test]
    fn unmatched_page_is_an_error() {
        let err = extract_content(PAGE, &classes(&["article-body"])).unwrap_err();
        assert!(matches!(err, RagError::InvalidDocument(_)));
    }

    #[test]
    fn empty_class_list_is_an_error() {
        let err = extract_content(PAGE, &[]).unwrap_err();
        assert!(matches!(err, RagError::InvalidDocument(_)));
    }
}
