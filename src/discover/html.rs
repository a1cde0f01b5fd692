// src/discover/html.rs
// =============================================================================
// This module pulls file links out of an HTML page.
//
// We use the `scraper` crate to find every <a href="..."> element and the
// `url` crate to turn relative hrefs into absolute URLs. A link is kept only
// if its *path* ends with the requested suffix, compared case-insensitively,
// so "a.webp", "B.WEBP" and "c.webp?size=big" all match ".webp".
//
// Order matters: links come back in document order and duplicates are kept,
// because the caller turns each one into a download task.
// =============================================================================

use scraper::{Html, Selector};
use url::Url;

// Extracts all links whose path ends with `suffix`
//
// Parameters:
//   html: the HTML content to parse
//   base: the URL of the page (for resolving relative links)
//   suffix: e.g. ".webp"; matched case-insensitively against the URL path
//
// Example:
//   html = "<a href='a.webp'>a</a><a href='c.png'>c</a>"
//   base = "https://example.com/gallery/"
//   result = ["https://example.com/gallery/a.webp"]
pub fn extract_links(html: &str, base: &Url, suffix: &str) -> Vec<Url> {
    let document = Html::parse_document(html);

    // "a[href]" is a constant, valid selector, so parsing it can't fail
    let selector = Selector::parse("a[href]").expect("static selector is valid");

    let suffix = suffix.to_lowercase();

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_url(base, href))
        .filter(|url| has_suffix(url, &suffix))
        .collect()
}

// Resolves a possibly-relative href against the page URL
//
// Anything that isn't plain http(s) afterwards (mailto:, javascript:,
// data:, ...) is dropped, as are hrefs the url crate refuses to parse.
fn resolve_url(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    // join() handles absolute hrefs too: they simply replace the base
    let url = match base.join(href) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!(href, error = %e, "skipping malformed link");
            return None;
        }
    };

    match url.scheme() {
        "http" | "https" => Some(url),
        _ => None,
    }
}

// `suffix` must already be lowercase
fn has_suffix(url: &Url, suffix: &str) -> bool {
    url.path().to_lowercase().ends_with(suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/gallery/").unwrap()
    }

    fn as_strings(links: Vec<Url>) -> Vec<String> {
        links.into_iter().map(String::from).collect()
    }

    #[test]
    fn test_gallery_filters_by_suffix_case_insensitively() {
        let html = r#"
            <html><body>
              <a href="a.webp">a.webp</a>
              <a href="B.WEBP">B.WEBP</a>
              <a href="c.png">c.png</a>
            </body></html>
        "#;
        let links = extract_links(html, &base(), ".webp");
        assert_eq!(
            as_strings(links),
            vec![
                "https://example.com/gallery/a.webp",
                "https://example.com/gallery/B.WEBP",
            ]
        );
    }

    #[test]
    fn test_uppercase_suffix_argument() {
        let html = r#"<a href="a.webp">a</a>"#;
        let links = extract_links(html, &base(), ".WEBP");
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_keeps_document_order_and_duplicates() {
        let html = r#"
            <a href="z.webp">z</a>
            <a href="a.webp">a</a>
            <a href="z.webp">z again</a>
        "#;
        let links = extract_links(html, &base(), ".webp");
        assert_eq!(
            as_strings(links),
            vec![
                "https://example.com/gallery/z.webp",
                "https://example.com/gallery/a.webp",
                "https://example.com/gallery/z.webp",
            ]
        );
    }

    #[test]
    fn test_resolves_absolute_and_root_relative_links() {
        let html = r#"
            <a href="https://cdn.example.org/x.webp">x</a>
            <a href="/top.webp">top</a>
            <a href="../up.webp">up</a>
        "#;
        let links = extract_links(html, &base(), ".webp");
        assert_eq!(
            as_strings(links),
            vec![
                "https://cdn.example.org/x.webp",
                "https://example.com/top.webp",
                "https://example.com/up.webp",
            ]
        );
    }

    #[test]
    fn test_suffix_is_checked_on_path_not_query() {
        let html = r#"
            <a href="a.webp?size=large">a</a>
            <a href="view?file=b.webp">b</a>
        "#;
        let links = extract_links(html, &base(), ".webp");
        assert_eq!(
            as_strings(links),
            vec!["https://example.com/gallery/a.webp?size=large"]
        );
    }

    #[test]
    fn test_skips_non_http_and_malformed_links() {
        let html = r##"
            <a href="mailto:me@example.com.webp">mail</a>
            <a href="javascript:alert('x.webp')">js</a>
            <a href="http://[::1.webp">broken</a>
            <a href="">empty</a>
            <a href="#frag.webp">fragment</a>
            <a>no href</a>
        "##;
        let links = extract_links(html, &base(), ".webp");
        assert!(links.is_empty());
    }

    #[test]
    fn test_directory_listing_parent_link_is_ignored() {
        let html = r#"
            <pre><a href="../">../</a>
            <a href="tex_01.webp">tex_01.webp</a></pre>
        "#;
        let links = extract_links(html, &base(), ".webp");
        assert_eq!(
            as_strings(links),
            vec!["https://example.com/gallery/tex_01.webp"]
        );
    }
}
