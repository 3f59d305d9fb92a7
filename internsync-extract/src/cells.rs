//! Cleaning of HTML-bearing cells.
//!
//! The README renders multi-city locations as `<details>`/`<br>` fragments
//! and application links as `<a href>` buttons wrapping an image.

use scraper::{Html, Selector};

/// Text content of an HTML fragment, text segments joined with `", "`.
///
/// Plain text passes through unchanged (apart from trimming).
pub fn html_text(cell: &str) -> String {
    if !cell.contains('<') && !cell.contains('&') {
        return cell.trim().to_string();
    }
    let fragment = Html::parse_fragment(cell);
    fragment
        .root_element()
        .text()
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The `href` of the first anchor in `cell`, if any.
pub fn first_href(cell: &str) -> Option<String> {
    if !cell.contains("href") {
        return None;
    }
    let fragment = Html::parse_fragment(cell);
    let selector = Selector::parse("a[href]").ok()?;
    fragment
        .select(&selector)
        .find_map(|a| a.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("San Francisco, CA", "San Francisco, CA")]
    #[case("  Remote  ", "Remote")]
    #[case("SF<br>NYC", "SF, NYC")]
    #[case(
        "<details><summary>**3 locations**</summary>Austin, TX</br>Seattle, WA</br>Boston, MA</details>",
        "**3 locations**, Austin, TX, Seattle, WA, Boston, MA"
    )]
    #[case("AT&amp;T Park", "AT&T Park")]
    fn location_text(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(html_text(input), expected);
    }

    #[test]
    fn href_from_image_button() {
        let cell = r#"<a href="https://jobs.example.com/123?utm_source=x"><img src="https://i.imgur.com/apply.png" width="118" alt="Apply"></a>"#;
        assert_eq!(
            first_href(cell).as_deref(),
            Some("https://jobs.example.com/123?utm_source=x")
        );
    }

    #[test]
    fn first_of_several_anchors_wins() {
        let cell = r#"<a href="http://first">A</a> <a href="http://second">B</a>"#;
        assert_eq!(first_href(cell).as_deref(), Some("http://first"));
    }

    #[test]
    fn no_anchor_yields_none() {
        assert_eq!(first_href("🔒"), None);
        assert_eq!(first_href("http://plain.example"), None);
    }
}
