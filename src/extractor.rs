use std::path::{Path, PathBuf};

use url::Url;

use crate::html_parser::HtmlDocument;
use crate::observer::{LoadObserver, SkipReason};
use crate::resolver::{resolve_reference, OriginPolicy};
use crate::slug::slugify_file_name;

/// Tag/attribute pairs that carry asset references, in extraction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetTag {
    Img,
    Link,
    Script,
}

impl AssetTag {
    pub const ALL: [AssetTag; 3] = [AssetTag::Img, AssetTag::Link, AssetTag::Script];

    pub fn name(&self) -> &'static str {
        match self {
            AssetTag::Img => "img",
            AssetTag::Link => "link",
            AssetTag::Script => "script",
        }
    }

    pub fn attribute(&self) -> &'static str {
        match self {
            AssetTag::Img | AssetTag::Script => "src",
            AssetTag::Link => "href",
        }
    }
}

/// One same-origin reference found in the markup. Two occurrences of the same URL are
/// two assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub original_reference: String,
    pub absolute_url: Url,
    pub tag: AssetTag,
    pub local_file_name: String,
    pub local_file_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub markup: String,
    pub assets: Vec<Asset>,
}

/// Rewrite every same-origin `img[src]`, `link[href]` and `script[src]` to point at
/// `<assets_dir_name>/<local file>` and list the assets to fetch.
///
/// Rewriting and listing happen in the same pass, so every rewritten attribute has
/// exactly one matching asset. Foreign and unparseable references are left untouched.
pub fn extract(
    markup: &str,
    page_url: &Url,
    assets_dir_name: &str,
    output_dir: &Path,
    origin: OriginPolicy,
    observer: &dyn LoadObserver,
) -> Extraction {
    let document = HtmlDocument::parse(markup);
    let mut assets = Vec::new();

    for tag in AssetTag::ALL {
        for element in document.elements_by_tag(tag.name()) {
            let reference = match element.attr(tag.attribute()) {
                Some(value) if !value.trim().is_empty() => value,
                Some(value) => {
                    observer.reference_skipped(tag.name(), &value, SkipReason::Empty);
                    continue;
                }
                None => continue,
            };

            let absolute_url = match resolve_reference(&reference, page_url) {
                Ok(url) => url,
                Err(_) => {
                    observer.reference_skipped(tag.name(), &reference, SkipReason::InvalidUrl);
                    continue;
                }
            };

            if !origin.is_same_origin(page_url, &absolute_url) {
                observer.reference_skipped(tag.name(), &reference, SkipReason::ForeignOrigin);
                continue;
            }

            let local_file_name = slugify_file_name(&absolute_url);
            element.set_attr(
                tag.attribute(),
                &format!("{}/{}", assets_dir_name, local_file_name),
            );

            assets.push(Asset {
                original_reference: reference,
                local_file_path: output_dir.join(assets_dir_name).join(&local_file_name),
                absolute_url,
                tag,
                local_file_name,
            });
        }
    }

    Extraction {
        markup: document.to_html(),
        assets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;
    use std::sync::Mutex;

    const DIR: &str = "example-com-courses_files";

    fn page() -> Url {
        Url::parse("https://example.com/courses").unwrap()
    }

    fn run(markup: &str) -> Extraction {
        extract(
            markup,
            &page(),
            DIR,
            Path::new("/tmp/out"),
            OriginPolicy::default(),
            &NoopObserver,
        )
    }

    fn attr_values(markup: &str, tag: &str, attr: &str) -> Vec<String> {
        HtmlDocument::parse(markup)
            .elements_by_tag(tag)
            .iter()
            .filter_map(|el| el.attr(attr))
            .collect()
    }

    #[derive(Default)]
    struct RecordingObserver {
        skipped: Mutex<Vec<(String, SkipReason)>>,
    }

    impl LoadObserver for RecordingObserver {
        fn reference_skipped(&self, _tag: &str, reference: &str, reason: SkipReason) {
            self.skipped.lock().unwrap().push((reference.to_string(), reason));
        }
    }

    #[test]
    fn test_extraction_order_is_img_link_script() {
        let html = r#"
            <html>
                <head>
                    <script src="/packs/runtime.js"></script>
                    <link rel="stylesheet" href="/assets/application.css">
                    <link rel="canonical" href="/courses">
                </head>
                <body>
                    <img src="/assets/professions/nodejs.png" alt="Node">
                    <script src="/packs/app.js"></script>
                </body>
            </html>
        "#;

        let extraction = run(html);
        let names: Vec<_> = extraction.assets.iter().map(|a| a.local_file_name.as_str()).collect();

        assert_eq!(
            names,
            vec![
                "example-com-assets-professions-nodejs.png",
                "example-com-assets-application.css",
                "example-com-courses.html",
                "example-com-packs-runtime.js",
                "example-com-packs-app.js",
            ]
        );
        let tags: Vec<_> = extraction.assets.iter().map(|a| a.tag).collect();
        assert_eq!(
            tags,
            vec![AssetTag::Img, AssetTag::Link, AssetTag::Link, AssetTag::Script, AssetTag::Script]
        );
    }

    #[test]
    fn test_foreign_references_are_untouched() {
        let html = r#"
            <html><head>
                <link rel="stylesheet" href="https://cdn2.hexlet.io/assets/menu.css">
                <script src="https://js.stripe.com/v3/"></script>
            </head><body>
                <img src="/assets/logo.png">
            </body></html>
        "#;

        let extraction = run(html);

        assert_eq!(extraction.assets.len(), 1);
        assert_eq!(extraction.assets[0].absolute_url.as_str(), "https://example.com/assets/logo.png");
        assert_eq!(
            attr_values(&extraction.markup, "link", "href"),
            vec!["https://cdn2.hexlet.io/assets/menu.css"]
        );
        assert_eq!(
            attr_values(&extraction.markup, "script", "src"),
            vec!["https://js.stripe.com/v3/"]
        );
    }

    #[test]
    fn test_rewritten_attributes_match_assets() {
        let html = r#"
            <html><head><link href="style.css" rel="stylesheet"></head>
            <body><img src="img/a.jpg"><img src="//example.com/img/b.jpg"><script src="../js/x.js"></script></body></html>
        "#;

        let extraction = run(html);

        let img_srcs = attr_values(&extraction.markup, "img", "src");
        let link_hrefs = attr_values(&extraction.markup, "link", "href");
        let script_srcs = attr_values(&extraction.markup, "script", "src");
        let rewritten: Vec<_> = img_srcs.into_iter().chain(link_hrefs).chain(script_srcs).collect();

        let expected: Vec<_> = extraction
            .assets
            .iter()
            .map(|a| format!("{}/{}", DIR, a.local_file_name))
            .collect();
        assert_eq!(rewritten, expected);

        for asset in &extraction.assets {
            assert_eq!(
                asset.local_file_path,
                Path::new("/tmp/out").join(DIR).join(&asset.local_file_name)
            );
        }
        assert_eq!(extraction.assets[2].original_reference, "style.css");
        assert_eq!(extraction.assets[3].absolute_url.as_str(), "https://example.com/js/x.js");
    }

    #[test]
    fn test_duplicate_references_produce_one_asset_each() {
        let html = r#"<html><body><img src="/a.png"><img src="/a.png"></body></html>"#;

        let extraction = run(html);

        assert_eq!(extraction.assets.len(), 2);
        assert_eq!(extraction.assets[0].local_file_path, extraction.assets[1].local_file_path);
        assert_eq!(
            attr_values(&extraction.markup, "img", "src"),
            vec![format!("{}/example-com-a.png", DIR); 2]
        );
    }

    #[test]
    fn test_empty_missing_and_invalid_references_are_skipped() {
        let html = r#"
            <html><head><script>var inline = 1;</script></head>
            <body><img src=""><img alt="no src"><img src="http://[::1"><img src="/ok.gif"></body></html>
        "#;
        let observer = RecordingObserver::default();

        let extraction = extract(
            html,
            &page(),
            DIR,
            Path::new("out"),
            OriginPolicy::default(),
            &observer,
        );

        assert_eq!(extraction.assets.len(), 1);
        assert_eq!(extraction.assets[0].local_file_name, "example-com-ok.gif");
        assert_eq!(
            attr_values(&extraction.markup, "img", "src"),
            vec!["".to_string(), "http://[::1".to_string(), format!("{}/example-com-ok.gif", DIR)]
        );

        let skipped = observer.skipped.lock().unwrap();
        assert!(skipped.contains(&("".to_string(), SkipReason::Empty)));
        assert!(skipped.contains(&("http://[::1".to_string(), SkipReason::InvalidUrl)));
    }

    #[test]
    fn test_strict_origin_policy_excludes_other_scheme() {
        let html = r#"<html><body><img src="http://example.com/a.png"><img src="/b.png"></body></html>"#;
        let strict = OriginPolicy {
            compare_scheme_and_port: true,
        };

        let lenient = run(html);
        let strict = extract(html, &page(), DIR, Path::new("out"), strict, &NoopObserver);

        assert_eq!(lenient.assets.len(), 2);
        assert_eq!(strict.assets.len(), 1);
        assert_eq!(strict.assets[0].absolute_url.as_str(), "https://example.com/b.png");
    }
}
