//! # Extractor
//! Turns raw shop markup into a [`Signature`]: a content hash over the visible
//! page text, the number of product-like elements with a name, and the first
//! few product names.
//!
//! Selectors are applied independently. An element matching two of them is
//! counted twice; `productCount` is a best-effort signal, not an inventory.

use once_cell::sync::Lazy;
use scraper::{node::Node, ElementRef, Html, Selector};

use crate::model::{Signature, SAMPLE_PRODUCTS_CAP};

/// Product container selectors, applied in order.
pub const PRODUCT_SELECTORS: &[&str] = &[
    "div.product",
    "article.product",
    ".product-item",
    r#"[class*="product-card"]"#,
    r#"[class*="product-grid"]"#,
];

/// Name/title lookup inside a product container.
pub const PRODUCT_NAME_SELECTOR: &str = "h2, h3, h4, .product-title, .product-name";

static PRODUCT_SEL: Lazy<Vec<Selector>> = Lazy::new(|| {
    PRODUCT_SELECTORS
        .iter()
        .map(|s| Selector::parse(s).expect("static product selector"))
        .collect()
});

static NAME_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(PRODUCT_NAME_SELECTOR).expect("static name selector"));

/// Build the signature of a page.
pub fn extract(page_markup: &str) -> Signature {
    let document = Html::parse_document(page_markup);

    let mut products = Vec::new();
    for sel in PRODUCT_SEL.iter() {
        for elem in document.select(sel) {
            if let Some(name) = elem.select(&NAME_SEL).next() {
                products.push(stripped_text(name));
            }
        }
    }

    let page_text = visible_text(&document);
    let product_count = products.len() as u64;
    products.truncate(SAMPLE_PRODUCTS_CAP);

    Signature {
        content_hash: content_hash(&page_text),
        product_count,
        sample_products: products,
        text_length: page_text.chars().count() as u64,
    }
}

/// Lowercase hex MD5 of `text`.
pub fn content_hash(text: &str) -> String {
    format!("{:x}", md5::compute(text.as_bytes()))
}

/// Text of an element with every text node trimmed and glued together.
fn stripped_text(elem: ElementRef<'_>) -> String {
    elem.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Whole-document text, same stripping as [`stripped_text`], minus script/style bodies.
fn visible_text(document: &Html) -> String {
    let mut out = String::new();
    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element())
            .is_some_and(|el| matches!(el.name(), "script" | "style" | "template"));
        if hidden {
            continue;
        }
        let t = text.trim();
        if !t.is_empty() {
            out.push_str(t);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOP: &str = r#"
        <html><head><title>Shop</title><style>.x { color: red }</style></head>
        <body>
          <div class="product"><h3> Blue Dream </h3><span>$10</span></div>
          <div class="product"><h2>Sour <b>Diesel</b></h2></div>
          <div class="product"><p>no name here</p></div>
          <script>var t = Date.now();</script>
        </body></html>
    "#;

    #[test]
    fn counts_named_products_and_trims_names() {
        let sig = extract(SHOP);
        assert_eq!(sig.product_count, 2);
        assert_eq!(sig.sample_products, vec!["Blue Dream", "SourDiesel"]);
    }

    #[test]
    fn overlapping_selectors_count_twice() {
        let html = r#"<div class="product product-card-v2"><h4>Gummies</h4></div>"#;
        let sig = extract(html);
        assert_eq!(sig.product_count, 2);
        assert_eq!(sig.sample_products, vec!["Gummies", "Gummies"]);
    }

    #[test]
    fn sample_is_capped_but_count_is_not() {
        let mut html = String::from("<ul>");
        for i in 0..35 {
            html.push_str(&format!(r#"<li class="product-item"><span class="product-name">P{i}</span></li>"#));
        }
        html.push_str("</ul>");
        let sig = extract(&html);
        assert_eq!(sig.product_count, 35);
        assert_eq!(sig.sample_products.len(), SAMPLE_PRODUCTS_CAP);
        assert_eq!(sig.sample_products[0], "P0");
        assert_eq!(sig.sample_products[19], "P19");
    }

    #[test]
    fn hash_ignores_whitespace_and_script_bodies() {
        let a = "<html><body><p>Hello</p>\n\n   <p>World</p><script>1</script></body></html>";
        let b = "<html><body><p>  Hello  </p><p>World</p><script>2</script></body></html>";
        assert_eq!(extract(a).content_hash, extract(b).content_hash);
        assert_eq!(extract(a).content_hash, content_hash("HelloWorld"));
        assert_eq!(extract(a).text_length, 10);
    }

    #[test]
    fn text_change_changes_hash() {
        let a = extract("<p>In stock</p>");
        let b = extract("<p>Sold out</p>");
        assert_ne!(a.content_hash, b.content_hash);
        assert_eq!(a.product_count, 0);
    }

    #[test]
    fn md5_hex_format() {
        assert_eq!(content_hash(""), "d41d8cd98f00b204e9800998ecf8427e");
    }
}
