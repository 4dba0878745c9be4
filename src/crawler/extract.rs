//! Markup extraction for category menus, listing cards, and product pages
//!
//! Every operation here is tolerant by design: the storefront's markup is
//! matched by fixed structural selectors, and an absent optional element
//! resolves to `None`/empty rather than an error. A silent change to the
//! site's markup degrades extraction; it never crashes the run.

use crate::normalize::dedup_urls;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

// Category menu
static MENU_ITEM: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.mhp-menu-item").expect("static selector"));
static MENU_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".mhp-title div").expect("static selector"));
static MENU_IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("img").expect("static selector"));

// Listing cards
static PRODUCT_CARD: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.card-wrapper.product-card-wrapper").expect("static selector"));
static CARD_TITLE_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".card__heading a").expect("static selector"));
static CARD_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".card__media img").expect("static selector"));
static CARD_PRICE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".price-item--regular").expect("static selector"));

// Product detail page
static INVENTORY: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".product__inventory").expect("static selector"));
static PRODUCT_ID_INPUT: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"input[name="product-id"]"#).expect("static selector"));
static VARIANT_ID_INPUT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("input.product-variant-id").expect("static selector"));
static MEDIA_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("ul.product__media-list img").expect("static selector"));
static DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.product__description").expect("static selector"));
static LIST_ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse("li").expect("static selector"));
static BOLD_LABEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("strong").expect("static selector"));

/// A category entry found in the site's menu
#[derive(Debug, Clone)]
pub struct DiscoveredCategory {
    pub name: String,
    pub url: String,
    pub image_url: Option<String>,
}

/// A product summary tile on a paginated listing page
#[derive(Debug, Clone)]
pub struct ListingCard {
    pub title: String,
    pub url: String,
    pub image_url: Option<String>,
    pub price_display: Option<String>,
}

/// Fields extracted from a product detail page
///
/// `availability` is the raw storefront text; mapping it onto the
/// availability enum happens during normalization.
#[derive(Debug, Clone, Default)]
pub struct ProductDetail {
    pub availability: Option<String>,
    pub product_id: Option<String>,
    pub variant_id: Option<String>,
    pub images: Vec<String>,
    pub description_text: Option<String>,
    pub specifications: IndexMap<String, String>,
}

/// Scans the site root's menu for category entries.
///
/// The returned map is keyed by category name in discovery order;
/// a name seen twice keeps the last URL/image (plain map overwrite,
/// no other dedup). Entries missing a name or URL are dropped silently.
pub fn discover_categories(html: &str, base: &Url) -> IndexMap<String, DiscoveredCategory> {
    let document = Html::parse_document(html);
    let mut categories = IndexMap::new();

    for item in document.select(&MENU_ITEM) {
        let href = match item.value().attr("href") {
            Some(h) => h,
            None => continue,
        };
        let url = match base.join(href) {
            Ok(u) => u.to_string(),
            Err(_) => continue,
        };

        let name = item
            .select(&MENU_TITLE)
            .next()
            .map(element_text)
            .filter(|n| !n.is_empty());
        let name = match name {
            Some(n) => n,
            None => continue,
        };

        let image_url = item
            .select(&MENU_IMAGE)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(absolutize_image);

        categories.insert(
            name.clone(),
            DiscoveredCategory {
                name,
                url,
                image_url,
            },
        );
    }

    categories
}

/// Extracts the product cards from one listing page.
///
/// A card without its title link is dropped. The caller terminates the
/// category's pagination at the first page that yields an empty list.
pub fn extract_listing_cards(html: &str, base: &Url) -> Vec<ListingCard> {
    let document = Html::parse_document(html);
    let mut cards = Vec::new();

    for card in document.select(&PRODUCT_CARD) {
        let title_link = match card.select(&CARD_TITLE_LINK).next() {
            Some(a) => a,
            None => continue,
        };
        let href = match title_link.value().attr("href") {
            Some(h) => h,
            None => continue,
        };
        let url = match base.join(href) {
            Ok(u) => u.to_string(),
            Err(_) => continue,
        };

        let title = element_text(title_link);
        if title.is_empty() {
            continue;
        }

        let image_url = card
            .select(&CARD_IMAGE)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(absolutize_image);

        let price_display = card
            .select(&CARD_PRICE)
            .next()
            .map(element_text)
            .filter(|p| !p.is_empty());

        cards.push(ListingCard {
            title,
            url,
            image_url,
            price_display,
        });
    }

    cards
}

/// Extracts the structured fields of a product detail page.
///
/// Media image URLs are rewritten from protocol-relative form and
/// de-duplicated preserving order. Specification pairs come from list
/// items inside the description block whose text starts with a bold
/// label: the label (colons removed) becomes the key, the remaining item
/// text the value. A label with nothing after it yields an empty-string
/// value, not an omitted key.
pub fn extract_product_detail(html: &str) -> ProductDetail {
    let document = Html::parse_document(html);

    let availability = document
        .select(&INVENTORY)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty());

    let product_id = document
        .select(&PRODUCT_ID_INPUT)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(|v| v.to_string());

    let variant_id = document
        .select(&VARIANT_ID_INPUT)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(|v| v.to_string());

    let images = dedup_urls(
        document
            .select(&MEDIA_IMAGE)
            .filter_map(|img| img.value().attr("src"))
            .map(absolutize_image)
            .collect(),
    );

    let mut description_text = None;
    let mut specifications = IndexMap::new();

    if let Some(desc) = document.select(&DESCRIPTION).next() {
        let text = block_text(desc);
        if !text.is_empty() {
            description_text = Some(text);
        }

        for item in desc.select(&LIST_ITEM) {
            let label = match item.select(&BOLD_LABEL).next() {
                Some(l) => element_text(l),
                None => continue,
            };
            if label.is_empty() {
                continue;
            }

            let key = label.replace(':', "");
            let value = element_text(item)
                .replacen(&label, "", 1)
                .trim()
                .to_string();
            specifications.insert(key, value);
        }
    }

    ProductDetail {
        availability,
        product_id,
        variant_id,
        images,
        description_text,
        specifications,
    }
}

/// Rewrites protocol-relative image URLs (`//cdn...`) to explicit HTTPS
fn absolutize_image(src: &str) -> String {
    if src.starts_with("//") {
        format!("https:{}", src)
    } else {
        src.to_string()
    }
}

/// Collects an element's text content, trimmed and joined
fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Collects a block element's text with segments separated by newlines,
/// skipping whitespace-only nodes
fn block_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://shop.example.com").unwrap()
    }

    // ===== Category discovery =====

    #[test]
    fn test_discover_categories() {
        let html = r#"
            <nav>
                <a class="mhp-menu-item" href="/collections/cement">
                    <img src="//cdn.example.com/cement.jpg" />
                    <span class="mhp-title"><div>Cement</div></span>
                </a>
                <a class="mhp-menu-item" href="/collections/steel">
                    <span class="mhp-title"><div>Steel</div></span>
                </a>
            </nav>
        "#;

        let categories = discover_categories(html, &base());
        assert_eq!(categories.len(), 2);

        let cement = &categories["Cement"];
        assert_eq!(cement.url, "https://shop.example.com/collections/cement");
        assert_eq!(
            cement.image_url.as_deref(),
            Some("https://cdn.example.com/cement.jpg")
        );

        let steel = &categories["Steel"];
        assert_eq!(steel.image_url, None);
    }

    #[test]
    fn test_discover_drops_entries_missing_name_or_url() {
        let html = r#"
            <a class="mhp-menu-item" href="/collections/unnamed"></a>
            <a class="mhp-menu-item">
                <span class="mhp-title"><div>No Link</div></span>
            </a>
        "#;
        assert!(discover_categories(html, &base()).is_empty());
    }

    #[test]
    fn test_discover_duplicate_name_last_wins() {
        let html = r#"
            <a class="mhp-menu-item" href="/collections/cement-old">
                <span class="mhp-title"><div>Cement</div></span>
            </a>
            <a class="mhp-menu-item" href="/collections/cement-new">
                <span class="mhp-title"><div>Cement</div></span>
            </a>
        "#;

        let categories = discover_categories(html, &base());
        assert_eq!(categories.len(), 1);
        assert_eq!(
            categories["Cement"].url,
            "https://shop.example.com/collections/cement-new"
        );
    }

    // ===== Listing cards =====

    #[test]
    fn test_extract_listing_cards() {
        let html = r#"
            <div class="card-wrapper product-card-wrapper">
                <div class="card__media"><img src="//cdn.example.com/opc.jpg" /></div>
                <h3 class="card__heading"><a href="/products/opc-53">OPC 53 Grade</a></h3>
                <span class="price-item--regular">Rs. 330.00</span>
            </div>
        "#;

        let cards = extract_listing_cards(html, &base());
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "OPC 53 Grade");
        assert_eq!(cards[0].url, "https://shop.example.com/products/opc-53");
        assert_eq!(
            cards[0].image_url.as_deref(),
            Some("https://cdn.example.com/opc.jpg")
        );
        assert_eq!(cards[0].price_display.as_deref(), Some("Rs. 330.00"));
    }

    #[test]
    fn test_card_without_title_link_dropped() {
        let html = r#"
            <div class="card-wrapper product-card-wrapper">
                <span class="price-item--regular">Rs. 100.00</span>
            </div>
            <div class="card-wrapper product-card-wrapper">
                <h3 class="card__heading"><a href="/products/kept">Kept</a></h3>
            </div>
        "#;

        let cards = extract_listing_cards(html, &base());
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "Kept");
        assert_eq!(cards[0].price_display, None);
    }

    #[test]
    fn test_empty_page_yields_no_cards() {
        assert!(extract_listing_cards("<html><body></body></html>", &base()).is_empty());
    }

    // ===== Product detail =====

    #[test]
    fn test_extract_product_detail() {
        let html = r#"
            <div class="product">
                <p class="product__inventory">In Stock</p>
                <input name="product-id" value="P123" />
                <input class="product-variant-id" value="V9" />
                <ul class="product__media-list">
                    <li><img src="//cdn.example.com/1.jpg" /></li>
                    <li><img src="//cdn.example.com/2.jpg" /></li>
                    <li><img src="//cdn.example.com/1.jpg" /></li>
                </ul>
                <div class="product__description">
                    <p>Strong cement for strong homes.</p>
                    <ul>
                        <li><strong>Weight:</strong> 50kg</li>
                        <li><strong>Grade:</strong></li>
                        <li>No label here</li>
                    </ul>
                </div>
            </div>
        "#;

        let detail = extract_product_detail(html);
        assert_eq!(detail.availability.as_deref(), Some("In Stock"));
        assert_eq!(detail.product_id.as_deref(), Some("P123"));
        assert_eq!(detail.variant_id.as_deref(), Some("V9"));
        assert_eq!(
            detail.images,
            vec![
                "https://cdn.example.com/1.jpg".to_string(),
                "https://cdn.example.com/2.jpg".to_string(),
            ]
        );
        assert!(detail
            .description_text
            .as_deref()
            .unwrap()
            .contains("Strong cement"));

        assert_eq!(detail.specifications.len(), 2);
        assert_eq!(detail.specifications["Weight"], "50kg");
        // A label with no following value yields an empty string, not a gap
        assert_eq!(detail.specifications["Grade"], "");
    }

    #[test]
    fn test_detail_with_nothing_present() {
        let detail = extract_product_detail("<html><body><p>bare page</p></body></html>");
        assert_eq!(detail.availability, None);
        assert_eq!(detail.product_id, None);
        assert_eq!(detail.variant_id, None);
        assert!(detail.images.is_empty());
        assert_eq!(detail.description_text, None);
        assert!(detail.specifications.is_empty());
    }

    #[test]
    fn test_absolutize_image() {
        assert_eq!(
            absolutize_image("//cdn.example.com/a.jpg"),
            "https://cdn.example.com/a.jpg"
        );
        assert_eq!(
            absolutize_image("https://cdn.example.com/a.jpg"),
            "https://cdn.example.com/a.jpg"
        );
    }
}
