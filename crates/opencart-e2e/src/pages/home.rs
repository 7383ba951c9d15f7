//! Home page: category navbar, banner carousel and the featured module.

use super::{route, Header};
use cartcheck::{
    expect, AjaxForm, AjaxOutcome, Assertion, BasePage, CartcheckError, CartcheckResult,
    ElementState, LoadState, Locator, PageObject,
};

/// Top-level categories of the default catalogue, in menu order
pub const NAVBAR_CATEGORIES: [&str; 8] = [
    "Desktops",
    "Laptops & Notebooks",
    "Components",
    "Tablets",
    "Software",
    "Phones & PDAs",
    "Cameras",
    "MP3 Players",
];

/// Products the featured module is configured with
pub const FEATURED_PRODUCTS: [&str; 4] = ["MacBook", "iPhone", "Apple Cinema 30\"", "Canon EOS 5D"];

const CAROUSEL: &str = "#carousel-banner-0";
const SLIDE_COUNT: usize = 2;

/// Storefront home page
#[derive(Debug, Clone)]
pub struct HomePage {
    base: BasePage,
}

impl PageObject for HomePage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    fn path(&self) -> String {
        route("common/home")
    }

    fn page_name(&self) -> &'static str {
        "home"
    }
}

impl HomePage {
    /// Home page driven by `base`
    #[must_use]
    pub const fn new(base: BasePage) -> Self {
        Self { base }
    }

    /// Shared header
    #[must_use]
    pub fn header(&self) -> Header {
        Header::new(self.base.clone())
    }

    // -- navbar ------------------------------------------------------------

    fn navbar() -> Locator {
        Locator::new("nav#menu")
    }

    fn navbar_links() -> Locator {
        Locator::new("nav#menu ul.nav.navbar-nav > li > a.nav-link")
    }

    fn navbar_link(category: &str) -> Locator {
        Self::navbar_links().with_text(category).first()
    }

    fn dropdown(category: &str) -> Locator {
        Locator::new("nav#menu a.nav-link.dropdown-toggle")
            .with_text(category)
            .first()
            .closest("li")
            .find(".dropdown-menu")
    }

    /// Labels of the top-level navbar links
    pub async fn navbar_categories(&self) -> CartcheckResult<Vec<String>> {
        self.base.all_texts(&Self::navbar_links()).await
    }

    /// The navbar and every default category link are visible
    pub async fn verify_all_navbar_elements_visible(&self) -> CartcheckResult<()> {
        expect(&self.base, Self::navbar()).to_be_visible().await?;
        for category in NAVBAR_CATEGORIES {
            expect(&self.base, Self::navbar_link(category))
                .to_be_visible()
                .await?;
        }
        Ok(())
    }

    /// Hover a category and wait for its dropdown to show
    pub async fn open_navbar_dropdown(&self, category: &str) -> CartcheckResult<()> {
        self.base.hover(&Self::navbar_link(category)).await?;
        self.base
            .wait_for(&Self::dropdown(category), ElementState::Visible)
            .await
    }

    /// Hovering `category` reveals a dropdown with at least one entry
    pub async fn verify_navbar_dropdown_opens(&self, category: &str) -> CartcheckResult<()> {
        self.open_navbar_dropdown(category).await?;
        let items = self.dropdown_items(category).await?;
        Assertion::at_least(&format!("{category} dropdown entries"), &items.len(), &1)
    }

    /// Entries of a category dropdown
    pub async fn dropdown_items(&self, category: &str) -> CartcheckResult<Vec<String>> {
        self.base
            .all_texts(&Self::dropdown(category).find("a.nav-link"))
            .await
    }

    /// Follow a category link to its listing
    pub async fn click_navbar_category(&self, category: &str) -> CartcheckResult<()> {
        self.base.click(&Self::navbar_link(category)).await?;
        self.base.wait_for_url("*route=product/category*").await?;
        self.base.wait_for_load_state(LoadState::NetworkIdle).await
    }

    // -- carousel ----------------------------------------------------------

    fn carousel() -> Locator {
        Locator::new(CAROUSEL)
    }

    fn slide_images() -> Locator {
        Locator::new(format!("{CAROUSEL} .carousel-item img"))
    }

    fn slide(index: usize) -> Locator {
        Locator::new(format!("{CAROUSEL} .carousel-item:nth-child({})", index + 1))
    }

    /// Number of carousel slides
    pub async fn slide_count(&self) -> CartcheckResult<usize> {
        self.base.count(&Self::slide_images()).await
    }

    /// Carousel, slide images, both controls and the indicators are present
    pub async fn verify_all_slider_elements_visible(&self) -> CartcheckResult<()> {
        expect(&self.base, Self::carousel()).to_be_visible().await?;
        expect(&self.base, Self::slide_images())
            .to_have_count(SLIDE_COUNT)
            .await?;
        expect(&self.base, Locator::new(format!("{CAROUSEL} .carousel-item.active img")))
            .to_be_visible()
            .await?;
        expect(&self.base, Locator::new(format!("{CAROUSEL} .carousel-control-prev")))
            .to_be_visible()
            .await?;
        expect(&self.base, Locator::new(format!("{CAROUSEL} .carousel-control-next")))
            .to_be_visible()
            .await?;
        expect(&self.base, Locator::new(format!("{CAROUSEL} .carousel-indicators button")))
            .to_have_count(SLIDE_COUNT)
            .await
    }

    /// Zero-based index of the active slide
    pub async fn active_slide_index(&self) -> CartcheckResult<Option<usize>> {
        let script = format!(
            "/*carousel*/ Array.from(document.querySelectorAll('{CAROUSEL} .carousel-item'))\
             .findIndex(el => el.classList.contains('active'))"
        );
        let index = self.base.evaluate_json(&script).await?;
        Ok(index.as_i64().and_then(|i| usize::try_from(i).ok()))
    }

    /// Stop auto-rotation and jump to `index`
    pub async fn show_slide(&self, index: usize) -> CartcheckResult<()> {
        let script = format!(
            "/*carousel*/ (() => {{ const el = document.querySelector('{CAROUSEL}'); \
             const c = bootstrap.Carousel.getOrCreateInstance(el); c.pause(); c.to({index}); return true; }})()"
        );
        self.base.evaluate_json(&script).await?;
        Ok(())
    }

    /// Advance the carousel by one slide
    pub async fn advance_slide(&self) -> CartcheckResult<()> {
        let script = format!(
            "/*carousel*/ (() => {{ const el = document.querySelector('{CAROUSEL}'); \
             bootstrap.Carousel.getOrCreateInstance(el).next(); return true; }})()"
        );
        self.base.evaluate_json(&script).await?;
        Ok(())
    }

    /// Wait until slide `index` carries the `active` class
    pub async fn wait_for_active_slide(&self, index: usize) -> CartcheckResult<()> {
        expect(&self.base, Self::slide(index))
            .to_have_class("active")
            .await
    }

    // -- featured ----------------------------------------------------------

    fn featured_heading() -> Locator {
        Locator::new("#content h3").with_text("Featured")
    }

    fn featured_cards() -> Locator {
        Locator::new("#content .product-thumb")
    }

    fn featured_card(index: usize) -> Locator {
        Self::featured_cards().nth(index)
    }

    fn featured_button(label: &str) -> Locator {
        Locator::new(format!(
            "#content .product-thumb .button-group button[aria-label='{label}']"
        ))
    }

    /// Number of featured product cards
    pub async fn featured_count(&self) -> CartcheckResult<usize> {
        self.base.count(&Self::featured_cards()).await
    }

    /// The featured heading and exactly four cards are shown
    pub async fn verify_featured_products_visible(&self) -> CartcheckResult<()> {
        expect(&self.base, Self::featured_heading())
            .to_be_visible()
            .await?;
        expect(&self.base, Self::featured_cards())
            .to_have_count(FEATURED_PRODUCTS.len())
            .await
    }

    /// Card titles in display order
    pub async fn featured_product_names(&self) -> CartcheckResult<Vec<String>> {
        self.base
            .all_texts(&Self::featured_cards().find(".description h4 a"))
            .await
    }

    /// Displayed (current) price of every card
    pub async fn featured_product_prices(&self) -> CartcheckResult<Vec<String>> {
        self.base
            .all_texts(&Self::featured_cards().find(".price .price-new"))
            .await
    }

    async fn verify_every_card_has(&self, what: &str, part: Locator) -> CartcheckResult<()> {
        expect(&self.base, part.clone())
            .to_have_count(FEATURED_PRODUCTS.len())
            .await?;
        let visible = self.base.probe(&part).await?.visible;
        Assertion::equals(
            &format!("visible featured {what}"),
            &FEATURED_PRODUCTS.len(),
            &visible,
        )
    }

    /// Each card shows its image
    pub async fn verify_featured_product_images_visible(&self) -> CartcheckResult<()> {
        self.verify_every_card_has("images", Self::featured_cards().find(".image img"))
            .await
    }

    /// Each card shows its name
    pub async fn verify_featured_product_names_visible(&self) -> CartcheckResult<()> {
        self.verify_every_card_has("names", Self::featured_cards().find(".description h4 a"))
            .await
    }

    /// Each card shows a price
    pub async fn verify_featured_product_prices_visible(&self) -> CartcheckResult<()> {
        self.verify_every_card_has("prices", Self::featured_cards().find(".price"))
            .await
    }

    /// Each card has its Add to Cart, wish list and compare buttons
    pub async fn verify_featured_buttons_visible(&self) -> CartcheckResult<()> {
        for label in ["Add to Cart", "Add to Wish List", "Compare this Product"] {
            self.verify_every_card_has(label, Self::featured_button(label))
                .await?;
        }
        Ok(())
    }

    /// Open the product page of card `index`
    pub async fn click_featured_product(&self, index: usize) -> CartcheckResult<()> {
        self.base
            .click(&Self::featured_card(index).find(".description h4 a"))
            .await?;
        self.base.wait_for_url("*route=product/product*").await?;
        self.base.wait_for_load_state(LoadState::NetworkIdle).await
    }

    /// `product_id` carried by card `index`
    pub async fn featured_product_id(&self, index: usize) -> CartcheckResult<String> {
        let input = Self::featured_card(index).find("input[name='product_id']");
        self.base
            .attribute(&input, "value")
            .await?
            .ok_or_else(|| CartcheckError::ElementNotFound {
                selector: format!("{input} [value]"),
            })
    }

    /// Add card `index` to the cart the way its button does, then refresh
    /// the header mini-cart
    pub async fn add_featured_product_to_cart(&self, index: usize) -> CartcheckResult<AjaxOutcome> {
        let product_id = self.featured_product_id(index).await?;
        tracing::debug!(index, product_id = %product_id, "adding featured product");
        let form = AjaxForm::new(format!(
            "#content .product-thumb form:has(input[name='product_id'][value='{product_id}'])"
        ))
        .post_to(self.base.url(&route("checkout/cart|add")))
        .reload(self.base.url(&route("common/cart|info")), "#header-cart");
        self.base.submit_ajax_form(&form).await
    }

    /// Switch the store currency from the header and reload the page
    pub async fn switch_currency(&self, code: &str) -> CartcheckResult<AjaxOutcome> {
        self.header().switch_currency(code).await
    }

    /// Whether every featured price is shown in `symbol`
    pub async fn featured_prices_use(&self, symbol: &str) -> CartcheckResult<bool> {
        let prices = self.featured_product_prices().await?;
        tracing::debug!(symbol, ?prices, "featured prices");
        Ok(!prices.is_empty() && prices.iter().all(|p| p.contains(symbol)))
    }

    /// Search from the header box
    pub async fn search_product(&self, keyword: &str) -> CartcheckResult<()> {
        self.header().search(keyword).await
    }

    /// Header mini-cart label
    pub async fn cart_text(&self) -> CartcheckResult<String> {
        self.header().cart_text().await
    }
}
