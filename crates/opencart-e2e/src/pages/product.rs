//! Product detail page.

use super::{route, route_with, Header};
use cartcheck::{
    expect, AjaxForm, AjaxOutcome, Assertion, BasePage, CartcheckResult, LoadState, Locator,
    PageObject,
};

const FORM: &str = "#form-product";

/// `product/product`, optionally bound to one product id
#[derive(Debug, Clone)]
pub struct ProductPage {
    base: BasePage,
    product_id: Option<u32>,
}

impl PageObject for ProductPage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    fn path(&self) -> String {
        match self.product_id {
            Some(id) => route_with("product/product", &[("product_id", &id.to_string())]),
            None => route("product/product"),
        }
    }

    fn page_name(&self) -> &'static str {
        "product"
    }
}

impl ProductPage {
    /// Whatever product page `base` is showing
    #[must_use]
    pub const fn new(base: BasePage) -> Self {
        Self {
            base,
            product_id: None,
        }
    }

    /// The page of product `product_id`
    #[must_use]
    pub const fn for_product(base: BasePage, product_id: u32) -> Self {
        Self {
            base,
            product_id: Some(product_id),
        }
    }

    /// Shared header
    #[must_use]
    pub fn header(&self) -> Header {
        Header::new(self.base.clone())
    }

    /// Navigate to product `product_id`
    pub async fn open_product(&self, product_id: u32) -> CartcheckResult<()> {
        Self::for_product(self.base.clone(), product_id).open().await
    }

    fn name() -> Locator {
        Locator::new("#content h1")
    }

    fn price() -> Locator {
        Locator::new("#content .price-new").first()
    }

    fn info_line(label: &str) -> Locator {
        Locator::new("#content ul.list-unstyled li")
            .with_text(label)
            .first()
    }

    fn images() -> Locator {
        Locator::new(".magnific-popup img")
    }

    fn tab(name: &str) -> Locator {
        Locator::new("#content .nav-tabs a").with_text(name).first()
    }

    fn description() -> Locator {
        Locator::new("#tab-description")
    }

    fn add_to_cart_button() -> Locator {
        Locator::new("#button-cart")
    }

    fn quantity() -> Locator {
        Locator::new("#input-quantity")
    }

    fn wishlist_button() -> Locator {
        Locator::new("#content button[aria-label='Add to Wish List']").first()
    }

    fn compare_button() -> Locator {
        Locator::new("#content button[aria-label='Compare this Product']").first()
    }

    async fn labelled_value(&self, label: &str) -> CartcheckResult<String> {
        let line = self.base.get_text(&Self::info_line(label)).await?;
        Ok(line.replacen(label, "", 1).trim().to_string())
    }

    /// Product heading
    pub async fn product_name(&self) -> CartcheckResult<String> {
        self.base.get_text(&Self::name()).await
    }

    /// Price including tax, e.g. `$602.00`
    pub async fn product_price(&self) -> CartcheckResult<String> {
        self.base.get_text(&Self::price()).await
    }

    /// Full ex-tax line, e.g. `Ex Tax: $500.00`
    pub async fn product_ex_tax(&self) -> CartcheckResult<String> {
        self.base.get_text(&Self::info_line("Ex Tax:")).await
    }

    /// Manufacturer name
    pub async fn brand(&self) -> CartcheckResult<String> {
        self.base
            .get_text(&Self::info_line("Brand:").find("a"))
            .await
    }

    /// Model code without its label, e.g. `Product 16`
    pub async fn product_code(&self) -> CartcheckResult<String> {
        self.labelled_value("Product Code:").await
    }

    /// Stock status without its label, e.g. `In Stock`
    pub async fn availability(&self) -> CartcheckResult<String> {
        self.labelled_value("Availability:").await
    }

    /// Name, price, ex-tax line, brand, code and availability are visible
    pub async fn verify_all_product_info_visible(&self) -> CartcheckResult<()> {
        expect(&self.base, Self::name()).to_be_visible().await?;
        expect(&self.base, Self::price()).to_be_visible().await?;
        for label in ["Ex Tax:", "Brand:", "Product Code:", "Availability:"] {
            expect(&self.base, Self::info_line(label))
                .to_be_visible()
                .await?;
        }
        Ok(())
    }

    /// Number of gallery images
    pub async fn image_count(&self) -> CartcheckResult<usize> {
        self.base.count(&Self::images()).await
    }

    /// The main image is shown
    pub async fn verify_main_image_visible(&self) -> CartcheckResult<()> {
        expect(&self.base, Self::images().first())
            .to_be_visible()
            .await
    }

    /// The gallery holds at least `min` images
    pub async fn verify_product_images_present(&self, min: usize) -> CartcheckResult<()> {
        let count = self.image_count().await?;
        Assertion::at_least("product images", &count, &min)
    }

    /// Labels of the detail tabs
    pub async fn tab_names(&self) -> CartcheckResult<Vec<String>> {
        self.base
            .all_texts(&Locator::new("#content .nav-tabs a"))
            .await
    }

    /// Whether the product has a Specification tab
    pub async fn has_specification_tab(&self) -> CartcheckResult<bool> {
        Ok(self
            .tab_names()
            .await?
            .iter()
            .any(|name| name.to_lowercase().contains("specification")))
    }

    /// The tab labelled `name` is visible
    pub async fn verify_tab_visible(&self, name: &str) -> CartcheckResult<()> {
        expect(&self.base, Self::tab(name)).to_be_visible().await
    }

    /// Switch to the tab labelled `name`
    pub async fn click_tab(&self, name: &str) -> CartcheckResult<()> {
        self.base.click(&Self::tab(name)).await
    }

    /// The description pane is shown
    pub async fn verify_description_content_visible(&self) -> CartcheckResult<()> {
        expect(&self.base, Self::description()).to_be_visible().await
    }

    /// Description pane text
    pub async fn description_text(&self) -> CartcheckResult<String> {
        self.base.get_text(&Self::description()).await
    }

    /// Breadcrumb trail text
    pub async fn breadcrumb_text(&self) -> CartcheckResult<String> {
        self.base.get_text(&Locator::new(".breadcrumb")).await
    }

    /// Add to Cart, quantity, wish list and compare controls are visible
    pub async fn verify_all_action_buttons_visible(&self) -> CartcheckResult<()> {
        for control in [
            Self::add_to_cart_button(),
            Self::quantity(),
            Self::wishlist_button(),
            Self::compare_button(),
        ] {
            expect(&self.base, control).to_be_visible().await?;
        }
        Ok(())
    }

    /// Set the quantity field
    pub async fn set_quantity(&self, quantity: u32) -> CartcheckResult<()> {
        self.base
            .fill(&Self::quantity(), &quantity.to_string())
            .await
    }

    /// Post the product form to `checkout/cart|add`, show the reply in the
    /// alert box and refresh the header mini-cart
    pub async fn add_to_cart(&self) -> CartcheckResult<AjaxOutcome> {
        let form = AjaxForm::new(FORM)
            .post_to(self.base.url(&route("checkout/cart|add")))
            .reload(self.base.url(&route("common/cart|info")), "#header-cart");
        let outcome = self.base.submit_ajax_form(&form).await?;
        self.base.wait_for_load_state(LoadState::NetworkIdle).await?;
        Ok(outcome)
    }

    /// Post the product to `account/wishlist|add`
    pub async fn add_to_wishlist(&self) -> CartcheckResult<AjaxOutcome> {
        let form = AjaxForm::new(FORM).post_to(self.base.url(&route("account/wishlist|add")));
        self.base.submit_ajax_form(&form).await
    }

    /// Post the product to `product/compare|add`
    pub async fn add_to_compare(&self) -> CartcheckResult<AjaxOutcome> {
        let form = AjaxForm::new(FORM).post_to(self.base.url(&route("product/compare|add")));
        self.base.submit_ajax_form(&form).await
    }

    /// Whether a success alert is shown
    pub async fn is_success_alert_visible(&self) -> CartcheckResult<bool> {
        self.base.is_visible(&Locator::new(".alert-success")).await
    }

    /// Text of the success alert
    pub async fn success_alert_text(&self) -> CartcheckResult<String> {
        self.base
            .get_text(&Locator::new(".alert-success").first())
            .await
    }
}
