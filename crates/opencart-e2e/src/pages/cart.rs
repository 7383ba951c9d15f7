//! Shopping cart page and the header mini-cart.

use super::{route, Header};
use cartcheck::{
    expect, AjaxForm, AjaxOutcome, BasePage, CartcheckError, CartcheckResult, LoadState, Locator,
    PageObject,
};
use serde::{Deserialize, Serialize};

/// One product row of the cart table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product name
    pub name: String,
    /// Model code
    pub model: String,
    /// Quantity field value
    pub quantity: String,
    /// Unit price
    pub unit_price: String,
    /// Row total
    pub total: String,
}

/// `checkout/cart`
#[derive(Debug, Clone)]
pub struct CartPage {
    base: BasePage,
}

impl PageObject for CartPage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    fn path(&self) -> String {
        route("checkout/cart")
    }

    fn page_name(&self) -> &'static str {
        "cart"
    }
}

/// Reads `#checkout-total` as `[label, value]` pairs, skipping rows that
/// are not two cells wide
const TOTALS_JS: &str = "/*totals*/ Array.from(document.querySelectorAll('#checkout-total tr'))\
    .map(tr => Array.from(tr.querySelectorAll('td')).map(td => (td.innerText || td.textContent || '').trim()))\
    .filter(cells => cells.length === 2)";

impl CartPage {
    /// Cart page driven by `base`
    #[must_use]
    pub const fn new(base: BasePage) -> Self {
        Self { base }
    }

    /// Shared header
    #[must_use]
    pub fn header(&self) -> Header {
        Header::new(self.base.clone())
    }

    fn rows() -> Locator {
        Locator::new("#shopping-cart table tbody tr")
    }

    fn cells(column: usize) -> Locator {
        Self::rows().find(format!("td:nth-child({column})"))
    }

    fn quantities() -> Locator {
        Locator::new("#shopping-cart input[name='quantity']")
    }

    fn row_form(index: usize) -> Locator {
        Locator::new("#shopping-cart form").nth(index)
    }

    fn empty_notice() -> Locator {
        Locator::new("#content p")
            .with_text("Your shopping cart is empty")
            .first()
    }

    fn total_row(label: &str) -> Locator {
        Locator::new("#checkout-total tr").with_text(label)
    }

    /// Heading, table, quantity field, update/remove buttons, totals and
    /// both navigation links are visible
    pub async fn verify_template_visible(&self) -> CartcheckResult<()> {
        expect(&self.base, "#content h1").to_contain_text("Shopping Cart").await?;
        for css in [
            "#shopping-cart table.table-bordered",
            "#shopping-cart input[name='quantity']",
            "#shopping-cart button[aria-label='Update']",
            "#shopping-cart button[aria-label='Remove']",
            "#checkout-total",
        ] {
            expect(&self.base, css).to_be_visible().await?;
        }
        for link in ["Continue Shopping", "Checkout"] {
            expect(&self.base, Locator::new("#content a").with_text(link).first())
                .to_be_visible()
                .await?;
        }
        Ok(())
    }

    /// Whether the empty-cart notice is shown
    pub async fn is_cart_empty(&self) -> CartcheckResult<bool> {
        self.base.is_visible(&Self::empty_notice()).await
    }

    /// Text of the empty-cart notice
    pub async fn empty_message(&self) -> CartcheckResult<String> {
        self.base.get_text(&Self::empty_notice()).await
    }

    /// Number of product rows
    pub async fn items_count(&self) -> CartcheckResult<usize> {
        self.base.count(&Self::rows()).await
    }

    /// Product names in row order
    pub async fn item_names(&self) -> CartcheckResult<Vec<String>> {
        self.base.all_texts(&Self::cells(2).find("a")).await
    }

    /// Every product row, read column by column
    pub async fn lines(&self) -> CartcheckResult<Vec<CartLine>> {
        let names = self.item_names().await?;
        let models = self.base.all_texts(&Self::cells(3)).await?;
        let quantities = self.base.all_attributes(&Self::quantities(), "value").await?;
        let unit_prices = self.base.all_texts(&Self::cells(5)).await?;
        let totals = self.base.all_texts(&Self::cells(6)).await?;

        let column = |values: &[String], i: usize| values.get(i).cloned().unwrap_or_default();
        Ok(names
            .iter()
            .enumerate()
            .map(|(i, name)| CartLine {
                name: name.clone(),
                model: column(&models, i),
                quantity: column(&quantities, i),
                unit_price: column(&unit_prices, i),
                total: column(&totals, i),
            })
            .collect())
    }

    /// Row `index`, failing if the cart has fewer rows
    pub async fn line(&self, index: usize) -> CartcheckResult<CartLine> {
        self.lines()
            .await?
            .into_iter()
            .nth(index)
            .ok_or_else(|| CartcheckError::ElementNotFound {
                selector: Self::rows().nth(index).to_string(),
            })
    }

    /// Grand total
    pub async fn total(&self) -> CartcheckResult<String> {
        self.base
            .get_text(&Self::total_row("Total").last().find("td:last-child"))
            .await
    }

    /// Sub-total
    pub async fn sub_total(&self) -> CartcheckResult<String> {
        self.base
            .get_text(&Self::total_row("Sub-Total").first().find("td:last-child"))
            .await
    }

    /// Every two-cell totals row as `(label, amount)`, in display order
    pub async fn totals(&self) -> CartcheckResult<Vec<(String, String)>> {
        let value = self.base.evaluate_json(TOTALS_JS).await?;
        if value.is_null() {
            return Ok(Vec::new());
        }
        let rows: Vec<[String; 2]> = serde_json::from_value(value)?;
        Ok(rows.into_iter().map(|[label, amount]| (label, amount)).collect())
    }

    async fn row_key(&self, index: usize) -> CartcheckResult<String> {
        let input = Self::row_form(index).find("input[name='key']");
        self.base
            .attribute(&input, "value")
            .await?
            .ok_or_else(|| CartcheckError::ElementNotFound {
                selector: format!("{input} [value]"),
            })
    }

    async fn submit_row(&self, index: usize, action: &str, quantity: Option<u32>) -> CartcheckResult<AjaxOutcome> {
        let key = self.row_key(index).await?;
        let mut form = AjaxForm::new(format!(
            "#shopping-cart form:has(input[name='key'][value='{key}'])"
        ))
        .post_to(self.base.url(&route(action)))
        .reload(self.base.url(&route("checkout/cart|list")), "#shopping-cart");
        if let Some(quantity) = quantity {
            form = form.with_field("quantity", quantity.to_string());
        }
        let outcome = self.base.submit_ajax_form(&form).await?;
        match outcome.redirect.as_deref() {
            Some(redirect) => self.base.navigate(redirect).await?,
            None => self.base.wait_for_load_state(LoadState::NetworkIdle).await?,
        }
        Ok(outcome)
    }

    /// Change the quantity of row `index` through `checkout/cart|edit`
    pub async fn update_quantity(&self, index: usize, quantity: u32) -> CartcheckResult<AjaxOutcome> {
        tracing::debug!(index, quantity, "updating cart row");
        self.submit_row(index, "checkout/cart|edit", Some(quantity)).await
    }

    /// Remove row `index` through `checkout/cart|remove`
    pub async fn remove_item(&self, index: usize) -> CartcheckResult<AjaxOutcome> {
        tracing::debug!(index, "removing cart row");
        self.submit_row(index, "checkout/cart|remove", None).await
    }

    /// Follow Continue Shopping
    pub async fn continue_shopping(&self) -> CartcheckResult<()> {
        self.base
            .click(&Locator::new("#content a").with_text("Continue Shopping").first())
            .await?;
        self.base.wait_for_load_state(LoadState::NetworkIdle).await
    }

    /// Follow Checkout
    pub async fn proceed_to_checkout(&self) -> CartcheckResult<()> {
        self.base
            .click(&Locator::new("#content a.btn-primary").with_text("Checkout").first())
            .await?;
        self.base.wait_for_url("*route=checkout/checkout*").await?;
        self.base.wait_for_load_state(LoadState::NetworkIdle).await
    }

    /// Open the header mini-cart dropdown
    pub async fn open_header_cart(&self) -> CartcheckResult<()> {
        self.base
            .click(&Locator::new("#header-cart > div > button.btn-inverse").first())
            .await
    }

    /// Mini-cart dropdown → View Cart
    pub async fn view_cart_from_header(&self) -> CartcheckResult<()> {
        self.open_header_cart().await?;
        self.base
            .click(&Locator::new("#header-cart a").with_text("View Cart").first())
            .await?;
        self.base.wait_for_url("*route=checkout/cart*").await?;
        self.base.wait_for_load_state(LoadState::NetworkIdle).await
    }
}
