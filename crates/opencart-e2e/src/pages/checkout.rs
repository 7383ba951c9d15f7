//! Checkout page, plus the coupon and gift certificate forms that live on
//! the cart page.

use super::{route, CartPage};
use cartcheck::{
    expect, wait_until, AjaxForm, AjaxOutcome, BasePage, CartcheckError, CartcheckResult,
    LoadState, Locator, PageObject,
};
use serde::{Deserialize, Serialize};

/// Guest checkout form values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestDetails {
    /// First name
    pub firstname: String,
    /// Last name
    pub lastname: String,
    /// E-mail
    pub email: String,
    /// Shipping address line 1
    pub address_1: String,
    /// City
    pub city: String,
    /// Post code
    pub postcode: String,
    /// Country option label; empty leaves the default
    pub country: String,
    /// Region option label; empty leaves the default
    pub zone: String,
}

impl GuestDetails {
    /// A complete, valid US guest
    #[must_use]
    pub fn john_doe() -> Self {
        Self {
            firstname: "John".into(),
            lastname: "Doe".into(),
            email: "john.doe@test.com".into(),
            address_1: "123 Test St".into(),
            city: "New York".into(),
            postcode: "10001".into(),
            country: "United States".into(),
            zone: "New York".into(),
        }
    }
}

/// Result of applying a coupon or gift certificate code
#[derive(Debug, Clone, PartialEq)]
pub struct CodeOutcome {
    /// Server reply
    pub response: AjaxOutcome,
    /// Alert shown after the reply, empty if none
    pub alert: String,
    /// Cart totals before the code was applied
    pub totals_before: Vec<(String, String)>,
    /// Cart totals after the cart list was reloaded
    pub totals_after: Vec<(String, String)>,
}

impl CodeOutcome {
    /// The server accepted the code
    #[must_use]
    pub fn accepted(&self) -> bool {
        self.response.success().is_some() && !self.response.has_error()
    }

    /// A totals line whose label contains `label` appeared
    #[must_use]
    pub fn added_total_line(&self, label: &str) -> bool {
        let has = |totals: &[(String, String)]| totals.iter().any(|(l, _)| l.contains(label));
        !has(&self.totals_before) && has(&self.totals_after)
    }

    /// Amount of the totals line labelled `label` after applying
    #[must_use]
    pub fn total_after(&self, label: &str) -> Option<&str> {
        self.totals_after
            .iter()
            .find(|(l, _)| l.trim_end_matches(':') == label)
            .map(|(_, amount)| amount.as_str())
    }
}

/// Accordion on the cart page that holds a code form
#[derive(Debug, Clone, Copy)]
struct CodeForm {
    toggle: &'static str,
    panel: &'static str,
    input: &'static str,
    form: &'static str,
}

const COUPON: CodeForm = CodeForm {
    toggle: "Use Coupon Code",
    panel: "#collapse-coupon",
    input: "#input-coupon",
    form: "#form-coupon",
};

const VOUCHER: CodeForm = CodeForm {
    toggle: "Use Gift Certificate",
    panel: "#collapse-voucher",
    input: "#input-voucher",
    form: "#form-voucher",
};

/// `checkout/checkout`
#[derive(Debug, Clone)]
pub struct CheckoutPage {
    base: BasePage,
}

impl PageObject for CheckoutPage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    fn path(&self) -> String {
        route("checkout/checkout")
    }

    fn page_name(&self) -> &'static str {
        "checkout"
    }
}

impl CheckoutPage {
    /// Checkout page driven by `base`
    #[must_use]
    pub const fn new(base: BasePage) -> Self {
        Self { base }
    }

    fn cart(&self) -> CartPage {
        CartPage::new(self.base.clone())
    }

    /// Navigate to the cart page, where the code forms are
    pub async fn open_cart(&self) -> CartcheckResult<()> {
        self.cart().open().await
    }

    fn legend(text: &str) -> Locator {
        Locator::new("fieldset legend").with_text(text).first()
    }

    fn password_fieldset() -> Locator {
        Locator::new("#form-register fieldset").with_text("Your Password")
    }

    fn alert() -> Locator {
        Locator::new("#alert .alert").first()
    }

    // -- template ----------------------------------------------------------

    /// Heading, personal details and shipping fieldsets, account radios,
    /// name and e-mail inputs, continue button and order summary
    pub async fn verify_all_checkout_elements_visible(&self) -> CartcheckResult<()> {
        expect(&self.base, "#content h1").to_contain_text("Checkout").await?;
        expect(&self.base, Self::legend("Your Personal Details"))
            .to_be_visible()
            .await?;
        expect(&self.base, Locator::new("#shipping-address legend").with_text("Shipping Address"))
            .to_be_visible()
            .await?;
        for css in [
            "#input-guest",
            "#input-register",
            "#input-firstname",
            "#input-lastname",
            "#input-email",
            "#button-register",
            "#checkout-confirm table",
        ] {
            expect(&self.base, css).to_be_visible().await?;
        }
        Ok(())
    }

    /// Checkout heading
    pub async fn heading_text(&self) -> CartcheckResult<String> {
        self.base.get_text(&Locator::new("#content h1")).await
    }

    /// Choose Guest Checkout
    pub async fn select_guest_checkout(&self) -> CartcheckResult<()> {
        self.base.check(&Locator::new("#input-guest")).await
    }

    /// Choose Register Account
    pub async fn select_register_account(&self) -> CartcheckResult<()> {
        self.base.check(&Locator::new("#input-register")).await
    }

    /// Whether the password fieldset is shown (register mode only)
    pub async fn is_password_section_visible(&self) -> CartcheckResult<bool> {
        self.base.is_visible(&Self::password_fieldset()).await
    }

    /// Wait for the password fieldset to disappear
    pub async fn verify_password_section_hidden(&self) -> CartcheckResult<()> {
        expect(&self.base, Self::password_fieldset()).to_be_hidden().await
    }

    // -- guest form --------------------------------------------------------

    async fn select_when_loaded(&self, css: &str, label: &str) -> CartcheckResult<()> {
        let select = Locator::new(css);
        let policy = *self.base.policy();
        let what = format!("option \"{label}\" in {css}");
        let select = &select;
        wait_until(&what, policy.timeout, policy.poll_interval, move || async move {
            match self.base.select_option(select, label).await {
                Ok(()) => Ok(Some(())),
                // zone options arrive over AJAX after the country changes
                Err(CartcheckError::ElementNotFound { .. }) => Ok(None),
                Err(other) => Err(other),
            }
        })
        .await
    }

    /// Fill the guest form; country and zone are chosen by label
    pub async fn fill_guest_details(&self, details: &GuestDetails) -> CartcheckResult<()> {
        for (css, value) in [
            ("#input-firstname", &details.firstname),
            ("#input-lastname", &details.lastname),
            ("#input-email", &details.email),
            ("#input-shipping-address-1", &details.address_1),
            ("#input-shipping-city", &details.city),
            ("#input-shipping-postcode", &details.postcode),
        ] {
            self.base.fill(&Locator::new(css), value).await?;
        }
        if !details.country.is_empty() {
            self.select_when_loaded("#input-shipping-country", &details.country)
                .await?;
        }
        if !details.zone.is_empty() {
            self.select_when_loaded("#input-shipping-zone", &details.zone)
                .await?;
        }
        Ok(())
    }

    /// Submit the details to `checkout/register|save`, following any
    /// redirect in the reply
    pub async fn submit_details(&self) -> CartcheckResult<AjaxOutcome> {
        let form = AjaxForm::new("#form-register")
            .post_to(self.base.url(&route("checkout/register|save")));
        let outcome = self.base.submit_ajax_form(&form).await?;
        match outcome.redirect.as_deref() {
            Some(redirect) => self.base.navigate(redirect).await?,
            None => self.base.wait_for_load_state(LoadState::NetworkIdle).await?,
        }
        Ok(outcome)
    }

    /// Visible, non-empty field error messages
    pub async fn validation_errors(&self) -> CartcheckResult<Vec<String>> {
        let errors = self
            .base
            .all_texts(&Locator::new(".invalid-feedback.d-block"))
            .await?;
        Ok(errors.into_iter().filter(|e| !e.is_empty()).collect())
    }

    /// Text of the first alert, empty if none
    pub async fn alert_text(&self) -> CartcheckResult<String> {
        if self.base.count(&Self::alert()).await? == 0 {
            return Ok(String::new());
        }
        self.base.get_text(&Self::alert()).await
    }

    /// Whether a success alert is present
    pub async fn has_success_alert(&self) -> CartcheckResult<bool> {
        Ok(self.base.count(&Locator::new(".alert-success")).await? > 0)
    }

    /// Whether a danger alert is present
    pub async fn has_danger_alert(&self) -> CartcheckResult<bool> {
        Ok(self.base.count(&Locator::new(".alert-danger")).await? > 0)
    }

    // -- order summary -----------------------------------------------------

    /// Product names listed in the order summary
    pub async fn order_summary_names(&self) -> CartcheckResult<Vec<String>> {
        self.base
            .all_texts(&Locator::new("#checkout-confirm tbody a"))
            .await
    }

    /// Grand total of the order summary
    pub async fn order_summary_total(&self) -> CartcheckResult<String> {
        let row = Locator::new("#checkout-confirm tfoot tr").with_text("Total").last();
        self.base.get_text(&row.find("td:last-child")).await
    }

    /// On the success page, or the heading says the order was placed
    pub async fn is_order_confirmed(&self) -> CartcheckResult<bool> {
        let url = self.base.current_url().await?;
        if url.to_lowercase().contains("success") {
            return Ok(true);
        }
        let heading = self.heading_text().await?;
        Ok(heading.to_lowercase().contains("your order has been placed"))
    }

    /// Whether the shipping method chooser has been unlocked, which the
    /// store only does once the address is saved
    pub async fn is_shipping_method_ready(&self) -> CartcheckResult<bool> {
        let button = Locator::new("#button-shipping-methods:not([disabled])");
        Ok(self.base.count(&button).await? > 0)
    }

    /// Whether the store positively accepted submitted details: the reply
    /// carried a `success` message, the shipping method step unlocked, or
    /// the order went through. A reply with an `error` is never accepted.
    pub async fn is_details_accepted(&self, outcome: &AjaxOutcome) -> CartcheckResult<bool> {
        if outcome.has_error() {
            return Ok(false);
        }
        if outcome.success().is_some() || self.has_success_alert().await? {
            return Ok(true);
        }
        if self.is_shipping_method_ready().await? {
            return Ok(true);
        }
        self.is_order_confirmed().await
    }

    /// Checkout bounced to the cart, which says it is empty
    pub async fn is_cart_empty_redirect(&self) -> CartcheckResult<bool> {
        let url = self.base.current_url().await?;
        if !url.to_lowercase().contains("cart") {
            return Ok(false);
        }
        let notice = Locator::new("#content p").first();
        if self.base.count(&notice).await? == 0 {
            return Ok(false);
        }
        Ok(self.base.get_text(&notice).await?.to_lowercase().contains("empty"))
    }

    // -- coupon and gift certificate (cart page) ---------------------------

    /// Cart totals as `(label, amount)` pairs
    pub async fn cart_totals(&self) -> CartcheckResult<Vec<(String, String)>> {
        self.cart().totals().await
    }

    async fn expand(&self, code_form: CodeForm) -> CartcheckResult<()> {
        let panel = Locator::new(code_form.panel);
        if !self.base.is_visible(&panel).await? {
            self.base
                .click(&Locator::new("button").with_text(code_form.toggle).first())
                .await?;
        }
        expect(&self.base, Locator::new(code_form.input))
            .to_be_visible()
            .await
    }

    async fn verify_code_form(&self, code_form: CodeForm) -> CartcheckResult<()> {
        self.expand(code_form).await?;
        expect(
            &self.base,
            Locator::new(format!("{} button[type='submit']", code_form.form)),
        )
        .to_be_visible()
        .await
    }

    async fn apply_code(&self, code_form: CodeForm, code: &str) -> CartcheckResult<CodeOutcome> {
        self.expand(code_form).await?;
        let totals_before = self.cart_totals().await?;
        self.base.fill(&Locator::new(code_form.input), code).await?;
        let form = AjaxForm::new(code_form.form)
            .reload(self.base.url(&route("checkout/cart|list")), "#shopping-cart");
        let response = self.base.submit_ajax_form(&form).await?;
        self.base.wait_for_load_state(LoadState::NetworkIdle).await?;
        let alert = self.alert_text().await?;
        let totals_after = self.cart_totals().await?;
        tracing::debug!(form = code_form.form, code, alert = %alert, "code applied");
        Ok(CodeOutcome {
            response,
            alert,
            totals_before,
            totals_after,
        })
    }

    /// The coupon accordion opens onto its input and apply button
    pub async fn verify_coupon_form_visible(&self) -> CartcheckResult<()> {
        self.verify_code_form(COUPON).await
    }

    /// The gift certificate accordion opens onto its input and apply button
    pub async fn verify_gift_form_visible(&self) -> CartcheckResult<()> {
        self.verify_code_form(VOUCHER).await
    }

    /// Apply a coupon code on the cart page
    pub async fn apply_coupon(&self, code: &str) -> CartcheckResult<CodeOutcome> {
        self.apply_code(COUPON, code).await
    }

    /// Apply a gift certificate code on the cart page
    pub async fn apply_gift_certificate(&self, code: &str) -> CartcheckResult<CodeOutcome> {
        self.apply_code(VOUCHER, code).await
    }
}
