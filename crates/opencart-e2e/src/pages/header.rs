//! Storefront header shared by every page: search box, My Account menu,
//! currency switcher, logo and mini-cart.

use cartcheck::{AjaxForm, AjaxOutcome, BasePage, CartcheckResult, ElementState, LoadState, Locator};

/// Header component
#[derive(Debug, Clone)]
pub struct Header {
    base: BasePage,
}

impl Header {
    /// Header of the page driven by `base`
    #[must_use]
    pub const fn new(base: BasePage) -> Self {
        Self { base }
    }

    fn search_input() -> Locator {
        Locator::new("#search input[name='search']")
    }

    fn search_button() -> Locator {
        Locator::new("#search button")
    }

    fn account_menu() -> Locator {
        Locator::new("#top a.dropdown-toggle").with_text("My Account").first()
    }

    fn account_item(name: &str) -> Locator {
        Locator::new("#top .dropdown-menu a.dropdown-item")
            .with_text(name)
            .first()
    }

    fn currency_toggle() -> Locator {
        Locator::new("#form-currency .dropdown-toggle").first()
    }

    fn currency_option(code: &str) -> Locator {
        Locator::new(format!("#form-currency a[href='{code}']"))
    }

    fn logo() -> Locator {
        Locator::new("#logo")
    }

    fn cart_button() -> Locator {
        Locator::new("#header-cart button").first()
    }

    /// Search the catalogue from the header box and wait for the results
    pub async fn search(&self, keyword: &str) -> CartcheckResult<()> {
        tracing::debug!(keyword, "header search");
        self.base.fill(&Self::search_input(), keyword).await?;
        self.base.click(&Self::search_button()).await?;
        self.base.wait_for_url("*route=product/search*").await?;
        self.base.wait_for_load_state(LoadState::NetworkIdle).await
    }

    /// Expand the My Account dropdown
    pub async fn open_account_menu(&self) -> CartcheckResult<()> {
        self.base.click(&Self::account_menu()).await
    }

    async fn account_action(&self, item: &str, route: &str) -> CartcheckResult<()> {
        self.open_account_menu().await?;
        self.base.click(&Self::account_item(item)).await?;
        self.base.wait_for_url(format!("*route={route}*").as_str()).await?;
        self.base.wait_for_load_state(LoadState::NetworkIdle).await
    }

    /// My Account → Register
    pub async fn go_to_register(&self) -> CartcheckResult<()> {
        self.account_action("Register", "account/register").await
    }

    /// My Account → Login
    pub async fn go_to_login(&self) -> CartcheckResult<()> {
        self.account_action("Login", "account/login").await
    }

    /// My Account → Logout
    pub async fn logout(&self) -> CartcheckResult<()> {
        self.account_action("Logout", "account/logout").await
    }

    /// Whether the Logout item is present in the account menu
    pub async fn is_logged_in(&self) -> CartcheckResult<bool> {
        Ok(self.base.count(&Self::account_item("Logout")).await? > 0)
    }

    /// Switch the store currency through the `#form-currency` dropdown,
    /// then reload the current page so prices are re-rendered.
    ///
    /// The returned outcome is the reply to the form post; the store
    /// answers with a redirect, so `status` is the followed page's.
    pub async fn switch_currency(&self, code: &str) -> CartcheckResult<AjaxOutcome> {
        tracing::debug!(code, "switching currency");
        self.base.click(&Self::currency_toggle()).await?;
        self.base
            .wait_for(&Self::currency_option(code), ElementState::Visible)
            .await?;
        let outcome = self
            .base
            .submit_ajax_form(&AjaxForm::new("#form-currency").with_field("code", code))
            .await?;
        self.base.reload().await?;
        Ok(outcome)
    }

    /// Symbol shown on the currency dropdown, e.g. `$`
    pub async fn currency_symbol(&self) -> CartcheckResult<String> {
        let symbol = Self::currency_toggle().find("strong");
        Ok(self.base.get_text(&symbol).await?.trim().to_string())
    }

    /// Whether the store logo is shown
    pub async fn is_logo_visible(&self) -> CartcheckResult<bool> {
        self.base.is_visible(&Self::logo()).await
    }

    /// Mini-cart button label, e.g. `1 item(s) - $602.00`
    pub async fn cart_text(&self) -> CartcheckResult<String> {
        self.base.wait_for(&Self::cart_button(), ElementState::Visible).await?;
        self.base.get_text(&Self::cart_button()).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pages::testing::{last_script, mock, page};
    use serde_json::json;

    #[tokio::test]
    async fn test_search_fills_and_submits() {
        let driver = mock();
        driver.set_current_url("http://localhost/index.php?route=product/search&search=iPhone");
        let header = Header::new(page(&driver));
        header.search("iPhone").await.unwrap();
        let scripts = driver.scripts();
        let fill = scripts.iter().position(|s| s.starts_with("/*fill*/")).unwrap();
        let click = scripts.iter().position(|s| s.starts_with("/*click*/")).unwrap();
        assert!(fill < click);
        assert!(scripts[fill].contains("\"iPhone\""));
        assert!(scripts[click].contains("#search button"));
    }

    #[tokio::test]
    async fn test_go_to_login_uses_account_menu() {
        let driver = mock();
        driver.set_current_url("http://localhost/index.php?route=account/login&language=en-gb");
        let header = Header::new(page(&driver));
        header.go_to_login().await.unwrap();
        let clicks: Vec<_> = driver
            .scripts()
            .into_iter()
            .filter(|s| s.starts_with("/*click*/"))
            .collect();
        assert_eq!(clicks.len(), 2);
        assert!(clicks[0].contains("My Account"));
        assert!(clicks[1].contains("\"Login\""));
    }

    #[tokio::test]
    async fn test_cart_text() {
        let driver = mock();
        driver.on_script(
            &["/*text*/", "#header-cart button"],
            json!({ "ok": true, "value": "1 item(s) - $602.00" }),
        );
        let header = Header::new(page(&driver));
        assert_eq!(header.cart_text().await.unwrap(), "1 item(s) - $602.00");
    }

    #[tokio::test]
    async fn test_switch_currency_posts_code_then_reloads() {
        let driver = mock();
        driver.set_current_url("http://localhost/index.php?route=common/home&language=en-gb");
        driver.on_script(
            &["/*ajax-submit*/", "#form-currency"],
            json!({
                "ok": true,
                "url": "http://localhost/index.php?route=common/home&language=en-gb",
                "status": 200,
                "contentType": "text/html; charset=utf-8",
                "json": {}
            }),
        );
        let header = Header::new(page(&driver));
        let outcome = header.switch_currency("EUR").await.unwrap();
        assert_eq!(outcome.status, 200);

        let scripts = driver.scripts();
        let toggle = scripts
            .iter()
            .position(|s| s.starts_with("/*click*/") && s.contains("#form-currency .dropdown-toggle"))
            .unwrap();
        let submit = scripts.iter().position(|s| s.starts_with("/*ajax-submit*/")).unwrap();
        assert!(toggle < submit);
        assert!(scripts[submit].contains(r#"["code","EUR"]"#));
        assert!(driver.was_called("navigate:http://localhost/index.php?route=common/home&language=en-gb"));
    }

    #[tokio::test]
    async fn test_unknown_currency_times_out() {
        let driver = mock();
        driver.on_script(&["/*probe*/", "a[href='XYZ']"], json!({ "count": 0, "visible": 0 }));
        let header = Header::new(page(&driver));
        let err = header.switch_currency("XYZ").await.unwrap_err();
        assert!(err.is_timeout(), "{err}");
        assert!(last_script(&driver, "/*ajax-submit*/").is_none());
    }

    #[tokio::test]
    async fn test_currency_symbol() {
        let driver = mock();
        driver.on_script(
            &["/*text*/", "#form-currency"],
            json!({ "ok": true, "value": " € " }),
        );
        let header = Header::new(page(&driver));
        assert_eq!(header.currency_symbol().await.unwrap(), "€");
    }

    #[tokio::test]
    async fn test_logged_out_menu() {
        let driver = mock();
        driver.on_script(&["/*probe*/", "Logout"], json!({ "count": 0, "visible": 0 }));
        let header = Header::new(page(&driver));
        assert!(!header.is_logged_in().await.unwrap());
        assert!(header.is_logo_visible().await.unwrap());
    }
}
