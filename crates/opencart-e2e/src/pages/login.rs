//! Customer login page, the account dashboard it leads to and the logout
//! confirmation.

use super::{page_alert_text, route, Header, FEEDBACK_WAIT};
use cartcheck::{
    expect, BasePage, CartcheckResult, ElementState, LoadState, Locator, PageObject, UrlPattern,
};
use std::time::Duration;

/// A successful login redirects here, with a `customer_token` appended
const ACCOUNT_URL: &str = "*route=account/account*";
const REDIRECT_WAIT: Duration = Duration::from_secs(10);
const LOGOUT_WAIT: Duration = Duration::from_secs(5);

/// `account/login`
#[derive(Debug, Clone)]
pub struct LoginPage {
    base: BasePage,
}

impl PageObject for LoginPage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    fn path(&self) -> String {
        route("account/login")
    }

    fn page_name(&self) -> &'static str {
        "login"
    }
}

impl LoginPage {
    /// Login page driven by `base`
    #[must_use]
    pub const fn new(base: BasePage) -> Self {
        Self { base }
    }

    /// Shared header
    #[must_use]
    pub fn header(&self) -> Header {
        Header::new(self.base.clone())
    }

    fn email_input() -> Locator {
        Locator::placeholder("E-Mail Address")
    }

    fn password_input() -> Locator {
        Locator::placeholder("Password")
    }

    fn login_button() -> Locator {
        Locator::role("button", Some("Login")).within(Locator::new("#form-login"))
    }

    fn forgotten_link() -> Locator {
        Locator::role("link", Some("Forgotten Password")).within(Locator::new("#form-login"))
    }

    /// Go home, then My Account > Login, so the session cookie is set the
    /// way a shopper gets it
    pub async fn open_via_menu(&self) -> CartcheckResult<()> {
        self.base.navigate(&route("common/home")).await?;
        self.header().go_to_login().await?;
        self.base.wait_for_load_state(LoadState::NetworkIdle).await
    }

    /// Returning Customer block, then the New Customer block
    pub async fn verify_all_fields_visible(&self) -> CartcheckResult<()> {
        let returning = [
            Locator::role("heading", Some("Returning Customer")),
            Locator::text("I am a returning customer"),
            Locator::new("#form-login div").with_text("E-Mail Address").first(),
            Self::email_input(),
            Locator::exact_text("Password").first(),
            Self::password_input(),
            Self::forgotten_link(),
            Self::login_button(),
        ];
        for locator in returning {
            expect(&self.base, locator).to_be_visible().await?;
        }
        expect(&self.base, Locator::new("p").with_text("Register Account").first())
            .to_be_visible()
            .await?;
        expect(&self.base, Locator::text("By creating an account you"))
            .to_be_visible()
            .await
    }

    /// Fill the credentials and submit
    pub async fn login(&self, email: &str, password: &str) -> CartcheckResult<()> {
        tracing::debug!(email, "logging in");
        self.base.fill(&Self::email_input(), email).await?;
        self.base.fill(&Self::password_input(), password).await?;
        self.base.click(&Self::login_button()).await?;
        self.base.wait_for_load_state(LoadState::NetworkIdle).await
    }

    /// Whether the browser reached the account dashboard
    pub async fn is_login_successful(&self) -> CartcheckResult<bool> {
        let pattern = UrlPattern::from(ACCOUNT_URL);
        match self.base.wait_for_url_within(&pattern, REDIRECT_WAIT).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_timeout() => {
                let url = self.base.current_url().await?;
                Ok(url.contains("route=account/account"))
            }
            Err(e) => Err(e),
        }
    }

    /// Warning shown for rejected credentials, empty if none appeared
    pub async fn error_message(&self) -> CartcheckResult<String> {
        page_alert_text(&self.base, FEEDBACK_WAIT).await
    }

    /// Dashboard heading after a successful login
    pub async fn verify_my_account_heading_visible(&self) -> CartcheckResult<()> {
        let heading = Locator::role("heading", Some("My Account")).within(Locator::new("#content"));
        expect(&self.base, heading.first()).to_be_visible().await
    }

    /// Follow the Forgotten Password link
    pub async fn click_forgotten_password(&self) -> CartcheckResult<()> {
        self.base.click(&Self::forgotten_link()).await?;
        self.base.wait_for_load_state(LoadState::NetworkIdle).await
    }

    /// Log out through the My Account menu
    pub async fn logout(&self) -> CartcheckResult<()> {
        self.base.navigate(&route("common/home")).await?;
        self.header().logout().await?;
        self.base.wait_for_load_state(LoadState::NetworkIdle).await
    }

    /// Whether the Account Logout confirmation is showing
    pub async fn is_logout_successful(&self) -> CartcheckResult<bool> {
        let heading = Locator::new("#content h1");
        let visible = self
            .base
            .clone()
            .with_policy(self.base.policy().with_timeout(LOGOUT_WAIT))
            .wait_for(&heading, ElementState::Visible)
            .await;
        match visible {
            Ok(()) => {}
            Err(e) if e.is_timeout() => return Ok(false),
            Err(e) => return Err(e),
        }
        let text = self.base.get_text(&heading).await?;
        Ok(text.to_lowercase().contains("logout"))
    }

    /// Account Logout heading and its Continue link
    pub async fn verify_logout_page(&self) -> CartcheckResult<()> {
        expect(&self.base, Locator::role("heading", Some("Account Logout")))
            .to_be_visible()
            .await?;
        expect(
            &self.base,
            Locator::role("link", Some("Continue")).within(Locator::new("#content")),
        )
        .to_be_visible()
        .await
    }
}
