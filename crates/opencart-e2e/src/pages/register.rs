//! Account registration page.
//!
//! The form posts over AJAX: on error the reply is written back into the
//! DOM as field messages and a warning alert, on success the reply carries
//! a redirect to `account/success`.

use super::{field_error_texts, page_alert_text, route, Header, FEEDBACK_WAIT};
use cartcheck::{
    expect, AjaxForm, AjaxOutcome, BasePage, CartcheckResult, LoadState, Locator, PageObject,
    UrlPattern,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SUCCESS_URL: &str = "*route=account/success*";
const REDIRECT_WAIT: Duration = Duration::from_secs(10);

/// Values typed into the registration form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// E-mail
    pub email: String,
    /// Password
    pub password: String,
    /// Tick the privacy policy checkbox
    pub agree_privacy: bool,
}

impl Registration {
    /// A registration that agrees to the privacy policy
    #[must_use]
    pub fn new(first_name: &str, last_name: &str, email: &str, password: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            agree_privacy: true,
        }
    }

    /// Leave the privacy policy unticked
    #[must_use]
    pub const fn without_privacy(mut self) -> Self {
        self.agree_privacy = false;
        self
    }
}

/// `account/register`
#[derive(Debug, Clone)]
pub struct RegisterPage {
    base: BasePage,
}

impl PageObject for RegisterPage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    fn path(&self) -> String {
        route("account/register")
    }

    fn page_name(&self) -> &'static str {
        "register"
    }
}

impl RegisterPage {
    /// Register page driven by `base`
    #[must_use]
    pub const fn new(base: BasePage) -> Self {
        Self { base }
    }

    /// Shared header
    #[must_use]
    pub fn header(&self) -> Header {
        Header::new(self.base.clone())
    }

    fn agree_checkbox() -> Locator {
        Locator::new("#form-register input[name='agree']")
    }

    /// Go home, then My Account > Register, so the form token is issued
    /// to this session
    pub async fn open_via_menu(&self) -> CartcheckResult<()> {
        self.base.navigate(&route("common/home")).await?;
        self.header().go_to_register().await?;
        self.base.wait_for_load_state(LoadState::NetworkIdle).await
    }

    /// Name, e-mail and password inputs, privacy checkbox and Continue
    pub async fn verify_all_fields_visible(&self) -> CartcheckResult<()> {
        for css in [
            "#input-firstname",
            "#input-lastname",
            "#input-email",
            "#input-password",
        ] {
            expect(&self.base, css).to_be_visible().await?;
        }
        expect(&self.base, Self::agree_checkbox()).to_be_visible().await?;
        expect(
            &self.base,
            Locator::role("button", Some("Continue")).within(Locator::new("#form-register")),
        )
        .to_be_visible()
        .await
    }

    /// Fill and submit the form, then follow the redirect if registration
    /// went through
    pub async fn register(&self, registration: &Registration) -> CartcheckResult<AjaxOutcome> {
        tracing::debug!(email = %registration.email, agree = registration.agree_privacy, "registering");
        for (css, value) in [
            ("#input-firstname", &registration.first_name),
            ("#input-lastname", &registration.last_name),
            ("#input-email", &registration.email),
            ("#input-password", &registration.password),
        ] {
            self.base.fill(&Locator::new(css), value).await?;
        }
        if registration.agree_privacy {
            self.base.check(&Self::agree_checkbox()).await?;
        }
        let outcome = self
            .base
            .submit_ajax_form(&AjaxForm::new("#form-register"))
            .await?;
        if let Some(ref redirect) = outcome.redirect {
            self.base.navigate(redirect).await?;
        }
        self.base.wait_for_load_state(LoadState::NetworkIdle).await?;
        Ok(outcome)
    }

    /// Whether the browser reached `account/success`
    pub async fn is_registration_successful(&self) -> CartcheckResult<bool> {
        let pattern = UrlPattern::from(SUCCESS_URL);
        match self.base.wait_for_url_within(&pattern, REDIRECT_WAIT).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_timeout() => {
                let url = self.base.current_url().await?;
                Ok(url.contains("route=account/success"))
            }
            Err(e) => Err(e),
        }
    }

    /// Page-level warning, e.g. duplicate e-mail or missing privacy consent
    pub async fn error_message(&self) -> CartcheckResult<String> {
        page_alert_text(&self.base, FEEDBACK_WAIT).await
    }

    /// Field-level validation messages
    pub async fn field_errors(&self) -> CartcheckResult<Vec<String>> {
        field_error_texts(&self.base, FEEDBACK_WAIT).await
    }

    /// Log out if registration left the customer logged in
    pub async fn logout(&self) -> CartcheckResult<()> {
        self.base.navigate(&route("common/home")).await?;
        let header = self.header();
        header.open_account_menu().await?;
        if header.is_logged_in().await? {
            header.logout().await?;
            self.base.wait_for_load_state(LoadState::NetworkIdle).await?;
        } else {
            tracing::debug!("not logged in, skipping logout");
        }
        Ok(())
    }
}
