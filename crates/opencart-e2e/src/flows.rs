//! Multi-page setup steps shared by several suites, and the per-test entry
//! point the live suites go through.

use crate::data::{unique_email, VALID_USER};
use crate::pages::{ProductPage, RegisterPage, Registration};
use cartcheck::{AjaxOutcome, Assertion, BasePage, CartcheckError, CartcheckResult, PageObject, Scenario};
use std::future::Future;

/// Product id of the demo MacBook
pub const MACBOOK_ID: u32 = 43;

/// Open product `product_id` and add one to the cart
///
/// # Errors
///
/// Returns `AssertionFailed` if the store did not confirm the add
pub async fn add_product_to_cart(base: &BasePage, product_id: u32) -> CartcheckResult<AjaxOutcome> {
    let product = ProductPage::for_product(base.clone(), product_id);
    product.open().await?;
    let outcome = product.add_to_cart().await?;
    Assertion::is_true(
        outcome.success().is_some(),
        &format!("adding product {product_id} to the cart was not confirmed: {}", outcome.json),
    )?;
    tracing::debug!(product_id, "product in cart");
    Ok(outcome)
}

/// Put one MacBook in the cart
///
/// # Errors
///
/// Returns `AssertionFailed` if the store did not confirm the add
pub async fn add_macbook_to_cart(base: &BasePage) -> CartcheckResult<AjaxOutcome> {
    add_product_to_cart(base, MACBOOK_ID).await
}

/// Register a new account named after [`VALID_USER`] with a unique e-mail
/// derived from `prefix`. The customer is left logged in.
///
/// # Errors
///
/// Returns `AssertionFailed` if the store did not reach `account/success`
pub async fn register_fresh_user(base: &BasePage, prefix: &str) -> CartcheckResult<Registration> {
    let page = RegisterPage::new(base.clone());
    let registration = Registration::new(
        VALID_USER.first_name,
        VALID_USER.last_name,
        &unique_email(prefix),
        VALID_USER.password,
    );
    page.open_via_menu().await?;
    page.register(&registration).await?;
    Assertion::is_true(
        page.is_registration_successful().await?,
        &format!("registering {} did not reach account/success", registration.email),
    )?;
    tracing::info!(email = %registration.email, "registered fresh customer");
    Ok(registration)
}

/// [`register_fresh_user`], then log out so the account can be used from
/// the login page
///
/// # Errors
///
/// Returns `AssertionFailed` if registration failed
pub async fn register_and_logout(base: &BasePage, prefix: &str) -> CartcheckResult<Registration> {
    let registration = register_fresh_user(base, prefix).await?;
    RegisterPage::new(base.clone()).logout().await?;
    Ok(registration)
}

/// Run `case` for every data row, carrying on past failures, then fail
/// once naming every row that failed.
///
/// # Errors
///
/// Returns `AssertionFailed` listing each failed case id with its error
pub async fn run_rows<'r, R, F, Fut>(suite: &str, rows: &'r [R], mut case: F) -> CartcheckResult<()>
where
    R: Scenario,
    F: FnMut(&'r R) -> Fut,
    Fut: Future<Output = CartcheckResult<()>>,
{
    let mut failed_ids = Vec::new();
    let mut errors = Vec::new();
    for row in rows {
        if let Err(e) = case(row).await {
            tracing::error!(suite, case = row.case_id(), error = %e, "data row failed");
            failed_ids.push(row.case_id());
            errors.push(format!("{}: {e}", row.case_id()));
        }
    }
    if failed_ids.is_empty() {
        return Ok(());
    }
    tracing::error!(suite, failed = ?failed_ids, total = rows.len(), "data rows failed");
    Err(CartcheckError::assertion(
        format!(
            "{suite}: {} of {} rows failed: {}",
            failed_ids.len(),
            rows.len(),
            failed_ids.join(", ")
        ),
        "every row passes",
        errors,
    ))
}

/// Run one live test case: init logging, read settings, skip if the marker
/// expression deselects it, otherwise launch a fresh browser and run `body`
/// in a [`Session`](cartcheck::Session) that captures artifacts on failure.
///
/// # Errors
///
/// Returns the body's error, `Config`/`InvalidMarker` for bad settings, or
/// `BrowserLaunch`
#[cfg(feature = "browser")]
pub async fn run_case<F, Fut>(
    test_id: &str,
    markers: &[cartcheck::Marker],
    body: F,
) -> CartcheckResult<()>
where
    F: FnOnce(BasePage) -> Fut,
    Fut: Future<Output = CartcheckResult<()>>,
{
    use cartcheck::{Session, Settings, TestInfo};

    cartcheck::logging::init();
    let settings = Settings::from_env()?;
    let info = TestInfo::new(test_id).with_markers(markers);
    if !info.is_selected(&settings)? {
        tracing::info!(test = test_id, "deselected by marker expression");
        return Ok(());
    }
    Session::launch(settings, info).await?.run(body).await
}
