//! Checkout suite: template, guest details, empty-cart redirect and the
//! coupon and gift certificate forms on the cart page.

use cartcheck::{Assertion, CartcheckResult, Marker, PageObject};
use opencart_e2e::data::checkout_rows;
use opencart_e2e::flows::{add_macbook_to_cart, run_case, run_rows};
use opencart_e2e::pages::{parse_price, CheckoutPage, GuestDetails};

const MARKERS: &[Marker] = &[Marker::Checkout, Marker::Regression];

/// Demo store coupon: 10% off the order
const DEMO_COUPON: &str = "2222";

// =============================================================================
// Template
// =============================================================================

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_all_checkout_elements_visible() -> CartcheckResult<()> {
    run_case("checkout::all_checkout_elements_visible", MARKERS, |page| async move {
        add_macbook_to_cart(&page).await?;
        let checkout = CheckoutPage::new(page);
        checkout.open().await?;
        checkout.verify_all_checkout_elements_visible().await
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_order_summary_lists_cart_product() -> CartcheckResult<()> {
    run_case("checkout::order_summary_lists_cart_product", MARKERS, |page| async move {
        add_macbook_to_cart(&page).await?;
        let checkout = CheckoutPage::new(page);
        checkout.open().await?;
        let names = checkout.order_summary_names().await?;
        Assertion::is_true(
            names.iter().any(|n| n.contains("MacBook")),
            &format!("order summary lists MacBook, got {names:?}"),
        )?;
        let total = checkout.order_summary_total().await?;
        Assertion::is_true(total.starts_with('$'), &format!("summary total {total:?} is a price"))
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_account_mode_toggles_password_section() -> CartcheckResult<()> {
    run_case("checkout::account_mode_toggles_password", MARKERS, |page| async move {
        add_macbook_to_cart(&page).await?;
        let checkout = CheckoutPage::new(page);
        checkout.open().await?;
        checkout.select_register_account().await?;
        Assertion::is_true(
            checkout.is_password_section_visible().await?,
            "register mode shows the password fieldset",
        )?;
        checkout.select_guest_checkout().await?;
        checkout.verify_password_section_hidden().await
    })
    .await
}

// =============================================================================
// Guest details
// =============================================================================

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_guest_details_accepted() -> CartcheckResult<()> {
    run_case("checkout::guest_details_accepted", &[Marker::Checkout, Marker::Smoke], |page| async move {
        add_macbook_to_cart(&page).await?;
        let checkout = CheckoutPage::new(page);
        checkout.open().await?;
        checkout.select_guest_checkout().await?;
        checkout.fill_guest_details(&GuestDetails::john_doe()).await?;
        let outcome = checkout.submit_details().await?;
        let errors = checkout.validation_errors().await?;
        Assertion::is_true(errors.is_empty(), &format!("no field errors, got {errors:?}"))?;
        Assertion::is_true(!checkout.has_danger_alert().await?, "no warning alert")?;
        Assertion::is_true(
            checkout.is_details_accepted(&outcome).await?,
            &format!("store accepted the details: {}", outcome.json),
        )
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_guest_details_from_csv() -> CartcheckResult<()> {
    run_rows("checkout", checkout_rows()?, |row| async move {
        run_case(&format!("checkout::{}", row.test_id), MARKERS, move |page| async move {
            let id = &row.test_id;
            add_macbook_to_cart(&page).await?;
            let checkout = CheckoutPage::new(page);
            checkout.open().await?;
            checkout.select_guest_checkout().await?;
            checkout.fill_guest_details(&row.guest_details()).await?;
            let outcome = checkout.submit_details().await?;
            let errors = checkout.validation_errors().await?;
            if row.expected_result.is_success() {
                Assertion::is_true(errors.is_empty(), &format!("[{id}] no field errors, got {errors:?}"))?;
                Assertion::is_true(
                    checkout.is_details_accepted(&outcome).await?,
                    &format!("[{id}] store accepted the details: {}", outcome.json),
                )
            } else {
                Assertion::is_true(
                    !errors.is_empty() || outcome.has_error(),
                    &format!("[{id}] missing field is reported: {}", outcome.json),
                )
            }
        })
        .await
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_empty_cart_redirects_to_cart() -> CartcheckResult<()> {
    run_case("checkout::empty_cart_redirect", MARKERS, |page| async move {
        let checkout = CheckoutPage::new(page);
        checkout.open().await?;
        Assertion::is_true(
            checkout.is_cart_empty_redirect().await?,
            "checkout with an empty cart lands on the empty cart page",
        )
    })
    .await
}

// =============================================================================
// Coupon and gift certificate
// =============================================================================

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_code_forms_visible_on_cart() -> CartcheckResult<()> {
    run_case("checkout::code_forms_visible", MARKERS, |page| async move {
        add_macbook_to_cart(&page).await?;
        let checkout = CheckoutPage::new(page);
        checkout.open_cart().await?;
        checkout.verify_coupon_form_visible().await?;
        checkout.verify_gift_form_visible().await
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_valid_coupon_adds_discount_line() -> CartcheckResult<()> {
    run_case("checkout::valid_coupon", MARKERS, |page| async move {
        add_macbook_to_cart(&page).await?;
        let checkout = CheckoutPage::new(page);
        checkout.open_cart().await?;
        let outcome = checkout.apply_coupon(DEMO_COUPON).await?;
        Assertion::is_true(outcome.accepted(), &format!("coupon accepted: {}", outcome.response.json))?;
        Assertion::is_true(
            outcome.added_total_line("Coupon"),
            &format!("a coupon line appears in {:?}", outcome.totals_after),
        )?;
        let grand_total = |totals: &[(String, String)]| {
            totals
                .iter()
                .rev()
                .find(|(label, _)| label.trim_end_matches(':') == "Total")
                .and_then(|(_, amount)| parse_price(amount))
        };
        let before = grand_total(&outcome.totals_before);
        let after = grand_total(&outcome.totals_after);
        Assertion::is_true(
            matches!((before, after), (Some(b), Some(a)) if a < b),
            &format!("total drops after the coupon: {before:?} -> {after:?}"),
        )
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_invalid_coupon_rejected() -> CartcheckResult<()> {
    run_case("checkout::invalid_coupon", MARKERS, |page| async move {
        add_macbook_to_cart(&page).await?;
        let checkout = CheckoutPage::new(page);
        checkout.open_cart().await?;
        let outcome = checkout.apply_coupon("NOSUCHCODE").await?;
        Assertion::is_true(!outcome.accepted(), "unknown coupon is rejected")?;
        Assertion::contains_ignore_case("coupon warning", &outcome.alert, "invalid")?;
        Assertion::equals("totals unchanged", &outcome.totals_before, &outcome.totals_after)
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_invalid_gift_certificate_rejected() -> CartcheckResult<()> {
    run_case("checkout::invalid_gift_certificate", MARKERS, |page| async move {
        add_macbook_to_cart(&page).await?;
        let checkout = CheckoutPage::new(page);
        checkout.open_cart().await?;
        let outcome = checkout.apply_gift_certificate("NOSUCHCERT").await?;
        Assertion::is_true(!outcome.accepted(), "unknown certificate is rejected")?;
        Assertion::contains_ignore_case("certificate warning", &outcome.alert, "invalid")
    })
    .await
}
