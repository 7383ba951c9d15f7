//! Server replies behind the storefront's AJAX calls and documents
//!
//! Each test drives the UI, then checks the raw response the browser got
//! (or refetches it with the page's cookies) against what the page shows.

use cartcheck::{Assertion, BasePage, CartcheckResult, Marker, PageObject, ResponseExpectation};
use opencart_e2e::flows::{register_fresh_user, run_case, MACBOOK_ID};
use opencart_e2e::pages::{route, route_with, CartPage, HomePage, ProductPage, SearchPage};

const MARKERS: &[Marker] = &[Marker::Regression];

// =============================================================================
// Cart endpoints
// =============================================================================

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_cart_add_reply() -> CartcheckResult<()> {
    run_case("api::cart_add_reply", &[Marker::Cart, Marker::Regression], |page| async move {
        let product = ProductPage::for_product(page, MACBOOK_ID);
        product.open().await?;
        let outcome = product.add_to_cart().await?;
        ResponseExpectation::new()
            .status(200)
            .content_type("json")
            .json_contains("success", "shopping cart")
            .json_contains("success", "MacBook")
            .verify(&outcome.response())
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_cart_remove_reply_and_header() -> CartcheckResult<()> {
    run_case("api::cart_remove_reply", &[Marker::Cart, Marker::Regression], |page| async move {
        let product = ProductPage::for_product(page.clone(), MACBOOK_ID);
        product.open().await?;
        product.add_to_cart().await?;

        let mini_cart = route("common/cart|info");
        let filled = page.capture_document(&mini_cart).await?;
        ResponseExpectation::new()
            .success()
            .body_lacks("0 item(s)")
            .body_contains("MacBook")
            .verify(&filled)?;

        let cart = CartPage::new(page.clone());
        cart.open().await?;
        let outcome = cart.remove_item(0).await?;
        ResponseExpectation::new()
            .success()
            .json_contains("success", "modified your shopping cart")
            .verify(&outcome.response())?;

        let emptied = page.capture_document(&mini_cart).await?;
        ResponseExpectation::new()
            .success()
            .body_contains("0 item(s)")
            .verify(&emptied)?;
        cart.open().await?;
        Assertion::is_true(cart.is_cart_empty().await?, "cart page agrees the cart is empty")
    })
    .await
}

// =============================================================================
// Search documents
// =============================================================================

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_search_document_matches_rendered_results() -> CartcheckResult<()> {
    run_case("api::search_document_matches_results", &[Marker::Search, Marker::Regression], |page| async move {
        let search = SearchPage::new(page.clone());
        search.open_with_query("mac").await?;
        let rendered = search.results_count().await?;
        Assertion::at_least("rendered results", &rendered, &1)?;

        let document = page
            .capture_document(&route_with("product/search", &[("search", "mac")]))
            .await?;
        ResponseExpectation::new()
            .status(200)
            .content_type("text/html")
            .occurrences("product-thumb", rendered)
            .verify(&document)
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_search_document_without_matches() -> CartcheckResult<()> {
    run_case("api::search_document_without_matches", &[Marker::Search, Marker::Regression], |page| async move {
        let search = SearchPage::new(page.clone());
        search.open_with_query("qwertyuiopasdf").await?;
        Assertion::is_true(search.has_no_results().await?, "no cards rendered")?;

        let document = page
            .capture_document(&route_with("product/search", &[("search", "qwertyuiopasdf")]))
            .await?;
        ResponseExpectation::new()
            .status(200)
            .body_lacks("product-thumb")
            .body_contains("There is no product that matches the search criteria")
            .verify(&document)
    })
    .await
}

// =============================================================================
// Currency
// =============================================================================

/// Switch the currency from the home page and check the reply and the
/// re-rendered featured prices
async fn switch_currency_and_check(page: BasePage, code: &str, symbol: &str) -> CartcheckResult<()> {
    let home = HomePage::new(page);
    home.open().await?;
    Assertion::is_true(home.featured_prices_use("$").await?, "store starts in US dollars")?;

    let outcome = home.switch_currency(code).await?;
    Assertion::is_true(
        matches!(outcome.status, 200 | 302),
        &format!("currency save answered 200 or 302, got {}", outcome.status),
    )?;
    Assertion::equals("header currency", &symbol.to_string(), &home.header().currency_symbol().await?)?;
    let prices = home.featured_product_prices().await?;
    Assertion::is_true(
        home.featured_prices_use(symbol).await?,
        &format!("featured prices shown in {symbol}, got {prices:?}"),
    )
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_currency_switch_to_eur() -> CartcheckResult<()> {
    run_case("api::currency_switch_eur", MARKERS, |page| async move {
        switch_currency_and_check(page, "EUR", "€").await
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_currency_switch_to_gbp() -> CartcheckResult<()> {
    run_case("api::currency_switch_gbp", MARKERS, |page| async move {
        switch_currency_and_check(page, "GBP", "£").await
    })
    .await
}

// =============================================================================
// Wishlist
// =============================================================================

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_wishlist_as_guest_asks_to_log_in() -> CartcheckResult<()> {
    run_case("api::wishlist_as_guest", &[Marker::Account, Marker::Regression], |page| async move {
        let product = ProductPage::for_product(page, MACBOOK_ID);
        product.open().await?;
        let outcome = product.add_to_wishlist().await?;
        let reply = outcome.json.to_string().to_lowercase();
        Assertion::is_true(
            outcome.redirect.is_some() || reply.contains("login"),
            &format!("guest wishlist reply asks to log in: {reply}"),
        )
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_wishlist_when_logged_in() -> CartcheckResult<()> {
    run_case("api::wishlist_logged_in", &[Marker::Account, Marker::Regression], |page| async move {
        register_fresh_user(&page, "wish").await?;
        let product = ProductPage::for_product(page, MACBOOK_ID);
        product.open().await?;
        let outcome = product.add_to_wishlist().await?;
        ResponseExpectation::new()
            .success()
            .json_contains("success", "wish list")
            .verify(&outcome.response())
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_home_document_is_html() -> CartcheckResult<()> {
    run_case("api::home_document", MARKERS, |page| async move {
        page.navigate(&route("common/home")).await?;
        let document = page.capture_document(&route("common/home")).await?;
        Assertion::is_true(document.is_html(), &format!("home is HTML, got {}", document.content_type))?;
        ResponseExpectation::new()
            .status(200)
            .body_contains("Featured")
            .verify(&document)
    })
    .await
}
