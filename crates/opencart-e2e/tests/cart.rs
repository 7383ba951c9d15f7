//! Shopping cart suite
//!
//! Every test starts from an empty cart in a fresh browser and adds what it
//! needs through the product page.

use cartcheck::{Assertion, CartcheckError, CartcheckResult, Marker, PageObject};
use opencart_e2e::data::cart_rows;
use opencart_e2e::flows::{add_macbook_to_cart, add_product_to_cart, run_case, run_rows};
use opencart_e2e::pages::{parse_price, CartPage, HomePage};

const MARKERS: &[Marker] = &[Marker::Cart, Marker::Regression];

// =============================================================================
// Template
// =============================================================================

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_empty_cart_shows_notice() -> CartcheckResult<()> {
    run_case("cart::empty_cart_shows_notice", MARKERS, |page| async move {
        let cart = CartPage::new(page);
        cart.open().await?;
        Assertion::is_true(cart.is_cart_empty().await?, "fresh session has an empty cart")?;
        Assertion::contains_ignore_case("empty notice", &cart.empty_message().await?, "empty")
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_cart_template_visible_with_item() -> CartcheckResult<()> {
    run_case("cart::template_visible_with_item", MARKERS, |page| async move {
        add_macbook_to_cart(&page).await?;
        let cart = CartPage::new(page);
        cart.open().await?;
        cart.verify_template_visible().await
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_added_product_appears_as_line() -> CartcheckResult<()> {
    run_case("cart::added_product_appears_as_line", &[Marker::Cart, Marker::Smoke], |page| async move {
        add_macbook_to_cart(&page).await?;
        let cart = CartPage::new(page);
        cart.open().await?;
        Assertion::equals("row count", &1, &cart.items_count().await?)?;
        let line = cart.line(0).await?;
        Assertion::equals("name", &"MacBook".to_string(), &line.name)?;
        Assertion::equals("model", &"Product 16".to_string(), &line.model)?;
        Assertion::equals("quantity", &"1".to_string(), &line.quantity)?;
        Assertion::equals("row total equals unit price", &line.unit_price, &line.total)?;
        Assertion::equals("grand total", &line.total, &cart.total().await?)
    })
    .await
}

// =============================================================================
// Catalogue rows (cart_data.csv)
// =============================================================================

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_cart_lines_from_csv() -> CartcheckResult<()> {
    run_rows("cart", cart_rows()?, |row| async move {
        run_case(&format!("cart::{}", row.test_id), MARKERS, move |page| async move {
            add_product_to_cart(&page, row.product_id).await?;
            let cart = CartPage::new(page);
            cart.open().await?;
            let line = cart.line(0).await?;
            Assertion::equals(&format!("[{}] name", row.test_id), &row.name, &line.name)?;
            Assertion::equals(&format!("[{}] unit price", row.test_id), &row.unit_price, &line.unit_price)
        })
        .await
    })
    .await
}

// =============================================================================
// Editing
// =============================================================================

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_update_quantity_changes_row_total() -> CartcheckResult<()> {
    run_case("cart::update_quantity", MARKERS, |page| async move {
        add_macbook_to_cart(&page).await?;
        let cart = CartPage::new(page);
        cart.open().await?;
        let before = cart.line(0).await?;
        let outcome = cart.update_quantity(0, 3).await?;
        Assertion::is_true(!outcome.has_error(), &format!("update accepted: {}", outcome.json))?;
        cart.open().await?;
        let after = cart.line(0).await?;
        Assertion::equals("quantity", &"3".to_string(), &after.quantity)?;
        Assertion::equals("unit price unchanged", &before.unit_price, &after.unit_price)?;
        let amount = |label: &str, text: &str| {
            parse_price(text).ok_or_else(|| {
                CartcheckError::assertion(format!("{label} is a price"), "an amount", text)
            })
        };
        let unit = amount("unit price", &after.unit_price)?;
        let total = amount("row total", &after.total)?;
        Assertion::is_true(
            (total - unit * 3.0).abs() < 0.005,
            &format!("row total {} is 3 x {}", after.total, after.unit_price),
        )
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_remove_item_empties_cart() -> CartcheckResult<()> {
    run_case("cart::remove_item", MARKERS, |page| async move {
        add_macbook_to_cart(&page).await?;
        let cart = CartPage::new(page);
        cart.open().await?;
        cart.remove_item(0).await?;
        cart.open().await?;
        Assertion::is_true(cart.is_cart_empty().await?, "cart is empty after removing its only row")?;
        Assertion::contains("header cart", &cart.header().cart_text().await?, "0 item")
    })
    .await
}

// =============================================================================
// Navigation
// =============================================================================

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_continue_shopping_returns_home() -> CartcheckResult<()> {
    run_case("cart::continue_shopping", MARKERS, |page| async move {
        add_macbook_to_cart(&page).await?;
        let cart = CartPage::new(page.clone());
        cart.open().await?;
        cart.continue_shopping().await?;
        HomePage::new(page).verify_featured_products_visible().await
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_proceed_to_checkout() -> CartcheckResult<()> {
    run_case("cart::proceed_to_checkout", &[Marker::Cart, Marker::Checkout], |page| async move {
        add_macbook_to_cart(&page).await?;
        let cart = CartPage::new(page.clone());
        cart.open().await?;
        cart.proceed_to_checkout().await?;
        Assertion::contains("checkout URL", &page.current_url().await?, "checkout/checkout")
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_view_cart_from_header() -> CartcheckResult<()> {
    run_case("cart::view_cart_from_header", MARKERS, |page| async move {
        add_macbook_to_cart(&page).await?;
        let cart = CartPage::new(page);
        cart.view_cart_from_header().await?;
        Assertion::has_length("cart rows", &cart.item_names().await?, 1)
    })
    .await
}
