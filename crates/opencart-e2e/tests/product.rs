//! Product page suite
//!
//! The template is checked on one representative product (the MacBook);
//! the CSV cases check that each featured product page loads, and the
//! server cross-checks compare the raw HTML with what the page renders.

use cartcheck::{Assertion, CartcheckResult, Marker, PageObject, ResponseExpectation};
use opencart_e2e::data::product_rows;
use opencart_e2e::flows::{run_case, run_rows, MACBOOK_ID};
use opencart_e2e::pages::{route_with, ProductPage};

const MARKERS: &[Marker] = &[Marker::Ui, Marker::Regression];

const MACBOOK_PRICE: &str = "$602.00";
const MACBOOK_DESCRIPTION: &str = "Intel Core 2 Duo processor";

fn macbook_path() -> String {
    route_with("product/product", &[("product_id", &MACBOOK_ID.to_string())])
}

// =============================================================================
// Template
// =============================================================================

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_all_product_info_visible() -> CartcheckResult<()> {
    run_case("product::all_product_info_visible", MARKERS, |page| async move {
        let product = ProductPage::for_product(page, MACBOOK_ID);
        product.open().await?;
        product.verify_all_product_info_visible().await
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_product_images_section() -> CartcheckResult<()> {
    run_case("product::images_section", MARKERS, |page| async move {
        let product = ProductPage::for_product(page, MACBOOK_ID);
        product.open().await?;
        product.verify_main_image_visible().await?;
        product.verify_product_images_present(1).await
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_tab_structure() -> CartcheckResult<()> {
    run_case("product::tab_structure", MARKERS, |page| async move {
        let product = ProductPage::for_product(page, MACBOOK_ID);
        product.open().await?;
        product.verify_tab_visible("Description").await?;
        product.verify_tab_visible("Reviews").await?;
        product.verify_description_content_visible().await
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_action_buttons_visible() -> CartcheckResult<()> {
    run_case("product::action_buttons_visible", MARKERS, |page| async move {
        let product = ProductPage::for_product(page, MACBOOK_ID);
        product.open().await?;
        product.verify_all_action_buttons_visible().await
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_product_data_renders_correctly() -> CartcheckResult<()> {
    run_case("product::data_renders_correctly", MARKERS, |page| async move {
        let product = ProductPage::for_product(page, MACBOOK_ID);
        product.open().await?;
        Assertion::equals("name", &"MacBook".to_string(), &product.product_name().await?)?;
        Assertion::equals("price", &MACBOOK_PRICE.to_string(), &product.product_price().await?)?;
        Assertion::equals("ex tax", &"Ex Tax: $500.00".to_string(), &product.product_ex_tax().await?)?;
        Assertion::equals("brand", &"Apple".to_string(), &product.brand().await?)?;
        Assertion::equals("code", &"Product 16".to_string(), &product.product_code().await?)?;
        Assertion::equals("availability", &"In Stock".to_string(), &product.availability().await?)
    })
    .await
}

// =============================================================================
// Featured products (product_data.csv)
// =============================================================================

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_featured_product_pages_from_csv() -> CartcheckResult<()> {
    run_rows("product", product_rows()?, |row| async move {
        run_case(&format!("product::{}", row.test_id), MARKERS, move |page| async move {
            let product = ProductPage::for_product(page, row.product_id);
            product.open().await?;
            Assertion::equals(
                &format!("[{}] product name", row.test_id),
                &row.name,
                &product.product_name().await?,
            )
        })
        .await
    })
    .await
}

// =============================================================================
// Server response vs rendered page
// =============================================================================

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_server_response_status_and_content_type() -> CartcheckResult<()> {
    run_case("product::server_status_and_type", MARKERS, |page| async move {
        page.navigate(&macbook_path()).await?;
        let response = page.capture_document(&macbook_path()).await?;
        ResponseExpectation::new()
            .status(200)
            .content_type("text/html")
            .verify(&response)
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_server_html_matches_rendered_details() -> CartcheckResult<()> {
    run_case("product::server_html_matches_rendered", MARKERS, |page| async move {
        let product = ProductPage::for_product(page.clone(), MACBOOK_ID);
        product.open().await?;
        let response = page.capture_document(&macbook_path()).await?;
        ResponseExpectation::new()
            .body_contains("MacBook")
            .body_contains(MACBOOK_PRICE)
            .body_contains("Apple")
            .body_contains(MACBOOK_DESCRIPTION)
            .verify(&response)?;
        Assertion::equals("rendered name", &"MacBook".to_string(), &product.product_name().await?)?;
        Assertion::equals("rendered price", &MACBOOK_PRICE.to_string(), &product.product_price().await?)?;
        Assertion::equals("rendered brand", &"Apple".to_string(), &product.brand().await?)?;
        Assertion::contains_ignore_case(
            "rendered description",
            &product.description_text().await?,
            MACBOOK_DESCRIPTION,
        )
    })
    .await
}

// =============================================================================
// Actions
// =============================================================================

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_add_to_cart_confirms_and_updates_header() -> CartcheckResult<()> {
    run_case("product::add_to_cart", &[Marker::Cart, Marker::Smoke], |page| async move {
        let product = ProductPage::for_product(page, MACBOOK_ID);
        product.open().await?;
        product.set_quantity(2).await?;
        let outcome = product.add_to_cart().await?;
        Assertion::contains("add reply", outcome.success().unwrap_or_default(), "MacBook")?;
        Assertion::is_true(product.is_success_alert_visible().await?, "success alert shown")?;
        Assertion::contains("header cart", &product.header().cart_text().await?, "2 item")
    })
    .await
}
