//! Home page suite: navbar, carousel and the featured section
//!
//! Run with `cargo test -p opencart-e2e --features browser --test home -- --ignored`.

use cartcheck::{Assertion, CartcheckResult, Marker, PageObject};
use opencart_e2e::flows::run_case;
use opencart_e2e::pages::{HomePage, FEATURED_PRODUCTS};

const MARKERS: &[Marker] = &[Marker::Smoke, Marker::Ui];

// =============================================================================
// Navbar
// =============================================================================

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_all_navbar_elements_visible() -> CartcheckResult<()> {
    run_case("home::all_navbar_elements_visible", MARKERS, |page| async move {
        let home = HomePage::new(page);
        home.open().await?;
        home.verify_all_navbar_elements_visible().await
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_navbar_dropdown_opens_on_hover() -> CartcheckResult<()> {
    run_case("home::navbar_dropdown_opens_on_hover", MARKERS, |page| async move {
        let home = HomePage::new(page);
        home.open().await?;
        home.verify_navbar_dropdown_opens("Desktops").await
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_navbar_category_link_navigates() -> CartcheckResult<()> {
    run_case("home::navbar_category_link_navigates", MARKERS, |page| async move {
        let home = HomePage::new(page.clone());
        home.open().await?;
        home.click_navbar_category("Tablets").await?;
        Assertion::contains("category URL", &page.current_url().await?, "product/category")
    })
    .await
}

// =============================================================================
// Carousel
// =============================================================================

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_all_slider_elements_visible() -> CartcheckResult<()> {
    run_case("home::all_slider_elements_visible", MARKERS, |page| async move {
        let home = HomePage::new(page);
        home.open().await?;
        home.verify_all_slider_elements_visible().await
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_slider_controls_advance_slide() -> CartcheckResult<()> {
    run_case("home::slider_controls_advance_slide", MARKERS, |page| async move {
        let home = HomePage::new(page);
        home.open().await?;
        home.show_slide(0).await?;
        home.wait_for_active_slide(0).await?;
        home.advance_slide().await?;
        home.wait_for_active_slide(1).await?;
        Assertion::equals("active slide", &Some(1), &home.active_slide_index().await?)
    })
    .await
}

// =============================================================================
// Featured
// =============================================================================

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_featured_section_has_four_products() -> CartcheckResult<()> {
    run_case("home::featured_section_has_four_products", MARKERS, |page| async move {
        let home = HomePage::new(page);
        home.open().await?;
        home.verify_featured_products_visible().await
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_featured_product_names_match_expected() -> CartcheckResult<()> {
    run_case("home::featured_product_names_match_expected", MARKERS, |page| async move {
        let home = HomePage::new(page);
        home.open().await?;
        let names = home.featured_product_names().await?;
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        Assertion::equals("featured products", &FEATURED_PRODUCTS.to_vec(), &names)
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_featured_card_template_has_all_elements() -> CartcheckResult<()> {
    run_case("home::featured_card_template_has_all_elements", MARKERS, |page| async move {
        let home = HomePage::new(page);
        home.open().await?;
        home.verify_featured_product_images_visible().await?;
        home.verify_featured_product_names_visible().await?;
        home.verify_featured_product_prices_visible().await?;
        home.verify_featured_buttons_visible().await
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_featured_product_link_navigates() -> CartcheckResult<()> {
    run_case("home::featured_product_link_navigates", MARKERS, |page| async move {
        let home = HomePage::new(page.clone());
        home.open().await?;
        home.click_featured_product(0).await?;
        Assertion::contains("product URL", &page.current_url().await?, "product/product")
    })
    .await
}

#[tokio::test]
#[ignore = "requires a running OpenCart instance"]
async fn test_header_logo_and_cart_visible() -> CartcheckResult<()> {
    run_case("home::header_logo_and_cart_visible", &[Marker::Ui], |page| async move {
        let home = HomePage::new(page);
        home.open().await?;
        Assertion::is_true(home.header().is_logo_visible().await?, "logo is visible")?;
        Assertion::contains("empty mini-cart", &home.cart_text().await?, "0 item")
    })
    .await
}
