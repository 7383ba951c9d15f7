//! Product search page and its result listing.

use super::{route, route_with, Header};
use cartcheck::{expect, BasePage, CartcheckResult, LoadState, Locator, PageObject};

/// `product/search`
#[derive(Debug, Clone)]
pub struct SearchPage {
    base: BasePage,
}

impl PageObject for SearchPage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    fn path(&self) -> String {
        route("product/search")
    }

    fn page_name(&self) -> &'static str {
        "search"
    }
}

impl SearchPage {
    /// Search page driven by `base`
    #[must_use]
    pub const fn new(base: BasePage) -> Self {
        Self { base }
    }

    fn heading() -> Locator {
        Locator::new("#content h1")
    }

    fn criteria_input() -> Locator {
        Locator::new("#input-search")
    }

    fn search_button() -> Locator {
        Locator::new("#button-search")
    }

    fn results() -> Locator {
        Locator::new("#content .product-thumb")
    }

    fn result_links() -> Locator {
        Self::results().find(".description h4 a")
    }

    fn no_results() -> Locator {
        Locator::new("#content p").with_text("no product").first()
    }

    /// Open the results page for `keyword` directly
    pub async fn open_with_query(&self, keyword: &str) -> CartcheckResult<()> {
        self.base
            .navigate(&route_with("product/search", &[("search", keyword)]))
            .await
    }

    /// Start from the home page and search from the header box
    pub async fn search_from_home(&self, keyword: &str) -> CartcheckResult<()> {
        self.base.navigate(&route("common/home")).await?;
        Header::new(self.base.clone()).search(keyword).await
    }

    /// Search again with the criteria form on this page
    pub async fn search(&self, keyword: &str) -> CartcheckResult<()> {
        self.base.fill(&Self::criteria_input(), keyword).await?;
        self.base.click(&Self::search_button()).await?;
        self.base.wait_for_url("*route=product/search*").await?;
        self.base.wait_for_load_state(LoadState::NetworkIdle).await
    }

    /// Heading, criteria input, button, label, description checkbox,
    /// category select and sub-category checkbox are visible
    pub async fn verify_search_form_visible(&self) -> CartcheckResult<()> {
        expect(&self.base, Self::heading())
            .to_contain_text("Search")
            .await?;
        for css in [
            "#input-search",
            "#button-search",
            "label[for='input-search']",
            "#input-description",
            "select[name='category_id']",
            "#input-sub-category",
        ] {
            expect(&self.base, css).to_be_visible().await?;
        }
        Ok(())
    }

    /// Sort, limit and grid/list toggles are visible
    pub async fn verify_result_controls_visible(&self) -> CartcheckResult<()> {
        for css in ["#input-sort", "#input-limit", "#button-grid", "#button-list"] {
            expect(&self.base, css).to_be_visible().await?;
        }
        Ok(())
    }

    /// Number of result cards
    pub async fn results_count(&self) -> CartcheckResult<usize> {
        self.base.count(&Self::results()).await
    }

    /// Result product names in display order
    pub async fn result_names(&self) -> CartcheckResult<Vec<String>> {
        self.base.all_texts(&Self::result_links()).await
    }

    /// Result prices in display order
    pub async fn result_prices(&self) -> CartcheckResult<Vec<String>> {
        self.base
            .all_texts(&Self::results().find(".price .price-new"))
            .await
    }

    /// Number of result thumbnails
    pub async fn result_image_count(&self) -> CartcheckResult<usize> {
        self.base.count(&Self::results().find(".image img")).await
    }

    /// Page heading, e.g. `Search - iphone`
    pub async fn heading_text(&self) -> CartcheckResult<String> {
        self.base.get_text(&Self::heading()).await
    }

    /// Whether the "no product matches" notice is shown
    pub async fn has_no_results(&self) -> CartcheckResult<bool> {
        self.base.is_visible(&Self::no_results()).await
    }

    /// Text of the "no product matches" notice
    pub async fn no_results_message(&self) -> CartcheckResult<String> {
        self.base.get_text(&Self::no_results()).await
    }

    /// Reorder results by the sort option labelled `label`
    pub async fn sort_by(&self, label: &str) -> CartcheckResult<()> {
        self.base
            .select_option(&Locator::new("#input-sort"), label)
            .await?;
        self.base.wait_for_url("*sort=*").await?;
        self.base.wait_for_load_state(LoadState::NetworkIdle).await
    }

    /// Open result `index`
    pub async fn click_product(&self, index: usize) -> CartcheckResult<()> {
        self.base.click(&Self::result_links().nth(index)).await?;
        self.base.wait_for_url("*route=product/product*").await?;
        self.base.wait_for_load_state(LoadState::NetworkIdle).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pages::testing::{last_script, mock, page};
    use serde_json::json;

    #[tokio::test]
    async fn test_open_with_query_encodes_keyword() {
        let driver = mock();
        let search = SearchPage::new(page(&driver));
        search.open_with_query("Apple Cinema").await.unwrap();
        assert!(driver.was_called(
            "navigate:http://localhost/index.php?route=product/search&language=en-gb&search=Apple+Cinema"
        ));
    }

    #[tokio::test]
    async fn test_search_from_home_starts_at_home() {
        let driver = mock();
        let search = SearchPage::new(page(&driver));
        let (result, ()) = tokio::join!(search.search_from_home("MacBook"), async {
            tokio::time::sleep(std::time::Duration::from_millis(30)).await;
            driver.set_current_url("http://localhost/index.php?route=product/search&search=MacBook");
        });
        result.unwrap();
        assert!(driver.was_called("navigate:http://localhost/index.php?route=common/home"));
    }

    #[tokio::test]
    async fn test_results_and_names() {
        let driver = mock();
        driver.on_script(&["/*probe*/", "#content .product-thumb"], json!({ "count": 4, "visible": 4 }));
        driver.on_script(&["/*texts*/", ".description h4 a"], json!(["iPhone", "iPod Classic"]));
        let search = SearchPage::new(page(&driver));
        assert_eq!(search.results_count().await.unwrap(), 4);
        assert_eq!(search.result_names().await.unwrap(), vec!["iPhone", "iPod Classic"]);
    }

    #[tokio::test]
    async fn test_no_results_notice() {
        let driver = mock();
        driver.on_script(
            &["/*text*/", "no product"],
            json!({ "ok": true, "value": "There is no product that matches the search criteria." }),
        );
        let search = SearchPage::new(page(&driver));
        assert!(search.has_no_results().await.unwrap());
        assert!(search.no_results_message().await.unwrap().contains("no product"));
    }

    #[tokio::test]
    async fn test_click_product_picks_nth_result() {
        let driver = mock();
        driver.set_current_url("http://localhost/index.php?route=product/product&product_id=40");
        let search = SearchPage::new(page(&driver));
        search.click_product(1).await.unwrap();
        assert!(last_script(&driver, "/*click*/").unwrap().contains(".slice(1, 2)"));
    }

    #[tokio::test]
    async fn test_form_check_fails_on_missing_control() {
        let driver = mock();
        driver.on_script(&["/*texts*/", "#content h1"], json!(["Search"]));
        driver.on_script(&["/*probe*/", "#input-sub-category"], json!({ "count": 0, "visible": 0 }));
        let search = SearchPage::new(page(&driver));
        let err = search.verify_search_form_visible().await.unwrap_err();
        assert!(err.to_string().contains("#input-sub-category"));
    }
}
