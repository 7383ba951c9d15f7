//! Scenario records for the data-driven suites, their CSV loaders, and the
//! fixed test data shared across suites.
//!
//! Every `*_rows()` loader reads its file from `testdata/` at most once per
//! test binary; later calls get the cached rows (or the cached error).

use crate::pages::GuestDetails;
use cartcheck::{CartcheckResult, CsvSource, Outcome, Scenario, ScenarioCache};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// =============================================================================
// Fixed data
// =============================================================================

/// Storefront customer account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Customer {
    /// First name
    pub first_name: &'static str,
    /// Last name
    pub last_name: &'static str,
    /// Login e-mail
    pub email: &'static str,
    /// Login password
    pub password: &'static str,
}

/// The default well-formed customer
pub const VALID_USER: Customer = Customer {
    first_name: "John",
    last_name: "Doe",
    email: "john.doe@example.com",
    password: "Test@1234",
};

/// Products shipped with the OpenCart demo catalogue
pub const SAMPLE_PRODUCTS: [&str; 7] = [
    "MacBook",
    "iPhone",
    "Apple Cinema 30\"",
    "Canon EOS 5D",
    "Samsung SyncMaster 941BW",
    "iPod Classic",
    "HP LP3065",
];

/// Not an e-mail address
pub const INVALID_EMAIL: &str = "invalid-email";
/// Below the four-character minimum
pub const SHORT_PASSWORD: &str = "123";

/// `{prefix}_{unix seconds}_{random}@example.com`
///
/// The random part keeps addresses unique when tests start in the same
/// second.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    let secs = chrono::Utc::now().timestamp();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}_{secs}_{}@example.com", &suffix[..8])
}

// =============================================================================
// Placeholders
// =============================================================================

/// Run-time values substituted into CSV cells
///
/// | Placeholder | Replaced with |
/// |---|---|
/// | `{unique_email}` | [`unique_email`] with the case id as prefix |
/// | `{existing_email}` | an address registered earlier in the test |
/// | `{registered_email}` / `{registered_password}` | the account made for login cases |
/// | `{long_32}` | 32 `A`s |
///
/// Placeholders without a bound value are left in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placeholders {
    /// Value for `{existing_email}`
    pub existing_email: Option<String>,
    /// Value for `{registered_email}`
    pub registered_email: Option<String>,
    /// Value for `{registered_password}`
    pub registered_password: Option<String>,
}

impl Placeholders {
    /// Bind the account used by `{registered_*}` cells
    #[must_use]
    pub fn registered(email: &str, password: &str) -> Self {
        Self {
            registered_email: Some(email.to_string()),
            registered_password: Some(password.to_string()),
            ..Self::default()
        }
    }

    /// Bind `{existing_email}`
    #[must_use]
    pub fn with_existing_email(mut self, email: &str) -> Self {
        self.existing_email = Some(email.to_string());
        self
    }

    /// Substitute every bound placeholder in `value`
    #[must_use]
    pub fn resolve(&self, value: &str, case_id: &str) -> String {
        let mut out = value.to_string();
        if out.contains("{unique_email}") {
            out = out.replace("{unique_email}", &unique_email(case_id));
        }
        out = out.replace("{long_32}", &"A".repeat(32));
        for (key, bound) in [
            ("{existing_email}", &self.existing_email),
            ("{registered_email}", &self.registered_email),
            ("{registered_password}", &self.registered_password),
        ] {
            if let Some(bound) = bound {
                out = out.replace(key, bound);
            }
        }
        out
    }
}

// =============================================================================
// Records
// =============================================================================

/// `register_data.csv`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRow {
    /// Case id
    pub test_id: String,
    /// First name cell
    pub first_name: String,
    /// Last name cell
    pub last_name: String,
    /// E-mail cell
    pub email: String,
    /// Password cell
    pub password: String,
    /// Tick the privacy policy
    pub agree_privacy: bool,
    /// Expected outcome
    pub expected_result: Outcome,
    /// Text the page or field errors should contain
    pub expected_error: Option<String>,
}

impl RegisterRow {
    /// Whether the case needs an account registered beforehand
    #[must_use]
    pub fn needs_existing_account(&self) -> bool {
        self.email.contains("{existing_email}")
    }
}

/// What a login case should end in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginExpectation {
    /// Lands on the account dashboard
    Pass,
    /// Lands on the dashboard, then logs out cleanly
    PassLogout,
    /// Stays on the login page with a warning
    Fail,
}

/// `login_data.csv`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRow {
    /// Case id
    pub test_id: String,
    /// E-mail cell
    pub email: String,
    /// Password cell
    pub password: String,
    /// Expected outcome
    pub expected_result: LoginExpectation,
    /// Text the warning should contain
    pub expected_error: Option<String>,
}

/// Whether a search should list products
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchExpectation {
    /// At least `min_results` cards
    Found,
    /// The no-results notice
    NotFound,
}

/// `search_data.csv`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRow {
    /// Case id
    pub test_id: String,
    /// Keyword typed into the header box
    pub search_keyword: String,
    /// Expected outcome
    pub expected_result: SearchExpectation,
    /// Lower bound on result cards
    pub min_results: Option<usize>,
    /// A result name should contain this
    pub expected_contains: Option<String>,
    /// The no-results notice should contain this
    pub expected_message: Option<String>,
}

/// `cart_data.csv`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartRow {
    /// Case id
    pub test_id: String,
    /// Product to add
    pub product_id: u32,
    /// Name expected in the cart
    pub name: String,
    /// Unit price expected in the cart, e.g. `$602.00`
    pub unit_price: String,
}

/// `product_data.csv`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRow {
    /// Case id
    pub test_id: String,
    /// Product to open
    pub product_id: u32,
    /// Expected heading
    pub name: String,
}

/// `checkout_data.csv`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRow {
    /// Case id
    pub test_id: String,
    /// First name
    pub firstname: String,
    /// Last name
    pub lastname: String,
    /// E-mail
    pub email: String,
    /// Address line 1
    pub address_1: String,
    /// City
    pub city: String,
    /// Post code
    pub postcode: String,
    /// Country label, may be empty
    pub country: String,
    /// Region label, may be empty
    pub zone: String,
    /// `success` when the form should validate
    pub expected_result: Outcome,
}

impl CheckoutRow {
    /// Form values for this row
    #[must_use]
    pub fn guest_details(&self) -> GuestDetails {
        GuestDetails {
            firstname: self.firstname.clone(),
            lastname: self.lastname.clone(),
            email: self.email.clone(),
            address_1: self.address_1.clone(),
            city: self.city.clone(),
            postcode: self.postcode.clone(),
            country: self.country.clone(),
            zone: self.zone.clone(),
        }
    }
}

macro_rules! scenario_by_test_id {
    ($($row:ty),+ $(,)?) => {
        $(impl Scenario for $row {
            fn case_id(&self) -> &str {
                &self.test_id
            }
        })+
    };
}

scenario_by_test_id!(RegisterRow, LoginRow, SearchRow, CartRow, ProductRow, CheckoutRow);

// =============================================================================
// Loaders
// =============================================================================

/// Absolute path of a file under `testdata/`
#[must_use]
pub fn testdata_path(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join(file)
}

fn load<R>(cache: &'static ScenarioCache<R>, file: &str) -> CartcheckResult<&'static [R]>
where
    R: DeserializeOwned + 'static,
{
    cache.get_or_load(&CsvSource::new(testdata_path(file)))
}

static REGISTER: ScenarioCache<RegisterRow> = ScenarioCache::new();
static LOGIN: ScenarioCache<LoginRow> = ScenarioCache::new();
static SEARCH: ScenarioCache<SearchRow> = ScenarioCache::new();
static CART: ScenarioCache<CartRow> = ScenarioCache::new();
static PRODUCT: ScenarioCache<ProductRow> = ScenarioCache::new();
static CHECKOUT: ScenarioCache<CheckoutRow> = ScenarioCache::new();

/// Rows of `register_data.csv`
///
/// # Errors
///
/// Returns `DataFile` if the file is missing or malformed
pub fn register_rows() -> CartcheckResult<&'static [RegisterRow]> {
    load(&REGISTER, "register_data.csv")
}

/// Rows of `login_data.csv`
///
/// # Errors
///
/// Returns `DataFile` if the file is missing or malformed
pub fn login_rows() -> CartcheckResult<&'static [LoginRow]> {
    load(&LOGIN, "login_data.csv")
}

/// Rows of `search_data.csv`
///
/// # Errors
///
/// Returns `DataFile` if the file is missing or malformed
pub fn search_rows() -> CartcheckResult<&'static [SearchRow]> {
    load(&SEARCH, "search_data.csv")
}

/// Rows of `cart_data.csv`
///
/// # Errors
///
/// Returns `DataFile` if the file is missing or malformed
pub fn cart_rows() -> CartcheckResult<&'static [CartRow]> {
    load(&CART, "cart_data.csv")
}

/// Rows of `product_data.csv`
///
/// # Errors
///
/// Returns `DataFile` if the file is missing or malformed
pub fn product_rows() -> CartcheckResult<&'static [ProductRow]> {
    load(&PRODUCT, "product_data.csv")
}

/// Rows of `checkout_data.csv`
///
/// # Errors
///
/// Returns `DataFile` if the file is missing or malformed
pub fn checkout_rows() -> CartcheckResult<&'static [CheckoutRow]> {
    load(&CHECKOUT, "checkout_data.csv")
}
