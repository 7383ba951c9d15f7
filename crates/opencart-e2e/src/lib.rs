//! Browser end-to-end suites for an OpenCart 4.x storefront.
//!
//! Page objects live in [`pages`], scenario records and fixed data in
//! [`data`], and setup steps shared between suites in [`flows`]. The live
//! suites under `tests/` need the `browser` feature and a running store:
//!
//! ```text
//! BASE_URL=http://localhost:8080/ cargo test -p opencart-e2e --features browser -- --ignored
//! ```
//!
//! `CARTCHECK_MARKERS="smoke and not checkout"` narrows the run.

#![warn(missing_docs)]

pub mod data;
#[allow(clippy::missing_errors_doc)]
pub mod flows;
#[allow(clippy::missing_errors_doc)]
pub mod pages;

pub use data::{
    unique_email, CartRow, CheckoutRow, Customer, LoginExpectation, LoginRow, Placeholders,
    ProductRow, RegisterRow, SearchExpectation, SearchRow,
};
pub use pages::{
    parse_price, route, route_with, CartLine, CartPage, CheckoutPage, CodeOutcome, GuestDetails,
    Header, HomePage, LoginPage, ProductPage, RegisterPage, Registration, SearchPage,
};

/// Page objects, data and the harness in one import
pub mod prelude {
    pub use crate::data::*;
    pub use crate::flows::*;
    pub use crate::pages::*;
    pub use cartcheck::prelude::*;
}
