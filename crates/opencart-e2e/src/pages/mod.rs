//! OpenCart 4.x storefront page objects.
//!
//! Each page composes a [`BasePage`](cartcheck::BasePage) and keeps its
//! selectors private; suites only see intent-level operations. Selectors
//! target the default theme with `language=en-gb`.

mod cart;
mod checkout;
mod header;
mod home;
mod login;
mod product;
mod register;
mod search;

use cartcheck::{wait_until, BasePage, CartcheckResult, Locator};
use std::time::Duration;
use url::form_urlencoded;

pub use cart::{CartLine, CartPage};
pub use checkout::{CheckoutPage, CodeOutcome, GuestDetails};
pub use header::Header;
pub use home::{HomePage, FEATURED_PRODUCTS, NAVBAR_CATEGORIES};
pub use login::LoginPage;
pub use product::ProductPage;
pub use register::{Registration, RegisterPage};
pub use search::SearchPage;

/// Storefront-relative path of an OpenCart route
#[must_use]
pub fn route(route: &str) -> String {
    format!("index.php?route={route}&language=en-gb")
}

/// Storefront-relative path of a route with extra query parameters
#[must_use]
pub fn route_with(route_name: &str, params: &[(&str, &str)]) -> String {
    let mut path = route(route_name);
    for (key, value) in params {
        path.push('&');
        path.push_str(key);
        path.push('=');
        path.extend(form_urlencoded::byte_serialize(value.as_bytes()));
    }
    path
}

/// First amount in a displayed price such as `$1,202.00`, `-$60.20` or
/// `602,00 €`. Text after the first amount (an "Ex Tax" line) is ignored.
#[must_use]
pub fn parse_price(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let rest = &text[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
        .unwrap_or(rest.len());
    let amount = rest[..end].trim_end_matches(['.', ',']);
    let decimal = decimal_separator(amount);
    let digits: String = amount
        .chars()
        .filter_map(|c| match c {
            '0'..='9' => Some(c),
            _ if Some(c) == decimal => Some('.'),
            _ => None,
        })
        .collect();
    let value: f64 = digits.parse().ok()?;
    let negative = text[..start]
        .trim_end_matches(|c: char| !(c.is_alphanumeric() || c.is_whitespace() || c == '-'))
        .ends_with('-');
    Some(if negative { -value } else { value })
}

/// Which of `.` and `,` marks the decimals in `amount`, if either does.
/// With both present the last one wins; a lone `,` followed by three
/// digits groups thousands.
fn decimal_separator(amount: &str) -> Option<char> {
    let last = amount.rfind(['.', ','])?;
    let sep = if amount[last..].starts_with('.') { '.' } else { ',' };
    let other = if sep == '.' { ',' } else { '.' };
    if amount.contains(other) {
        return Some(sep);
    }
    if amount.matches(sep).count() > 1 {
        return None;
    }
    let fraction = amount.len() - last - 1;
    (sep == '.' || fraction != 3).then_some(sep)
}

/// How long each alert or error selector gets to show up, capped by the
/// action timeout
pub(crate) const FEEDBACK_WAIT: Duration = Duration::from_secs(3);

async fn shows_up(base: &BasePage, locator: &Locator, within: Duration) -> CartcheckResult<bool> {
    let within = within.min(base.policy().timeout);
    let what = format!("{locator} to be visible");
    let found = wait_until(&what, within, base.policy().poll_interval, move || async move {
        Ok((base.probe(locator).await?.visible > 0).then_some(()))
    })
    .await;
    match found {
        Ok(()) => Ok(true),
        Err(e) if e.is_timeout() => Ok(false),
        Err(e) => Err(e),
    }
}

/// Text of the first page-level alert to appear, empty if none does.
/// Alerts are injected after AJAX replies, so each selector is waited on.
pub(crate) async fn page_alert_text(base: &BasePage, within: Duration) -> CartcheckResult<String> {
    for css in [".alert-danger", "#alert"] {
        let alert = Locator::new(css).first();
        if !shows_up(base, &alert, within).await? {
            continue;
        }
        let text = base.get_text(&alert).await?;
        if !text.is_empty() {
            return Ok(text);
        }
    }
    Ok(String::new())
}

/// Visible field error messages from the first selector family that shows any
pub(crate) async fn field_error_texts(
    base: &BasePage,
    within: Duration,
) -> CartcheckResult<Vec<String>> {
    for css in [".text-danger", ".invalid-feedback.d-block", "[id^='error-']"] {
        let errors = Locator::new(css);
        if !shows_up(base, &errors.clone().first(), within).await? {
            continue;
        }
        let texts = base.visible_texts(&errors).await?;
        if !texts.is_empty() {
            return Ok(texts);
        }
    }
    Ok(Vec::new())
}
