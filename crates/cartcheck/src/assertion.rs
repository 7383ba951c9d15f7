//! Assertions for test validation.
//!
//! Two layers:
//!
//! - [`expect`] builds retrying assertions over a locator, which poll the
//!   page until they hold or the action timeout expires
//! - [`Assertion`] checks plain values
//!
//! Both fail with [`CartcheckError::AssertionFailed`] carrying the expected
//! and observed values, so a session's failure hooks see the mismatch.

use crate::locator::Locator;
use crate::page::BasePage;
use crate::result::{CartcheckError, CartcheckResult};
use std::fmt::Debug;
use std::future::Future;
use std::time::{Duration, Instant};

/// Retrying assertion builder for a locator
#[derive(Debug, Clone)]
pub struct Expect<'a> {
    page: &'a BasePage,
    locator: Locator,
    timeout: Duration,
}

/// Create an expectation for a locator on `page`
#[must_use]
pub fn expect(page: &BasePage, locator: impl Into<Locator>) -> Expect<'_> {
    Expect {
        page,
        locator: locator.into(),
        timeout: page.policy().timeout,
    }
}

impl<'a> Expect<'a> {
    /// Use a custom retry bound
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn retry<T, F, Fut, P>(
        &self,
        message: String,
        expected: &str,
        mut observe: F,
        pass: P,
    ) -> CartcheckResult<()>
    where
        T: Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = CartcheckResult<T>>,
        P: Fn(&T) -> bool,
    {
        let start = Instant::now();
        let poll = self.page.policy().poll_interval;
        loop {
            let actual = observe().await?;
            if pass(&actual) {
                tracing::debug!(assertion = %message, "assertion passed");
                return Ok(());
            }
            if start.elapsed() >= self.timeout {
                tracing::warn!(assertion = %message, actual = ?actual, "assertion failed");
                return Err(CartcheckError::AssertionFailed {
                    message,
                    expected: expected.to_string(),
                    actual: format!("{actual:?}"),
                });
            }
            tokio::time::sleep(poll).await;
        }
    }

    async fn first_text(&self) -> CartcheckResult<Option<String>> {
        Ok(self
            .page
            .all_texts(&self.locator)
            .await?
            .into_iter()
            .next())
    }

    /// At least one match is visible
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` if none becomes visible in time
    pub async fn to_be_visible(&self) -> CartcheckResult<()> {
        let locator = &self.locator;
        let page = self.page;
        self.retry(
            format!("{locator} to be visible"),
            "visible",
            move || async move { Ok(page.is_visible(locator).await?) },
            |visible| *visible,
        )
        .await
    }

    /// No match is visible
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` if a match stays visible
    pub async fn to_be_hidden(&self) -> CartcheckResult<()> {
        let locator = &self.locator;
        let page = self.page;
        self.retry(
            format!("{locator} to be hidden"),
            "hidden",
            move || async move { Ok(page.is_visible(locator).await?) },
            |visible| !*visible,
        )
        .await
    }

    /// Exactly `count` matches
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` with the last observed count
    pub async fn to_have_count(&self, count: usize) -> CartcheckResult<()> {
        let locator = &self.locator;
        let page = self.page;
        self.retry(
            format!("{locator} to have count"),
            &count.to_string(),
            move || async move { page.count(locator).await },
            |actual| *actual == count,
        )
        .await
    }

    /// First match's text contains `text`
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` with the last observed text
    pub async fn to_contain_text(&self, text: &str) -> CartcheckResult<()> {
        self.retry(
            format!("{} to contain text", self.locator),
            text,
            move || self.first_text(),
            |actual| actual.as_deref().is_some_and(|t| t.contains(text)),
        )
        .await
    }

    /// First match's trimmed text equals `text`
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` with the last observed text
    pub async fn to_have_text(&self, text: &str) -> CartcheckResult<()> {
        self.retry(
            format!("{} to have text", self.locator),
            text,
            move || self.first_text(),
            |actual| actual.as_deref() == Some(text),
        )
        .await
    }

    /// First match's `class` attribute contains the class token `class`
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` with the last observed class list
    pub async fn to_have_class(&self, class: &str) -> CartcheckResult<()> {
        let locator = &self.locator;
        let page = self.page;
        self.retry(
            format!("{locator} to have class"),
            class,
            move || async move {
                Ok(page
                    .all_attributes(locator, "class")
                    .await?
                    .into_iter()
                    .next()
                    .unwrap_or_default())
            },
            |classes| classes.split_whitespace().any(|c| c == class),
        )
        .await
    }

    /// First match's attribute `name` equals `value`
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` with the last observed value
    pub async fn to_have_attribute(&self, name: &str, value: &str) -> CartcheckResult<()> {
        let locator = &self.locator;
        let page = self.page;
        self.retry(
            format!("{locator} to have attribute {name}"),
            value,
            move || async move {
                Ok(page
                    .all_attributes(locator, name)
                    .await?
                    .into_iter()
                    .next())
            },
            |actual| actual.as_deref() == Some(value),
        )
        .await
    }
}

/// Assertion helpers for plain values
#[derive(Debug, Clone, Copy)]
pub struct Assertion;

impl Assertion {
    /// Assert two values are equal
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` if they differ
    pub fn equals<T: PartialEq + Debug>(message: &str, expected: &T, actual: &T) -> CartcheckResult<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(CartcheckError::assertion(message, expected, actual))
        }
    }

    /// Assert a string contains a substring
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` if it does not
    pub fn contains(message: &str, haystack: &str, needle: &str) -> CartcheckResult<()> {
        if haystack.contains(needle) {
            Ok(())
        } else {
            Err(CartcheckError::assertion(
                message,
                format!("text containing {needle:?}"),
                haystack,
            ))
        }
    }

    /// Assert a string contains a substring, ignoring case
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` if it does not
    pub fn contains_ignore_case(message: &str, haystack: &str, needle: &str) -> CartcheckResult<()> {
        if haystack.to_lowercase().contains(&needle.to_lowercase()) {
            Ok(())
        } else {
            Err(CartcheckError::assertion(
                message,
                format!("text containing {needle:?} (any case)"),
                haystack,
            ))
        }
    }

    /// Assert a condition holds
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` if it does not
    pub fn is_true(condition: bool, message: &str) -> CartcheckResult<()> {
        if condition {
            Ok(())
        } else {
            Err(CartcheckError::assertion(message, true, false))
        }
    }

    /// Assert `actual >= min`
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` if it is smaller
    pub fn at_least<T: PartialOrd + Debug>(message: &str, actual: &T, min: &T) -> CartcheckResult<()> {
        if actual >= min {
            Ok(())
        } else {
            Err(CartcheckError::assertion(
                message,
                format!(">= {min:?}"),
                actual,
            ))
        }
    }

    /// Assert a collection has the expected length
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` if it does not
    pub fn has_length<T: Debug>(message: &str, collection: &[T], expected: usize) -> CartcheckResult<()> {
        if collection.len() == expected {
            Ok(())
        } else {
            Err(CartcheckError::assertion(
                message,
                format!("{expected} items"),
                collection,
            ))
        }
    }
}
