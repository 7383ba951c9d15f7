//! Test markers and marker-expression selection.
//!
//! Each test declares the [`Marker`]s it belongs to. A [`MarkerExpr`]
//! such as `smoke and not checkout` or `(cart, search)` decides whether a
//! test runs. `,` is a synonym for `or`; `not` binds tighter than `and`,
//! which binds tighter than `or`.

use crate::result::{CartcheckError, CartcheckResult};
use std::fmt;
use std::str::FromStr;

/// Test category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Quick critical-path checks
    Smoke,
    /// Full regression coverage
    Regression,
    /// Template and layout checks
    Ui,
    /// Product search
    Search,
    /// Shopping cart
    Cart,
    /// Checkout flow
    Checkout,
    /// Login and registration
    Account,
}

impl Marker {
    /// Every marker, in declaration order
    pub const ALL: [Self; 7] = [
        Self::Smoke,
        Self::Regression,
        Self::Ui,
        Self::Search,
        Self::Cart,
        Self::Checkout,
        Self::Account,
    ];

    /// Lowercase marker name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Smoke => "smoke",
            Self::Regression => "regression",
            Self::Ui => "ui",
            Self::Search => "search",
            Self::Cart => "cart",
            Self::Checkout => "checkout",
            Self::Account => "account",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Marker {
    type Err = CartcheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| CartcheckError::InvalidMarker {
                expression: s.to_string(),
                message: format!("unknown marker {s:?}"),
            })
    }
}

/// Parsed marker expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerExpr {
    /// Test carries this marker
    Is(Marker),
    /// Negation
    Not(Box<MarkerExpr>),
    /// Both sides hold
    And(Box<MarkerExpr>, Box<MarkerExpr>),
    /// Either side holds
    Or(Box<MarkerExpr>, Box<MarkerExpr>),
}

impl MarkerExpr {
    /// Parse an expression like `smoke and not (cart or checkout)`
    ///
    /// # Errors
    ///
    /// Returns `InvalidMarker` for unknown names or malformed syntax
    pub fn parse(expression: &str) -> CartcheckResult<Self> {
        let tokens = tokenize(expression)?;
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            source: expression,
        };
        let expr = parser.or_expr()?;
        if let Some(token) = parser.peek() {
            return Err(parser.error(format!("unexpected {token}")));
        }
        Ok(expr)
    }

    /// Whether a test with `markers` is selected
    #[must_use]
    pub fn matches(&self, markers: &[Marker]) -> bool {
        match self {
            Self::Is(marker) => markers.contains(marker),
            Self::Not(inner) => !inner.matches(markers),
            Self::And(lhs, rhs) => lhs.matches(markers) && rhs.matches(markers),
            Self::Or(lhs, rhs) => lhs.matches(markers) || rhs.matches(markers),
        }
    }
}

impl fmt::Display for MarkerExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Is(marker) => write!(f, "{marker}"),
            Self::Not(inner) => write!(f, "not {inner}"),
            Self::And(lhs, rhs) => write!(f, "({lhs} and {rhs})"),
            Self::Or(lhs, rhs) => write!(f, "({lhs} or {rhs})"),
        }
    }
}

impl FromStr for MarkerExpr {
    type Err = CartcheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Name(Marker),
    And,
    Or,
    Not,
    Open,
    Close,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(marker) => write!(f, "{marker:?}"),
            Self::And => f.write_str("'and'"),
            Self::Or => f.write_str("'or'"),
            Self::Not => f.write_str("'not'"),
            Self::Open => f.write_str("'('"),
            Self::Close => f.write_str("')'"),
        }
    }
}

fn tokenize(expression: &str) -> CartcheckResult<Vec<Token>> {
    let invalid = |message: String| CartcheckError::InvalidMarker {
        expression: expression.to_string(),
        message,
    };

    let mut tokens = Vec::new();
    let mut chars = expression.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Or);
            }
            c if c.is_ascii_alphanumeric() || c == '_' => {
                let mut end = start;
                while let Some(&(i, c)) = chars.peek() {
                    if !(c.is_ascii_alphanumeric() || c == '_') {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                let word = &expression[start..end];
                tokens.push(match word.to_ascii_lowercase().as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    _ => Token::Name(word.parse().map_err(|_| invalid(format!("unknown marker {word:?}")))?),
                });
            }
            other => return Err(invalid(format!("unexpected character {other:?} at {start}"))),
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    source: &'a str,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn error(&self, message: String) -> CartcheckError {
        CartcheckError::InvalidMarker {
            expression: self.source.to_string(),
            message,
        }
    }

    fn or_expr(&mut self) -> CartcheckResult<MarkerExpr> {
        let mut lhs = self.and_expr()?;
        while self.peek() == Some(Token::Or) {
            self.pos += 1;
            let rhs = self.and_expr()?;
            lhs = MarkerExpr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> CartcheckResult<MarkerExpr> {
        let mut lhs = self.not_expr()?;
        while self.peek() == Some(Token::And) {
            self.pos += 1;
            let rhs = self.not_expr()?;
            lhs = MarkerExpr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn not_expr(&mut self) -> CartcheckResult<MarkerExpr> {
        if self.peek() == Some(Token::Not) {
            self.pos += 1;
            return Ok(MarkerExpr::Not(Box::new(self.not_expr()?)));
        }
        self.atom()
    }

    fn atom(&mut self) -> CartcheckResult<MarkerExpr> {
        let token = self.peek();
        self.pos += 1;
        match token {
            Some(Token::Name(marker)) => Ok(MarkerExpr::Is(marker)),
            Some(Token::Open) => {
                let inner = self.or_expr()?;
                if self.peek() != Some(Token::Close) {
                    return Err(self.error("missing ')'".to_string()));
                }
                self.pos += 1;
                Ok(inner)
            }
            Some(other) => Err(self.error(format!("expected a marker, found {other}"))),
            None => Err(self.error("expression ends early".to_string())),
        }
    }
}

/// Selection applied to every test of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerFilter {
    expr: Option<MarkerExpr>,
}

impl MarkerFilter {
    /// Select everything
    #[must_use]
    pub const fn all() -> Self {
        Self { expr: None }
    }

    /// Build from an optional expression; blank means everything
    ///
    /// # Errors
    ///
    /// Returns `InvalidMarker` if the expression does not parse
    pub fn from_expression(expression: Option<&str>) -> CartcheckResult<Self> {
        match expression.map(str::trim) {
            None | Some("") => Ok(Self::all()),
            Some(text) => Ok(Self {
                expr: Some(MarkerExpr::parse(text)?),
            }),
        }
    }

    /// Whether a test carrying `markers` runs
    #[must_use]
    pub fn selects(&self, markers: &[Marker]) -> bool {
        self.expr.as_ref().map_or(true, |expr| expr.matches(markers))
    }

    /// Parsed expression, if any
    #[must_use]
    pub const fn expression(&self) -> Option<&MarkerExpr> {
        self.expr.as_ref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_single_marker() {
            assert_eq!(MarkerExpr::parse("smoke").unwrap(), MarkerExpr::Is(Marker::Smoke));
            assert_eq!(MarkerExpr::parse("  UI ").unwrap(), MarkerExpr::Is(Marker::Ui));
        }

        #[test]
        fn test_precedence() {
            let expr = MarkerExpr::parse("smoke or cart and not checkout").unwrap();
            assert!(expr.matches(&[Marker::Smoke, Marker::Checkout]));
            assert!(expr.matches(&[Marker::Cart]));
            assert!(!expr.matches(&[Marker::Cart, Marker::Checkout]));
        }

        #[test]
        fn test_parentheses_and_comma() {
            let expr = MarkerExpr::parse("(cart, search) and not ui").unwrap();
            assert!(expr.matches(&[Marker::Search]));
            assert!(!expr.matches(&[Marker::Search, Marker::Ui]));
            assert!(!expr.matches(&[Marker::Account]));
        }

        #[test]
        fn test_double_negation() {
            let expr = MarkerExpr::parse("not not smoke").unwrap();
            assert!(expr.matches(&[Marker::Smoke]));
        }

        #[test]
        fn test_unknown_marker() {
            let err = MarkerExpr::parse("smoke and slow").unwrap_err();
            assert!(matches!(err, CartcheckError::InvalidMarker { .. }));
            assert!(err.to_string().contains("slow"));
        }

        #[test]
        fn test_malformed() {
            for bad in ["", "smoke and", "(cart", "cart)", "and smoke", "smoke cart", "smoke & cart"] {
                assert!(MarkerExpr::parse(bad).is_err(), "{bad:?} parsed");
            }
        }
    }

    mod filter_tests {
        use super::*;

        #[test]
        fn test_blank_selects_all() {
            let filter = MarkerFilter::from_expression(Some("  ")).unwrap();
            assert!(filter.selects(&[]));
            assert!(MarkerFilter::from_expression(None).unwrap().selects(&[Marker::Cart]));
        }

        #[test]
        fn test_expression_filter() {
            let filter = MarkerFilter::from_expression(Some("smoke")).unwrap();
            assert!(filter.selects(&[Marker::Smoke, Marker::Cart]));
            assert!(!filter.selects(&[Marker::Regression]));
        }
    }

    fn any_marker() -> impl Strategy<Value = Marker> {
        prop::sample::select(Marker::ALL.to_vec())
    }

    fn any_expr() -> impl Strategy<Value = MarkerExpr> {
        any_marker().prop_map(MarkerExpr::Is).prop_recursive(4, 24, 2, |inner| {
            prop_oneof![
                inner.clone().prop_map(|e| MarkerExpr::Not(Box::new(e))),
                (inner.clone(), inner.clone())
                    .prop_map(|(a, b)| MarkerExpr::And(Box::new(a), Box::new(b))),
                (inner.clone(), inner).prop_map(|(a, b)| MarkerExpr::Or(Box::new(a), Box::new(b))),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_display_reparses_to_same_selection(
            expr in any_expr(),
            markers in prop::collection::vec(any_marker(), 0..4),
        ) {
            let reparsed = MarkerExpr::parse(&expr.to_string()).unwrap();
            prop_assert_eq!(reparsed.matches(&markers), expr.matches(&markers));
        }

        #[test]
        fn prop_parse_never_panics(input in "[a-z(), ]{0,40}") {
            let _ = MarkerExpr::parse(&input);
        }
    }
}
