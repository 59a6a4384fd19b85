use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::catalog::FieldCatalog;
use crate::error::{Error, Result};

/// Requested participation percentage for a field.
///
/// Percentages are not range-checked here; the planner floors whatever it is
/// given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPercentage {
    pub field: String,
    pub percentage: f64,
}

impl FieldPercentage {
    pub fn new(field: impl Into<String>, percentage: f64) -> Self {
        Self {
            field: field.into(),
            percentage,
        }
    }
}

/// Parser for `field=N%` tokens, bound to the names of one catalog.
#[derive(Debug, Clone)]
pub struct SpecifierParser {
    pattern: Regex,
}

impl SpecifierParser {
    pub fn new(catalog: &FieldCatalog) -> Result<Self> {
        if catalog.is_empty() {
            return Err(Error::InvalidCatalog(
                "cannot parse specifiers against an empty catalog".to_string(),
            ));
        }

        let names = catalog
            .field_names()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"^({names})=(100|[1-9]?[0-9])%$"))
            .map_err(|err| Error::InvalidCatalog(format!("field names: {err}")))?;

        Ok(Self { pattern })
    }

    pub fn parse(&self, token: &str) -> Result<FieldPercentage> {
        let malformed = || Error::MalformedSpecifier(token.to_string());
        let captures = self.pattern.captures(token.trim()).ok_or_else(malformed)?;
        let field = captures.get(1).ok_or_else(malformed)?.as_str();
        let percentage: u8 = captures
            .get(2)
            .ok_or_else(malformed)?
            .as_str()
            .parse()
            .map_err(|_| malformed())?;

        Ok(FieldPercentage::new(field, f64::from(percentage)))
    }

    /// Parse every token, stopping at the first malformed one.
    pub fn parse_all<I, S>(&self, tokens: I) -> Result<Vec<FieldPercentage>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tokens
            .into_iter()
            .map(|token| self.parse(token.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Domain, Field};

    fn parser() -> SpecifierParser {
        let catalog = FieldCatalog::new(vec![
            Field::new("heart-rate", Domain::IntRange { min: 50, max: 180 }),
            Field::new(
                "eye-color",
                Domain::Choice {
                    values: vec!["blue".to_string()],
                },
            ),
        ])
        .expect("valid catalog");
        SpecifierParser::new(&catalog).expect("parser")
    }

    #[test]
    fn parses_known_fields() {
        let parser = parser();
        assert_eq!(
            parser.parse("heart-rate=35%").expect("valid token"),
            FieldPercentage::new("heart-rate", 35.0)
        );
        assert_eq!(
            parser.parse("eye-color=100%").expect("valid token"),
            FieldPercentage::new("eye-color", 100.0)
        );
        assert_eq!(
            parser.parse("eye-color=0%").expect("valid token"),
            FieldPercentage::new("eye-color", 0.0)
        );
    }

    #[test]
    fn rejects_malformed_tokens_with_echo() {
        let parser = parser();
        for token in [
            "heart-rate=101%",
            "heart-rate=50",
            "heart-rate=-5%",
            "heart-rate=05%",
            "weight=10%",
            "heart-rate:10%",
            "=10%",
        ] {
            match parser.parse(token) {
                Err(Error::MalformedSpecifier(echoed)) => assert_eq!(echoed, token),
                other => panic!("expected malformed specifier for {token}, got {other:?}"),
            }
        }
    }

    #[test]
    fn parse_all_stops_at_first_error() {
        let parser = parser();
        let result = parser.parse_all(["heart-rate=10%", "bogus", "eye-color=20%"]);
        assert!(matches!(result, Err(Error::MalformedSpecifier(token)) if token == "bogus"));
    }
}
