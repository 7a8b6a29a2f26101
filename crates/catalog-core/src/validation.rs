//! # Validation Module
//!
//! Form validation for products and user accounts.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE (before any store call)                          │
//! │  ├── Required fields, number formats, ranges                           │
//! │  ├── Name uniqueness against the loaded catalog                        │
//! │  └── Every field checked, all errors returned together                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Record store (SQLite)                                        │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE constraints → Conflict                                     │
//! │                                                                         │
//! │  The loaded catalog can be stale, so layer 2 still catches races.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use catalog_core::validation::{validate_price, validate_stock};
//!
//! assert_eq!(validate_price("10.99").unwrap().cents(), 1099);
//! assert!(validate_price("-1").is_err());
//! assert!(validate_stock("2.5").is_err());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationErrors};
use crate::money::Money;
use crate::types::{NewProduct, Product, ProductStatus};
use crate::MIN_PASSWORD_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 1000;
const MAX_USERNAME_LEN: usize = 50;
const MAX_SEARCH_LEN: usize = 100;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a product name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Trims a description; blank becomes `None`.
pub fn validate_description(description: Option<&str>) -> ValidationResult<Option<String>> {
    let description = description.map(str::trim).filter(|d| !d.is_empty());

    match description {
        Some(d) if d.chars().count() > MAX_DESCRIPTION_LEN => Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LEN,
        }),
        other => Ok(other.map(str::to_string)),
    }
}

/// Validates price text as entered.
///
/// ## Rules
/// - Must not be empty
/// - Decimal with at most two fractional digits
/// - Must not be negative (zero is allowed)
pub fn validate_price(input: &str) -> ValidationResult<Money> {
    if input.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "price".to_string(),
        });
    }

    let price = Money::parse(input)?;
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
            kind: "number".to_string(),
        });
    }

    Ok(price)
}

/// Validates stock text as entered.
///
/// ## Rules
/// - Must not be empty
/// - Whole number, no fraction
/// - Must not be negative
pub fn validate_stock(input: &str) -> ValidationResult<i64> {
    let input = input.trim();

    if input.is_empty() {
        return Err(ValidationError::Required {
            field: "stock".to_string(),
        });
    }

    let stock: i64 = input.parse().map_err(|_| ValidationError::InvalidFormat {
        field: "stock".to_string(),
        reason: "must be a whole number".to_string(),
    })?;

    if stock < 0 {
        return Err(ValidationError::Negative {
            field: "stock".to_string(),
            kind: "integer".to_string(),
        });
    }

    Ok(stock)
}

/// Validates the brand/category label against the configured rule.
pub fn validate_classification(value: &str, rule: &Classification) -> ValidationResult<String> {
    let value = value.trim();
    let field = rule.field();

    if value.is_empty() {
        return Err(ValidationError::Required { field });
    }

    if rule.values.is_empty() {
        return Ok(value.to_string());
    }

    // Closed list: accept any casing, store the canonical spelling.
    rule.values
        .iter()
        .find(|allowed| allowed.eq_ignore_ascii_case(value))
        .cloned()
        .ok_or_else(|| ValidationError::NotAllowed {
            field,
            allowed: rule.values.clone(),
        })
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (no search)
/// - Maximum 100 characters
///
/// ## Returns
/// The query unchanged; surrounding spaces are part of the search.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    if query.chars().count() > MAX_SEARCH_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_SEARCH_LEN,
        });
    }

    Ok(query.to_string())
}

/// Validates a username and returns it trimmed.
///
/// Letters, digits, `.`, `_` and `-` only.
pub fn validate_username(username: &str) -> ValidationResult<String> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: MAX_USERNAME_LEN,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only letters, numbers, dots, hyphens, and underscores"
                .to_string(),
        });
    }

    Ok(username.to_string())
}

/// Validates an email address and returns it trimmed.
///
/// Only the shape is checked: `local@domain.tld`, no whitespace.
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if !well_formed {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must be a valid email address".to_string(),
        });
    }

    Ok(email.to_string())
}

/// Checks password length and confirmation.
pub fn validate_new_password(password: &str, confirm: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if password.is_empty() {
        errors.push(ValidationError::Required {
            field: "password".to_string(),
        });
    } else if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }

    if password != confirm {
        errors.push(ValidationError::Mismatch {
            field: "confirm password".to_string(),
        });
    }

    errors.into_result(())
}

// =============================================================================
// Classification Rule
// =============================================================================

/// How products are classified: by brand, by category, or anything else.
///
/// An empty `values` list means free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Classification {
    /// Display label ("brand", "category", ...).
    pub label: String,
    /// Closed list of allowed values.
    pub values: Vec<String>,
}

impl Classification {
    /// Field name used in validation errors.
    pub fn field(&self) -> String {
        self.label.trim().to_lowercase()
    }
}

impl Default for Classification {
    fn default() -> Self {
        Classification {
            label: "brand".to_string(),
            values: Vec::new(),
        }
    }
}

// =============================================================================
// Product Form
// =============================================================================

/// Raw product form input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub brand: String,
    pub status: ProductStatus,
    pub stock: String,
}

impl ProductForm {
    /// Pre-fills the form from an existing product (edit dialog).
    pub fn from_product(product: &Product) -> Self {
        ProductForm {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price().to_string(),
            brand: product.brand.clone(),
            status: product.status,
            stock: product.stock.to_string(),
        }
    }

    /// Validates every field and returns the cleaned draft.
    ///
    /// `is_name_unique` is asked only when the name itself is valid. All
    /// field errors are collected, not just the first.
    ///
    /// ## Example
    /// ```rust
    /// use catalog_core::validation::{Classification, ProductForm};
    ///
    /// let form = ProductForm {
    ///     name: "Widget".into(),
    ///     price: "abc".into(),
    ///     stock: "-1".into(),
    ///     brand: "".into(),
    ///     ..Default::default()
    /// };
    /// let errors = form.validate(&Classification::default(), |_| true).unwrap_err();
    /// assert_eq!(errors.len(), 3);
    /// ```
    pub fn validate(
        &self,
        classification: &Classification,
        is_name_unique: impl Fn(&str) -> bool,
    ) -> Result<NewProduct, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = match validate_product_name(&self.name) {
            Ok(name) if !is_name_unique(&name) => {
                errors.push(ValidationError::Duplicate {
                    field: "name".to_string(),
                    value: name.clone(),
                });
                name
            }
            Ok(name) => name,
            Err(e) => {
                errors.push(e);
                String::new()
            }
        };

        let description = validate_description(self.description.as_deref()).unwrap_or_else(|e| {
            errors.push(e);
            None
        });

        let price = validate_price(&self.price).unwrap_or_else(|e| {
            errors.push(e);
            Money::zero()
        });

        let brand = validate_classification(&self.brand, classification).unwrap_or_else(|e| {
            errors.push(e);
            String::new()
        });

        let stock = validate_stock(&self.stock).unwrap_or_else(|e| {
            errors.push(e);
            0
        });

        errors.into_result(NewProduct {
            name,
            description,
            price_cents: price.cents(),
            brand,
            status: self.status,
            stock,
        })
    }
}

// =============================================================================
// Account Form
// =============================================================================

/// Input of the "create user" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// A validated account form. The password is still plaintext here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl AccountForm {
    pub fn validate(&self) -> Result<ValidAccount, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let username = validate_username(&self.username).unwrap_or_else(|e| {
            errors.push(e);
            String::new()
        });

        let email = validate_email(&self.email).unwrap_or_else(|e| {
            errors.push(e);
            String::new()
        });

        if let Err(password_errors) = validate_new_password(&self.password, &self.confirm_password) {
            for e in password_errors {
                errors.push(e);
            }
        }

        errors.into_result(ValidAccount {
            username,
            email,
            password: self.password.clone(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
