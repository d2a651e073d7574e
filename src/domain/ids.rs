//! Domain identifier types with validation
//!
//! This module provides newtype wrappers for the warehouse business keys.
//! Each type ensures type safety and provides validation at construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Invoice number newtype wrapper
///
/// Represents the business key of a retail invoice. Cancellation invoices
/// carry a reserved `C` prefix (e.g. `C536365` reverses `536365`).
///
/// # Examples
///
/// ```
/// use mercator::domain::ids::InvoiceNo;
/// use std::str::FromStr;
///
/// let invoice = InvoiceNo::from_str("536365").unwrap();
/// assert!(!invoice.is_cancellation());
///
/// let cancellation = InvoiceNo::from_str("C536365").unwrap();
/// assert!(cancellation.is_cancellation());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InvoiceNo(String);

impl InvoiceNo {
    /// Creates a new InvoiceNo from a string
    ///
    /// # Arguments
    ///
    /// * `invoice_no` - The invoice number string
    ///
    /// # Returns
    ///
    /// Returns `Ok(InvoiceNo)` if the number is non-blank, `Err` otherwise
    pub fn new(invoice_no: impl Into<String>) -> Result<Self, String> {
        let invoice_no = invoice_no.into();
        if invoice_no.trim().is_empty() {
            return Err("invoice number cannot be empty".to_string());
        }
        Ok(Self(invoice_no))
    }

    /// Returns the invoice number as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }

    /// True when this invoice reverses a prior one (reserved `C` prefix)
    pub fn is_cancellation(&self) -> bool {
        self.0.starts_with('C')
    }
}

impl fmt::Display for InvoiceNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InvoiceNo {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for InvoiceNo {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Stock code newtype wrapper
///
/// Represents the business key of a product in the source system.
///
/// # Examples
///
/// ```
/// use mercator::domain::ids::StockCode;
/// use std::str::FromStr;
///
/// let code = StockCode::from_str("85123A").unwrap();
/// assert_eq!(code.as_str(), "85123A");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StockCode(String);

impl StockCode {
    /// Creates a new StockCode from a string
    ///
    /// # Arguments
    ///
    /// * `code` - The stock code string
    ///
    /// # Returns
    ///
    /// Returns `Ok(StockCode)` if the code is non-blank, `Err` otherwise
    pub fn new(code: impl Into<String>) -> Result<Self, String> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err("stock code cannot be empty".to_string());
        }
        Ok(Self(code))
    }

    /// Returns the stock code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for StockCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StockCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for StockCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Customer surrogate key
///
/// Source customer identifiers are non-negative integers. The reserved key
/// `-1` is the unknown member, absorbing facts whose source row carried no
/// customer identifier.
///
/// # Examples
///
/// ```
/// use mercator::domain::ids::CustomerKey;
///
/// let known = CustomerKey::new(17850).unwrap();
/// assert!(!known.is_unknown());
///
/// let unknown = CustomerKey::from_source(None);
/// assert_eq!(unknown, CustomerKey::UNKNOWN);
/// assert_eq!(unknown.value(), -1);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CustomerKey(i64);

impl CustomerKey {
    /// The unknown-member key, always present in the customer dimension
    pub const UNKNOWN: CustomerKey = CustomerKey(-1);

    /// Creates a new CustomerKey from a source identifier
    ///
    /// # Arguments
    ///
    /// * `id` - The source customer identifier (non-negative)
    ///
    /// # Returns
    ///
    /// Returns `Ok(CustomerKey)` for non-negative identifiers, `Err` otherwise.
    /// Use [`CustomerKey::UNKNOWN`] for the sentinel key.
    pub fn new(id: i64) -> Result<Self, String> {
        if id < 0 {
            return Err(format!(
                "customer identifier must be non-negative, got {id} (-1 is reserved)"
            ));
        }
        Ok(Self(id))
    }

    /// Resolves an optional source identifier, substituting the unknown member
    pub fn from_source(id: Option<i64>) -> Self {
        match id {
            Some(id) if id >= 0 => Self(id),
            _ => Self::UNKNOWN,
        }
    }

    /// Returns the key value
    pub fn value(&self) -> i64 {
        self.0
    }

    /// True for the reserved unknown-member key
    pub fn is_unknown(&self) -> bool {
        self.0 == -1
    }
}

impl fmt::Display for CustomerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<CustomerKey> for i64 {
    fn from(key: CustomerKey) -> i64 {
        key.0
    }
}
