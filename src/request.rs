use serde::{Deserialize, Serialize};

use crate::common::{Field, FieldError, Format, Method, ValidationErrors};

// Generation request
//------------------------------------------------------------------------------

/// Configuration of one bulk run.
///
/// Numeric fields are kept signed so that out of range user input reaches
/// [`GenerationRequest::validate`] instead of failing at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationRequest {
    pub format: Format,
    pub method: Method,
    pub prefix: String,
    pub start_number: i64,
    pub quantity: i64,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            format: Format::Matrix,
            method: Method::Serial,
            prefix: String::new(),
            start_number: 1,
            quantity: 10,
        }
    }
}

impl GenerationRequest {
    pub fn new(format: Format, method: Method) -> Self {
        Self { format, method, ..Default::default() }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_start_number(mut self, start_number: i64) -> Self {
        self.start_number = start_number;
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn normalized_prefix(&self) -> String {
        self.prefix.to_uppercase()
    }

    /// Checks every field and reports all offending ones at once.
    pub fn validate(&self, max_quantity: u32) -> Result<(), ValidationErrors> {
        let mut errs = Vec::new();

        if self.method == Method::Serial && self.start_number < 1 {
            errs.push(FieldError {
                field: Field::StartNumber,
                message: "Start number must be 1 or greater.".to_string(),
            });
        }

        if self.quantity < 1 {
            errs.push(FieldError {
                field: Field::Quantity,
                message: "Quantity must be 1 or greater.".to_string(),
            });
        } else if self.quantity > i64::from(max_quantity) {
            errs.push(FieldError {
                field: Field::Quantity,
                message: format!("Maximum quantity is {max_quantity}."),
            });
        }

        if errs.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors::new(errs))
        }
    }

    /// Quantity as a count. Only meaningful once the request validated.
    pub(crate) fn count(&self) -> u32 {
        u32::try_from(self.quantity).unwrap_or(0)
    }
}
