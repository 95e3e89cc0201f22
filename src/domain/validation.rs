/// Loopback Request Validator - Input Validation
///
/// This module turns a raw `LoopbackRequest` into typed domain values before
/// any session is opened. A request that fails here never reaches a device.
///
/// ## Validation Rules
/// - `interface_number` is required and must be a loopback number
/// - `loopback_ip` is required for create/configure and must be IPv4
/// - `subnet`, when present, must be a contiguous mask or prefix length
/// - `description`, when present, must be non-blank, free of control characters
///   and length-limited; it is kept verbatim
///
/// ## Usage
/// ```rust
/// use loopback_api::domain::validation::LoopbackValidator;
/// use loopback_api::shared::protocol::LoopbackRequest;
///
/// let validator = LoopbackValidator::new();
/// let request = LoopbackRequest::default();
/// match validator.validate_create(&request) {
///     Ok(spec) => println!("valid: {}", spec.id),
///     Err(e) => println!("Validation error: {}", e),
/// }
/// ```

use crate::domain::loopback::{InterfaceId, Ipv4Interface, LoopbackSpec};
use crate::shared::protocol::LoopbackRequest;

/// Validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Required field absent or null
    MissingField(&'static str),

    /// Interface number is not a loopback number
    InvalidInterface(String),

    /// Description contains forbidden characters or is too long
    InvalidDescription(String),

    /// Address is not IPv4
    InvalidAddress(String),

    /// Subnet mask or prefix length is invalid
    InvalidMask(String),

    /// Body is not a JSON object of the expected shape
    MalformedBody(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingField(field) => write!(f, "Missing required field: {}", field),
            ValidationError::InvalidInterface(msg) => write!(f, "Invalid interface: {}", msg),
            ValidationError::InvalidDescription(msg) => write!(f, "Invalid description: {}", msg),
            ValidationError::InvalidAddress(msg) => write!(f, "Invalid address: {}", msg),
            ValidationError::InvalidMask(msg) => write!(f, "Invalid subnet: {}", msg),
            ValidationError::MalformedBody(msg) => write!(f, "Malformed request body: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validation configuration
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Maximum description length in characters
    pub max_description_len: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_description_len: 240,
        }
    }
}

/// Loopback request validator
#[derive(Debug, Clone, Default)]
pub struct LoopbackValidator {
    config: ValidationConfig,
}

impl LoopbackValidator {
    /// Creates a new validator with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new validator with custom configuration
    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validates a create/configure request
    ///
    /// # Returns
    /// * `Ok(LoopbackSpec)` with every field parsed
    /// * `Err(ValidationError)` on the first field that fails
    pub fn validate_create(&self, request: &LoopbackRequest) -> Result<LoopbackSpec, ValidationError> {
        let id = self.validate_target(request)?;

        let address = request
            .loopback_ip
            .as_deref()
            .filter(|ip| !ip.trim().is_empty())
            .ok_or(ValidationError::MissingField("loopback_ip"))?;
        let subnet = match &request.subnet {
            None | Some(serde_json::Value::Null) => None,
            Some(value) => Some(LoopbackRequest::scalar(Some(value)).ok_or_else(|| {
                ValidationError::InvalidMask("subnet must be a string or number".to_string())
            })?),
        };
        let ipv4 = Ipv4Interface::parse(address, subnet.as_deref())?;

        let description = match request.description.as_deref() {
            Some(text) => Some(self.validate_description(text)?),
            None => None,
        };

        Ok(LoopbackSpec { id, description, ipv4 })
    }

    /// Validates the interface selector of a delete/show request
    pub fn validate_target(&self, request: &LoopbackRequest) -> Result<InterfaceId, ValidationError> {
        match &request.interface_number {
            None | Some(serde_json::Value::Null) => {
                Err(ValidationError::MissingField("interface_number"))
            }
            Some(value) => {
                let raw = LoopbackRequest::scalar(Some(value)).ok_or_else(|| {
                    ValidationError::InvalidInterface(
                        "interface_number must be a string or number".to_string(),
                    )
                })?;
                InterfaceId::parse(&raw)
            }
        }
    }

    /// Validates the description; the text is sent to the device unchanged
    fn validate_description(&self, text: &str) -> Result<String, ValidationError> {
        if text.trim().is_empty() {
            return Err(ValidationError::InvalidDescription(
                "description must not be empty; omit the field instead".to_string(),
            ));
        }

        if let Some(c) = text.chars().find(|c| c.is_control()) {
            return Err(ValidationError::InvalidDescription(format!(
                "control character {:?} is not allowed",
                c
            )));
        }

        let len = text.chars().count();
        if len > self.config.max_description_len {
            return Err(ValidationError::InvalidDescription(format!(
                "{} characters exceeds maximum {}",
                len, self.config.max_description_len
            )));
        }

        Ok(text.to_string())
    }
}
