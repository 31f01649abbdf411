use std::time::{SystemTime, UNIX_EPOCH};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::{Color, ComposeError, Format, InputError, StyleError};
use crate::encoder::{CodeEncoder, Encoder, ImagePayload, RenderOptions};

pub const MIN_WIDTH: u32 = 10;
pub const MAX_WIDTH: u32 = 300;

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://)?(www\.)?([a-zA-Z0-9-]+(\.[a-zA-Z0-9-]+)+)(/[^\s]*)?$")
        .expect("URL pattern is valid")
});
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Email pattern is valid"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[\d\s()-]{7,}$").expect("Phone pattern is valid"));

// Input kind
//------------------------------------------------------------------------------

/// What the text of a one-off code represents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Url,
    Email,
    Tel,
    /// Input is the network name.
    Wifi { password: String },
}

impl InputKind {
    pub fn validate(&self, input: &str) -> Result<(), InputError> {
        let ok = match self {
            Self::Text => !input.is_empty(),
            Self::Url => URL_RE.is_match(input),
            Self::Email => EMAIL_RE.is_match(input),
            Self::Tel => PHONE_RE.is_match(input),
            Self::Wifi { .. } => !input.is_empty(),
        };
        if ok {
            return Ok(());
        }
        Err(match self {
            Self::Text => InputError::EmptyText,
            Self::Url => InputError::InvalidUrl,
            Self::Email => InputError::InvalidEmail,
            Self::Tel => InputError::InvalidPhone,
            Self::Wifi { .. } => InputError::EmptyNetwork,
        })
    }

    /// Text to encode for `input`.
    pub fn payload(&self, input: &str) -> String {
        match self {
            Self::Wifi { password } => format!("WIFI:S:{input};T:WPA;P:{password};;"),
            _ => input.to_string(),
        }
    }
}

// Render style
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    pub foreground: Color,
    pub background: Color,
    /// Output width in pixels.
    pub width: u32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self { foreground: Color::BLACK, background: Color::WHITE, width: 265 }
    }
}

impl RenderStyle {
    pub fn validate(&self) -> Result<(), StyleError> {
        if !(MIN_WIDTH..=MAX_WIDTH).contains(&self.width) {
            return Err(StyleError::Width { min: MIN_WIDTH, max: MAX_WIDTH, got: self.width });
        }
        Ok(())
    }

    fn apply(&self, base: &RenderOptions) -> RenderOptions {
        RenderOptions {
            foreground: self.foreground,
            background: self.background,
            target_width: Some(self.width),
            ..base.clone()
        }
    }
}

// Compose
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedCode {
    pub payload: String,
    pub format: Format,
    pub image: ImagePayload,
    /// `<qrcode|barcode>-<unix millis>.png`
    pub file_name: String,
}

/// Validates and renders a single code.
pub fn compose(
    kind: &InputKind,
    input: &str,
    style: &RenderStyle,
    format: Format,
    base: &RenderOptions,
) -> Result<ComposedCode, ComposeError> {
    kind.validate(input)?;
    style.validate()?;

    let payload = kind.payload(input);
    let image = CodeEncoder::new(style.apply(base)).encode(&payload, format)?;
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0);
    debug!(format = %format, len = payload.len(), "Composed code");

    Ok(ComposedCode { file_name: format!("{}-{millis}.png", format.label()), payload, format, image })
}

#[cfg(test)]
mod compose_tests {
    use test_case::test_case;

    use super::{compose, InputKind, RenderStyle};
    use crate::common::{ComposeError, Format, InputError, StyleError};
    use crate::encoder::RenderOptions;
    use crate::scan::scan_bytes;

    #[test_case(InputKind::Url, "https://example.com")]
    #[test_case(InputKind::Url, "www.example.co.uk/path?q=1")]
    #[test_case(InputKind::Url, "example.com")]
    #[test_case(InputKind::Email, "someone@example.com")]
    #[test_case(InputKind::Tel, "+1 (555) 010-9999")]
    #[test_case(InputKind::Text, "anything at all")]
    fn test_valid_input(kind: InputKind, input: &str) {
        assert_eq!(kind.validate(input), Ok(()));
    }

    #[test_case(InputKind::Text, "", InputError::EmptyText)]
    #[test_case(InputKind::Url, "not a url", InputError::InvalidUrl)]
    #[test_case(InputKind::Url, "localhost", InputError::InvalidUrl)]
    #[test_case(InputKind::Email, "someone@example", InputError::InvalidEmail)]
    #[test_case(InputKind::Tel, "12345", InputError::InvalidPhone)]
    #[test_case(InputKind::Tel, "555-CALL-NOW", InputError::InvalidPhone)]
    #[test_case(InputKind::Wifi { password: "pw".into() }, "", InputError::EmptyNetwork)]
    fn test_invalid_input(kind: InputKind, input: &str, exp: InputError) {
        assert_eq!(kind.validate(input), Err(exp));
    }

    #[test]
    fn test_wifi_payload() {
        let kind = InputKind::Wifi { password: "s3cret".into() };
        assert_eq!(kind.payload("home"), "WIFI:S:home;T:WPA;P:s3cret;;");
        assert_eq!(InputKind::Email.payload("a@b.co"), "a@b.co");
    }

    #[test_case(9, false)]
    #[test_case(10, true)]
    #[test_case(300, true)]
    #[test_case(301, false)]
    fn test_width_bounds(width: u32, ok: bool) {
        let style = RenderStyle { width, ..Default::default() };
        assert_eq!(style.validate().is_ok(), ok);
    }

    #[test]
    fn test_compose_scans_back() {
        let kind = InputKind::Wifi { password: "s3cret".into() };
        let style = RenderStyle { width: 290, ..Default::default() };
        let code = compose(&kind, "home", &style, Format::Matrix, &RenderOptions::default()).unwrap();

        assert!(code.file_name.starts_with("qrcode-") && code.file_name.ends_with(".png"));
        let scan = scan_bytes(&code.image.to_bytes().unwrap()).unwrap();
        assert_eq!(scan.text, "WIFI:S:home;T:WPA;P:s3cret;;");
    }

    #[test]
    fn test_compose_barcode_name() {
        let style = RenderStyle { width: 200, ..Default::default() };
        let code = compose(&InputKind::Text, "ABC-1", &style, Format::Linear, &RenderOptions::default())
            .unwrap();
        assert!(code.file_name.starts_with("barcode-"));
    }

    #[test]
    fn test_compose_rejects_before_rendering() {
        let style = RenderStyle { width: 5, ..Default::default() };
        let err = compose(&InputKind::Text, "", &style, Format::Matrix, &RenderOptions::default())
            .unwrap_err();
        assert!(matches!(err, ComposeError::Input(InputError::EmptyText)));

        let err = compose(&InputKind::Text, "x", &style, Format::Matrix, &RenderOptions::default())
            .unwrap_err();
        assert!(matches!(err, ComposeError::Style(StyleError::Width { got: 5, .. })));
    }
}
