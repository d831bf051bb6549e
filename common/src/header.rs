//! Firmware header rendering.
//!
//! A header template is plain text with `{{name}}` placeholders. The
//! default template is the LMIC device identifier header used by the
//! platformio projects.

use std::str::FromStr;

use thiserror::Error;

use crate::credentials::CredentialSet;
use crate::hex_bytes::join_byte_literals;

pub const DEFAULT_TEMPLATE: &str = r#"#include <lmic.h>
#include <hal/hal.h>

// OTAA/ABP: defines activation method for the device
#define {{mode}}

// DEVEUI: Unique device ID (LSBF)
static const u1_t DEVEUI[8] PROGMEM = { {{dev_eui}} };

// APPEUI: Application ID (LSBF)
static const u1_t APPEUI[8] PROGMEM = { {{app_eui}} };

// APPKEY: Device-specific AES key.
static const u1_t APPKEY[16] PROGMEM = { {{app_key}} };

// DEVADDR: Unique device ID
static const u4_t DEVADDR = {{dev_addr}};

// NWKSKEY: network specific session key
static const u1_t NWKSKEY[16] PROGMEM = { {{nwk_skey}} };

// APPSKEY: Application specific session key
static const u1_t APPSKEY[16] PROGMEM = { {{app_skey}} };
"#;

/// Placeholder names understood by [`HeaderTemplate`].
pub const PLACEHOLDERS: [&str; 7] = [
    "mode", "dev_eui", "app_eui", "app_key", "dev_addr", "nwk_skey", "app_skey",
];

/// How the 32 bit device address is printed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde_support", serde(rename_all = "lowercase"))]
pub enum DevAddrFormat {
    /// `123456`
    Decimal,
    /// `0x0001E240`
    Hex,
}

impl Default for DevAddrFormat {
    fn default() -> Self {
        Self::Decimal
    }
}

impl FromStr for DevAddrFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "decimal" => Ok(Self::Decimal),
            "hex" => Ok(Self::Hex),
            other => Err(format!(
                "invalid dev addr format {:?}, expected \"decimal\" or \"hex\"",
                other
            )),
        }
    }
}

impl DevAddrFormat {
    pub fn format(&self, dev_addr: u32) -> String {
        match self {
            Self::Decimal => dev_addr.to_string(),
            Self::Hex => format!("0x{:08X}", dev_addr),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown placeholder {{{{{0}}}}}")]
    UnknownPlaceholder(String),

    #[error("unterminated placeholder at offset {0}")]
    Unterminated(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderTemplate {
    source: String,
    dev_addr_format: DevAddrFormat,
}

impl Default for HeaderTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_TEMPLATE.to_string(),
            dev_addr_format: DevAddrFormat::default(),
        }
    }
}

impl HeaderTemplate {
    /// Parse a template, rejecting placeholders we cannot fill.
    pub fn new(source: impl Into<String>) -> Result<Self, TemplateError> {
        let source = source.into();
        let mut rest = source.as_str();
        let mut offset = 0;
        while let Some(start) = rest.find("{{") {
            let after = &rest[start + 2..];
            let end = after
                .find("}}")
                .ok_or(TemplateError::Unterminated(offset + start))?;
            let name = after[..end].trim();
            if !PLACEHOLDERS.contains(&name) {
                return Err(TemplateError::UnknownPlaceholder(name.to_string()));
            }
            let consumed = start + 2 + end + 2;
            offset += consumed;
            rest = &rest[consumed..];
        }
        Ok(Self {
            source,
            dev_addr_format: DevAddrFormat::default(),
        })
    }

    pub fn with_dev_addr_format(mut self, dev_addr_format: DevAddrFormat) -> Self {
        self.dev_addr_format = dev_addr_format;
        self
    }

    /// Substitute the credentials into the template.
    pub fn render(&self, creds: &CredentialSet) -> String {
        let mut out = String::with_capacity(self.source.len() + 256);
        let mut rest = self.source.as_str();
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            // Templates are validated in `new`, every `{{` is terminated
            let end = match after.find("}}") {
                Some(end) => end,
                None => break,
            };
            out.push_str(&self.value(after[..end].trim(), creds));
            rest = &after[end + 2..];
        }
        out.push_str(rest);
        out
    }

    fn value(&self, name: &str, creds: &CredentialSet) -> String {
        match name {
            "mode" => creds.mode.macro_name().to_string(),
            "dev_eui" => join_byte_literals(&creds.dev_eui),
            "app_eui" => join_byte_literals(&creds.app_eui),
            "app_key" => join_byte_literals(&creds.app_key),
            "dev_addr" => self.dev_addr_format.format(creds.dev_addr),
            "nwk_skey" => join_byte_literals(&creds.nwk_skey),
            "app_skey" => join_byte_literals(&creds.app_skey),
            _ => String::new(),
        }
    }
}
