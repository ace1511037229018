//! Structured template renderer
//!
//! Template text is compiled once into literal segments and typed slots.
//! Values are never spliced in raw: free text goes through
//! `escape_string_literal`, and every other value kind is checked against
//! the character set it is allowed to contain before it is emitted.

use std::collections::BTreeMap;

use crate::{Error, Result};

/// Named insertion point in a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Slot {
    ContractName,
    Question,
    Oracle,
    OracleHex,
    FeeBps,
    MaxFeeBps,
    Mechanism,
    Outcomes,
}

impl Slot {
    pub const ALL: [Slot; 8] = [
        Slot::ContractName,
        Slot::Question,
        Slot::Oracle,
        Slot::OracleHex,
        Slot::FeeBps,
        Slot::MaxFeeBps,
        Slot::Mechanism,
        Slot::Outcomes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Slot::ContractName => "contract_name",
            Slot::Question => "question",
            Slot::Oracle => "oracle",
            Slot::OracleHex => "oracle_hex",
            Slot::FeeBps => "fee_bps",
            Slot::MaxFeeBps => "max_fee_bps",
            Slot::Mechanism => "mechanism",
            Slot::Outcomes => "outcomes",
        }
    }

    fn from_name(name: &str) -> Option<Slot> {
        Slot::ALL.into_iter().find(|s| s.name() == name)
    }
}

/// Value bound to a slot, tagged with how it must be emitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Free text, emitted as the body of a double-quoted string literal
    Text(String),
    Uint(u64),
    /// Bare hex digits
    Hex(String),
    /// `0x`-prefixed hex
    Address(String),
    /// Single identifier
    Ident(String),
    /// Comma-separated identifier list
    IdentList(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(&'static str),
    Slot(Slot),
}

/// Compiled template: literal text interleaved with slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

/// Slot values for one render
pub type Bindings = BTreeMap<Slot, Value>;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

impl Template {
    /// Split `text` on `{{ name }}` placeholders
    ///
    /// # Errors
    /// `TemplateRender` naming the placeholder if it is unknown or unclosed.
    pub fn compile(text: &'static str) -> Result<Template> {
        let mut segments = Vec::new();
        let mut rest = text;

        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                segments.push(Segment::Literal(&rest[..start]));
            }
            let after_open = &rest[start + OPEN.len()..];
            let Some(end) = after_open.find(CLOSE) else {
                return Err(Error::TemplateRender {
                    field: after_open.chars().take(24).collect(),
                });
            };
            let name = after_open[..end].trim();
            let slot = Slot::from_name(name).ok_or_else(|| Error::TemplateRender {
                field: name.to_string(),
            })?;
            segments.push(Segment::Slot(slot));
            rest = &after_open[end + CLOSE.len()..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest));
        }

        Ok(Template { segments })
    }

    /// Slots referenced by the template, in first-use order
    pub fn slots(&self) -> Vec<Slot> {
        let mut seen = Vec::new();
        for segment in &self.segments {
            if let Segment::Slot(slot) = segment {
                if !seen.contains(slot) {
                    seen.push(*slot);
                }
            }
        }
        seen
    }

    /// Render with every slot filled from `bindings`
    ///
    /// # Errors
    /// `TemplateRender` for a slot with no binding or a value that fails its
    /// kind's character check. No default is ever substituted.
    pub fn render(&self, bindings: &Bindings) -> Result<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(slot) => {
                    let value = bindings.get(slot).ok_or_else(|| missing(*slot))?;
                    emit(&mut out, *slot, value)?;
                }
            }
        }
        Ok(out)
    }
}

fn missing(slot: Slot) -> Error {
    Error::TemplateRender {
        field: slot.name().to_string(),
    }
}

fn emit(out: &mut String, slot: Slot, value: &Value) -> Result<()> {
    match value {
        Value::Text(text) => out.push_str(&escape_string_literal(text)),
        Value::Uint(n) => out.push_str(&n.to_string()),
        Value::Hex(hex) => {
            if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(missing(slot));
            }
            out.push_str(hex);
        }
        Value::Address(address) => {
            let digits = address.strip_prefix("0x").unwrap_or("");
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(missing(slot));
            }
            out.push_str(address);
        }
        Value::Ident(ident) => {
            if !is_identifier(ident) {
                return Err(missing(slot));
            }
            out.push_str(ident);
        }
        Value::IdentList(idents) => {
            if idents.is_empty() || !idents.iter().all(|i| is_identifier(i)) {
                return Err(missing(slot));
            }
            out.push_str(&idents.join(", "));
        }
    }
    Ok(())
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Escape text for the inside of a Solidity `"..."` literal
///
/// Printable ASCII passes through except `"` and `\`. Tab, newline and
/// carriage return use their short escapes; every other byte, including
/// each byte of a non-ASCII character, becomes `\xNN`.
pub fn escape_string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ' '..='~' => out.push(ch),
            _ => {
                let mut buf = [0u8; 4];
                for byte in ch.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("\\x{:02x}", byte));
                }
            }
        }
    }
    out
}
