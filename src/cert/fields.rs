//! The certificate body: field names, their wire types and validation rules.
//!
//! [`CertField::ORDER`] is the wire order of the body and therefore part of
//! the signed byte layout. It is a versioned constant of the
//! `*-cert-v01@openssh.com` format, not configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use time::OffsetDateTime;

use crate::error::{Result, SignabilityCause, SshCertError};
use crate::wire;

/// Critical options and extensions: names mapped to (possibly empty) values.
pub type OptionMap = BTreeMap<String, String>;

const KNOWN_CRITICAL_OPTIONS: &[&str] = &["force-command", "source-address", "verify-required"];

const KNOWN_EXTENSIONS: &[&str] = &[
    "no-touch-required",
    "permit-X11-forwarding",
    "permit-agent-forwarding",
    "permit-port-forwarding",
    "permit-pty",
    "permit-user-rc",
];

/// The body fields of a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CertField {
    Serial,
    CertType,
    KeyId,
    Principals,
    ValidAfter,
    ValidBefore,
    CriticalOptions,
    Extensions,
}

impl CertField {
    /// Body fields in wire order.
    pub const ORDER: [CertField; 8] = [
        CertField::Serial,
        CertField::CertType,
        CertField::KeyId,
        CertField::Principals,
        CertField::ValidAfter,
        CertField::ValidBefore,
        CertField::CriticalOptions,
        CertField::Extensions,
    ];

    /// Logical field names in wire order.
    pub fn field_names_in_order() -> impl Iterator<Item = &'static str> {
        Self::ORDER.iter().map(|field| field.name())
    }

    pub fn name(self) -> &'static str {
        match self {
            CertField::Serial => "serial",
            CertField::CertType => "cert_type",
            CertField::KeyId => "key_id",
            CertField::Principals => "principals",
            CertField::ValidAfter => "valid_after",
            CertField::ValidBefore => "valid_before",
            CertField::CriticalOptions => "critical_options",
            CertField::Extensions => "extensions",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::ORDER
            .into_iter()
            .find(|field| field.name() == name)
            .ok_or_else(|| {
                SshCertError::InvalidField(format!("{name} is not a valid certificate field"))
            })
    }

    /// Wire type of the field with the given name.
    pub fn type_for(name: &str) -> Result<FieldKind> {
        Ok(Self::from_name(name)?.kind())
    }

    pub fn kind(self) -> FieldKind {
        match self {
            CertField::Serial => FieldKind::Uint64,
            CertField::CertType => FieldKind::CertType,
            CertField::KeyId => FieldKind::String,
            CertField::Principals => FieldKind::StringList,
            CertField::ValidAfter | CertField::ValidBefore => FieldKind::Timestamp,
            CertField::CriticalOptions | CertField::Extensions => FieldKind::OptionMap,
        }
    }

    /// Whether the field must be assigned before signing. The others encode
    /// as empty when unset.
    pub fn is_required(self) -> bool {
        matches!(
            self,
            CertField::Serial | CertField::CertType | CertField::ValidAfter | CertField::ValidBefore
        )
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Checks one field value. `None` means the field was never assigned.
    pub fn validate(self, value: Option<&FieldValue>) -> std::result::Result<(), SignabilityCause> {
        let Some(value) = value else {
            return if self.is_required() {
                Err(SignabilityCause::MissingField(self))
            } else {
                Ok(())
            };
        };

        let invalid = |reason: String| SignabilityCause::InvalidField {
            field: self,
            reason,
        };

        if !self.kind().accepts(value) {
            return Err(invalid(format!("expected a {} value", self.kind())));
        }

        match (self, value) {
            (CertField::Principals, FieldValue::StringList(principals)) => {
                if principals.iter().any(|p| p.is_empty()) {
                    return Err(invalid("principals must not be empty strings".to_string()));
                }
            }
            (CertField::CriticalOptions, FieldValue::OptionMap(options)) => {
                if let Some(name) = unknown_name(options, KNOWN_CRITICAL_OPTIONS) {
                    return Err(invalid(format!("unknown critical option {name:?}")));
                }
            }
            (CertField::Extensions, FieldValue::OptionMap(extensions)) => {
                if let Some(name) = unknown_name(extensions, KNOWN_EXTENSIONS) {
                    return Err(invalid(format!("unknown extension {name:?}")));
                }
            }
            _ => {}
        }

        Ok(())
    }
}

/// Vendor options are accepted in their `name@domain` form.
fn unknown_name<'a>(map: &'a OptionMap, known: &[&str]) -> Option<&'a str> {
    map.keys()
        .map(String::as_str)
        .find(|name| !known.contains(name) && !name.contains('@'))
}

impl fmt::Display for CertField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CertField {
    type Err = SshCertError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

/// Wire types of body fields. Each one knows how to encode, decode and
/// type-check its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Uint64,
    CertType,
    String,
    StringList,
    Timestamp,
    OptionMap,
}

impl FieldKind {
    /// Encodes `value`, or the empty value of this kind when unset.
    pub fn encode(self, value: Option<&FieldValue>, writer: &mut Vec<u8>) -> Result<()> {
        match (self, value) {
            (FieldKind::Uint64, Some(FieldValue::Uint64(v))) => wire::write_u64(writer, *v),
            (FieldKind::Uint64, None) => wire::write_u64(writer, 0),
            (FieldKind::CertType, Some(FieldValue::CertType(t))) => {
                wire::write_u32(writer, t.as_u32())
            }
            (FieldKind::CertType, None) => wire::write_u32(writer, 0),
            (FieldKind::String, Some(FieldValue::String(s))) => wire::write_str(writer, s),
            (FieldKind::String, None) => wire::write_str(writer, ""),
            (FieldKind::StringList, Some(FieldValue::StringList(items))) => {
                wire::write_string_list(writer, items)
            }
            (FieldKind::StringList, None) => wire::write_string_list(writer, &[]),
            (FieldKind::Timestamp, Some(FieldValue::Timestamp(t))) => {
                wire::write_u64(writer, t.as_unix())
            }
            (FieldKind::Timestamp, None) => wire::write_u64(writer, 0),
            (FieldKind::OptionMap, Some(FieldValue::OptionMap(map))) => {
                wire::write_option_map(writer, map)
            }
            (FieldKind::OptionMap, None) => wire::write_option_map(writer, &OptionMap::new()),
            (kind, Some(other)) => Err(SshCertError::Encoding(format!(
                "cannot encode {other:?} as {kind}"
            ))),
        }
    }

    /// Decodes one value of this kind, advancing `reader` past it.
    pub fn decode(self, reader: &mut &[u8]) -> Result<FieldValue> {
        Ok(match self {
            FieldKind::Uint64 => FieldValue::Uint64(wire::read_u64(reader)?),
            FieldKind::CertType => {
                let raw = wire::read_u32(reader)?;
                FieldValue::CertType(CertType::try_from(raw).map_err(|_| {
                    SshCertError::Format(format!("unknown certificate type {raw}"))
                })?)
            }
            FieldKind::String => FieldValue::String(wire::read_string(reader)?),
            FieldKind::StringList => FieldValue::StringList(wire::read_string_list(reader)?),
            FieldKind::Timestamp => FieldValue::Timestamp(Timestamp(wire::read_u64(reader)?)),
            FieldKind::OptionMap => FieldValue::OptionMap(wire::read_option_map(reader)?),
        })
    }

    pub fn accepts(self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (FieldKind::Uint64, FieldValue::Uint64(_))
                | (FieldKind::CertType, FieldValue::CertType(_))
                | (FieldKind::String, FieldValue::String(_))
                | (FieldKind::StringList, FieldValue::StringList(_))
                | (FieldKind::Timestamp, FieldValue::Timestamp(_))
                | (FieldKind::OptionMap, FieldValue::OptionMap(_))
        )
    }

    /// Converts an assigned value to this kind. Plain integers are accepted
    /// for timestamps and certificate types.
    pub fn coerce(self, value: FieldValue) -> Result<FieldValue> {
        match (self, value) {
            (FieldKind::Timestamp, FieldValue::Uint64(v)) => {
                Ok(FieldValue::Timestamp(Timestamp(v)))
            }
            (FieldKind::CertType, FieldValue::Uint64(v)) => u32::try_from(v)
                .ok()
                .and_then(|v| CertType::try_from(v).ok())
                .map(FieldValue::CertType)
                .ok_or_else(|| {
                    SshCertError::InvalidField(format!("{v} is not a certificate type"))
                }),
            (kind, value) if kind.accepts(&value) => Ok(value),
            (kind, value) => Err(SshCertError::InvalidField(format!(
                "expected a {kind} value, got {value:?}"
            ))),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::Uint64 => "uint64",
            FieldKind::CertType => "certificate type",
            FieldKind::String => "string",
            FieldKind::StringList => "string list",
            FieldKind::Timestamp => "timestamp",
            FieldKind::OptionMap => "option map",
        })
    }
}

/// A body field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Uint64(u64),
    CertType(CertType),
    String(String),
    StringList(Vec<String>),
    Timestamp(Timestamp),
    OptionMap(OptionMap),
}

impl FieldValue {
    /// Empty strings, lists and maps. Numbers are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::String(s) => s.is_empty(),
            FieldValue::StringList(items) => items.is_empty(),
            FieldValue::OptionMap(map) => map.is_empty(),
            FieldValue::Uint64(_) | FieldValue::CertType(_) | FieldValue::Timestamp(_) => false,
        }
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Uint64(value)
    }
}

impl From<CertType> for FieldValue {
    fn from(value: CertType) -> Self {
        FieldValue::CertType(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::StringList(value)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(value: Vec<&str>) -> Self {
        FieldValue::StringList(value.into_iter().map(str::to_string).collect())
    }
}

impl From<Timestamp> for FieldValue {
    fn from(value: Timestamp) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl From<OffsetDateTime> for FieldValue {
    fn from(value: OffsetDateTime) -> Self {
        FieldValue::Timestamp(value.into())
    }
}

impl From<OptionMap> for FieldValue {
    fn from(value: OptionMap) -> Self {
        FieldValue::OptionMap(value)
    }
}

/// Certificate purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CertType {
    User = 1,
    Host = 2,
}

impl CertType {
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for CertType {
    type Error = u32;

    fn try_from(value: u32) -> std::result::Result<Self, u32> {
        match value {
            1 => Ok(CertType::User),
            2 => Ok(CertType::Host),
            other => Err(other),
        }
    }
}

impl fmt::Display for CertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CertType::User => "user",
            CertType::Host => "host",
        })
    }
}

/// Seconds since the unix epoch, as carried by `valid_after`/`valid_before`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// `valid_before` value meaning "never expires".
    pub const FOREVER: Timestamp = Timestamp(u64::MAX);

    pub fn from_unix(seconds: u64) -> Self {
        Timestamp(seconds)
    }

    pub fn now() -> Self {
        OffsetDateTime::now_utc().into()
    }

    pub fn as_unix(self) -> u64 {
        self.0
    }

    /// `None` for instants `time` cannot represent, such as [`Timestamp::FOREVER`].
    pub fn to_datetime(self) -> Option<OffsetDateTime> {
        let seconds = i64::try_from(self.0).ok()?;
        OffsetDateTime::from_unix_timestamp(seconds).ok()
    }
}

impl From<OffsetDateTime> for Timestamp {
    /// Instants before the epoch clamp to zero.
    fn from(value: OffsetDateTime) -> Self {
        Timestamp(u64::try_from(value.unix_timestamp()).unwrap_or(0))
    }
}

impl From<u64> for Timestamp {
    fn from(value: u64) -> Self {
        Timestamp(value)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Timestamp::FOREVER {
            return f.write_str("forever");
        }
        match self.to_datetime() {
            Some(datetime) => write!(f, "{datetime}"),
            None => write!(f, "{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_order_is_the_wire_order() {
        let names: Vec<_> = CertField::field_names_in_order().collect();
        assert_eq!(
            names,
            [
                "serial",
                "cert_type",
                "key_id",
                "principals",
                "valid_after",
                "valid_before",
                "critical_options",
                "extensions",
            ]
        );
        for (i, field) in CertField::ORDER.iter().enumerate() {
            assert_eq!(field.index(), i);
        }
    }

    #[test]
    fn unknown_field_name_is_invalid_field() {
        assert!(matches!(
            CertField::type_for("subject"),
            Err(SshCertError::InvalidField(_))
        ));
        assert_eq!(CertField::type_for("principals").unwrap(), FieldKind::StringList);
        assert_eq!("valid_before".parse::<CertField>().unwrap(), CertField::ValidBefore);
    }

    #[test]
    fn unset_optional_fields_encode_empty() {
        let mut out = Vec::new();
        FieldKind::StringList.encode(None, &mut out).unwrap();
        FieldKind::OptionMap.encode(None, &mut out).unwrap();
        FieldKind::String.encode(None, &mut out).unwrap();
        assert_eq!(out, vec![0u8; 12]);
    }

    #[test]
    fn decode_leaves_remainder() {
        let mut out = Vec::new();
        FieldKind::Timestamp
            .encode(Some(&FieldValue::Timestamp(Timestamp(1000))), &mut out)
            .unwrap();
        out.extend_from_slice(b"rest");

        let mut reader = out.as_slice();
        let value = FieldKind::Timestamp.decode(&mut reader).unwrap();
        assert_eq!(value, FieldValue::Timestamp(Timestamp(1000)));
        assert_eq!(reader, b"rest");
    }

    #[test]
    fn unknown_cert_type_on_the_wire_is_a_format_error() {
        let mut reader: &[u8] = &[0, 0, 0, 3];
        assert!(matches!(
            FieldKind::CertType.decode(&mut reader),
            Err(SshCertError::Format(_))
        ));
    }

    #[test]
    fn coerce_accepts_integers_for_timestamps_and_types() {
        assert_eq!(
            FieldKind::Timestamp.coerce(FieldValue::Uint64(5)).unwrap(),
            FieldValue::Timestamp(Timestamp(5))
        );
        assert_eq!(
            FieldKind::CertType.coerce(FieldValue::Uint64(2)).unwrap(),
            FieldValue::CertType(CertType::Host)
        );
        assert!(FieldKind::CertType.coerce(FieldValue::Uint64(9)).is_err());
        assert!(FieldKind::String.coerce(FieldValue::Uint64(9)).is_err());
    }

    #[test]
    fn validation_rules() {
        assert_eq!(
            CertField::ValidAfter.validate(None),
            Err(SignabilityCause::MissingField(CertField::ValidAfter))
        );
        assert_eq!(CertField::Principals.validate(None), Ok(()));

        let empty_principal = FieldValue::from(vec![""]);
        assert!(CertField::Principals.validate(Some(&empty_principal)).is_err());

        let mut options = OptionMap::new();
        options.insert("force-command".to_string(), "/bin/true".to_string());
        options.insert("custom@example.com".to_string(), String::new());
        assert_eq!(
            CertField::CriticalOptions.validate(Some(&FieldValue::OptionMap(options.clone()))),
            Ok(())
        );
        assert!(
            CertField::Extensions
                .validate(Some(&FieldValue::OptionMap(options)))
                .is_err()
        );
    }

    #[test]
    fn timestamps_convert_from_time() {
        let datetime = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert_eq!(Timestamp::from(datetime), Timestamp(1_700_000_000));
        assert_eq!(Timestamp(1_700_000_000).to_datetime(), Some(datetime));
        assert_eq!(Timestamp::FOREVER.to_datetime(), None);
        assert_eq!(Timestamp::FOREVER.to_string(), "forever");
    }
}
