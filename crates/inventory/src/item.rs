use core::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use stocktally_core::{DomainResult, ValueObject};

use crate::schema::{FieldKey, Schema};

/// A non-negative quantity (pallets, boxes per pallet, units per box, total).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Count(u64);

impl Count {
    pub const ZERO: Count = Count(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Normalize raw user input into a count.
    ///
    /// Leading whitespace and an optional sign are accepted, then the leading
    /// run of ASCII digits is read (`"12 cx"` is 12, `"3.9"` is 3). Anything
    /// that does not yield a non-negative integer becomes zero: blank input,
    /// text without leading digits, negative numbers and values that do not fit
    /// in a `u64`.
    pub fn parse_lenient(raw: &str) -> Self {
        let trimmed = raw.trim();
        let (negative, rest) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let digits = &rest[..digits_end];
        if digits.is_empty() {
            return Self::ZERO;
        }

        match digits.parse::<u64>() {
            Ok(value) if !negative => Self(value),
            _ => Self::ZERO,
        }
    }

    pub fn saturating_mul(self, other: Count) -> Count {
        Count(self.0.saturating_mul(other.0))
    }
}

impl ValueObject for Count {}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// Persisted documents may have been written by older or hand-edited copies of
// the tool, so counts are accepted as numbers, numeric strings or null.
impl<'de> Deserialize<'de> for Count {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CountVisitor;

        impl<'de> Visitor<'de> for CountVisitor {
            type Value = Count;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative count")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Count, E> {
                Ok(Count(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Count, E> {
                Ok(u64::try_from(v).map(Count).unwrap_or(Count::ZERO))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Count, E> {
                if v.is_finite() && v >= 0.0 && v < u64::MAX as f64 {
                    Ok(Count(v.trunc() as u64))
                } else {
                    Ok(Count::ZERO)
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Count, E> {
                Ok(Count::parse_lenient(v))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Count, E> {
                Ok(Count::ZERO)
            }

            fn visit_none<E: de::Error>(self) -> Result<Count, E> {
                Ok(Count::ZERO)
            }

            fn visit_some<D2>(self, deserializer: D2) -> Result<Count, D2::Error>
            where
                D2: Deserializer<'de>,
            {
                deserializer.deserialize_any(self)
            }
        }

        deserializer.deserialize_any(CountVisitor)
    }
}

fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Raw, unvalidated field values as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemDraft {
    pub code: String,
    pub description: String,
    pub pallets: String,
    pub boxes_per_pallet: String,
    pub units_per_box: String,
}

impl ItemDraft {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_counts(
        mut self,
        pallets: impl Into<String>,
        boxes_per_pallet: impl Into<String>,
        units_per_box: impl Into<String>,
    ) -> Self {
        self.pallets = pallets.into();
        self.boxes_per_pallet = boxes_per_pallet.into();
        self.units_per_box = units_per_box.into();
        self
    }

    /// Raw text of an input field. Derived fields have no raw text.
    pub fn field(&self, key: FieldKey) -> &str {
        match key {
            FieldKey::Code => &self.code,
            FieldKey::Description => &self.description,
            FieldKey::Pallets => &self.pallets,
            FieldKey::BoxesPerPallet => &self.boxes_per_pallet,
            FieldKey::UnitsPerBox => &self.units_per_box,
            FieldKey::TotalUnits => "",
        }
    }

    pub fn set_field(&mut self, key: FieldKey, value: impl Into<String>) {
        let slot = match key {
            FieldKey::Code => &mut self.code,
            FieldKey::Description => &mut self.description,
            FieldKey::Pallets => &mut self.pallets,
            FieldKey::BoxesPerPallet => &mut self.boxes_per_pallet,
            FieldKey::UnitsPerBox => &mut self.units_per_box,
            FieldKey::TotalUnits => return,
        };
        *slot = value.into();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// One inventory tally record.
///
/// Serialized with the field names of the persisted document (`codigo`,
/// `boxesPerPallet`, ...). `descricao` and `totalUnits` are only written when
/// the record carries them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "codigo", default, deserialize_with = "text_or_empty")]
    pub code: String,
    #[serde(rename = "descricao", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub pallets: Count,
    #[serde(rename = "boxesPerPallet", default)]
    pub boxes_per_pallet: Count,
    #[serde(rename = "unitsPerBox", default)]
    pub units_per_box: Count,
    #[serde(rename = "totalUnits", default, skip_serializing_if = "Option::is_none")]
    pub total_units: Option<Count>,
}

impl ValueObject for Item {}

impl Item {
    /// Validate and normalize a draft against `schema`.
    ///
    /// Text fields are trimmed, counts go through [`Count::parse_lenient`], the
    /// description and total are only kept when the schema has those columns.
    pub fn from_draft(schema: &Schema, draft: &ItemDraft) -> DomainResult<Self> {
        let code = draft.code.trim();
        let description = draft.description.trim();

        schema.check_required(|key| match key {
            FieldKey::Code => code,
            FieldKey::Description => description,
            _ => "",
        })?;

        let mut item = Item {
            code: code.to_string(),
            description: schema
                .includes(FieldKey::Description)
                .then(|| description.to_string()),
            pallets: Count::parse_lenient(&draft.pallets),
            boxes_per_pallet: Count::parse_lenient(&draft.boxes_per_pallet),
            units_per_box: Count::parse_lenient(&draft.units_per_box),
            total_units: None,
        };
        if schema.includes(FieldKey::TotalUnits) {
            item.total_units = Some(item.computed_total());
        }
        Ok(item)
    }

    /// pallets × boxes per pallet × units per box (saturating).
    pub fn computed_total(&self) -> Count {
        self.pallets
            .saturating_mul(self.boxes_per_pallet)
            .saturating_mul(self.units_per_box)
    }

    /// Re-establish the derived total after loading from storage.
    ///
    /// A stored total is never trusted; it is recomputed whenever the record
    /// has one or the schema displays one.
    pub fn conform_to(&mut self, schema: &Schema) {
        if self.total_units.is_some() || schema.includes(FieldKey::TotalUnits) {
            self.total_units = Some(self.computed_total());
        }
    }

    pub fn count(&self, key: FieldKey) -> Option<Count> {
        match key {
            FieldKey::Pallets => Some(self.pallets),
            FieldKey::BoxesPerPallet => Some(self.boxes_per_pallet),
            FieldKey::UnitsPerBox => Some(self.units_per_box),
            FieldKey::TotalUnits => Some(self.computed_total()),
            FieldKey::Code | FieldKey::Description => None,
        }
    }

    /// Display-ready text for a column: counts in plain base 10, missing text
    /// as an empty string.
    pub fn display_value(&self, key: FieldKey) -> String {
        match key {
            FieldKey::Code => self.code.clone(),
            FieldKey::Description => self.description.clone().unwrap_or_default(),
            _ => self.count(key).unwrap_or_default().to_string(),
        }
    }

    /// Short name for messages: the code, or the description when there is no code.
    pub fn label(&self) -> &str {
        match self.description.as_deref() {
            Some(description) if self.code.is_empty() => description,
            _ => &self.code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CODE_ONLY, DETAILED};
    use stocktally_core::DomainError;

    #[test]
    fn parse_lenient_normalizes_bad_input_to_zero() {
        assert_eq!(Count::parse_lenient("-5"), Count::ZERO);
        assert_eq!(Count::parse_lenient(""), Count::ZERO);
        assert_eq!(Count::parse_lenient("   "), Count::ZERO);
        assert_eq!(Count::parse_lenient("abc"), Count::ZERO);
        assert_eq!(Count::parse_lenient("-"), Count::ZERO);
        assert_eq!(Count::parse_lenient("99999999999999999999999"), Count::ZERO);
    }

    #[test]
    fn parse_lenient_reads_leading_digits() {
        assert_eq!(Count::parse_lenient("7"), Count::new(7));
        assert_eq!(Count::parse_lenient(" 12 "), Count::new(12));
        assert_eq!(Count::parse_lenient("+4"), Count::new(4));
        assert_eq!(Count::parse_lenient("3.9"), Count::new(3));
        assert_eq!(Count::parse_lenient("8cx"), Count::new(8));
        assert_eq!(Count::parse_lenient("-0"), Count::ZERO);
    }

    #[test]
    fn from_draft_trims_code_and_normalizes_counts() {
        let draft = ItemDraft::new("  A1 ").with_counts("2", "abc", "-1");
        let item = Item::from_draft(&CODE_ONLY, &draft).unwrap();

        assert_eq!(item.code, "A1");
        assert_eq!(item.description, None);
        assert_eq!(item.pallets, Count::new(2));
        assert_eq!(item.boxes_per_pallet, Count::ZERO);
        assert_eq!(item.units_per_box, Count::ZERO);
        assert_eq!(item.total_units, None);
    }

    #[test]
    fn from_draft_rejects_blank_code_in_code_only_schema() {
        let draft = ItemDraft::new("   ").with_description("widget");
        let err = Item::from_draft(&CODE_ONLY, &draft).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn detailed_schema_computes_total() {
        let draft = ItemDraft::new("")
            .with_description("caixa de parafusos")
            .with_counts("2", "3", "4");
        let item = Item::from_draft(&DETAILED, &draft).unwrap();

        assert_eq!(item.description.as_deref(), Some("caixa de parafusos"));
        assert_eq!(item.total_units, Some(Count::new(24)));
        assert_eq!(item.display_value(FieldKey::TotalUnits), "24");
    }

    #[test]
    fn total_is_zero_when_any_factor_is_zero() {
        let draft = ItemDraft::new("B2").with_counts("5", "", "10");
        let item = Item::from_draft(&DETAILED, &draft).unwrap();
        assert_eq!(item.total_units, Some(Count::ZERO));
    }

    #[test]
    fn serializes_with_persisted_field_names() {
        let item = Item::from_draft(&CODE_ONLY, &ItemDraft::new("A1").with_counts("2", "3", "4"))
            .unwrap();
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(
            json,
            r#"{"codigo":"A1","pallets":2,"boxesPerPallet":3,"unitsPerBox":4}"#
        );
    }

    #[test]
    fn deserializes_loosely_typed_records() {
        let item: Item =
            serde_json::from_str(r#"{"codigo":null,"pallets":"3","boxesPerPallet":-2,"unitsPerBox":1.5}"#)
                .unwrap();
        assert_eq!(item.code, "");
        assert_eq!(item.pallets, Count::new(3));
        assert_eq!(item.boxes_per_pallet, Count::ZERO);
        assert_eq!(item.units_per_box, Count::new(1));
        assert_eq!(item.display_value(FieldKey::Description), "");
    }

    #[test]
    fn conform_to_recomputes_stale_total() {
        let mut item: Item = serde_json::from_str(
            r#"{"codigo":"X","pallets":1,"boxesPerPallet":2,"unitsPerBox":3,"totalUnits":999}"#,
        )
        .unwrap();
        item.conform_to(&CODE_ONLY);
        assert_eq!(item.total_units, Some(Count::new(6)));
    }

    #[test]
    fn label_falls_back_to_description() {
        let coded = Item::from_draft(&DETAILED, &ItemDraft::new("A1").with_description("parafuso")).unwrap();
        assert_eq!(coded.label(), "A1");

        let uncoded = Item::from_draft(&DETAILED, &ItemDraft::new(" ").with_description("porca")).unwrap();
        assert_eq!(uncoded.label(), "porca");
    }
}
