//! Declarative field schema shared by the validator and the projector.
//!
//! The tool ships in two configurations:
//!
//! - [`Variant::CodeOnly`]: code + three counts, the code is mandatory.
//! - [`Variant::Detailed`]: code + description + three counts + derived total,
//!   either the code or the description must be filled in.
//!
//! Both are expressed as a [`Schema`] so table rows, CSV columns and the
//! required-field check are generated from the same field list.

use core::fmt;
use core::str::FromStr;

use stocktally_core::{DomainError, DomainResult};

/// Identifies a single item field.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Code,
    Description,
    Pallets,
    BoxesPerPallet,
    UnitsPerBox,
    TotalUnits,
}

/// Metadata for one column of the active schema.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: FieldKey,
    /// Column header used by the table view and the CSV export.
    pub header: &'static str,
    /// Participates in the required-field rule.
    pub required: bool,
    /// Computed from other fields; never entered by the user.
    pub derived: bool,
}

impl FieldSpec {
    const fn input(key: FieldKey, header: &'static str, required: bool) -> Self {
        Self {
            key,
            header,
            required,
            derived: false,
        }
    }

    const fn derived(key: FieldKey, header: &'static str) -> Self {
        Self {
            key,
            header,
            required: false,
            derived: true,
        }
    }
}

/// How the `required` fields of a schema combine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RequiredRule {
    /// Every required field must be non-blank.
    All,
    /// At least one required field must be non-blank.
    Any,
}

/// Named schema configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Variant {
    #[default]
    CodeOnly,
    Detailed,
}

impl Variant {
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::CodeOnly => "code-only",
            Variant::Detailed => "detailed",
        }
    }

    pub fn schema(self) -> Schema {
        match self {
            Variant::CodeOnly => CODE_ONLY,
            Variant::Detailed => DETAILED,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "code-only" | "code_only" | "simple" => Ok(Variant::CodeOnly),
            "detailed" | "full" => Ok(Variant::Detailed),
            other => Err(DomainError::validation(format!(
                "unknown variant '{other}' (expected 'code-only' or 'detailed')"
            ))),
        }
    }
}

/// A field list plus the rule that decides whether a candidate is acceptable.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Schema {
    variant: Variant,
    fields: &'static [FieldSpec],
    rule: RequiredRule,
    missing_message: &'static str,
}

const CODE_ONLY_FIELDS: &[FieldSpec] = &[
    FieldSpec::input(FieldKey::Code, "Código", true),
    FieldSpec::input(FieldKey::Pallets, "Paletes", false),
    FieldSpec::input(FieldKey::BoxesPerPallet, "Caixas/Palete", false),
    FieldSpec::input(FieldKey::UnitsPerBox, "Unidades/Caixa", false),
];

const DETAILED_FIELDS: &[FieldSpec] = &[
    FieldSpec::input(FieldKey::Code, "Código", true),
    FieldSpec::input(FieldKey::Description, "Descrição", true),
    FieldSpec::input(FieldKey::Pallets, "Paletes", false),
    FieldSpec::input(FieldKey::BoxesPerPallet, "Caixas/Palete", false),
    FieldSpec::input(FieldKey::UnitsPerBox, "Unidades/Caixa", false),
    FieldSpec::derived(FieldKey::TotalUnits, "Total Unidades"),
];

pub const CODE_ONLY: Schema = Schema {
    variant: Variant::CodeOnly,
    fields: CODE_ONLY_FIELDS,
    rule: RequiredRule::All,
    missing_message: "Por favor, preencha o Código do Item.",
};

pub const DETAILED: Schema = Schema {
    variant: Variant::Detailed,
    fields: DETAILED_FIELDS,
    rule: RequiredRule::Any,
    missing_message: "Por favor, preencha o Código ou a Descrição do Item.",
};

impl Schema {
    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    /// Fields the user types into, in entry order.
    pub fn input_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(|f| !f.derived)
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.header).collect()
    }

    pub fn includes(&self, key: FieldKey) -> bool {
        self.fields.iter().any(|f| f.key == key)
    }

    /// Message shown when the required-field rule rejects a candidate.
    pub fn missing_message(&self) -> &'static str {
        self.missing_message
    }

    /// Apply the required-field rule to already-trimmed text values.
    pub fn check_required<'a>(&self, text_of: impl Fn(FieldKey) -> &'a str) -> DomainResult<()> {
        let mut required = self.fields.iter().filter(|f| f.required);
        let satisfied = match self.rule {
            RequiredRule::All => required.all(|f| !text_of(f.key).is_empty()),
            RequiredRule::Any => required.any(|f| !text_of(f.key).is_empty()),
        };

        if satisfied {
            Ok(())
        } else {
            Err(DomainError::validation(self.missing_message))
        }
    }
}

impl Default for Schema {
    fn default() -> Self {
        CODE_ONLY
    }
}
