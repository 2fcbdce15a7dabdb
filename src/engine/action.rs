//! Typed actions and their parsing from loosely typed parameter bags.

use super::report::ActionError;
use crate::ops::coerce::CastTarget;
use crate::ops::derive::{BinaryOp, UnaryOp};
use crate::ops::text::TextNormalization;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Parameter bag as it arrives from a form, the CLI or a pipeline step.
pub type Params = HashMap<String, String>;

/// Target column name used by `derive_column` when none is given.
pub const DEFAULT_TARGET: &str = "result";

/// Every action identifier the dispatcher understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    DropMissingRows,
    FillValue,
    FillForward,
    FillBackward,
    FillMedian,
    FillMean,
    FillMode,
    DropDuplicateRows,
    DropColumn,
    AddColumn,
    DeriveColumn,
    ReplaceValue,
    NormalizeLowercase,
    NormalizeTrim,
    NormalizeAlnum,
    CastType,
    FilterOutliersIqr,
    FixTypo,
}

impl ActionKind {
    pub const ALL: [Self; 18] = [
        Self::DropMissingRows,
        Self::FillValue,
        Self::FillForward,
        Self::FillBackward,
        Self::FillMedian,
        Self::FillMean,
        Self::FillMode,
        Self::DropDuplicateRows,
        Self::DropColumn,
        Self::AddColumn,
        Self::DeriveColumn,
        Self::ReplaceValue,
        Self::NormalizeLowercase,
        Self::NormalizeTrim,
        Self::NormalizeAlnum,
        Self::CastType,
        Self::FilterOutliersIqr,
        Self::FixTypo,
    ];

    /// Canonical identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DropMissingRows => "drop_missing_rows",
            Self::FillValue => "fill_value",
            Self::FillForward => "fill_forward",
            Self::FillBackward => "fill_backward",
            Self::FillMedian => "fill_median",
            Self::FillMean => "fill_mean",
            Self::FillMode => "fill_mode",
            Self::DropDuplicateRows => "drop_duplicate_rows",
            Self::DropColumn => "drop_column",
            Self::AddColumn => "add_column",
            Self::DeriveColumn => "derive_column",
            Self::ReplaceValue => "replace_value",
            Self::NormalizeLowercase => "normalize_lowercase",
            Self::NormalizeTrim => "normalize_trim",
            Self::NormalizeAlnum => "normalize_alnum",
            Self::CastType => "cast_type",
            Self::FilterOutliersIqr => "filter_outliers_iqr",
            Self::FixTypo => "fix_typo",
        }
    }

    /// Identifiers accepted in addition to [`ActionKind::as_str`].
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::DropMissingRows => &["dropna"],
            Self::FillForward => &["ffill"],
            Self::FillBackward => &["bfill"],
            Self::FillMedian => &["median"],
            Self::FillMean => &["mean"],
            Self::FillMode => &["mode"],
            Self::DropDuplicateRows => &["drop_duplicates"],
            Self::DeriveColumn => &["calc_column"],
            Self::ReplaceValue => &["replace"],
            Self::NormalizeLowercase => &["normalize_lower"],
            Self::NormalizeTrim => &["normalize_strip"],
            Self::NormalizeAlnum => &["normalize_clean"],
            Self::CastType => &["astype"],
            Self::FilterOutliersIqr => &["outlier_iqr"],
            Self::FillValue | Self::DropColumn | Self::AddColumn | Self::FixTypo => &[],
        }
    }
}

impl FromStr for ActionKind {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == id || kind.aliases().contains(&id))
            .ok_or_else(|| ActionError::UnknownAction(id.to_owned()))
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillStrategy {
    Constant(String),
    Forward,
    Backward,
    Median,
    Mean,
    Mode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeriveOperator {
    Binary {
        op: BinaryOp,
        source_a: String,
        source_b: String,
    },
    Unary {
        op: UnaryOp,
        source: String,
    },
    /// Expression source is kept verbatim; a parse failure is an outcome of
    /// the action (an all-null target), not a parameter error.
    Custom {
        source: String,
        expression: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeriveSpec {
    pub operator: DeriveOperator,
    pub target: String,
}

/// A fully parsed action with typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    DropMissingRows,
    Fill {
        column: String,
        strategy: FillStrategy,
    },
    DropDuplicateRows {
        subset: Option<Vec<String>>,
    },
    DropColumn {
        column: String,
    },
    AddColumn {
        name: String,
    },
    DeriveColumn(DeriveSpec),
    ReplaceValue {
        column: String,
        old: String,
        new: String,
    },
    FixTypo {
        column: String,
        old: String,
        new: String,
    },
    Normalize {
        column: String,
        mode: TextNormalization,
    },
    CastType {
        column: String,
        target: CastTarget,
    },
    FilterOutliersIqr {
        column: String,
    },
}

impl Action {
    /// Parse the parameter bag for `kind`. Only the presence and shape of
    /// parameters is checked here; column applicability is checked against a
    /// dataset at dispatch time.
    pub fn parse(kind: ActionKind, params: &Params) -> Result<Self, ActionError> {
        let reader = ParamReader { kind, params };
        let action = match kind {
            ActionKind::DropMissingRows => Self::DropMissingRows,
            ActionKind::FillValue => Self::Fill {
                column: reader.name("column")?,
                strategy: FillStrategy::Constant(reader.literal("value")?),
            },
            ActionKind::FillForward => reader.fill(FillStrategy::Forward)?,
            ActionKind::FillBackward => reader.fill(FillStrategy::Backward)?,
            ActionKind::FillMedian => reader.fill(FillStrategy::Median)?,
            ActionKind::FillMean => reader.fill(FillStrategy::Mean)?,
            ActionKind::FillMode => reader.fill(FillStrategy::Mode)?,
            ActionKind::DropDuplicateRows => Self::DropDuplicateRows {
                subset: reader.optional("subset").and_then(parse_subset),
            },
            ActionKind::DropColumn => Self::DropColumn {
                column: reader.name("column")?,
            },
            ActionKind::AddColumn => Self::AddColumn {
                name: reader.name("name")?,
            },
            ActionKind::DeriveColumn => Self::DeriveColumn(reader.derive()?),
            ActionKind::ReplaceValue => Self::ReplaceValue {
                column: reader.name("column")?,
                old: reader.literal("old")?,
                new: reader.literal("new")?,
            },
            ActionKind::FixTypo => Self::FixTypo {
                column: reader.name("column")?,
                old: reader.literal("old")?,
                new: reader.literal("new")?,
            },
            ActionKind::NormalizeLowercase => reader.normalize(TextNormalization::Lowercase)?,
            ActionKind::NormalizeTrim => reader.normalize(TextNormalization::Trim)?,
            ActionKind::NormalizeAlnum => reader.normalize(TextNormalization::Alnum)?,
            ActionKind::CastType => {
                let column = reader.name("column")?;
                let raw = reader.name("target_type")?;
                let target = raw
                    .parse()
                    .map_err(|reason| ActionError::invalid("target_type", &raw, reason))?;
                Self::CastType { column, target }
            }
            ActionKind::FilterOutliersIqr => Self::FilterOutliersIqr {
                column: reader.name("column")?,
            },
        };
        Ok(action)
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Self::DropMissingRows => ActionKind::DropMissingRows,
            Self::Fill { strategy, .. } => match strategy {
                FillStrategy::Constant(_) => ActionKind::FillValue,
                FillStrategy::Forward => ActionKind::FillForward,
                FillStrategy::Backward => ActionKind::FillBackward,
                FillStrategy::Median => ActionKind::FillMedian,
                FillStrategy::Mean => ActionKind::FillMean,
                FillStrategy::Mode => ActionKind::FillMode,
            },
            Self::DropDuplicateRows { .. } => ActionKind::DropDuplicateRows,
            Self::DropColumn { .. } => ActionKind::DropColumn,
            Self::AddColumn { .. } => ActionKind::AddColumn,
            Self::DeriveColumn(_) => ActionKind::DeriveColumn,
            Self::ReplaceValue { .. } => ActionKind::ReplaceValue,
            Self::FixTypo { .. } => ActionKind::FixTypo,
            Self::Normalize { mode, .. } => match mode {
                TextNormalization::Lowercase => ActionKind::NormalizeLowercase,
                TextNormalization::Trim => ActionKind::NormalizeTrim,
                TextNormalization::Alnum => ActionKind::NormalizeAlnum,
            },
            Self::CastType { .. } => ActionKind::CastType,
            Self::FilterOutliersIqr { .. } => ActionKind::FilterOutliersIqr,
        }
    }

    /// Columns that must exist before the action runs. Subset columns of
    /// `drop_duplicate_rows` are not required; unknown ones fall back to a
    /// whole-row comparison.
    pub fn required_columns(&self) -> Vec<&str> {
        match self {
            Self::DropMissingRows | Self::DropDuplicateRows { .. } | Self::AddColumn { .. } => {
                Vec::new()
            }
            Self::Fill { column, .. }
            | Self::DropColumn { column }
            | Self::ReplaceValue { column, .. }
            | Self::FixTypo { column, .. }
            | Self::Normalize { column, .. }
            | Self::CastType { column, .. }
            | Self::FilterOutliersIqr { column } => vec![column.as_str()],
            Self::DeriveColumn(spec) => match &spec.operator {
                DeriveOperator::Binary {
                    source_a, source_b, ..
                } => vec![source_a.as_str(), source_b.as_str()],
                DeriveOperator::Unary { source, .. } | DeriveOperator::Custom { source, .. } => {
                    vec![source.as_str()]
                }
            },
        }
    }

    /// Column created (or overwritten) by the action.
    pub fn produced_column(&self) -> Option<&str> {
        match self {
            Self::AddColumn { name } => Some(name),
            Self::DeriveColumn(spec) => Some(&spec.target),
            _ => None,
        }
    }

    /// Column removed by the action.
    pub fn removed_column(&self) -> Option<&str> {
        match self {
            Self::DropColumn { column } => Some(column),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())?;
        let columns = self.required_columns();
        if !columns.is_empty() {
            write!(f, " on {}", columns.join(", "))?;
        }
        if let Some(target) = self.produced_column() {
            write!(f, " -> {target}")?;
        }
        Ok(())
    }
}

struct ParamReader<'a> {
    kind: ActionKind,
    params: &'a Params,
}

impl ParamReader<'_> {
    /// A parameter that may legitimately be empty (fill literal, replace
    /// old/new). Only an absent key counts as missing.
    fn literal(&self, key: &'static str) -> Result<String, ActionError> {
        self.params
            .get(key)
            .cloned()
            .ok_or_else(|| ActionError::missing(self.kind, key))
    }

    /// A column name, operator or type. Blank values count as missing.
    fn name(&self, key: &'static str) -> Result<String, ActionError> {
        self.optional(key)
            .ok_or_else(|| ActionError::missing(self.kind, key))
    }

    fn optional(&self, key: &str) -> Option<String> {
        self.params
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    }

    fn fill(&self, strategy: FillStrategy) -> Result<Action, ActionError> {
        Ok(Action::Fill {
            column: self.name("column")?,
            strategy,
        })
    }

    fn normalize(&self, mode: TextNormalization) -> Result<Action, ActionError> {
        Ok(Action::Normalize {
            column: self.name("column")?,
            mode,
        })
    }

    fn derive(&self) -> Result<DeriveSpec, ActionError> {
        let raw = self.name("operator")?;
        let target = self
            .optional("target_name")
            .unwrap_or_else(|| DEFAULT_TARGET.to_owned());
        let source_a = self.name("source_a")?;

        let operator = if raw.eq_ignore_ascii_case("custom") {
            DeriveOperator::Custom {
                source: source_a,
                expression: self.name("expression")?,
            }
        } else if let Ok(op) = raw.parse::<BinaryOp>() {
            DeriveOperator::Binary {
                op,
                source_a,
                source_b: self.name("source_b")?,
            }
        } else if let Ok(op) = raw.parse::<UnaryOp>() {
            DeriveOperator::Unary {
                op,
                source: source_a,
            }
        } else {
            return Err(ActionError::invalid(
                "operator",
                &raw,
                "expected add, subtract, multiply, divide, percent, negate, square, sqrt, log or custom",
            ));
        };

        Ok(DeriveSpec { operator, target })
    }
}

/// Comma-separated column names; blanks are dropped and an empty list means
/// "no subset".
fn parse_subset(raw: String) -> Option<Vec<String>> {
    let names: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();
    (!names.is_empty()).then_some(names)
}
