//! Unit normalization for vendor measurement tables.
//!
//! Vendor motor curves report speed in rpm and efficiency in percent. Every
//! downstream fit works in rev/s and unit fractions, so tables are rescaled
//! once, right after ingest.

use crate::domain::columns;
use crate::domain::table::Table;
use crate::error::CurveError;

/// Divide one column by a constant.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitRule {
    pub column: &'static str,
    pub divisor: f64,
    /// When set, a missing column is a schema error; otherwise the rule is skipped.
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitNormalizer {
    rules: Vec<UnitRule>,
}

impl UnitNormalizer {
    pub fn new(rules: Vec<UnitRule>) -> Self {
        Self { rules }
    }

    /// Rules for a vendor motor curve: rpm → rev/s, percent → fraction.
    pub fn motor_curve() -> Self {
        Self::new(vec![
            UnitRule {
                column: columns::SPEED,
                divisor: 60.0,
                required: true,
            },
            UnitRule {
                column: columns::EFFICIENCY,
                divisor: 100.0,
                required: false,
            },
        ])
    }

    pub fn rules(&self) -> &[UnitRule] {
        &self.rules
    }

    /// Return a rescaled copy of `table`.
    pub fn normalize(&self, table: &Table) -> Result<Table, CurveError> {
        let mut out = table.clone();
        for rule in &self.rules {
            if !out.has_column(rule.column) {
                if rule.required {
                    return Err(CurveError::schema(rule.column, table.label()));
                }
                continue;
            }
            let divisor = rule.divisor;
            out.map_column(rule.column, |v| v / divisor)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescales_speed_and_efficiency() {
        let t = Table::from_columns(
            "curve",
            vec![
                (columns::SPEED, vec![0.0, 600.0, 5310.0]),
                (columns::EFFICIENCY, vec![0.0, 50.0, 100.0]),
                (columns::CURRENT, vec![133.0, 90.0, 2.7]),
            ],
        )
        .unwrap();

        let n = UnitNormalizer::motor_curve().normalize(&t).unwrap();
        assert_eq!(n.column(columns::SPEED).unwrap(), &[0.0, 10.0, 88.5]);
        assert_eq!(n.column(columns::EFFICIENCY).unwrap(), &[0.0, 0.5, 1.0]);
        // Untouched columns pass through.
        assert_eq!(n.column(columns::CURRENT).unwrap(), t.column(columns::CURRENT).unwrap());
        // Input is not mutated.
        assert_eq!(t.column(columns::SPEED).unwrap()[1], 600.0);
    }

    #[test]
    fn missing_speed_is_schema_error() {
        let t = Table::from_columns("curve", vec![(columns::CURRENT, vec![1.0])]).unwrap();
        let err = UnitNormalizer::motor_curve().normalize(&t).unwrap_err();
        assert_eq!(err, CurveError::schema(columns::SPEED, "curve"));
    }

    #[test]
    fn optional_efficiency_may_be_absent() {
        let t = Table::from_columns("curve", vec![(columns::SPEED, vec![60.0])]).unwrap();
        let n = UnitNormalizer::motor_curve().normalize(&t).unwrap();
        assert_eq!(n.column(columns::SPEED).unwrap(), &[1.0]);
    }
}
