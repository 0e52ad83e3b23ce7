//! Totals, balance and the monthly breakdown of the financial report.

use serde::Serialize;
use time::{Date, Month};
use utoipa::ToSchema;

use crate::movement::MovementType;

/// The part of a movement that the report needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportEntry {
    pub amount: f64,
    pub movement_type: MovementType,
    pub date: Date,
}

/// Income and expenses for one month of the current year.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthlyBreakdown {
    /// The lower-case Spanish month name, e.g. "enero".
    pub mes: String,
    pub ingresos: f64,
    pub egresos: f64,
}

/// The financial report.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Report {
    /// The sum of every income.
    #[serde(rename = "totalIngresos")]
    pub total_income: f64,
    /// The sum of every expense.
    #[serde(rename = "totalEgresos")]
    pub total_expense: f64,
    /// Total income minus total expense.
    #[serde(rename = "saldo")]
    pub balance: f64,
    /// One entry per month of the current year that has movements, in the
    /// order the months first appear among the entries.
    #[serde(rename = "movimientosPorMes")]
    pub monthly_breakdown: Vec<MonthlyBreakdown>,
}

/// The lower-case Spanish name of `month`.
pub fn month_name(month: Month) -> &'static str {
    match month {
        Month::January => "enero",
        Month::February => "febrero",
        Month::March => "marzo",
        Month::April => "abril",
        Month::May => "mayo",
        Month::June => "junio",
        Month::July => "julio",
        Month::August => "agosto",
        Month::September => "septiembre",
        Month::October => "octubre",
        Month::November => "noviembre",
        Month::December => "diciembre",
    }
}

/// Build the report from `entries`.
///
/// The totals cover every entry. The monthly breakdown only covers entries
/// dated on or after `start_of_year`, grouped by month name. Entries with a
/// non-finite amount are ignored.
pub fn aggregate(entries: &[ReportEntry], start_of_year: Date) -> Report {
    let mut total_income = 0.0;
    let mut total_expense = 0.0;
    let mut monthly_breakdown: Vec<MonthlyBreakdown> = Vec::new();

    for entry in entries.iter().filter(|entry| entry.amount.is_finite()) {
        match entry.movement_type {
            MovementType::Income => total_income += entry.amount,
            MovementType::Expense => total_expense += entry.amount,
        }

        if entry.date < start_of_year {
            continue;
        }

        let label = month_name(entry.date.month());
        let index = match monthly_breakdown.iter().position(|month| month.mes == label) {
            Some(index) => index,
            None => {
                monthly_breakdown.push(MonthlyBreakdown {
                    mes: label.to_owned(),
                    ingresos: 0.0,
                    egresos: 0.0,
                });
                monthly_breakdown.len() - 1
            }
        };

        let month = &mut monthly_breakdown[index];
        match entry.movement_type {
            MovementType::Income => month.ingresos += entry.amount,
            MovementType::Expense => month.egresos += entry.amount,
        }
    }

    Report {
        total_income,
        total_expense,
        balance: total_income - total_expense,
        monthly_breakdown,
    }
}

#[cfg(test)]
mod aggregate_tests {
    use time::{Date, macros::date};

    use crate::movement::MovementType;

    use super::{MonthlyBreakdown, Report, ReportEntry, aggregate};

    const START_OF_YEAR: Date = date!(2025 - 01 - 01);

    fn entry(amount: f64, movement_type: MovementType, date: Date) -> ReportEntry {
        ReportEntry {
            amount,
            movement_type,
            date,
        }
    }

    fn month(mes: &str, ingresos: f64, egresos: f64) -> MonthlyBreakdown {
        MonthlyBreakdown {
            mes: mes.to_owned(),
            ingresos,
            egresos,
        }
    }

    #[test]
    fn empty_input_gives_zero_report() {
        assert_eq!(
            aggregate(&[], START_OF_YEAR),
            Report {
                total_income: 0.0,
                total_expense: 0.0,
                balance: 0.0,
                monthly_breakdown: vec![],
            }
        );
    }

    #[test]
    fn totals_and_breakdown_for_current_year() {
        let entries = [
            entry(100.0, MovementType::Income, date!(2025 - 01 - 05)),
            entry(40.0, MovementType::Expense, date!(2025 - 01 - 20)),
            entry(60.0, MovementType::Income, date!(2025 - 02 - 01)),
        ];

        let report = aggregate(&entries, START_OF_YEAR);

        assert_eq!(report.total_income, 160.0);
        assert_eq!(report.total_expense, 40.0);
        assert_eq!(report.balance, 120.0);
        assert_eq!(
            report.monthly_breakdown,
            vec![month("enero", 100.0, 40.0), month("febrero", 60.0, 0.0)]
        );
    }

    #[test]
    fn previous_years_count_towards_totals_only() {
        let entries = [
            entry(500.0, MovementType::Income, date!(2024 - 12 - 31)),
            entry(20.0, MovementType::Expense, date!(2025 - 03 - 10)),
        ];

        let report = aggregate(&entries, START_OF_YEAR);

        assert_eq!(report.total_income, 500.0);
        assert_eq!(report.total_expense, 20.0);
        assert_eq!(report.balance, 480.0);
        assert_eq!(report.monthly_breakdown, vec![month("marzo", 0.0, 20.0)]);
    }

    #[test]
    fn months_keep_first_occurrence_order() {
        let entries = [
            entry(10.0, MovementType::Income, date!(2025 - 05 - 01)),
            entry(20.0, MovementType::Income, date!(2025 - 02 - 01)),
            entry(30.0, MovementType::Expense, date!(2025 - 05 - 20)),
        ];

        let report = aggregate(&entries, START_OF_YEAR);

        assert_eq!(
            report.monthly_breakdown,
            vec![month("mayo", 10.0, 30.0), month("febrero", 20.0, 0.0)]
        );
    }

    #[test]
    fn non_finite_amounts_are_skipped() {
        let entries = [
            entry(f64::NAN, MovementType::Income, date!(2025 - 01 - 05)),
            entry(f64::INFINITY, MovementType::Expense, date!(2025 - 01 - 05)),
            entry(5.0, MovementType::Expense, date!(2025 - 01 - 05)),
        ];

        let report = aggregate(&entries, START_OF_YEAR);

        assert_eq!(report.total_income, 0.0);
        assert_eq!(report.total_expense, 5.0);
        assert_eq!(report.monthly_breakdown, vec![month("enero", 0.0, 5.0)]);
    }

    #[test]
    fn balance_is_income_minus_expense() {
        let entries: Vec<ReportEntry> = (1..=40)
            .map(|i| {
                let movement_type = if i % 3 == 0 {
                    MovementType::Expense
                } else {
                    MovementType::Income
                };
                let date = date!(2024 - 06 - 01)
                    .checked_add(time::Duration::days(i * 11))
                    .unwrap();
                entry(i as f64 * 12.5, movement_type, date)
            })
            .collect();

        let report = aggregate(&entries, START_OF_YEAR);

        assert_eq!(report.balance, report.total_income - report.total_expense);
        let (monthly_income, monthly_expense) = report
            .monthly_breakdown
            .iter()
            .fold((0.0, 0.0), |(income, expense), month| {
                (income + month.ingresos, expense + month.egresos)
            });
        assert!(monthly_income <= report.total_income);
        assert!(monthly_expense <= report.total_expense);
    }

    #[test]
    fn serializes_with_spanish_field_names() {
        let report = aggregate(
            &[entry(100.0, MovementType::Income, date!(2025 - 01 - 05))],
            START_OF_YEAR,
        );

        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "totalIngresos": 100.0,
                "totalEgresos": 0.0,
                "saldo": 100.0,
                "movimientosPorMes": [{"mes": "enero", "ingresos": 100.0, "egresos": 0.0}]
            })
        );
    }
}
