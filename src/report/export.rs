//! Downloadable versions of the financial report: a CSV file for
//! spreadsheets and a printable HTML page.

use axum::{
    Extension,
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use time::Date;

use crate::{
    Error,
    html::format_currency,
    movement::format_date,
    report::{
        MonthlyBreakdown, Report,
        stats_endpoint::{ReportState, build_report},
    },
    timezone::local_today,
    user::{UserID, get_user_by_id},
};

/// Excel needs the byte order mark to read the file as UTF-8.
const UTF8_BOM: &str = "\u{FEFF}";

/// The name shown when the signed-in user cannot be found.
const UNKNOWN_AUTHOR: &str = "Usuario";

const PRINT_STYLES: &str = "\
body { font-family: Arial, sans-serif; margin: 40px; }
h1 { color: #1f2937; border-bottom: 2px solid #4f46e5; padding-bottom: 10px; }
h2 { color: #374151; margin-top: 30px; }
table { width: 100%; border-collapse: collapse; margin: 20px 0; }
th, td { border: 1px solid #d1d5db; padding: 12px; text-align: left; }
th { background-color: #f3f4f6; font-weight: bold; }
.positive { color: #059669; }
.negative { color: #dc2626; }
.footer { margin-top: 40px; font-size: 12px; color: #6b7280; }";

const PRINT_SCRIPT: &str =
    "window.addEventListener('load', function() { setTimeout(function() { window.print(); }, 500); });";

/// Everything needed to render an export.
struct ExportContext {
    report: Report,
    author: String,
    today: Date,
}

fn load_context(state: &ReportState, user_id: UserID) -> Result<ExportContext, Error> {
    let report = build_report(state)?;
    let today = local_today(&state.local_timezone)?;

    let author = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        match get_user_by_id(user_id, &connection) {
            Ok(user) => user.name,
            Err(Error::NotFound) => UNKNOWN_AUTHOR.to_owned(),
            Err(error) => return Err(error),
        }
    };

    Ok(ExportContext {
        report,
        author,
        today,
    })
}

/// Capitalise the first letter of a month name, e.g. "enero" -> "Enero".
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `part` as a percentage of `whole` with one decimal, or "0%" if `whole` is zero.
fn percentage_of(part: f64, whole: f64) -> String {
    if whole > 0.0 {
        format!("{:.1}%", part / whole * 100.0)
    } else {
        "0%".to_owned()
    }
}

fn monthly_balance(month: &MonthlyBreakdown) -> f64 {
    month.ingresos - month.egresos
}

/// Write the report as CSV with every field quoted.
///
/// # Errors
/// Returns [Error::CsvExport] if the CSV writer fails.
pub fn report_to_csv(report: &Report, author: &str, today: Date) -> Result<String, Error> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let title = format!("REPORTE FINANCIERO - {}", format_date(today));
    let total_income = format!("{:.2}", report.total_income);
    let total_expense = format!("{:.2}", report.total_expense);
    let balance = format!("{:.2}", report.balance);
    let expense_share = percentage_of(report.total_expense, report.total_income);
    let balance_share = percentage_of(report.balance, report.total_income);

    let header_rows: [&[&str]; 10] = [
        &[title.as_str()],
        &["Generado por:", author],
        &[""],
        &["=== RESUMEN EJECUTIVO ==="],
        &["Concepto", "Monto (COP)", "Porcentaje"],
        &["Total Ingresos", total_income.as_str(), "100%"],
        &["Total Egresos", total_expense.as_str(), expense_share.as_str()],
        &["Saldo Final", balance.as_str(), balance_share.as_str()],
        &[""],
        &["=== MOVIMIENTOS POR MES ==="],
    ];

    let write_error = |error: csv::Error| Error::CsvExport(error.to_string());

    for row in header_rows {
        writer.write_record(row).map_err(write_error)?;
    }

    writer
        .write_record(["Mes", "Ingresos (COP)", "Egresos (COP)", "Balance Mensual"])
        .map_err(write_error)?;

    for month in &report.monthly_breakdown {
        writer
            .write_record([
                capitalize(&month.mes),
                format!("{:.2}", month.ingresos),
                format!("{:.2}", month.egresos),
                format!("{:.2}", monthly_balance(month)),
            ])
            .map_err(write_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::CsvExport(error.to_string()))?;
    let body = String::from_utf8(bytes).map_err(|error| Error::CsvExport(error.to_string()))?;

    Ok(format!("{UTF8_BOM}{body}"))
}

/// Download the report as a CSV file.
pub async fn get_report_csv(
    State(state): State<ReportState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let context = load_context(&state, user_id)?;
    let body = report_to_csv(&context.report, &context.author, context.today)?;
    let disposition = format!(
        "attachment; filename=\"reporte_financiero_{}.csv\"",
        context.today
    );

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

fn sign_class(amount: f64) -> &'static str {
    if amount >= 0.0 { "positive" } else { "negative" }
}

/// Render the report as a standalone page that opens the print dialog.
pub fn report_to_printable_html(report: &Report, author: &str, today: Date) -> Markup {
    html! {
        (DOCTYPE)
        html lang="es"
        {
            head
            {
                meta charset="UTF-8";
                title { "Reporte Financiero" }
                style { (PreEscaped(PRINT_STYLES)) }
            }

            body
            {
                h1 { "Reporte Financiero" }
                p { strong { "Fecha:" } " " (format_date(today)) }
                p { strong { "Generado por:" } " " (author) }

                h2 { "Resumen Ejecutivo" }
                table id="summary"
                {
                    tr { th { "Concepto" } th { "Monto (COP)" } th { "Porcentaje" } }
                    tr
                    {
                        td { "Total Ingresos" }
                        td class="positive" { (format_currency(report.total_income)) }
                        td { "100%" }
                    }
                    tr
                    {
                        td { "Total Egresos" }
                        td class="negative" { (format_currency(report.total_expense)) }
                        td { (percentage_of(report.total_expense, report.total_income)) }
                    }
                    tr
                    {
                        td { "Saldo Final" }
                        td class=(sign_class(report.balance)) { (format_currency(report.balance)) }
                        td { (percentage_of(report.balance, report.total_income)) }
                    }
                }

                h2 { "Movimientos por Mes" }
                table id="monthly"
                {
                    tr { th { "Mes" } th { "Ingresos" } th { "Egresos" } th { "Balance" } }
                    @for month in &report.monthly_breakdown {
                        @let balance = monthly_balance(month);
                        tr
                        {
                            td { (capitalize(&month.mes)) }
                            td class="positive" { (format_currency(month.ingresos)) }
                            td class="negative" { (format_currency(month.egresos)) }
                            td class=(sign_class(balance)) { (format_currency(balance)) }
                        }
                    }
                }

                div class="footer"
                {
                    p { "Reporte generado automáticamente por Sistema de Gestión Financiera" }
                }

                script { (PreEscaped(PRINT_SCRIPT)) }
            }
        }
    }
}

/// Show the report as a printable page.
pub async fn get_report_html(
    State(state): State<ReportState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let context = load_context(&state, user_id)?;

    Ok(report_to_printable_html(&context.report, &context.author, context.today).into_response())
}

#[cfg(test)]
mod csv_export_tests {
    use time::macros::date;

    use crate::report::{MonthlyBreakdown, Report};

    use super::{capitalize, percentage_of, report_to_csv};

    fn sample_report() -> Report {
        Report {
            total_income: 160.0,
            total_expense: 40.0,
            balance: 120.0,
            monthly_breakdown: vec![
                MonthlyBreakdown {
                    mes: "enero".to_owned(),
                    ingresos: 100.0,
                    egresos: 40.0,
                },
                MonthlyBreakdown {
                    mes: "febrero".to_owned(),
                    ingresos: 60.0,
                    egresos: 0.0,
                },
            ],
        }
    }

    fn parse_rows(csv_text: &str) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(csv_text.as_bytes());

        reader
            .records()
            .map(|record| {
                record
                    .unwrap()
                    .iter()
                    .map(|field| field.to_owned())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn capitalizes_month_names() {
        assert_eq!(capitalize("enero"), "Enero");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn percentage_is_zero_without_income() {
        assert_eq!(percentage_of(50.0, 0.0), "0%");
        assert_eq!(percentage_of(40.0, 160.0), "25.0%");
    }

    #[test]
    fn starts_with_bom_and_quotes_every_field() {
        let csv_text = report_to_csv(&sample_report(), "Ana", date!(2025 - 02 - 03)).unwrap();

        let csv_text = csv_text
            .strip_prefix('\u{FEFF}')
            .expect("CSV should start with a byte order mark");
        let mut lines = csv_text.lines();
        assert_eq!(lines.next(), Some("\"REPORTE FINANCIERO - 03/02/2025\""));
        assert_eq!(lines.next(), Some("\"Generado por:\",\"Ana\""));
    }

    #[test]
    fn contains_summary_and_monthly_rows() {
        let csv_text = report_to_csv(&sample_report(), "Ana", date!(2025 - 02 - 03)).unwrap();
        let rows = parse_rows(csv_text.trim_start_matches('\u{FEFF}'));

        assert!(rows.contains(&vec![
            "Total Ingresos".to_owned(),
            "160.00".to_owned(),
            "100%".to_owned()
        ]));
        assert!(rows.contains(&vec![
            "Total Egresos".to_owned(),
            "40.00".to_owned(),
            "25.0%".to_owned()
        ]));
        assert!(rows.contains(&vec![
            "Saldo Final".to_owned(),
            "120.00".to_owned(),
            "75.0%".to_owned()
        ]));

        let monthly_header = rows
            .iter()
            .position(|row| row[0] == "Mes")
            .expect("missing monthly table header");
        assert_eq!(
            rows[monthly_header + 1],
            vec!["Enero", "100.00", "40.00", "60.00"]
        );
        assert_eq!(
            rows[monthly_header + 2],
            vec!["Febrero", "60.00", "0.00", "60.00"]
        );
        assert_eq!(rows.len(), monthly_header + 3);
    }
}
