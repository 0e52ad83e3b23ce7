//! The reports page: summary cards, a monthly chart, the monthly table and
//! links to the exports.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisPointer, AxisPointerType, AxisType, ItemStyle, Tooltip, Trigger},
    series::Bar,
};
use maud::{Markup, PreEscaped, html};

use crate::{
    Error, endpoints,
    html::{
        BUTTON_SECONDARY_STYLE, HeadElement, NEGATIVE_AMOUNT_STYLE, PAGE_CONTAINER_STYLE,
        POSITIVE_AMOUNT_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        amount_style, base, format_currency,
    },
    navigation::NavBar,
    report::{
        Report,
        stats_endpoint::{ReportState, build_report},
    },
};

const CHART_ID: &str = "monthly-chart";

/// Render the reports page.
pub async fn get_reports_page(State(state): State<ReportState>) -> Result<Response, Error> {
    let report = build_report(&state)?;

    Ok(reports_view(&report).into_response())
}

/// Income against expenses for each month of the current year.
fn monthly_chart(report: &Report) -> Chart {
    let labels: Vec<String> = report
        .monthly_breakdown
        .iter()
        .map(|month| month.mes.clone())
        .collect();
    let income: Vec<f64> = report
        .monthly_breakdown
        .iter()
        .map(|month| month.ingresos)
        .collect();
    let expenses: Vec<f64> = report
        .monthly_breakdown
        .iter()
        .map(|month| month.egresos)
        .collect();

    Chart::new()
        .title(Title::new().text("Movimientos por mes").subtext("Año en curso"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .legend(Legend::new().top("1%").right("4%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(70)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(
            Bar::new()
                .name("Ingresos")
                .item_style(ItemStyle::new().color("#10b981"))
                .data(income),
        )
        .series(
            Bar::new()
                .name("Egresos")
                .item_style(ItemStyle::new().color("#ef4444"))
                .data(expenses),
        )
}

fn chart_script(chart: &Chart) -> HeadElement {
    let script = format!(
        r#"document.addEventListener('DOMContentLoaded', function() {{
            const chart = echarts.init(document.getElementById("{CHART_ID}"));
            chart.setOption({});
            window.addEventListener('resize', chart.resize);
        }});"#,
        chart
    );

    HeadElement::ScriptSource(PreEscaped(script))
}

fn summary_card(title: &str, amount: f64, style: &str, id: &str) -> Markup {
    html!(
        div class="p-6 bg-white border border-gray-200 rounded-lg shadow
            dark:bg-gray-800 dark:border-gray-700"
        {
            h3 class="text-sm font-medium uppercase tracking-wider
                text-gray-500 dark:text-gray-400"
            {
                (title)
            }

            p id=(id) class={"text-2xl font-bold " (style)}
            {
                (format_currency(amount))
            }
        }
    )
}

fn reports_view(report: &Report) -> Markup {
    let nav_bar = NavBar::new(endpoints::REPORTS_VIEW).into_html();
    let chart = monthly_chart(report);

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full space-y-6 lg:max-w-5xl"
            {
                h1 class="text-xl font-bold" { "Reportes Financieros" }

                div class="grid grid-cols-1 md:grid-cols-3 gap-4"
                {
                    (summary_card(
                        "Total Ingresos",
                        report.total_income,
                        POSITIVE_AMOUNT_STYLE,
                        "total-income"
                    ))
                    (summary_card(
                        "Total Egresos",
                        report.total_expense,
                        NEGATIVE_AMOUNT_STYLE,
                        "total-expense"
                    ))
                    (summary_card(
                        "Saldo",
                        report.balance,
                        amount_style(report.balance),
                        "balance"
                    ))
                }

                div id=(CHART_ID) class="min-h-[380px] rounded dark:bg-gray-100" {}

                div class="dark:bg-gray-800 overflow-x-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Mes" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Ingresos" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Egresos" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Balance" }
                            }
                        }

                        tbody
                        {
                            @for month in &report.monthly_breakdown {
                                @let balance = month.ingresos - month.egresos;
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE) { (month.mes) }
                                    td class=(TABLE_CELL_STYLE) { (format_currency(month.ingresos)) }
                                    td class=(TABLE_CELL_STYLE) { (format_currency(month.egresos)) }
                                    td class={(TABLE_CELL_STYLE) " " (amount_style(balance))}
                                    {
                                        (format_currency(balance))
                                    }
                                }
                            }

                            @if report.monthly_breakdown.is_empty() {
                                tr
                                {
                                    td
                                        colspan="4"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No hay movimientos este año."
                                    }
                                }
                            }
                        }
                    }
                }

                section id="exports" class="grid grid-cols-1 md:grid-cols-2 gap-4"
                {
                    a href=(endpoints::REPORT_CSV) download class=(BUTTON_SECONDARY_STYLE)
                    {
                        "Descargar CSV"
                    }

                    a href=(endpoints::REPORT_HTML) target="_blank" class=(BUTTON_SECONDARY_STYLE)
                    {
                        "Imprimir / PDF"
                    }
                }
            }
        }
    );

    base(
        "Reportes",
        &[
            HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
            chart_script(&chart),
        ],
        &content,
    )
}
