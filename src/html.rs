//! Page shell, shared Tailwind classes and number formatting for the HTML views.

use std::sync::OnceLock;

use maud::{DOCTYPE, Markup, PreEscaped, html};
use numfmt::{Formatter, Precision};

use crate::endpoints;

pub const LINK_STYLE: &str = "font-medium text-blue-600 underline \
    hover:text-blue-500 dark:text-blue-400 dark:hover:text-blue-300";

pub const BUTTON_PRIMARY_STYLE: &str = "w-full rounded-lg px-4 py-2.5 \
    text-sm font-semibold text-white bg-blue-600 hover:enabled:bg-blue-700 \
    disabled:bg-blue-400 dark:bg-blue-500 hover:enabled:dark:bg-blue-600";

pub const BUTTON_SECONDARY_STYLE: &str = "w-full rounded-lg px-4 py-2.5 \
    text-sm font-medium text-gray-900 bg-white border border-gray-300 \
    hover:bg-gray-100 hover:text-blue-700 dark:bg-gray-800 dark:text-gray-300 \
    dark:border-gray-600 dark:hover:bg-gray-700 dark:hover:text-white";

pub const FORM_CONTAINER_STYLE: &str = "flex flex-col items-center w-full max-w-md \
    mx-auto px-6 py-8 text-gray-900 dark:text-white";
pub const FORM_LABEL_STYLE: &str = "block mb-1.5 text-sm font-medium text-gray-700 dark:text-gray-200";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full rounded-lg p-2.5 text-sm \
    bg-white border border-gray-300 text-gray-900 disabled:text-gray-500 \
    focus:border-blue-600 focus:ring-blue-600 dark:bg-gray-700 \
    dark:border-gray-600 dark:text-white dark:placeholder-gray-400";
pub const FORM_RADIO_GROUP_STYLE: &str = "grid grid-cols-2 gap-2";
pub const FORM_RADIO_INPUT_STYLE: &str = "sr-only";
/// For a label wrapping its radio input, highlighted while the input is checked.
pub const FORM_RADIO_LABEL_STYLE: &str = "block rounded-lg border border-gray-300 \
    px-3 py-2 text-center text-sm font-medium cursor-pointer bg-white \
    text-gray-700 hover:bg-gray-50 dark:bg-gray-700 dark:border-gray-600 \
    dark:text-white has-[:checked]:border-blue-600 has-[:checked]:bg-blue-50 \
    has-[:checked]:text-blue-700 dark:has-[:checked]:bg-blue-600/20 \
    dark:has-[:checked]:text-blue-200 has-[:focus-visible]:ring-2 has-[:focus-visible]:ring-blue-500";

pub const TABLE_HEADER_STYLE: &str = "text-xs uppercase tracking-wide \
    text-gray-600 bg-gray-100 dark:bg-gray-700 dark:text-gray-300";
pub const TABLE_ROW_STYLE: &str = "border-b bg-white dark:bg-gray-800 dark:border-gray-700";
pub const TABLE_CELL_STYLE: &str = "px-4 py-3";

pub const BADGE_BLUE_STYLE: &str = "inline-flex rounded-full px-2.5 py-0.5 \
    text-xs font-semibold bg-blue-100 text-blue-800 dark:bg-blue-900 dark:text-blue-300";
pub const BADGE_PURPLE_STYLE: &str = "inline-flex rounded-full px-2.5 py-0.5 \
    text-xs font-semibold bg-purple-100 text-purple-800 dark:bg-purple-900 dark:text-purple-300";

pub const POSITIVE_AMOUNT_STYLE: &str = "text-emerald-600 dark:text-emerald-400";
pub const NEGATIVE_AMOUNT_STYLE: &str = "text-red-600 dark:text-red-400";

pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center mx-auto px-4 py-6 pb-24 lg:pb-6 text-gray-900 dark:text-white";

/// The htmx scripts every page loads, with their subresource integrity hashes.
const HTMX_SCRIPTS: [(&str, &str); 2] = [
    (
        "/static/htmx-2.0.8-min.js",
        "sha384-/TgkGk7p307TH7EXJDuUlgG3Ce1UVolAOFopFekQkkXihi5u/6OCvVKyz1W+idaz",
    ),
    (
        "/static/htmx-ext-response-targets-2.0.4.js",
        "sha384-T41oglUPvXLGBVyRdZsVRxNWnOOqCynaPubjUVjxhsjFTKrFJGEMm3/0KGmNQ+Pg",
    ),
];

/// Hides the spinner inside `#indicator` until htmx marks a request in flight.
const INDICATOR_CSS: &str = "#indicator.htmx-indicator { display: none; } \
    #indicator.htmx-request .htmx-indicator, \
    #indicator.htmx-request.htmx-indicator { display: inline; }";

/// Extra elements for the `<head>` of a page.
pub enum HeadElement {
    /// The file path or URL to a JavaScript script.
    ScriptLink(String),
    /// JavaScript source code.
    ScriptSource(PreEscaped<String>),
}

/// Wrap `content` in the HTML document shared by every page.
///
/// Failed htmx requests swap their alert into `#alert-container`.
pub fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="es"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " | Cashbook" }
                link rel="icon" type="image/png" sizes="32x32" href="/static/favicon-32x32.png";
                link rel="stylesheet" href="/static/main.css";

                @for (src, integrity) in HTMX_SCRIPTS {
                    script src=(src) integrity=(integrity) {}
                }

                style { (PreEscaped(INDICATOR_CSS)) }

                @for element in head_elements {
                    @match element {
                        HeadElement::ScriptLink(path) => script src=(path) {}
                        HeadElement::ScriptSource(source) => script { (source) }
                    }
                }
            }

            body
                hx-ext="response-targets"
                class="min-h-screen bg-gray-50 dark:bg-gray-900"
            {
                (content)

                div
                    id="alert-container"
                    class="fixed bottom-20 lg:bottom-4 left-1/2 -translate-x-1/2 z-50 w-full max-w-md px-4"
                {}
            }
        }
    }
}

/// A full page error with a retry button and a link back to the dashboard.
///
/// `code` is shown large, e.g. "404", above `description` and `fix`.
pub fn error_view(title: &str, code: &str, description: &str, fix: &str) -> Markup {
    let content = html! {
        main class="flex min-h-screen items-center justify-center px-4"
        {
            div class="max-w-lg text-center"
            {
                h1 class="text-7xl lg:text-8xl font-extrabold text-blue-600 dark:text-blue-500"
                {
                    (code)
                }

                p class="mt-4 text-2xl md:text-3xl font-bold text-gray-900 dark:text-white"
                {
                    (description)
                }

                p class="mt-3 text-lg text-gray-600 dark:text-gray-300" { (fix) }

                div class="mt-6 flex flex-col sm:flex-row justify-center gap-3"
                {
                    button
                        type="button"
                        onclick="location.reload()"
                        class=(BUTTON_SECONDARY_STYLE)
                    {
                        "Reintentar"
                    }

                    a
                        href=(endpoints::DASHBOARD_VIEW)
                        class="w-full rounded-lg px-4 py-2.5 text-sm font-semibold \
                            text-white bg-blue-600 hover:bg-blue-700 dark:bg-blue-500"
                    {
                        "Volver al inicio"
                    }
                }
            }
        }
    };

    base(title, &[], &content)
}

pub fn loading_spinner() -> Markup {
    // Spinner SVG adapted from https://flowbite.com/docs/components/spinner/
    html! {
        svg
            aria-hidden="true"
            role="status"
            class="inline text-white w-4 h-4 me-2 mb-1 animate-spin"
            viewBox="0 0 100 101"
            fill="none"
            xmlns="http://www.w3.org/2000/svg"
        {
            path
                d="M100 50.5908C100 78.2051 77.6142 100.591 50 100.591C22.3858 100.591 0 78.2051 0 50.5908C0 22.9766 22.3858 0.59082 50 0.59082C77.6142 0.59082 100 22.9766 100 50.5908ZM9.08144 50.5908C9.08144 73.1895 27.4013 91.5094 50 91.5094C72.5987 91.5094 90.9186 73.1895 90.9186 50.5908C90.9186 27.9921 72.5987 9.67226 50 9.67226C27.4013 9.67226 9.08144 27.9921 9.08144 50.5908Z"
                fill="#E5E7EB" {}
            path
                d="M93.9676 39.0409C96.393 38.4038 97.8624 35.9116 97.0079 33.5539C95.2932 28.8227 92.871 24.3692 89.8167 20.348C85.8452 15.1192 80.8826 10.7238 75.2124 7.41289C69.5422 4.10194 63.2754 1.94025 56.7698 1.05124C51.7666 0.367541 46.6976 0.446843 41.7345 1.27873C39.2613 1.69328 37.813 4.19778 38.4501 6.62326C39.0873 9.04874 41.5694 10.4717 44.0505 10.1071C47.8511 9.54855 51.7191 9.52689 55.5402 10.0491C60.8642 10.7766 65.9928 12.5457 70.6331 15.2552C75.2735 17.9648 79.3347 21.5619 82.5849 25.841C84.9175 28.9121 86.7997 32.2913 88.1811 35.8758C89.083 38.2158 91.5421 39.6781 93.9676 39.0409Z"
                fill="currentColor" {}
        }
    }
}

fn currency_formatter(
    cell: &'static OnceLock<Formatter>,
    prefix: &str,
    decimals: u8,
) -> &'static Formatter {
    cell.get_or_init(|| {
        Formatter::currency(prefix)
            .unwrap_or_else(|_| Formatter::new())
            .precision(Precision::Decimals(decimals))
    })
}

pub fn format_currency(number: f64) -> String {
    static POSITIVE_FMT: OnceLock<Formatter> = OnceLock::new();
    static NEGATIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let mut formatted_string = if number < 0.0 {
        currency_formatter(&NEGATIVE_FMT, "-$", 2).fmt_string(number.abs())
    } else if number > 0.0 {
        currency_formatter(&POSITIVE_FMT, "$", 2).fmt_string(number)
    } else {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        "$0.00".to_owned()
    };

    // numfmt omits trailing zeros, e.g. "12.30" is rendered as "12.3" and
    // "12.00" as "12".
    match formatted_string.rfind('.') {
        None => formatted_string.push_str(".00"),
        Some(index) if formatted_string.len() - index == 2 => formatted_string.push('0'),
        Some(_) => {}
    }

    formatted_string
}

/// The CSS class for an amount that is coloured by its sign.
pub fn amount_style(amount: f64) -> &'static str {
    if amount < 0.0 {
        NEGATIVE_AMOUNT_STYLE
    } else {
        POSITIVE_AMOUNT_STYLE
    }
}

#[cfg(test)]
mod format_currency_tests {
    use super::format_currency;

    #[test]
    fn formats_positive_amounts_with_two_decimals() {
        assert_eq!(format_currency(12.34), "$12.34");
        assert_eq!(format_currency(12.3), "$12.30");
    }

    #[test]
    fn formats_whole_amounts_with_two_decimals() {
        assert_eq!(format_currency(100.0), "$100.00");
    }

    #[test]
    fn formats_negative_amounts() {
        assert_eq!(format_currency(-40.0), "-$40.00");
    }

    #[test]
    fn formats_zero() {
        assert_eq!(format_currency(0.0), "$0.00");
    }
}
