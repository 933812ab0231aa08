//! HTML dashboard page.

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset};

use bandwatch_core::signals::{EvaluatedBar, Signal};
use bandwatch_core::sizing::OrderPlan;

use crate::config::SYMBOL_SLOTS;
use crate::pipeline::DashboardReport;

const STYLE: &str = r#"
        body { font-family: Arial, sans-serif; margin: 20px; background-color: #FEFFFE; }
        h1 { color: #333; text-align: center; }
        .main-table { border-collapse: collapse; width: 80%; margin: 20px auto; }
        .main-table, th, td { border: 1px solid #ccc; padding: 8px; text-align: left; position: relative; }
        th { background-color: #f2f2f2; }
        .highlight-low { background-color: lightgreen; position: relative; }
        .highlight-mid { background-color: yellow; }
        .highlight-high { background-color: red; }
        .price-info { font-size: smaller; color: #333; position: absolute; bottom: 20px; right: 100px; top: 2px; }
        .stop-loss { font-size: smaller; color: red; position: absolute; bottom: 2px; right: 2px; }
        .qty { font-size: smaller; color: blue; position: absolute; top: 2px; right: 2px; }
        .target { font-size: smaller; color: #1233B3; position: absolute; bottom: 2px; right: 100px; }
        .rsi-table { border-collapse: collapse; width: 80%; margin: 0 auto; table-layout: fixed; }
        .rsi-table th, .rsi-table td { border: 1px solid #ccc; padding: 8px; text-align: left; width: 25%; height: 50px; overflow: hidden; }
        .rsi-table th { background-color: #f2f2f2; }
        .input-form { text-align: center; margin-bottom: 20px; }
        .input-form input { padding: 8px; margin-right: 8px; font-size: 16px; }
        .error { color: #B00020; text-align: center; }
        .refreshed { color: #777; text-align: center; font-size: smaller; }
        .gainer { text-align: right; text-decoration: none; margin-right: 200px; }
        .loser { text-align: right; text-decoration: none; margin-right: 100px; }
"#;

const PLACEHOLDERS: [&str; SYMBOL_SLOTS] = [
    "Enter first ticker symbol",
    "Enter second ticker symbol",
    "Enter third ticker symbol",
];

/// Page-level extras that are not part of the pipeline result.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Message from a rejected form submission.
    pub update_error: Option<String>,
    /// Shown under the heading; omitted when `None` so renders stay
    /// byte-identical for identical reports.
    pub refreshed_at: Option<DateTime<FixedOffset>>,
}

/// Escape text for use in element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Colour band for the daily RSI cell.
pub fn daily_rsi_class(rsi: f64) -> &'static str {
    if rsi < 40.0 {
        "highlight-low"
    } else if rsi <= 60.0 {
        "highlight-mid"
    } else {
        "highlight-high"
    }
}

fn fmt_level(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

fn plan_spans(plan: &OrderPlan) -> String {
    format!(
        "<span class='price-info'>Price: {:.2}</span>\
         <span class='stop-loss'>SL: {:.2}</span>\
         <span class='qty'>Qty: {:.2}</span>\
         <span class='target'>Target: {:.2}</span>",
        plan.price, plan.stop_loss, plan.quantity, plan.target_price
    )
}

fn signal_cell(bar: &EvaluatedBar) -> String {
    let rsi = format!("{:.2}", bar.rsi);
    match &bar.signal {
        Signal::NoSignal => format!("<td>{rsi}</td>"),
        Signal::BuyLow(plan) => {
            format!("<td class='highlight-low'>{rsi}{}</td>", plan_spans(plan))
        }
        Signal::SellHigh(plan) => {
            let spans = plan.as_ref().map(plan_spans).unwrap_or_default();
            format!("<td class='highlight-high'>{rsi}{spans}</td>")
        }
    }
}

fn write_form(html: &mut String, report: &DashboardReport) {
    html.push_str("<div class=\"input-form\">\n<form action=\"/\" method=\"post\">\n");
    for (slot, placeholder) in PLACEHOLDERS.iter().enumerate() {
        let value = report
            .symbols
            .get(slot)
            .map(|r| escape_html(&r.symbol))
            .unwrap_or_default();
        let _ = writeln!(
            html,
            "<input type=\"text\" name=\"ticker{}\" value=\"{value}\" placeholder=\"{placeholder}\">",
            slot + 1
        );
    }
    let _ = writeln!(
        html,
        "<input type=\"text\" name=\"capital\" value=\"{}\" placeholder=\"Enter Your Capital\">",
        report.risk.capital
    );
    let _ = writeln!(
        html,
        "<input type=\"text\" name=\"risk\" value=\"{}\" placeholder=\"Enter Your Per Day Risk Capacity\">",
        report.risk.risk_per_trade
    );
    html.push_str("<input type=\"submit\" value=\"Submit\">\n</form>\n</div>\n");
}

fn write_errors(html: &mut String, report: &DashboardReport, options: &RenderOptions) {
    if let Some(message) = &options.update_error {
        let _ = writeln!(html, "<p class=\"error\">{}</p>", escape_html(message));
    }
    for (symbol, error) in report.failures() {
        let _ = writeln!(
            html,
            "<p class=\"error\">{}: {}</p>",
            escape_html(symbol),
            escape_html(&error.to_string())
        );
    }
}

fn write_levels(html: &mut String, report: &DashboardReport) {
    html.push_str(
        "<table class=\"main-table\">\n<thead>\n<tr>\
         <th>Ticker Symbol</th><th>Day RSI Level</th><th>Week RSI Level</th><th>Month RSI Level</th>\
         </tr>\n</thead>\n<tbody>\n",
    );
    for entry in &report.symbols {
        let levels = entry.analysis().map(|a| a.levels).unwrap_or_default();
        let daily = match levels.daily {
            Some(rsi) => format!("<td class=\"{}\">{rsi:.2}</td>", daily_rsi_class(rsi)),
            None => "<td>n/a</td>".to_string(),
        };
        let _ = writeln!(
            html,
            "<tr><td>{}</td>{daily}<td>{}</td><td>{}</td></tr>",
            escape_html(&entry.symbol),
            fmt_level(levels.weekly),
            fmt_level(levels.monthly)
        );
    }
    html.push_str("</tbody>\n</table>\n");
}

fn write_intraday(html: &mut String, report: &DashboardReport) {
    html.push_str("<table class=\"rsi-table\">\n<thead>\n<tr><th>Time</th>");
    for entry in &report.symbols {
        let _ = write!(html, "<th>{} RSI Level</th>", escape_html(&entry.symbol));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    let by_time: Vec<Option<HashMap<DateTime<FixedOffset>, &EvaluatedBar>>> = report
        .symbols
        .iter()
        .map(|entry| {
            entry
                .analysis()
                .map(|a| a.bars.iter().map(|b| (b.timestamp, b)).collect())
        })
        .collect();

    // Rows follow the first symbol that produced data.
    let spine = report.symbols.iter().find_map(|entry| entry.analysis());
    if let Some(spine) = spine {
        for bar in &spine.bars {
            let _ = write!(html, "<tr><td>{}</td>", bar.timestamp.format("%Y-%m-%d %H:%M"));
            for column in &by_time {
                match column.as_ref().and_then(|m| m.get(&bar.timestamp)) {
                    Some(cell) => html.push_str(&signal_cell(cell)),
                    None => html.push_str("<td></td>"),
                }
            }
            html.push_str("</tr>\n");
        }
    }
    html.push_str("</tbody>\n</table>\n");
}

/// Render the full dashboard page.
pub fn render_html(report: &DashboardReport, options: &RenderOptions) -> String {
    let mut html = String::with_capacity(16 * 1024);
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>5-Minute RSI Levels</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <h1>{}</h1>\n",
        report.variant.title()
    );
    for (class, label, url) in report.variant.header_links() {
        let _ = writeln!(
            html,
            "<h2 class=\"{class}\"><a href=\"{url}\" target=\"_blank\">{label}</a></h2>"
        );
    }
    if let Some(at) = options.refreshed_at {
        let _ = writeln!(
            html,
            "<p class=\"refreshed\">Refreshed {}</p>",
            at.format("%Y-%m-%d %H:%M:%S")
        );
    }

    write_form(&mut html, report);
    write_errors(&mut html, report, options);
    write_levels(&mut html, report);
    write_intraday(&mut html, report);

    html.push_str("</body>\n</html>\n");
    html
}
