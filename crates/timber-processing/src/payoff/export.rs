//! Schedule exports: CSV for bank import, printable HTML and JSON.

use askama::Template;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use timber_core::models::{ExportFormat, PayoffPlan};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to serialize schedule: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render schedule page: {0}")]
    Template(#[from] askama::Error),
}

/// Rendered export ready to be served as a download
#[derive(Debug, Clone)]
pub struct ScheduleExport {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

pub fn export_plan(
    plan: &PayoffPlan,
    format: ExportFormat,
    generated: NaiveDate,
) -> Result<ScheduleExport, ExportError> {
    let body = match format {
        ExportFormat::Csv => to_csv(plan, generated),
        ExportFormat::Html => to_html(plan, generated)?,
        ExportFormat::Json => serde_json::to_string_pretty(plan)?,
    };

    Ok(ScheduleExport {
        filename: format!(
            "{}-schedule-{}.{}",
            plan.strategy.as_str(),
            generated.format("%Y-%m-%d"),
            format.extension()
        ),
        content_type: format.content_type(),
        body,
    })
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_row(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn to_csv(plan: &PayoffPlan, generated: NaiveDate) -> String {
    let title = format!("Debt Freedom {} Schedule", plan.strategy.title());
    let generated = generated.format("%Y-%m-%d").to_string();
    let total_months = plan.total_months.to_string();
    let total_interest = format!("{:.2}", plan.total_interest);

    let mut rows = vec![
        csv_row(&[title.as_str(), "", "", "", ""]),
        csv_row(&["Generated", generated.as_str(), "", "", ""]),
        csv_row(&["", "", "", "", ""]),
        csv_row(&[
            "Month",
            "Creditor",
            "Payment Amount",
            "Principal",
            "Interest",
            "Remaining Balance",
        ]),
    ];

    for entry in &plan.schedule {
        let amounts = [
            entry.payment,
            entry.principal,
            entry.interest,
            entry.remaining_balance,
        ]
        .map(|amount| format!("{:.2}", amount));
        rows.push(csv_row(&[
            entry.date.as_str(),
            entry.debt_name.as_str(),
            amounts[0].as_str(),
            amounts[1].as_str(),
            amounts[2].as_str(),
            amounts[3].as_str(),
        ]));
    }

    rows.push(csv_row(&["", "", "", "", ""]));
    rows.push(csv_row(&["Summary", "", "", "", ""]));
    rows.push(csv_row(&["Total Months", total_months.as_str(), "", "", ""]));
    rows.push(csv_row(&["Total Interest", total_interest.as_str(), "", "", ""]));
    rows.push(csv_row(&["Debt Free Date", plan.debt_free_date.as_str(), "", "", ""]));

    rows.join("\n")
}

/// Printable schedule page; askama escapes every interpolated value.
#[derive(Template)]
#[template(path = "schedule.html")]
struct ScheduleTemplate<'a> {
    title: String,
    generated: String,
    monthly_payment: String,
    total_months: u32,
    debt_free_date: &'a str,
    total_interest: String,
    total_paid: String,
    rows: Vec<ScheduleRow<'a>>,
}

struct ScheduleRow<'a> {
    date: &'a str,
    creditor: &'a str,
    payment: String,
    principal: String,
    interest: String,
    balance: String,
}

fn cents(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

pub fn to_html(plan: &PayoffPlan, generated: NaiveDate) -> Result<String, askama::Error> {
    let rows = plan
        .schedule
        .iter()
        .map(|entry| ScheduleRow {
            date: &entry.date,
            creditor: &entry.debt_name,
            payment: cents(entry.payment),
            principal: cents(entry.principal),
            interest: cents(entry.interest),
            balance: cents(entry.remaining_balance),
        })
        .collect();

    ScheduleTemplate {
        title: format!("Debt Freedom {} Schedule", plan.strategy.title()),
        generated: generated.format("%Y-%m-%d").to_string(),
        monthly_payment: cents(plan.monthly_payment),
        total_months: plan.total_months,
        debt_free_date: &plan.debt_free_date,
        total_interest: cents(plan.total_interest),
        total_paid: cents(plan.total_paid),
        rows,
    }
    .render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use timber_core::models::{PayoffScheduleEntry, PayoffStrategy};

    fn plan() -> PayoffPlan {
        PayoffPlan {
            strategy: PayoffStrategy::Avalanche,
            total_months: 2,
            total_interest: Decimal::new(1510, 2),
            total_paid: Decimal::new(101510, 2),
            debt_free_date: "February 2025".to_string(),
            monthly_payment: Decimal::from(600),
            schedule: vec![
                PayoffScheduleEntry {
                    month: 1,
                    date: "2025-01".to_string(),
                    debt_name: "Bank, \"Premier\" <Card>".to_string(),
                    payment: Decimal::from(500),
                    principal: Decimal::from(490),
                    interest: Decimal::from(10),
                    remaining_balance: Decimal::from(510),
                    is_payoff_month: false,
                },
                PayoffScheduleEntry {
                    month: 2,
                    date: "2025-02".to_string(),
                    debt_name: "Bank, \"Premier\" <Card>".to_string(),
                    payment: Decimal::new(51510, 2),
                    principal: Decimal::from(510),
                    interest: Decimal::new(510, 2),
                    remaining_balance: Decimal::ZERO,
                    is_payoff_month: true,
                },
            ],
            debt_order: vec![],
        }
    }

    fn generated() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
    }

    #[test]
    fn test_csv_layout() {
        let csv = to_csv(&plan(), generated());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Debt Freedom Avalanche Schedule,,,,");
        assert_eq!(lines[1], "Generated,2025-01-10,,,");
        assert_eq!(
            lines[3],
            "Month,Creditor,Payment Amount,Principal,Interest,Remaining Balance"
        );
        assert_eq!(
            lines[4],
            "2025-01,\"Bank, \"\"Premier\"\" <Card>\",500.00,490.00,10.00,510.00"
        );
        assert_eq!(lines[5].split(',').last(), Some("0.00"));
        assert_eq!(lines[7], "Summary,,,,");
        assert_eq!(lines[8], "Total Months,2,,,");
        assert_eq!(lines[9], "Total Interest,15.10,,,");
        assert_eq!(lines[10], "Debt Free Date,February 2025,,,");
    }

    #[test]
    fn test_html_escapes_names() {
        let html = to_html(&plan(), generated()).unwrap();
        assert!(html.contains("<h1>Debt Freedom Avalanche Schedule</h1>"));
        assert!(html.contains("Bank, &quot;Premier&quot; &lt;Card&gt;"));
        assert!(!html.contains("<Card>"));
        assert!(html.contains("Monthly Payment: $600.00"));
        assert!(html.contains("<td>$515.10</td>"));
        assert_eq!(html.matches("<td>2025-0").count(), 2);
    }

    #[test]
    fn test_html_export_is_served_as_page() {
        let export = export_plan(&plan(), ExportFormat::Html, generated()).unwrap();
        assert_eq!(export.filename, "avalanche-schedule-2025-01-10.html");
        assert!(export.body.starts_with("<!DOCTYPE html>"));
        assert!(export.body.contains("Debt Free Date: February 2025"));
    }

    #[test]
    fn test_export_plan_names_file() {
        let export = export_plan(&plan(), ExportFormat::Json, generated()).unwrap();
        assert_eq!(export.filename, "avalanche-schedule-2025-01-10.json");
        assert_eq!(export.content_type, "application/json");
        let value: serde_json::Value = serde_json::from_str(&export.body).unwrap();
        assert_eq!(value["totalMonths"], 2);
        assert_eq!(value["debtFreeDate"], "February 2025");
    }
}
