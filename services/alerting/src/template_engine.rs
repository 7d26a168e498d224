//! Email Template Engine
//!
//! Handlebars-based rendering of expiry alert emails.

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde::Serialize;
use shelfwatch_models::{ReportEntry, ScanReport, UrgencyTier};

/// Template definition
#[derive(Debug, Clone)]
pub struct EmailTemplate {
    pub subject_template: String,
    pub body_html_template: String,
    pub body_text_template: String,
}

/// Template rendering result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedEmail {
    pub subject: String,
    pub body_html: String,
    pub body_text: String,
}

/// Template engine
pub struct TemplateEngine {
    html: Handlebars<'static>,
    text: Handlebars<'static>,
    alert: EmailTemplate,
}

impl TemplateEngine {
    pub fn new() -> Self {
        let mut text = Handlebars::new();
        text.register_escape_fn(handlebars::no_escape);

        Self {
            html: Handlebars::new(),
            text,
            alert: expiry_alert_template(),
        }
    }

    /// Render the alert for a report. Subject and text part are not HTML-escaped.
    pub fn render_alert(&self, report: &ScanReport) -> Result<RenderedEmail> {
        let context = AlertContext::from_report(report);

        let subject = self
            .text
            .render_template(&self.alert.subject_template, &context)
            .context("Failed to render subject")?;

        let body_html = self
            .html
            .render_template(&self.alert.body_html_template, &context)
            .context("Failed to render HTML body")?;

        let body_text = self
            .text
            .render_template(&self.alert.body_text_template, &context)
            .context("Failed to render text body")?;

        Ok(RenderedEmail {
            subject: subject.trim().to_string(),
            body_html,
            body_text,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
struct AlertContext {
    filename: String,
    generated_at: String,
    reference_date: String,
    warning_days: u32,
    rows_scanned: usize,
    rows_dropped: usize,
    sheets_processed: usize,
    item_count: usize,
    needs_action: usize,
    sections: Vec<TierSection>,
    skipped_sheets: Vec<String>,
}

#[derive(Debug, Serialize)]
struct TierSection {
    title: &'static str,
    class: &'static str,
    colour: &'static str,
    background: &'static str,
    count: usize,
    items: Vec<ItemView>,
}

#[derive(Debug, Serialize)]
struct ItemView {
    sheet: String,
    row: usize,
    label: String,
    expiry_date: String,
    days_text: String,
    details: String,
}

impl AlertContext {
    fn from_report(report: &ScanReport) -> Self {
        let sections = UrgencyTier::ALL
            .into_iter()
            .filter(|tier| tier.is_reportable())
            .filter_map(|tier| {
                let items: Vec<ItemView> = report.entries_for(tier).map(ItemView::from_entry).collect();
                if items.is_empty() {
                    return None;
                }
                let (colour, background) = tier.colours();
                Some(TierSection {
                    title: tier.title(),
                    class: tier.as_str(),
                    colour,
                    background,
                    count: items.len(),
                    items,
                })
            })
            .collect();

        let counts = report.counts();
        Self {
            filename: report.filename().to_string(),
            generated_at: report.generated_at().format("%B %d, %Y at %H:%M UTC").to_string(),
            reference_date: report.reference_date().format("%Y-%m-%d").to_string(),
            warning_days: report.thresholds().warning_days,
            rows_scanned: report.stats().rows_scanned,
            rows_dropped: report.stats().rows_dropped,
            sheets_processed: report.stats().sheets_processed,
            item_count: report.entries().len(),
            needs_action: counts.expired + counts.critical,
            sections,
            skipped_sheets: report.skipped_sheets().map(|i| i.message.clone()).collect(),
        }
    }
}

impl ItemView {
    fn from_entry(entry: &ReportEntry) -> Self {
        let details = entry
            .record
            .details()
            .into_iter()
            .map(|(field, value)| format!("{}: {}", field.title(), value))
            .collect::<Vec<_>>()
            .join(" | ");

        Self {
            sheet: entry.record.sheet.clone(),
            row: entry.record.row_number,
            label: entry.record.display_label().to_string(),
            expiry_date: entry.record.expiry_date.format("%Y-%m-%d").to_string(),
            days_text: days_text(entry.days_until_expiry),
            details,
        }
    }
}

/// Human wording for a days-until-expiry value.
pub fn days_text(days: i64) -> String {
    match days {
        0 => "Expires today".to_string(),
        -1 => "Expired 1 day ago".to_string(),
        d if d < 0 => format!("Expired {} days ago", -d),
        1 => "1 day left".to_string(),
        d => format!("{} days left", d),
    }
}

fn expiry_alert_template() -> EmailTemplate {
    EmailTemplate {
        subject_template: "Expiry Alert - {{item_count}} Item(s) Require Attention".to_string(),
        body_html_template: r#"<!DOCTYPE html>
<html>
<head><style>body{font-family:'Segoe UI',Arial,sans-serif;line-height:1.6;color:#333;}.header{background:#0891B2;color:white;padding:24px;text-align:center;}.summary{background:#f8f9fa;padding:16px 20px;margin:20px 0;border-left:4px solid #0891B2;}table{width:100%;border-collapse:collapse;margin:8px 0 24px;}th{background:#0891B2;color:white;padding:10px;text-align:left;}td{padding:10px;border-bottom:1px solid #e9ecef;}.footer{font-size:12px;color:#666;}</style></head>
<body>
<div class="header"><h1>Expiry Date Monitoring Alert</h1><p>Report generated {{generated_at}}</p></div>
<div class="summary">
<p><strong>File:</strong> {{filename}}</p>
<p><strong>Reference date:</strong> {{reference_date}}</p>
<p><strong>Warning period:</strong> {{warning_days}} days</p>
<p><strong>Rows with dates:</strong> {{rows_scanned}} &middot; <strong>Sheets processed:</strong> {{sheets_processed}}</p>
<p><strong>Items expiring soon:</strong> {{item_count}}{{#if needs_action}} ({{needs_action}} expired or critical){{/if}}</p>
</div>
{{#each sections}}
<h2 style="color:{{colour}};">{{title}} ({{count}})</h2>
<table class="{{class}}">
<tr><th>Source</th><th>Item</th><th>Expiry Date</th><th>Status</th></tr>
{{#each items}}
<tr style="background-color:{{../background}};">
<td><strong>{{sheet}}</strong> row {{row}}</td>
<td>{{label}}{{#if details}}<br><small>{{details}}</small>{{/if}}</td>
<td>{{expiry_date}}</td>
<td style="color:{{../colour}};"><strong>{{days_text}}</strong></td>
</tr>
{{/each}}
</table>
{{/each}}
{{#if skipped_sheets}}
<p><strong>Skipped sheets:</strong></p>
<ul>{{#each skipped_sheets}}<li>{{this}}</li>{{/each}}</ul>
{{/if}}
{{#if rows_dropped}}<p>{{rows_dropped}} row(s) had a date that could not be read and were left out.</p>{{/if}}
<p><em>Please take the necessary action to replace or dispose of these items.</em></p>
<p class="footer">Generated by Shelfwatch Expiry Monitor</p>
</body>
</html>
"#
        .to_string(),
        body_text_template: r#"EXPIRY DATE MONITORING ALERT
Report generated {{generated_at}}

File: {{filename}}
Reference date: {{reference_date}}
Warning period: {{warning_days}} days
Items expiring soon: {{item_count}}
{{#each sections}}

{{title}} ({{count}})
{{#each items}}
- {{label}} [{{sheet}} row {{row}}] {{expiry_date}}: {{days_text}}{{#if details}} ({{details}}){{/if}}
{{/each}}
{{/each}}
{{#if skipped_sheets}}

Skipped sheets:
{{#each skipped_sheets}}
- {{this}}
{{/each}}
{{/if}}

Please take the necessary action to replace or dispose of these items.
--
Shelfwatch Expiry Monitor
"#
        .to_string(),
    }
}
