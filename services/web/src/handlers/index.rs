use axum::response::Html;

const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Shelfwatch Expiry Monitor</title>
<style>
body{font-family:'Segoe UI',Arial,sans-serif;max-width:760px;margin:40px auto;color:#333;line-height:1.5;}
.banner{background:#0891B2;color:white;padding:24px;border-radius:8px;}
fieldset{border:1px solid #e5e7eb;border-radius:8px;margin:16px 0;padding:16px;}
label{display:block;margin:8px 0 4px;font-weight:600;}
input,select{padding:6px;width:100%;box-sizing:border-box;}
.actions button{margin:12px 8px 0 0;padding:10px 16px;background:#0891B2;color:white;border:0;border-radius:6px;cursor:pointer;}
</style>
</head>
<body>
<div class="banner">
<h1>Shelfwatch Expiry Monitor</h1>
<p>Upload any spreadsheet. Expiry date columns are found automatically.</p>
</div>
<form method="post" enctype="multipart/form-data" action="/api/v1/scan">
<fieldset>
<label for="file">Spreadsheet (XLSX, XLS, ODS or CSV)</label>
<input type="file" id="file" name="file" accept=".xlsx,.xls,.ods,.csv" required>
<label for="warning_days">Warning period (days, 30-180)</label>
<input type="number" id="warning_days" name="warning_days" min="30" max="180" step="10" value="90">
<label for="exclude_sheets">Exclude sheets (comma-separated)</label>
<input type="text" id="exclude_sheets" name="exclude_sheets" placeholder="Archive, Template, Old Data">
<label for="date_order">Ambiguous dates like 03/04/2026</label>
<select id="date_order" name="date_order">
<option value="">Detect from file</option>
<option value="month_first">Month first (March 4)</option>
<option value="day_first">Day first (3 April)</option>
</select>
</fieldset>
<fieldset>
<label for="recipient">Alert recipient (email only)</label>
<input type="email" id="recipient" name="recipient" placeholder="manager@example.com">
</fieldset>
<div class="actions">
<button type="submit">View report</button>
<button type="submit" formaction="/api/v1/scan/export?format=xlsx">Download Excel</button>
<button type="submit" formaction="/api/v1/scan/export?format=csv">Download CSV</button>
<button type="submit" formaction="/api/v1/scan/email">Send email alert</button>
</div>
</form>
</body>
</html>
"#;

/// Upload form
///
/// GET /
pub async fn index_page() -> Html<&'static str> {
    Html(INDEX_PAGE)
}
