//! HTML rendering of the estimation form

use crate::reference::FormChoices;
use std::fmt::Write;

/// Escape text for use in HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn options<I, T>(out: &mut String, values: I)
where
    I: IntoIterator<Item = T>,
    T: ToString,
{
    for value in values {
        let value = escape_html(&value.to_string());
        let _ = write!(out, r#"<option value="{0}">{0}</option>"#, value);
    }
}

/// Render the form page for the given choices
pub fn render_index(choices: &FormChoices) -> String {
    // `</` would end the script element early.
    let models_json = serde_json::to_string(&choices.car_models)
        .unwrap_or_else(|_| "{}".to_string())
        .replace("</", "<\\/");

    let mut companies = String::new();
    options(&mut companies, &choices.companies);
    let mut years = String::new();
    options(&mut years, &choices.years);
    let mut fuel_types = String::new();
    options(&mut fuel_types, &choices.fuel_types);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Car Price Predictor</title>
</head>
<body>
<h1>Car Price Predictor</h1>
<form id="predict-form" method="post" action="/predict">
<label>Company <select id="company" name="company" required>{companies}</select></label>
<label>Model <select id="car_model" name="car_model" required></select></label>
<label>Year <select id="year" name="year" required>{years}</select></label>
<label>Fuel type <select id="fuel_type" name="fuel_type" required>{fuel_types}</select></label>
<label>Kilometers driven <input id="kilo_driven" name="kilo_driven" type="text" required></label>
<button type="submit">Predict price</button>
</form>
<p id="prediction"></p>
<script>
const carModels = {models_json};
const company = document.getElementById("company");
const model = document.getElementById("car_model");
company.addEventListener("change", () => {{
  model.innerHTML = "";
  for (const name of carModels[company.value] || []) {{
    const option = document.createElement("option");
    option.value = name;
    option.textContent = name;
    model.appendChild(option);
  }}
}});
document.getElementById("predict-form").addEventListener("submit", async (event) => {{
  event.preventDefault();
  const response = await fetch("/predict", {{ method: "POST", body: new URLSearchParams(new FormData(event.target)) }});
  document.getElementById("prediction").textContent = await response.text();
}});
</script>
</body>
</html>
"#
    )
}
