use serde::Serialize;
use std::path::Path;
use std::process::Command;

use crate::error::{KhataError, Result};
use crate::ledger::{BillData, StatementData};

/// Shared Typst helpers prepended to every template
const PRELUDE: &str = r##"#let data = json("DATA_JSON_PATH")

#set page(
  paper: data.paper,
  margin: (top: 0.8in, bottom: 0.9in, left: 0.7in, right: 0.7in),
  footer: context [
    #set text(size: 8pt, fill: gray)
    #data.business.name
    #h(1fr)
    Page #counter(page).display() of #counter(page).final().first()
  ],
)

#set text(font: "Helvetica", size: 10pt)

#let fmt-int(digits) = {
  let len = digits.len()
  let out = ""
  for (i, digit) in digits.clusters().enumerate() {
    if i > 0 and calc.rem(len - i, 3) == 0 {
      out += ","
    }
    out += digit
  }
  out
}

#let fmt-amount(amount) = {
  let sign = if amount < 0 { "-" } else { "" }
  let parts = str(calc.round(calc.abs(amount), digits: 2)).split(".")
  let whole = fmt-int(parts.at(0))
  let frac = if parts.len() > 1 { parts.at(1) } else { "00" }
  let frac2 = if frac.len() == 1 { frac + "0" } else { frac }
  sign + whole + "." + frac2
}

#let fmt-currency(amount) = data.currency_symbol + " " + fmt-amount(amount)

#let business-header(title) = block(
  width: 100%,
  fill: rgb(10, 80, 160),
  inset: 10pt,
  radius: 2pt,
  grid(
    columns: (1fr, auto),
    align: (left + horizon, right + horizon),
    [
      #text(size: 16pt, weight: "bold", fill: white)[#data.business.name] \
      #text(size: 9pt, fill: white)[#data.business.address · #data.business.phone]
      #if data.business.gstin != none [
        #text(size: 9pt, fill: white)[· GSTIN #data.business.gstin]
      ]
    ],
    text(size: 18pt, weight: "bold", fill: white)[#title],
  ),
)
"##;

/// Customer statement: summary box, then one row per ledger entry. The
/// table header repeats on every page the rows flow onto.
const STATEMENT_TEMPLATE: &str = r##"
#business-header("STATEMENT")

#v(1em)
#text(size: 14pt, weight: "bold")[#data.customer_name]
#v(0.2em)
Phone Number: #data.customer_phone \
#text(fill: gray)[(#data.period) · Generated #data.generated_date]

#v(1em)
#block(
  width: 100%,
  fill: luma(245),
  stroke: 0.5pt + luma(200),
  radius: 4pt,
  inset: 10pt,
  grid(
    columns: (1fr, 1fr, 1fr, 1fr),
    row-gutter: 6pt,
    text(weight: "bold")[Opening Balance],
    text(weight: "bold")[Total Debit(-)],
    text(weight: "bold")[Total Credit(+)],
    text(weight: "bold")[Net Balance],
    [#fmt-amount(data.opening_balance) #data.opening_label],
    [#fmt-amount(data.total_debit)],
    [#fmt-amount(data.total_credit)],
    text(fill: if data.closing_label == "Dr" { rgb(200, 0, 0) } else { rgb(56, 142, 60) })[
      #fmt-amount(data.closing_balance) #data.closing_label
    ],
  ),
)

#v(1em)

#table(
  columns: (auto, 1fr, auto, auto, auto),
  align: (left, left, right, right, right),
  stroke: (x, y) => if y == 0 { (bottom: 1pt + black) } else { (bottom: 0.5pt + luma(200)) },
  inset: 7pt,
  fill: (x, y) => if y == 0 { luma(230) } else { none },

  table.header(
    [*Date*], [*Details*], [*Debit(-)*], [*Credit(+)*], [*Balance*],
  ),

  ..data.rows.map(row => (
    row.date,
    row.details,
    if row.debit != none [#fmt-amount(row.debit)] else [],
    if row.credit != none [#fmt-amount(row.credit)] else [],
    [#fmt-amount(row.balance) #row.balance_label],
  )).flatten()
)

#if data.rows.len() == 0 [
  #align(center)[#text(fill: gray)[No transactions in this period.]]
]

#v(2em)
#align(center)[#text(size: 12pt, weight: "bold", fill: rgb(10, 80, 160))[#data.footer]]
"##;

/// Single-sale bill with the customer's previous balance
const BILL_TEMPLATE: &str = r##"
#business-header("BILL")

#v(1em)
#grid(
  columns: (1fr, 1fr),
  [
    #text(weight: "bold", size: 11pt)[Billed to:]
    #v(0.3em)
    #data.customer_name
    #if data.customer_phone != none [
      \ #data.customer_phone
    ]
  ],
  align(right)[
    #table(
      columns: (auto, auto),
      stroke: none,
      align: (right, left),
      inset: 2pt,
      [*Bill \#:*], [#data.number],
      [*Date:*], [#data.date],
    )
  ],
)

#v(1.5em)

#table(
  columns: (1fr, auto, auto, auto),
  align: (left, right, right, right),
  stroke: (x, y) => if y == 0 { (bottom: 1pt + black) } else { (bottom: 0.5pt + gray) },
  inset: 8pt,
  fill: (x, y) => if y == 0 { luma(240) } else { none },

  table.header([*Item*], [*Quantity*], [*Price*], [*Amount*]),

  ..data.lines.map(line => (
    line.description,
    [#line.quantity #line.unit],
    [#fmt-currency(line.unit_price)],
    [#fmt-currency(line.amount)],
  )).flatten()
)

#align(right)[
  #table(
    columns: (auto, auto),
    stroke: none,
    align: (right, right),
    inset: 6pt,
    table.hline(stroke: 1pt),
    [*Total:*], [*#fmt-currency(data.total)*],
  )
]

#if data.previous_balance != none [
  #v(1.5em)
  #let status-color = if data.previous_status == "Completed" {
    rgb(56, 142, 60)
  } else {
    rgb(255, 136, 0)
  }
  #text(weight: "bold")[Previous balance:]
  #fmt-currency(data.previous_balance) #data.previous_label \
  #text(weight: "bold")[Previous balance status:]
  #text(fill: status-color)[#data.previous_status]
]

#v(2em)
#text(weight: "bold")[Note:] #data.footer
"##;

/// Write `data` as JSON next to the template and run `typst compile`.
fn compile<T: Serialize>(template: &str, stem: &str, data: &T, output_path: &Path) -> Result<()> {
    if Command::new("typst").arg("--version").output().is_err() {
        return Err(KhataError::TypstNotFound);
    }

    let temp_dir = std::env::temp_dir().join(format!("khata-{}", std::process::id()));
    std::fs::create_dir_all(&temp_dir)?;

    let json_name = format!("{stem}.json");
    let json_path = temp_dir.join(&json_name);
    std::fs::write(&json_path, serde_json::to_string(data)?)?;

    let source = format!("{}{}", PRELUDE.replace("DATA_JSON_PATH", &json_name), template);
    let template_path = temp_dir.join(format!("{stem}.typ"));
    std::fs::write(&template_path, source)?;

    tracing::debug!(
        template = %template_path.display(),
        output = %output_path.display(),
        "running typst"
    );
    let output = Command::new("typst")
        .arg("compile")
        .arg("--root")
        .arg(&temp_dir)
        .arg(&template_path)
        .arg(output_path)
        .output()?;

    let _ = std::fs::remove_dir_all(&temp_dir);

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(KhataError::PdfGeneration(stderr.to_string()));
    }
    Ok(())
}

/// Render a customer statement PDF
pub fn generate_statement_pdf(data: &StatementData, output_path: &Path) -> Result<()> {
    compile(STATEMENT_TEMPLATE, "statement", data, output_path)
}

/// Render a sale bill PDF
pub fn generate_bill_pdf(data: &BillData, output_path: &Path) -> Result<()> {
    compile(BILL_TEMPLATE, "bill", data, output_path)
}
