mod typst;

pub use typst::{generate_bill_pdf, generate_statement_pdf};
