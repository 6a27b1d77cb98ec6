mod csv_export;
mod csv_import;

pub(crate) use csv_export::export_expenses;
pub(crate) use csv_import::CsvImporter;

/// Column order shared by export and import.
pub(crate) const HEADER: [&str; 4] = ["date", "description", "amount", "category"];
