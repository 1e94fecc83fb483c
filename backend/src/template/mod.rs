//! Example spreadsheet users fill in before importing.
//!
//! The headers are exactly the spellings the normalizer looks for first,
//! so a filled-in template always maps cleanly.

use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;
use std::str::FromStr;

use crate::error::TemplateError;

/// Display widths of the seven columns, in characters.
pub const COLUMN_WIDTHS: [f64; 7] = [20.0, 25.0, 18.0, 18.0, 20.0, 25.0, 10.0];

/// MIME type of the generated file.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Header language of the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemplateLanguage {
    #[default]
    Spanish,
    English,
}

impl FromStr for TemplateLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "es" | "spanish" | "español" => Ok(Self::Spanish),
            "en" | "english" => Ok(Self::English),
            other => Err(format!("unknown template language '{}' (use es or en)", other)),
        }
    }
}

impl TemplateLanguage {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Spanish => "plantilla_invitados.xlsx",
            Self::English => "guest_template.xlsx",
        }
    }

    pub fn sheet_name(&self) -> &'static str {
        match self {
            Self::Spanish => "Invitados",
            Self::English => "Guests",
        }
    }

    pub fn headers(&self) -> [&'static str; 7] {
        match self {
            Self::Spanish => [
                "Nombre Completo",
                "Email",
                "Teléfono",
                "Tiene Acompañante",
                "Nombre Acompañante",
                "Preferencias Alimentarias",
                "Mesa",
            ],
            Self::English => [
                "Full Name",
                "Email",
                "Phone",
                "Has Plus One",
                "Plus One Name",
                "Dietary Preferences",
                "Table",
            ],
        }
    }

    /// Two sample guests: one with a plus-one, one without.
    pub fn sample_rows(&self) -> [[&'static str; 7]; 2] {
        match self {
            Self::Spanish => [
                [
                    "Juan Pérez",
                    "juan@ejemplo.com",
                    "+54 11 1234 5678",
                    "Sí",
                    "María García",
                    "Vegetariano",
                    "Mesa 1",
                ],
                ["Ana López", "ana@ejemplo.com", "+54 11 8765 4321", "No", "", "", ""],
            ],
            Self::English => [
                [
                    "John Smith",
                    "john@example.com",
                    "+1 555 123 4567",
                    "Yes",
                    "Jane Smith",
                    "Vegetarian",
                    "Table 1",
                ],
                ["Emma Brown", "emma@example.com", "+1 555 765 4321", "No", "", "", ""],
            ],
        }
    }
}

/// Build the template workbook in memory.
pub fn build_workbook(language: TemplateLanguage) -> Result<Workbook, TemplateError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(language.sheet_name())?;

    for (col, (header, width)) in language.headers().iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *header, &header_format)?;
        sheet.set_column_width(col, width)?;
    }

    for (row, values) in language.sample_rows().iter().enumerate() {
        for (col, value) in values.iter().enumerate() {
            if !value.is_empty() {
                sheet.write_string(row as u32 + 1, col as u16, *value)?;
            }
        }
    }

    Ok(workbook)
}

/// Template as `.xlsx` bytes, ready to serve as a download.
pub fn template_bytes(language: TemplateLanguage) -> Result<Vec<u8>, TemplateError> {
    let mut workbook = build_workbook(language)?;
    Ok(workbook.save_to_buffer()?)
}

/// Write the template to `path`.
pub fn write_template(language: TemplateLanguage, path: &Path) -> Result<(), TemplateError> {
    let bytes = template_bytes(language)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::pipeline::parse_guests;

    #[test]
    fn test_spanish_template_round_trips() {
        let bytes = template_bytes(TemplateLanguage::Spanish).unwrap();
        let preview = parse_guests("plantilla_invitados.xlsx", &bytes).unwrap();

        assert_eq!(preview.valid_count(), 2);
        assert_eq!(preview.invalid_count(), 0);

        let juan = &preview.guests[0];
        assert_eq!(juan.full_name, "Juan Pérez");
        assert_eq!(juan.email.as_deref(), Some("juan@ejemplo.com"));
        assert!(juan.plus_one);
        assert_eq!(juan.plus_one_name.as_deref(), Some("María García"));
        assert_eq!(juan.dietary_preferences.as_deref(), Some("Vegetariano"));
        assert_eq!(juan.table_assignment.as_deref(), Some("Mesa 1"));

        let ana = &preview.guests[1];
        assert!(!ana.plus_one);
        assert_eq!(ana.plus_one_name, None);
        assert_eq!(ana.table_assignment, None);
    }

    #[test]
    fn test_english_template_round_trips() {
        let bytes = template_bytes(TemplateLanguage::English).unwrap();
        let preview = parse_guests("guest_template.xlsx", &bytes).unwrap();

        assert_eq!(preview.valid_count(), 2);
        let john = &preview.guests[0];
        assert_eq!(john.full_name, "John Smith");
        assert!(john.plus_one);
        assert_eq!(john.dietary_preferences.as_deref(), Some("Vegetarian"));
        assert_eq!(john.table_assignment.as_deref(), Some("Table 1"));
    }

    #[test]
    fn test_every_header_is_recognized() {
        use crate::transform::fields::GuestField;

        for language in [TemplateLanguage::Spanish, TemplateLanguage::English] {
            for (header, field) in language.headers().iter().zip(GuestField::ALL) {
                assert!(
                    field.aliases().contains(header),
                    "{header} is not an alias of {}",
                    field.column()
                );
            }
        }
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!("es".parse::<TemplateLanguage>().unwrap(), TemplateLanguage::Spanish);
        assert_eq!("EN".parse::<TemplateLanguage>().unwrap(), TemplateLanguage::English);
        assert!("fr".parse::<TemplateLanguage>().is_err());
        assert_eq!(TemplateLanguage::default().file_name(), "plantilla_invitados.xlsx");
    }

    #[test]
    fn test_write_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TemplateLanguage::Spanish.file_name());
        write_template(TemplateLanguage::Spanish, &path).unwrap();

        // XLSX is a zip archive.
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
