use crate::io::error::Error;
use crate::model::record::LabeledRecord;
use std::io::Write;

/// Column header of the labeled-record table.
pub const HEADER: &str = "Identifier,Validity";

/// Writes labeled records as a two-column CSV table with a header row.
///
/// Records are written in the order given. Identifiers containing commas, quotes, or line
/// breaks are quoted with embedded quotes doubled.
pub fn write_records<'a, W, I>(mut writer: W, records: I) -> Result<(), Error>
where
    W: Write,
    I: IntoIterator<Item = &'a LabeledRecord>,
{
    let io_err = |e: std::io::Error| Error::from_io(e, None);
    writeln!(writer, "{}", HEADER).map_err(io_err)?;
    for record in records {
        writeln!(
            writer,
            "{},{}",
            escape(&record.identifier),
            record.validity_flag()
        )
        .map_err(io_err)?;
    }
    Ok(())
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(records: &[LabeledRecord]) -> String {
        let mut buffer = Vec::new();
        write_records(&mut buffer, records).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn writes_header_and_flags() {
        let text = render(&[
            LabeledRecord::new("O=C=O", true),
            LabeledRecord::new("[C-]#[O+]", false),
        ]);
        assert_eq!(text, "Identifier,Validity\nO=C=O,1\n[C-]#[O+],0\n");
    }

    #[test]
    fn empty_table_has_only_header() {
        assert_eq!(render(&[]), "Identifier,Validity\n");
    }

    #[test]
    fn identifiers_with_separators_are_quoted() {
        let text = render(&[LabeledRecord::new("a,\"b\"", true)]);
        assert_eq!(text, "Identifier,Validity\n\"a,\"\"b\"\"\",1\n");
    }
}
