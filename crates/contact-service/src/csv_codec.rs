use crate::error::ServiceError;
use core_types::{Contact, CSV_COLUMNS};
use std::io::{Read, Write};

/// Writes the header row followed by one row per contact.
///
/// The header is written explicitly so an empty export still carries it.
pub fn write_contacts<W: Write>(writer: W, contacts: &[Contact]) -> Result<(), ServiceError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(CSV_COLUMNS)?;
    for contact in contacts {
        csv_writer.serialize(contact)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Parses a CSV document with a header row into contacts.
///
/// Columns are matched by header name, so their order is free. Unknown columns
/// are ignored and absent optional columns default to empty, but `email` must
/// be present: without it the document is not a contacts export.
pub fn read_contacts<R: Read>(reader: R) -> Result<Vec<Contact>, ServiceError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?;
    if !headers.iter().any(|h| h == "email") {
        return Err(ServiceError::MissingColumn("email"));
    }

    let mut contacts = Vec::new();
    for record in csv_reader.deserialize() {
        contacts.push(record?);
    }
    Ok(contacts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Contact> {
        vec![
            Contact {
                id: "1".into(),
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                email: "ada@example.com".into(),
                phone: "555-0100".into(),
            },
            Contact {
                id: "2".into(),
                first_name: "Grace".into(),
                last_name: "Hopper, RADM".into(),
                email: "grace@example.com".into(),
                phone: "".into(),
            },
        ]
    }

    #[test]
    fn writes_header_and_rows_in_fixed_column_order() {
        let mut out = Vec::new();
        write_contacts(&mut out, &sample()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "id,first_name,last_name,email,phone");
        assert_eq!(lines[1], "1,Ada,Lovelace,ada@example.com,555-0100");
        assert_eq!(lines[2], "2,Grace,\"Hopper, RADM\",grace@example.com,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn empty_export_is_just_the_header() {
        let mut out = Vec::new();
        write_contacts(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "id,first_name,last_name,email,phone\n");
    }

    #[test]
    fn reads_back_what_it_writes() {
        let mut out = Vec::new();
        write_contacts(&mut out, &sample()).unwrap();
        assert_eq!(read_contacts(out.as_slice()).unwrap(), sample());
    }

    #[test]
    fn empty_id_cell_means_a_new_contact() {
        let input = "id,first_name,last_name,email,phone\n,Alan,Turing,alan@example.com,555-0142\n";
        let contacts = read_contacts(input.as_bytes()).unwrap();
        assert_eq!(contacts.len(), 1);
        assert!(!contacts[0].has_id());
        assert_eq!(contacts[0].last_name, "Turing");
    }

    #[test]
    fn matches_columns_by_header_name() {
        let input = "email,phone,first_name\n  kay@example.com , 555 ,Kay\n";
        let contacts = read_contacts(input.as_bytes()).unwrap();
        assert_eq!(contacts[0].email, "kay@example.com");
        assert_eq!(contacts[0].phone, "555");
        assert_eq!(contacts[0].first_name, "Kay");
        assert!(contacts[0].last_name.is_empty());
    }

    #[test]
    fn rejects_documents_without_an_email_column() {
        let err = read_contacts("name,phone\nAda,555\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ServiceError::MissingColumn("email")));
    }

    #[test]
    fn rejects_ragged_rows() {
        let input = "id,first_name,last_name,email,phone\n1,Ada\n";
        let err = read_contacts(input.as_bytes()).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCsv(_)));
    }
}
