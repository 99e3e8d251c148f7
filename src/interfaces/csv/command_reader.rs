use crate::domain::command::Command;
use crate::error::{LedgerError, Result};
use std::io::Read;

/// Reads journal commands from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record lengths,
/// so trailing empty columns may be omitted.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and deserializes commands in journal order.
    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LedgerError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::command::CommandType;
    use crate::domain::money::Money;
    use rust_decimal_macros::dec;

    const HEADER: &str = "type, reseller, sale, index, amount, count, client, method, at";

    #[test]
    fn test_reader_valid_stream() {
        let data = format!("{HEADER}\nsale, 1, 1, , 100.00, , Ana\npay, 1, 1, , , 3, , pix\nsettle, 1");
        let reader = CommandReader::new(data.as_bytes());
        let results: Vec<Result<Command>> = reader.commands().collect();

        assert_eq!(results.len(), 3);
        let sale = results[0].as_ref().unwrap();
        assert_eq!(sale.amount, Some(Money::new(dec!(100.00))));
        assert_eq!(sale.client.as_deref(), Some("Ana"));

        let settle = results[2].as_ref().unwrap();
        assert_eq!(settle.r#type, CommandType::Settle);
        assert_eq!(settle.sale, None);
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = format!("{HEADER}\nrefund, 1, 1, , 1.0\nsale, x, 1, , 1.0\nsettle, 2");
        let reader = CommandReader::new(data.as_bytes());
        let results: Vec<Result<Command>> = reader.commands().collect();

        assert!(matches!(results[0], Err(LedgerError::CsvError(_))));
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }
}
