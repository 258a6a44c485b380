/// Column that holds the free-text address description.
pub const DEFAULT_ADDRESS_COLUMN: usize = 1;

/// A single record of the input table.
///
/// The columns are kept untouched so that they can be written
/// back in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddressRow {
    pub columns: Vec<String>,
}

impl AddressRow {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = columns.into_iter().map(Into::into).collect();
        Self { columns }
    }

    /// The trimmed text of the given column, if it is present and not blank.
    pub fn address(&self, column: usize) -> Option<&str> {
        self.columns
            .get(column)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl From<Vec<String>> for AddressRow {
    fn from(columns: Vec<String>) -> Self {
        Self { columns }
    }
}

/// All rows of an input file plus its optional header line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddressTable {
    pub header: Option<Vec<String>>,
    pub rows: Vec<AddressRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_from_second_column() {
        let row = AddressRow::new(["1", " Main St & 2nd Ave ", "x"]);
        assert_eq!(
            Some("Main St & 2nd Ave"),
            row.address(DEFAULT_ADDRESS_COLUMN)
        );
    }

    #[test]
    fn missing_or_blank_address() {
        assert_eq!(None, AddressRow::new(["1"]).address(1));
        assert_eq!(None, AddressRow::new(["1", "   "]).address(1));
    }
}
