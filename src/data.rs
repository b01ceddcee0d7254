use crate::errors::ReinaError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Contiguous column major matrix view.
///
/// Holds a dense matrix of values in a single borrowed memory block in
/// column-major order, which allows for efficient column slicing during
/// model fitting.
pub struct Matrix<'a, T> {
    /// The raw data stored in a single slice.
    pub data: &'a [T],
    /// Number of rows in the matrix.
    pub rows: usize,
    /// Number of columns in the matrix.
    pub cols: usize,
}

impl<'a, T> Matrix<'a, T> {
    /// Create a new Matrix over a column-major buffer.
    pub fn new(data: &'a [T], rows: usize, cols: usize) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Matrix { data, rows, cols }
    }

    /// Get a single reference to an item in the matrix.
    ///
    /// * `i` - The ith row of the data to get.
    /// * `j` - the jth column of the data to get.
    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.data[j * self.rows + i]
    }

    /// Get an entire column in the matrix.
    ///
    /// * `col` - The index of the column to get.
    pub fn get_col(&self, col: usize) -> &[T] {
        &self.data[col * self.rows..(col + 1) * self.rows]
    }

    /// Get access to a row of the data, as an iterator.
    pub fn get_row_iter(&self, row: usize) -> std::iter::StepBy<std::iter::Skip<std::slice::Iter<'a, T>>> {
        self.data.iter().skip(row).step_by(self.rows)
    }
}

impl<'a, T> Matrix<'a, T>
where
    T: Copy,
{
    /// Get a row of the data as a vector.
    pub fn get_row(&self, row: usize) -> Vec<T> {
        self.get_row_iter(row).copied().collect()
    }
}

/// An owned table of named numeric columns.
///
/// This is the in-memory representation of the data a learner is fit on.
/// All columns are `f64`; missing values are encoded as NaN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    rows: usize,
}

impl Dataset {
    /// Create a dataset from named columns.
    ///
    /// Returns an error if column names repeat, or if the columns are not
    /// all of the same length.
    pub fn from_columns(names: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self, ReinaError> {
        if names.len() != columns.len() {
            return Err(ReinaError::InvalidParameter(
                "columns".to_string(),
                format!("{} columns to match the names", names.len()),
                columns.len().to_string(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(ReinaError::DuplicateColumn(name.clone()));
            }
        }
        let rows = columns.first().map_or(0, |c| c.len());
        for (name, column) in names.iter().zip(&columns) {
            if column.len() != rows {
                return Err(ReinaError::RaggedColumns(name.clone(), column.len(), rows));
            }
        }
        Ok(Dataset { names, columns, rows })
    }

    /// Read a dataset from a CSV file with a header row.
    ///
    /// Every cell is parsed as `f64`. Empty or unparseable cells are
    /// treated as missing and stored as NaN.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, ReinaError> {
        let file = File::open(path).map_err(|e| ReinaError::UnableToRead(e.to_string()))?;
        Self::from_reader(BufReader::new(file))
    }

    /// Read a dataset from any CSV source with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ReinaError> {
        let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| ReinaError::UnableToRead(e.to_string()))?
            .clone();
        let names: Vec<String> = headers.iter().map(|h| h.to_string()).collect();

        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
        for result in csv_reader.records() {
            let record = result.map_err(|e| ReinaError::UnableToRead(e.to_string()))?;
            for (column, value) in columns.iter_mut().zip(record.iter()) {
                let parsed = if value.is_empty() {
                    f64::NAN
                } else {
                    value.trim().parse::<f64>().unwrap_or(f64::NAN)
                };
                column.push(parsed);
            }
        }

        Self::from_columns(names, columns)
    }

    /// The column names, in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of rows in the dataset.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns in the dataset.
    pub fn cols(&self) -> usize {
        self.columns.len()
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Result<&[f64], ReinaError> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
            .ok_or_else(|| ReinaError::ColumnNotFound(name.to_string()))
    }

    /// Copy the requested columns into a single contiguous column-major
    /// buffer, suitable for constructing a [`Matrix`].
    pub fn assemble<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<f64>, ReinaError> {
        let mut data = Vec::with_capacity(self.rows * names.len());
        for name in names {
            data.extend_from_slice(self.column(name.as_ref())?);
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_access() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let matrix = Matrix::new(&data, 3, 2);
        assert_eq!(*matrix.get(0, 0), 1.0);
        assert_eq!(*matrix.get(2, 1), 6.0);
        assert_eq!(matrix.get_col(1), &[4.0, 5.0, 6.0]);
        assert_eq!(matrix.get_row(1), vec![2.0, 5.0]);
    }

    #[test]
    fn test_from_reader() {
        let raw = "var1,var2,outcome\n1.0,2.0,3.5\n4.0,,0.5\n7.0,x,1.5\n";
        let dataset = Dataset::from_reader(raw.as_bytes()).unwrap();
        assert_eq!(dataset.rows(), 3);
        assert_eq!(dataset.names(), &["var1", "var2", "outcome"]);
        assert_eq!(dataset.column("var1").unwrap(), &[1.0, 4.0, 7.0]);
        let var2 = dataset.column("var2").unwrap();
        assert_eq!(var2[0], 2.0);
        assert!(var2[1].is_nan());
        assert!(var2[2].is_nan());
    }

    #[test]
    fn test_missing_column() {
        let raw = "a,b\n1,2\n";
        let dataset = Dataset::from_reader(raw.as_bytes()).unwrap();
        assert!(matches!(
            dataset.column("c"),
            Err(ReinaError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_and_ragged_columns() {
        let result = Dataset::from_columns(
            vec!["a".to_string(), "a".to_string()],
            vec![vec![1.0], vec![2.0]],
        );
        assert!(matches!(result, Err(ReinaError::DuplicateColumn(_))));

        let result = Dataset::from_columns(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![1.0, 2.0], vec![3.0]],
        );
        assert!(matches!(result, Err(ReinaError::RaggedColumns(_, 1, 2))));
    }

    #[test]
    fn test_assemble_is_column_major() {
        let dataset = Dataset::from_columns(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        )
        .unwrap();
        let buffer = dataset.assemble(&["b", "a"]).unwrap();
        assert_eq!(buffer, vec![3.0, 4.0, 1.0, 2.0]);
        let matrix = Matrix::new(&buffer, 2, 2);
        assert_eq!(matrix.get_row(0), vec![3.0, 1.0]);
    }
}
