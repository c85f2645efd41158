use nalgebra::DVector;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::convert::AsRef;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Column {0} not found")]
    MissingColumn(String),

    #[error("Could not parse value '{value}' at row {row}, column {column}")]
    Parse { row : usize, column : String, value : String },

    #[error("No observations for category {0}")]
    EmptyCategory(String)

}

/// Columns are indexed by header name or by zero-based position.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnIndex {
    Named(String),
    Pos(usize)
}

impl From<usize> for ColumnIndex {

    fn from(ix : usize) -> Self {
        Self::Pos(ix)
    }
}

impl From<&str> for ColumnIndex {

    fn from(name : &str) -> Self {
        Self::Named(name.to_owned())
    }
}

impl From<String> for ColumnIndex {

    fn from(name : String) -> Self {
        Self::Named(name)
    }
}

/// Load observations from comma-separated text with a header row. Fields are kept
/// as text and only parsed to double precision when a column is requested, so
/// tables can mix label columns (e.g. a group or condition) with numeric ones.
#[derive(Debug, Clone)]
pub struct Table {

    headers : Vec<String>,

    rows : Vec<csv::StringRecord>

}

impl Table {

    pub fn load_from_path<P>(path : P) -> Result<Self, TableError>
    where
        P : AsRef<Path>
    {
        let f = File::open(path)?;
        Self::load(f)
    }

    pub fn load<R>(reader : R) -> Result<Self, TableError>
    where
        R : Read
    {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers : Vec<String> = rdr.headers()?.iter().map(|h| h.to_string() ).collect();
        let mut rows = Vec::new();
        for rec in rdr.records() {
            rows.push(rec?);
        }
        tracing::debug!(ncols = headers.len(), nrows = rows.len(), "loaded table");
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers[..]
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncols(&self) -> usize {
        self.headers.len()
    }

    fn index_pos(&self, ix : &ColumnIndex) -> Result<usize, TableError> {
        match ix {
            ColumnIndex::Named(name) => self.headers.iter()
                .position(|h| h == name )
                .ok_or_else(|| TableError::MissingColumn(name.clone()) ),
            ColumnIndex::Pos(p) if *p < self.headers.len() => Ok(*p),
            ColumnIndex::Pos(p) => Err(TableError::MissingColumn(format!("at position {}", p)))
        }
    }

    fn field<'a>(&'a self, row : usize, col : usize) -> &'a str {
        self.rows[row].get(col).unwrap_or("")
    }

    /// Raw text of a column.
    pub fn text_column<I>(&self, ix : I) -> Result<Vec<String>, TableError>
    where
        I : Into<ColumnIndex>
    {
        let col = self.index_pos(&ix.into())?;
        Ok((0..self.nrows()).map(|r| self.field(r, col).to_string() ).collect())
    }

    /// Column parsed to double precision. Any field that does not parse is an error
    /// that reports its (one-based, excluding the header) row.
    pub fn column<I>(&self, ix : I) -> Result<DVector<f64>, TableError>
    where
        I : Into<ColumnIndex>
    {
        let col = self.index_pos(&ix.into())?;
        let mut data = Vec::with_capacity(self.nrows());
        for r in 0..self.nrows() {
            let val = self.field(r, col);
            let v = f64::from_str(val).map_err(|_| TableError::Parse {
                row : r + 1,
                column : self.headers[col].clone(),
                value : val.to_string()
            })?;
            data.push(v);
        }
        Ok(DVector::from_vec(data))
    }

    /// Splits the value column by the label column, returning one vector per requested
    /// category in the requested order. Rows with other labels are ignored; a category
    /// without any row is an error.
    pub fn grouped<S>(
        &self,
        label : &str,
        value : &str,
        categories : &[S]
    ) -> Result<Vec<(String, DVector<f64>)>, TableError>
    where
        S : AsRef<str>
    {
        let labels = self.text_column(label)?;
        let values = self.column(value)?;
        let mut groups = Vec::with_capacity(categories.len());
        for cat in categories.iter() {
            let cat = cat.as_ref();
            let data : Vec<f64> = labels.iter()
                .zip(values.iter())
                .filter(|(l, _)| l.as_str() == cat )
                .map(|(_, v)| *v )
                .collect();
            if data.is_empty() {
                return Err(TableError::EmptyCategory(cat.to_string()));
            }
            groups.push((cat.to_string(), DVector::from_vec(data)));
        }
        Ok(groups)
    }

}

impl FromStr for Table {

    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::load(s.as_bytes())
    }

}

#[cfg(test)]
mod tests {

    use super::*;

    const TRIALS : &str = "condition, time\nA, 1.5\nB, 2.0\nA, 2.5\nC, 0.5\nB, 3.0\n";

    #[test]
    fn numeric_and_text_columns() {
        let tbl : Table = TRIALS.parse().unwrap();
        assert_eq!(tbl.headers(), &[String::from("condition"), String::from("time")]);
        assert_eq!(tbl.nrows(), 5);
        let time = tbl.column("time").unwrap();
        assert_eq!(time.as_slice(), &[1.5, 2.0, 2.5, 0.5, 3.0]);
        assert_eq!(tbl.column(1).unwrap(), time);
        assert!(matches!(tbl.column("condition"), Err(TableError::Parse { row : 1, .. })));
        assert!(matches!(tbl.column("weight"), Err(TableError::MissingColumn(_))));
    }

    #[test]
    fn groups_follow_requested_order() {
        let tbl : Table = TRIALS.parse().unwrap();
        let groups = tbl.grouped("condition", "time", &["B", "A"]).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "B");
        assert_eq!(groups[0].1.as_slice(), &[2.0, 3.0]);
        assert_eq!(groups[1].1.as_slice(), &[1.5, 2.5]);
        assert!(matches!(tbl.grouped("condition", "time", &["D"]), Err(TableError::EmptyCategory(_))));
    }

}
