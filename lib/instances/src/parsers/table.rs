use std::io;
use std::path::Path;
use anyhow::Context;
use crate::Result;
use crate::raw::pcvrp::{VertexRow, VertexTable};
use super::ParseInstance;

#[derive(Debug, Copy, Clone)]
pub struct CsvFmt<P>(pub P);

impl<P: AsRef<Path>> ParseInstance<CsvFmt<P>> for VertexTable {
  fn parse(path: CsvFmt<P>) -> Result<VertexTable> {
    let path = path.0.as_ref();
    let file = std::fs::File::open(path)?;
    read_table(file)
  }
}

/// Read a vertex table from CSV: a `x,y,income,demand` header followed by
/// one row per vertex, the depot first.
pub fn read_table(rdr: impl io::Read) -> Result<VertexTable> {
  let mut reader = csv::ReaderBuilder::new()
    .trim(csv::Trim::All)
    .from_reader(rdr);

  let mut rows = Vec::new();
  for (k, record) in reader.deserialize().enumerate() {
    let row: VertexRow = record.with_context(|| format!("vertex row {}", k))?;
    rows.push(row);
  }
  Ok(VertexTable { rows })
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn small_table() {
    let input = "\
x,y,income,demand
0,0,0,0
10, 0,100,5
0,20,100,5
";
    let table = read_table(input.as_bytes()).unwrap();
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[0], VertexRow { x: 0, y: 0, income: 0, demand: 0 });
    assert_eq!(table.rows[1], VertexRow { x: 10, y: 0, income: 100, demand: 5 });
    assert_eq!(table.rows[2], VertexRow { x: 0, y: 20, income: 100, demand: 5 });
  }

  #[test]
  fn missing_column() {
    let input = "\
x,y,income
0,0,0
10,0,100
";
    assert!(read_table(input.as_bytes()).is_err());
  }

  #[test]
  fn non_integer_field() {
    let input = "\
x,y,income,demand
0,0,0,0
1.5,0,100,5
";
    assert!(read_table(input.as_bytes()).is_err());
  }

  #[test]
  fn header_only() {
    let table = read_table("x,y,income,demand\n".as_bytes()).unwrap();
    assert!(table.rows.is_empty());
  }
}
