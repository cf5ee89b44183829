use serde::Deserialize;

/// One row of the vertex table, as read from file. The first row is the
/// depot; its `income` and `demand` fields are present but carry no meaning.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize)]
pub struct VertexRow {
  pub x: i64,
  pub y: i64,
  pub income: i64,
  pub demand: i64,
}

#[derive(Debug, Clone, Default)]
pub struct VertexTable {
  pub rows: Vec<VertexRow>,
}

/// Fleet configuration: K identical vehicles of capacity Q. For the standard
/// datasets this is encoded in the instance name (`n{N}-k{K}-Q{Q}`).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Fleet {
  pub vehicles: usize,
  pub capacity: i64,
}
