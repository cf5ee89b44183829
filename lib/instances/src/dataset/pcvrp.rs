use super::*;
use crate::parsers::{ParseInstance, CsvFmt, parse_name};
use crate::raw::pcvrp::{Fleet, VertexTable};
use crate::raw::FromRaw;
use crate::Map;
use anyhow::ensure;
use itertools::Itertools;

pub type Loc = usize;
pub type Vehicle = usize;
pub type Coord = i64;
pub type Demand = i64;
pub type Money = i64;
pub type Cost = i64;

pub const DEPOT: Loc = 0;

/// A prize-collecting CVRP instance.  Vertices are `0..=n` with `DEPOT = 0`;
/// clients are `1..=n` and carry a demand and an income.  Serving clients is
/// optional, and a client may be served partially.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct PcvrpInstance {
  pub id: String,
  /// Number of clients.
  pub n: Loc,
  /// Indexed by vertex.
  pub coords: Vec<(Coord, Coord)>,
  /// Keyed by client vertex.
  pub demand: Map<Loc, Demand>,
  /// Keyed by client vertex.
  pub income: Map<Loc, Money>,
  pub num_vehicles: Vehicle,
  pub capacity: Demand,
}

impl FromRaw<(VertexTable, Fleet)> for PcvrpInstance {
  fn from_raw((table, fleet): (VertexTable, Fleet), id: Cow<str>) -> PcvrpInstance {
    let n = table.rows.len().saturating_sub(1);
    let coords: Vec<_> = table.rows.iter().map(|r| (r.x, r.y)).collect();
    // the depot row carries no demand or income
    let demand: Map<_, _> = table.rows.iter().enumerate().skip(1).map(|(c, r)| (c, r.demand)).collect();
    let income: Map<_, _> = table.rows.iter().enumerate().skip(1).map(|(c, r)| (c, r.income)).collect();

    PcvrpInstance {
      id: id.into_owned(),
      n,
      coords,
      demand,
      income,
      num_vehicles: fleet.vehicles,
      capacity: fleet.capacity,
    }
  }
}

impl PcvrpInstance {
  /// Reject malformed instances before any model is built from them.
  pub fn check(&self) -> Result<()> {
    ensure!(self.coords.len() == self.n + 1,
      "instance {}: expected {} coordinate pairs (depot + {} clients), found {}",
      self.id, self.n + 1, self.n, self.coords.len());
    ensure!(self.capacity > 0,
      "instance {}: vehicle capacity must be positive (Q = {})", self.id, self.capacity);

    let missing: Vec<Loc> = (1..=self.n)
      .filter(|c| !self.demand.contains_key(c) || !self.income.contains_key(c))
      .collect();
    ensure!(missing.is_empty(),
      "instance {}: clients without demand or income: {}", self.id, missing.iter().join(", "));
    ensure!(self.demand.len() == self.n && self.income.len() == self.n,
      "instance {}: demand or income given for vertices outside 1..={}", self.id, self.n);

    let bad: Vec<Loc> = (1..=self.n).filter(|c| self.demand[c] <= 0).collect();
    ensure!(bad.is_empty(),
      "instance {}: demand must be positive, violated by clients {}", self.id, bad.iter().join(", "));

    let bad: Vec<Loc> = (1..=self.n).filter(|c| self.income[c] < 0).collect();
    ensure!(bad.is_empty(),
      "instance {}: income must be non-negative, violated by clients {}", self.id, bad.iter().join(", "));

    Ok(())
  }
}

/// Build a checked instance from its name and raw vertex table.  The name
/// (`n{N}-k{K}-Q{Q}`) declares the instance size and fleet configuration.
pub fn build_instance(name: &str, table: VertexTable) -> Result<PcvrpInstance> {
  let (num_clients, fleet) = parse_name(name)?;
  ensure!(table.rows.len() == num_clients + 1,
    "instance {}: name declares {} clients but table has {} rows", name, num_clients, table.rows.len());
  let data = PcvrpInstance::from_raw((table, fleet), Cow::Borrowed(name));
  data.check()?;
  Ok(data)
}

pub enum PcvrpCsv {}

impl Dataset for StdLayout<PcvrpCsv> {
  type Instance = PcvrpInstance;

  fn load_instance(&self, idx: usize) -> Result<Self::Instance> {
    let instance = self.index_to_name(idx)?;
    let mut path = self.dir.join(&*instance);
    path.set_extension(&self.suffix);
    let table = VertexTable::parse(CsvFmt(&path)).context(format!("failed to load {:?}", path))?;
    build_instance(&instance, table)
  }
}

lazy_static!{
    pub static ref DSET: StdLayout<PcvrpCsv> = {
        pretty_unwrap(StdLayout::new("PCVRP_csv", "csv"))
    };
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::raw::pcvrp::VertexRow;

  fn table(rows: &[(i64, i64, i64, i64)]) -> VertexTable {
    let rows = rows.iter()
      .map(|&(x, y, income, demand)| VertexRow { x, y, income, demand })
      .collect();
    VertexTable { rows }
  }

  #[test]
  fn convert_from_raw() {
    let t = table(&[(0, 0, 0, 0), (10, 0, 100, 5), (0, 20, 90, 7)]);
    let data = build_instance("n2-k1-Q10", t).unwrap();
    assert_eq!(data.n, 2);
    assert_eq!(data.coords, vec![(0, 0), (10, 0), (0, 20)]);
    assert_eq!(data.num_vehicles, 1);
    assert_eq!(data.capacity, 10);
    assert_eq!(data.demand[&1], 5);
    assert_eq!(data.demand[&2], 7);
    assert_eq!(data.income[&1], 100);
    assert_eq!(data.income[&2], 90);
    // no attributes for the depot
    assert!(!data.demand.contains_key(&DEPOT));
    assert!(!data.income.contains_key(&DEPOT));
  }

  #[test]
  fn row_count_mismatch() {
    let t = table(&[(0, 0, 0, 0), (10, 0, 100, 5)]);
    assert!(build_instance("n2-k1-Q10", t).is_err());
  }

  #[test]
  fn zero_demand_rejected() {
    let t = table(&[(0, 0, 0, 0), (10, 0, 100, 0)]);
    assert!(build_instance("n1-k1-Q10", t).is_err());
  }

  #[test]
  fn negative_income_rejected() {
    let t = table(&[(0, 0, 0, 0), (10, 0, -1, 5)]);
    assert!(build_instance("n1-k1-Q10", t).is_err());
  }

  #[test]
  fn capacity_must_be_positive() {
    let t = table(&[(0, 0, 0, 0), (10, 0, 100, 5)]);
    assert!(build_instance("n1-k1-Q0", t).is_err());
  }

  #[test]
  fn no_vehicles_is_valid() {
    let t = table(&[(0, 0, 0, 0), (10, 0, 100, 5)]);
    let data = build_instance("n1-k0-Q10", t).unwrap();
    assert_eq!(data.num_vehicles, 0);
  }

  #[test]
  fn fixtures_load() {
    for idx in 0..DSET.len() {
      pretty_unwrap(DSET.load_instance(idx));
    }
  }
}
