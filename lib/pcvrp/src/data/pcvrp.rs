use std::ops::{Range, RangeInclusive};

pub use instances::dataset::pcvrp::{
  Coord,
  Cost,
  Money,
  Vehicle,
  Demand,
  Loc,
  DEPOT,
  DSET,
};

pub type PcvrpInstance = instances::dataset::pcvrp::PcvrpInstance;

pub trait PcvrpInstanceExt {
  fn vertices(&self) -> RangeInclusive<Loc>;
  fn clients(&self) -> RangeInclusive<Loc>;
  fn vehicles(&self) -> Range<Vehicle>;
  fn is_client(&self, i: Loc) -> bool;
  fn unit_profit(&self, i: Loc) -> f64;
}

impl PcvrpInstanceExt for PcvrpInstance {
    /// All vertices, depot included.
    #[inline]
    fn vertices(&self) -> RangeInclusive<Loc> {
        return 0..=self.n;
    }

    #[inline]
    fn clients(&self) -> RangeInclusive<Loc> {
        return 1..=self.n;
    }

    #[inline]
    fn vehicles(&self) -> Range<Vehicle> {
        return 0..self.num_vehicles;
    }

    #[inline]
    fn is_client(&self, i: Loc) -> bool {
        return 0 < i && i <= self.n;
    }

    /// Income earned per unit of demand delivered to client `i`.
    #[inline]
    fn unit_profit(&self, i: Loc) -> f64 {
        debug_assert!(self.is_client(i));
        return self.income[&i] as f64 / self.demand[&i] as f64;
    }
}
