use std::fmt;
use grb::prelude::*;
use ndarray::Array2;
use itertools::{iproduct, Itertools};
use anyhow::{bail, ensure, Context, Result};
use tracing::*;

use crate::Map;
use crate::data::pcvrp::*;
use super::build::{build_model, Vars};
use super::{check, geometry};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SolveStatus {
    /// proven optimal
    Optimal,
    /// the time limit was reached with at least one incumbent
    TimeLimitFeasible,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::TimeLimitFeasible => "time-limit",
        };
        f.write_str(s)
    }
}

/// A feasible assignment recovered from the solver.
#[derive(Debug, Clone)]
pub struct Solution {
    pub status: SolveStatus,
    /// objective value as reported by the solver
    pub objective: f64,
    /// total cost of all arcs travelled
    pub travel_cost: f64,
    /// income collected over all deliveries
    pub total_profit: f64,
    /// served clients, ascending
    pub delivered: Vec<Loc>,
    /// positive deliveries, keyed by vehicle and client
    pub flows: Map<(Vehicle, Loc), Demand>,
    /// one route per vehicle, beginning and ending at the depot
    pub routes: Vec<Vec<Loc>>,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Feasible(Solution),
    Infeasible,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Classified {
    Feasible(SolveStatus),
    Infeasible,
}

fn classify(status: Status, sol_count: i32) -> Result<Classified> {
    let c = match status {
        Status::Optimal => Classified::Feasible(SolveStatus::Optimal),
        Status::TimeLimit if sol_count > 0 => Classified::Feasible(SolveStatus::TimeLimitFeasible),
        Status::TimeLimit => bail!("time limit reached without finding a feasible solution"),
        Status::Infeasible | Status::InfOrUnbd => Classified::Infeasible,
        status => bail!("unexpected termination status {:?}", status),
    };
    return Ok(c);
}

/// Formulate `data` and hand it to Gurobi with a wall-clock budget of
/// `time_limit` seconds.  A fresh solver environment is created for every
/// call and disposed of on return.
#[instrument(level="info", skip(data), fields(id=%data.id))]
pub fn solve(data: &PcvrpInstance, time_limit: f64) -> Result<Outcome> {
    data.check()?;

    let dist = geometry::rounded_dist_matrix(&data.coords);

    let mut env = Env::new("")?;
    env.set(param::TimeLimit, time_limit)?;
    env.set(param::Threads, 1)?;
    let mut model = Model::with_env("pcvrp", &env)?;
    let vars = build_model(&mut model, data, &dist)?;

    model.optimize()?;

    let status = model.status()?;
    let sol_count = model.get_attr(attr::SolCount)?;
    debug!(?status, sol_count);

    let status = match classify(status, sol_count)? {
        Classified::Infeasible => {
            info!("model is infeasible");
            return Ok(Outcome::Infeasible);
        }
        Classified::Feasible(s) => s,
    };

    let sol = extract_solution(&model, data, &dist, &vars, status)?;
    if let Err(err) = check::verify(data, &dist, &sol) {
        error!(%err, "solution verification failed");
        panic!("bug - solver produced an inconsistent solution")
    }
    info!(status=%sol.status, objective=sol.objective, "solve finished");
    return Ok(Outcome::Feasible(sol));
}

fn extract_solution(
    model: &Model,
    data: &PcvrpInstance,
    dist: &Array2<Cost>,
    vars: &Vars,
    status: SolveStatus,
) -> Result<Solution> {
    let objective = model.get_attr(attr::ObjVal)?;

    let xs = model.get_obj_attr_batch(attr::X, vars.delivered.clone())?;
    let delivered = data.clients().zip(xs)
        .filter(|&(_, x)| x > 0.5)
        .map(|(c, _)| c)
        .collect_vec();

    let xs = model.get_obj_attr_batch(attr::X, vars.flow.clone())?;
    let mut flows = Map::default();
    for ((v, c), x) in iproduct!(data.vehicles(), data.clients()).zip(xs) {
        let q = x.round() as Demand;
        if q > 0 {
            flows.insert((v, c), q);
        }
    }

    let xs = model.get_obj_attr_batch(attr::X, vars.arc.clone())?;
    let stride = (data.n + 1) * (data.n + 1);
    let mut routes = Vec::with_capacity(data.num_vehicles);
    for v in data.vehicles() {
        let x = &xs[v * stride..(v + 1) * stride];
        let route = route_from_arcs(data.n, |i, j| x[i * (data.n + 1) + j] > 0.5)
            .with_context(|| format!("arcs of vehicle {} do not form a tour", v))?;
        routes.push(route);
    }

    let travel_cost = routes.iter()
        .flat_map(|r| r.iter().tuple_windows())
        .map(|(&i, &j)| dist[[i, j]])
        .sum::<Cost>() as f64;
    let total_profit = flows.iter()
        .map(|(&(_, c), &q)| data.unit_profit(c) * q as f64)
        .sum::<f64>();

    return Ok(Solution { status, objective, travel_cost, total_profit, delivered, flows, routes });
}

/// Reconstruct a route by walking the vehicle's arcs from the depot.  Fails
/// if some vertex has two outgoing arcs or if arcs remain that the walk
/// never reached, which would mean a cycle disconnected from the depot.
fn route_from_arcs(n: usize, used: impl Fn(Loc, Loc) -> bool) -> Result<Vec<Loc>> {
    let mut next: Map<Loc, Loc> = Map::default();
    for i in 0..=n {
        for j in 0..=n {
            if used(i, j) {
                ensure!(next.insert(i, j).is_none(), "vertex {} has two outgoing arcs", i);
            }
        }
    }

    let mut route = vec![DEPOT];
    let mut walked = 0;
    let mut i = DEPOT;
    while let Some(&j) = next.get(&i) {
        route.push(j);
        walked += 1;
        i = j;
        if i == DEPOT {
            break;
        }
        ensure!(route.len() <= n + 1, "route does not return to the depot");
    }
    ensure!(walked == next.len(), "{} arcs were not reachable from the depot", next.len() - walked);
    return Ok(route);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arcs(pairs: &'static [(Loc, Loc)]) -> impl Fn(Loc, Loc) -> bool {
        move |i, j| pairs.contains(&(i, j))
    }

    #[test]
    fn route_walk() {
        let r = route_from_arcs(4, arcs(&[(0, 2), (2, 3), (3, 0)])).unwrap();
        assert_eq!(r, vec![0, 2, 3, 0]);
    }

    #[test]
    fn route_walk_no_arcs() {
        let r = route_from_arcs(4, arcs(&[])).unwrap();
        assert_eq!(r, vec![0]);
    }

    #[test]
    fn route_rejects_disconnected_cycle() {
        assert!(route_from_arcs(4, arcs(&[(0, 1), (1, 0), (2, 3), (3, 2)])).is_err());
    }

    #[test]
    fn route_rejects_branching() {
        assert!(route_from_arcs(4, arcs(&[(0, 1), (0, 2), (1, 0), (2, 0)])).is_err());
    }

    #[test]
    fn classify_statuses() {
        assert_eq!(classify(Status::Optimal, 1).unwrap(), Classified::Feasible(SolveStatus::Optimal));
        assert_eq!(classify(Status::TimeLimit, 2).unwrap(), Classified::Feasible(SolveStatus::TimeLimitFeasible));
        assert_eq!(classify(Status::Infeasible, 0).unwrap(), Classified::Infeasible);
        assert_eq!(classify(Status::InfOrUnbd, 0).unwrap(), Classified::Infeasible);
        assert!(classify(Status::TimeLimit, 0).is_err());
        assert!(classify(Status::Unbounded, 0).is_err());
        assert!(classify(Status::Interrupted, 1).is_err());
    }

    // the tests below need a Gurobi licence
    const LOGFILE: Option<&str> = None;

    fn tiny_instance(coords: Vec<(Coord, Coord)>, attrs: Vec<(Money, Demand)>, num_vehicles: usize, capacity: Demand) -> PcvrpInstance {
        let n = attrs.len();
        let mut demand = Map::default();
        let mut income = Map::default();
        for (c, (m, d)) in attrs.into_iter().enumerate() {
            income.insert(c + 1, m);
            demand.insert(c + 1, d);
        }
        let data = PcvrpInstance {
            id: format!("n{}-k{}-Q{}", n, num_vehicles, capacity),
            n,
            coords,
            demand,
            income,
            num_vehicles,
            capacity,
        };
        data.check().unwrap();
        return data;
    }

    fn solve_ok(data: &PcvrpInstance) -> Solution {
        let _g = crate::init_test_logging(LOGFILE);
        match solve(data, 60.0).unwrap() {
            Outcome::Feasible(sol) => sol,
            Outcome::Infeasible => panic!("expected a feasible model"),
        }
    }

    #[test]
    #[ignore]
    fn serves_the_cheaper_client() {
        let data = crate::data::get_pcvrp_instance_by_name("n2-k1-Q10").unwrap();
        let sol = solve_ok(&data);
        assert_eq!(sol.status, SolveStatus::Optimal);
        assert_eq!(sol.delivered, vec![1]);
        assert_eq!(sol.routes, vec![vec![0, 1, 0]]);
        assert_eq!(sol.flows[&(0, 1)], 5);
        assert!((sol.travel_cost - 20.0).abs() < 1e-4);
        assert!((sol.total_profit - 100.0).abs() < 1e-4);
        assert!((sol.objective - 80.0).abs() < 1e-4);
    }

    #[test]
    #[ignore]
    fn partial_delivery_when_capacity_binds() {
        let mut data = crate::data::get_pcvrp_instance_by_name("n2-k1-Q10").unwrap();
        data.capacity = 3;
        let sol = solve_ok(&data);
        assert_eq!(sol.delivered, vec![1]);
        assert_eq!(sol.flows[&(0, 1)], 3);
        assert!((sol.objective - 40.0).abs() < 1e-4);
    }

    #[test]
    #[ignore]
    fn no_vehicles_means_empty_solution() {
        let mut data = crate::data::get_pcvrp_instance_by_name("n2-k1-Q10").unwrap();
        data.num_vehicles = 0;
        let sol = solve_ok(&data);
        assert_eq!(sol.status, SolveStatus::Optimal);
        assert!(sol.routes.is_empty());
        assert!(sol.flows.is_empty());
        assert_eq!(sol.objective, 0.0);
    }

    #[test]
    #[ignore]
    fn infeasible_without_clients() {
        let data = tiny_instance(vec![(0, 0)], vec![], 1, 10);
        match solve(&data, 60.0).unwrap() {
            Outcome::Infeasible => {}
            Outcome::Feasible(sol) => panic!("expected infeasible, found {:?}", sol),
        }
    }

    #[test]
    #[ignore]
    fn lone_client_may_never_be_served() {
        // floor(0.5 * 1) = 0, yet both vehicles must still tour through the
        // only client to satisfy the depot degree constraints
        let data = tiny_instance(vec![(0, 0), (10, 0)], vec![(1000, 4)], 2, 10);
        let sol = solve_ok(&data);
        assert!(sol.delivered.is_empty());
        assert!(sol.flows.is_empty());
        assert_eq!(sol.routes, vec![vec![0, 1, 0], vec![0, 1, 0]]);
        assert!((sol.objective + 40.0).abs() < 1e-4);
    }

    #[test]
    #[ignore]
    fn large_instance_reports_consistent_scalars() {
        let data = crate::data::get_pcvrp_instance_by_name("n39-k6-Q40").unwrap();
        let sol = solve_ok(&data);
        assert_eq!(sol.routes.len(), 6);
        assert!(2 * sol.delivered.len() <= data.n);
        let recomputed = sol.total_profit - sol.travel_cost;
        assert!((sol.objective - recomputed).abs() <= 1e-4 * (1.0 + recomputed.abs()));
    }

    #[test]
    #[ignore]
    fn forced_tours_favour_splitting_the_fleet() {
        let data = crate::data::get_pcvrp_instance_by_name("n4-k2-Q10").unwrap();
        let sol = solve_ok(&data);
        assert_eq!(sol.delivered, vec![1, 2]);
        for c in 1..=2usize {
            let total: Demand = data.vehicles().filter_map(|v| sol.flows.get(&(v, c))).sum();
            assert_eq!(total, 5);
        }
        let mut routes = sol.routes.clone();
        routes.sort();
        assert_eq!(routes, vec![vec![0, 1, 0], vec![0, 2, 0]]);
        assert!((sol.objective - 156.0).abs() < 1e-4);
    }
}
