use anyhow::{ensure, Result};
use itertools::Itertools;
use ndarray::Array2;

use crate::Set;
use crate::data::pcvrp::*;
use super::solve::Solution;

const EPS: f64 = 1e-4;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPS * (1.0 + b.abs())
}

/// Check a solution against the model's feasibility requirements and confirm
/// that the reported totals match the assignment.
pub fn verify(data: &PcvrpInstance, dist: &Array2<Cost>, sol: &Solution) -> Result<()> {
    ensure!(sol.routes.len() == data.num_vehicles,
            "expected {} routes, found {}", data.num_vehicles, sol.routes.len());

    for (v, route) in sol.routes.iter().enumerate() {
        ensure!(route.len() >= 3, "route of vehicle {} visits no clients", v);
        ensure!(route.first() == Some(&DEPOT), "route of vehicle {} does not start at the depot", v);
        ensure!(route.last() == Some(&DEPOT), "route of vehicle {} does not end at the depot", v);
        let interior = &route[1..route.len() - 1];
        for &c in interior {
            ensure!(data.is_client(c), "route of vehicle {} passes through unknown vertex {}", v, c);
        }
        let distinct: Set<Loc> = interior.iter().copied().collect();
        ensure!(distinct.len() == interior.len(), "route of vehicle {} visits a client twice", v);
    }

    // deliveries go to visited clients only and never exceed demand
    for (&(v, c), &q) in &sol.flows {
        ensure!(v < data.num_vehicles, "flow from unknown vehicle {}", v);
        ensure!(data.is_client(c), "flow to unknown client {}", c);
        ensure!(q > 0, "non-positive flow of {} from vehicle {} to client {}", q, v, c);
        ensure!(q <= data.demand[&c], "flow of {} to client {} exceeds its demand", q, c);
        ensure!(sol.routes[v].contains(&c), "vehicle {} delivers to client {} without visiting it", v, c);
    }

    for v in data.vehicles() {
        let load: Demand = data.clients().filter_map(|c| sol.flows.get(&(v, c))).sum();
        ensure!(load <= data.capacity, "vehicle {} carries {} with capacity {}", v, load, data.capacity);
    }

    // the served list must cover every delivery and respect the cap
    let served: Set<Loc> = sol.delivered.iter().copied().collect();
    for &c in &sol.delivered {
        ensure!(data.is_client(c), "served list contains unknown client {}", c);
    }
    ensure!(served.len() == sol.delivered.len(), "served list contains a duplicate");
    for &(_, c) in sol.flows.keys() {
        ensure!(served.contains(&c), "client {} receives a delivery but is not marked served", c);
    }
    ensure!(2 * served.len() <= data.n,
            "{} served clients exceed the cap of {}", served.len(), data.n / 2);

    for c in data.clients() {
        let total: Demand = data.vehicles().filter_map(|v| sol.flows.get(&(v, c))).sum();
        ensure!(total <= data.demand[&c],
                "client {} receives {} in total with demand {}", c, total, data.demand[&c]);
    }

    let travel_cost = sol.routes.iter()
        .flat_map(|r| r.iter().tuple_windows())
        .map(|(&i, &j)| dist[[i, j]])
        .sum::<Cost>() as f64;
    ensure!(approx_eq(sol.travel_cost, travel_cost),
            "reported travel cost {} differs from {}", sol.travel_cost, travel_cost);

    let total_profit = sol.flows.iter()
        .map(|(&(_, c), &q)| data.unit_profit(c) * q as f64)
        .sum::<f64>();
    ensure!(approx_eq(sol.total_profit, total_profit),
            "reported profit {} differs from {}", sol.total_profit, total_profit);

    ensure!(approx_eq(sol.objective, total_profit - travel_cost),
            "objective {} does not match profit {} minus cost {}", sol.objective, total_profit, travel_cost);

    return Ok(());
}
