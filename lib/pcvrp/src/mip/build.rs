use grb::prelude::*;
use ndarray::Array2;
use itertools::iproduct;
use tracing::*;

use crate::data::pcvrp::*;

/// Decision variables of the prize-collecting model, in flat storage.  The
/// auxiliary subtour-elimination flows are scoped to each vehicle's
/// constraint block and are not retained after the model is built.
pub struct Vars {
    n: usize,
    /// client `c` counts as served, indexed by `c - 1`
    pub(crate) delivered: Vec<Var>,
    /// units vehicle `v` delivers to client `c`
    pub(crate) flow: Vec<Var>,
    /// vehicle `v` visits vertex `i`
    pub(crate) visited: Vec<Var>,
    /// vehicle `v` travels directly from `i` to `j`
    pub(crate) arc: Vec<Var>,
}

impl Vars {
    #[inline]
    pub fn delivered(&self, c: Loc) -> Var {
        debug_assert!(0 < c && c <= self.n);
        self.delivered[c - 1]
    }

    #[inline]
    pub fn flow(&self, v: Vehicle, c: Loc) -> Var {
        debug_assert!(0 < c && c <= self.n);
        self.flow[v * self.n + c - 1]
    }

    #[inline]
    pub fn visited(&self, v: Vehicle, i: Loc) -> Var {
        debug_assert!(i <= self.n);
        self.visited[v * (self.n + 1) + i]
    }

    #[inline]
    pub fn arc(&self, v: Vehicle, i: Loc, j: Loc) -> Var {
        debug_assert!(i <= self.n && j <= self.n);
        self.arc[(v * (self.n + 1) + i) * (self.n + 1) + j]
    }
}

fn add_vars(model: &mut Model, data: &PcvrpInstance) -> grb::Result<Vars> {
    let n = data.n;

    let mut delivered = Vec::with_capacity(n);
    for c in data.clients() {
        delivered.push(add_binvar!(model, name: &format!("d_{}", c))?);
    }

    let mut flow = Vec::with_capacity(data.num_vehicles * n);
    let mut visited = Vec::with_capacity(data.num_vehicles * (n + 1));
    let mut arc = Vec::with_capacity(data.num_vehicles * (n + 1) * (n + 1));
    for v in data.vehicles() {
        for c in data.clients() {
            let ub = data.capacity as f64;
            flow.push(add_intvar!(model, name: &format!("f_{}_{}", v, c), bounds: 0.0..ub)?);
        }
        for i in data.vertices() {
            visited.push(add_binvar!(model, name: &format!("y_{}_{}", v, i))?);
        }
        for i in data.vertices() {
            for j in data.vertices() {
                arc.push(add_binvar!(model, name: &format!("x_{}_{}_{}", v, i, j))?);
            }
        }
    }

    return Ok(Vars { n, delivered, flow, visited, arc });
}

fn coverage_constraints(model: &mut Model, data: &PcvrpInstance, vars: &Vars) -> grb::Result<()> {
    // any delivery, including a partial one, marks the client as served
    for c in data.clients() {
        let served = vars.delivered(c);
        let frac = 1.0 / data.demand[&c] as f64;
        let lhs = data.vehicles().map(|v| frac * vars.flow(v, c)).grb_sum();
        model.add_constr(&format!("cover_{}", c), c!(served >= lhs))?;
    }

    // at most half of the clients may be served
    let num_served = data.clients().map(|c| vars.delivered(c)).grb_sum();
    let cap = 0.5 * data.n as f64;
    model.add_constr("half_cap", c!(num_served <= cap))?;

    return Ok(());
}

/// Objective contribution of one vehicle, split into its two terms.
struct VehicleObj {
    travel_cost: Expr,
    profit: Expr,
}

fn vehicle_constraints(
    model: &mut Model,
    data: &PcvrpInstance,
    dist: &Array2<Cost>,
    vars: &Vars,
    v: Vehicle,
) -> grb::Result<VehicleObj> {
    let n = data.n;

    // every route includes the depot
    let visit_depot = vars.visited(v, DEPOT);
    model.add_constr(&format!("depot_{}", v), c!(visit_depot == 1.0))?;

    // deliveries are gated by visits and bounded by the client's demand
    for c in data.clients() {
        let lhs = data.demand[&c] as f64 * vars.visited(v, c);
        let f = vars.flow(v, c);
        model.add_constr(&format!("gate_{}_{}", v, c), c!(lhs >= f))?;
    }

    // one arc in and one arc out of every visited vertex, no self-loops
    for j in data.vertices() {
        let y = vars.visited(v, j);
        let inflow = data.vertices().map(|i| vars.arc(v, i, j)).grb_sum();
        model.add_constr(&format!("deg_in_{}_{}", v, j), c!(inflow == y))?;
        let outflow = data.vertices().map(|k| vars.arc(v, j, k)).grb_sum();
        model.add_constr(&format!("deg_out_{}_{}", v, j), c!(outflow == y))?;
        let selfloop = vars.arc(v, j, j);
        model.add_constr(&format!("loop_{}_{}", v, j), c!(selfloop == 0.0))?;
    }

    // single-commodity flow: the depot emits one unit for every visited
    // vertex and each visited vertex absorbs one, which rules out cycles
    // that are disconnected from the depot
    let mut gvars = Vec::with_capacity((n + 1) * (n + 1));
    for i in data.vertices() {
        for j in data.vertices() {
            let ub = n as f64;
            gvars.push(add_intvar!(model, name: &format!("g_{}_{}_{}", v, i, j), bounds: 0.0..ub)?);
        }
    }
    let g = |i: Loc, j: Loc| gvars[i * (n + 1) + j];

    for (i, j) in iproduct!(data.vertices(), data.vertices()) {
        let lhs = g(i, j);
        let rhs = n as f64 * vars.arc(v, i, j);
        model.add_constr(&format!("sub_ub_{}_{}_{}", v, i, j), c!(lhs <= rhs))?;
    }

    let depot_out = data.vertices().map(|j| g(DEPOT, j)).grb_sum();
    let visits = data.vertices().map(|j| vars.visited(v, j)).grb_sum();
    let lhs = visits - depot_out;
    model.add_constr(&format!("sub_src_{}", v), c!(lhs == 1.0))?;

    for j in data.clients() {
        let inflow = data.vertices().map(|i| g(i, j)).grb_sum();
        let outflow = data.vertices().map(|k| g(j, k)).grb_sum();
        let lhs = inflow - outflow;
        let y = vars.visited(v, j);
        model.add_constr(&format!("sub_bal_{}_{}", v, j), c!(lhs == y))?;
    }

    // total load of the vehicle
    let load = data.clients().map(|c| vars.flow(v, c)).grb_sum();
    let cap = data.capacity as f64;
    model.add_constr(&format!("cap_{}", v), c!(load <= cap))?;

    let travel_cost = iproduct!(data.vertices(), data.vertices())
        .map(|(i, j)| dist[[i, j]] as f64 * vars.arc(v, i, j))
        .grb_sum();
    let profit = data.clients()
        .map(|c| data.unit_profit(c) * vars.flow(v, c))
        .grb_sum();

    return Ok(VehicleObj { travel_cost, profit });
}

/// Add every variable and constraint of the prize-collecting model to
/// `model` and set the maximisation objective.
#[instrument(level="debug", skip(model, data, dist))]
pub fn build_model(model: &mut Model, data: &PcvrpInstance, dist: &Array2<Cost>) -> grb::Result<Vars> {
    debug_assert_eq!(dist.dim(), (data.n + 1, data.n + 1));

    let vars = add_vars(model, data)?;
    coverage_constraints(model, data, &vars)?;

    let mut total_cost = Vec::with_capacity(data.num_vehicles);
    let mut total_profit = Vec::with_capacity(data.num_vehicles);
    for v in data.vehicles() {
        let obj = vehicle_constraints(model, data, dist, &vars, v)?;
        total_cost.push(obj.travel_cost);
        total_profit.push(obj.profit);
    }

    let objective = total_profit.into_iter().grb_sum() - total_cost.into_iter().grb_sum();
    model.set_objective(objective, Maximize)?;

    return Ok(vars);
}
