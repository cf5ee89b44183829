use json;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use std::io::Write;
use itertools::Itertools;
use anyhow::{Result};
use tracing::*;


use pcvrp::*;
use pcvrp::data::get_pcvrp_instance_by_index;
use pcvrp::data::pcvrp::*;
use pcvrp::mip::{solve, Outcome, Solution};

mod common;
use common::*;
use common::SolveReport;

use structopt::StructOpt;

#[derive(Debug, StructOpt)]
struct ClArgs {
    #[structopt(required=true)]
    indices: Vec<usize>,
    #[structopt(long, short="k")]
    vehicles: Option<usize>,
    #[structopt(long, short="Q", validator=clap_range_validator(Some(1), None))]
    capacity: Option<Demand>,
    #[structopt(long, default_value="60", validator=clap_range_validator(Some(1e-6), None))]
    time_limit: f64,
    #[structopt(long, short="c", default_value="1", validator=clap_range_validator(Some(1), None))]
    cpus: usize,
    #[structopt(flatten)]
    output: OutputOptions,
}

#[derive(Debug)]
enum RunOutcome {
    Solved(Solution),
    Infeasible,
    Failed,
}

#[derive(Debug)]
struct InstanceReport {
    id: String,
    outcome: RunOutcome,
}

struct RunSummary(Vec<InstanceReport>);

fn get_record(r: &InstanceReport) -> json::JsonValue {
    return match &r.outcome {
        RunOutcome::Solved(sol) => {
            let flows = sol.flows.iter()
                .sorted()
                .map(|(&(v, c), &q)| json::object! { vehicle: v, client: c, quantity: q })
                .collect_vec();
            json::object! {
                id: r.id.clone(),
                status: sol.status.to_string(),
                objective: sol.objective,
                distance_cost: sol.travel_cost,
                total_profit: sol.total_profit,
                delivered: json::JsonValue::from(sol.delivered.clone()),
                routes: json::JsonValue::from(sol.routes.clone()),
                flows: json::JsonValue::from(flows),
            }
        }
        RunOutcome::Infeasible => json::object! { id: r.id.clone(), status: "infeasible" },
        RunOutcome::Failed => json::object! { id: r.id.clone(), status: "failed" },
    }
}

impl SolveReport for RunSummary {
    fn write_text(&self, mut buf: impl Write) -> Result<()> {
        for r in &self.0 {
            match &r.outcome {
                RunOutcome::Solved(sol) => {
                    writeln!(buf, "{}: {}", r.id, sol.status)?;
                    writeln!(buf, "distance cost = {}", sol.travel_cost)?;
                    writeln!(buf, "total profit = {}", sol.total_profit)?;
                }
                RunOutcome::Infeasible => {
                    writeln!(buf, "{}: infeasible", r.id)?;
                }
                RunOutcome::Failed => {
                    writeln!(buf, "{}: failed", r.id)?;
                }
            }
        }
        return Ok(())
    }

    fn write_json(&self, mut buf: impl Write) -> Result<()> {
        let root: json::JsonValue = self.0.iter().map(get_record).collect_vec().into();
        root.write_pretty(&mut buf, 2)?;
        return Ok(())
    }
}

fn run_one(data: &PcvrpInstance, time_limit: f64) -> InstanceReport {
    let outcome = match solve(data, time_limit) {
        Ok(Outcome::Feasible(sol)) => RunOutcome::Solved(sol),
        Ok(Outcome::Infeasible) => {
            warn!(id=%data.id, "instance is infeasible");
            RunOutcome::Infeasible
        }
        Err(err) => {
            match err.downcast_ref::<grb::Error>() {
                Some(grb::Error::FromAPI(msg, code)) => error!(id=%data.id, code=*code, msg=%msg, "solver error"),
                _ => error!(id=%data.id, err=?err, "solve failed"),
            }
            RunOutcome::Failed
        }
    };
    return InstanceReport { id: data.id.clone(), outcome };
}


fn main() -> anyhow::Result<()> {
    let args : ClArgs = StructOpt::from_args();
    let _g = init_logging(args.output.log.clone());
    debug!(?args);
    ThreadPoolBuilder::new().num_threads(args.cpus).build_global().expect("Failed to construct thread pool");

    let mut instances = Vec::with_capacity(args.indices.len());
    for &idx in &args.indices {
        let mut data = get_pcvrp_instance_by_index(idx)?;
        if let Some(k) = args.vehicles {
            data.num_vehicles = k;
        }
        if let Some(q) = args.capacity {
            data.capacity = q;
        }
        data.check()?;
        instances.push(data);
    }

    let reports = if args.cpus > 1 {
        instances.par_iter().map(|data| run_one(data, args.time_limit)).collect()
    } else {
        instances.iter().map(|data| run_one(data, args.time_limit)).collect()
    };

    output_reports(&args.output, RunSummary(reports))?;
    Ok(())
}
