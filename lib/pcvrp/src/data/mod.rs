use anyhow::Result;
use instances::dataset::{Dataset, IdxNameMap};

pub mod pcvrp;

pub fn get_pcvrp_instance_by_name(name : &str) -> Result<pcvrp::PcvrpInstance> {
  get_pcvrp_instance_by_index(pcvrp::DSET.name_to_index(name)?)
}


pub fn get_pcvrp_instance_by_index(idx : usize) -> Result<pcvrp::PcvrpInstance> {
    pcvrp::DSET.load_instance(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic]
    fn fail_load_pcvrp_instance() {
        get_pcvrp_instance_by_name("non-existent").unwrap();
    }

    #[test]
    #[should_panic]
    fn fail_load_pcvrp_instance_idx() {
        get_pcvrp_instance_by_index(999).unwrap();
    }

}
