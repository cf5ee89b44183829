use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use lazy_static::lazy_static;
use crate::Error;
use std::borrow::Cow;


pub trait IdxNameMap {
  fn index_to_name(&self, idx: usize) -> Result<Cow<str>>;

  fn name_to_index(&self, name: &str) -> Result<usize>;

  fn len(&self) -> usize;

  fn check_idx(&self, idx: usize) -> Result<()> {
    if self.len() <= idx {
      Err(Error::IndexOutOfRange.into())
    } else {
      Ok(())
    }
  }
}


impl<'a, D: IdxNameMap> IdxNameMap for &'a D {
  fn index_to_name(&self, idx: usize) -> Result<Cow<str>> {
    D::index_to_name(self, idx)
  }

  fn name_to_index(&self, name: &str) -> Result<usize> {
    D::name_to_index(self, name)
  }

  fn len(&self) -> usize {
    D::len(self)
  }
}

pub trait Dataset: IdxNameMap + Sync {
  type Instance;
  fn load_instance(&self, idx: usize) -> Result<Self::Instance>;
}


impl<'a, D: Dataset> Dataset for &'a D {
  type Instance = D::Instance;

  fn load_instance(&self, idx: usize) -> Result<Self::Instance> {
    D::load_instance(self, idx)
  }
}


/// A Standard Layout Dataset: a directory containing instance files and `INDEX.txt` index file.
/// The index file contains a new-line separated list of instance names, which acts as a map from index -> name.
/// Each instance file is named `NAME.SUFFIX`.
///
/// The directory is looked up under `$DATA_ROOT`, falling back to the `data/`
/// directory shipped with this repository.
pub struct StdLayout<D> {
  _marker: PhantomData<D>,
  name_order: Vec<String>,
  name_to_idx_map: HashMap<String, usize>,
  dir: PathBuf,
  suffix: String,
}


impl<D> StdLayout<D> {
  fn new(dir: impl AsRef<Path>, suffix: &str) -> Result<StdLayout<D>> {
    let root = std::env::var("DATA_ROOT")
      .unwrap_or_else(|_| concat!(env!("CARGO_MANIFEST_DIR"), "/../../data").to_string());
    let dir = Path::new(&root).join(dir);
    let ctx = format!("try read directory {:?}", &dir);
    let dir = dir.canonicalize().context(ctx)?;

    let contents = std::fs::read_to_string(dir.join("INDEX.txt"))?;
    let name_order: Vec<String> = contents.split_whitespace().map(|s| s.trim().to_string()).collect();
    let name_to_idx_map: HashMap<_, _> = name_order.iter().enumerate().map(|(i, s)| (s.clone(), i)).collect();

    Ok(StdLayout {
      _marker: PhantomData {},
      name_order,
      name_to_idx_map,
      dir,
      suffix: suffix.to_string(),
    })
  }
}

impl<D> IdxNameMap for StdLayout<D> {
  fn index_to_name(&self, idx: usize) -> Result<Cow<str>> {
    self.check_idx(idx)?;
    Ok(Cow::Borrowed(&self.name_order[idx]))
  }

  fn name_to_index(&self, name: &str) -> Result<usize> {
    self.name_to_idx_map.get(name).ok_or(Error::UnknownInstanceName.into()).map(|i| *i)
  }

  fn len(&self) -> usize { self.name_order.len() }
}


pub mod pcvrp;


fn pretty_unwrap<T>(r: Result<T>) -> T {
  match r {
    Err(e) => panic!("{:?}", e),
    Ok(t) => t
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn index_name_roundtrip() {
    let dset = &*pcvrp::DSET;
    assert!(dset.len() >= 4);
    for idx in 0..dset.len() {
      let name = dset.index_to_name(idx).unwrap().into_owned();
      assert_eq!(dset.name_to_index(&name).unwrap(), idx);
    }
    assert!(dset.name_to_index("n0-k0-Q0").is_err());
    assert!(dset.index_to_name(dset.len()).is_err());
  }

  #[test]
  fn load_one() {
    pretty_unwrap(pcvrp::DSET.load_instance(0));
  }
}
