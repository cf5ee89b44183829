mod table;
pub use table::CsvFmt;

mod name;
pub use name::parse_name;


mod nom_prelude {
  pub use nom::{
    IResult,
    error::{
      self,
      ParseError,
      FromExternalError,
    },
    sequence::*,
    combinator::*,
    character::complete::*,
    bytes::complete::tag,
    Finish,
  };
  pub use std::str::FromStr;
  pub use std::num::ParseIntError;
}

mod common;

pub trait ParseInstance<Fmt>: Sized {
  fn parse(inputs: Fmt) -> crate::Result<Self>;
}
