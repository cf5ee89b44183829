use super::nom_prelude::*;
use std::num::ParseIntError;
use std::str::FromStr;

pub fn usize_<'a, E>(input: &'a str) -> IResult<&'a str, usize, E>
  where
    E: ParseError<&'a str> + error::FromExternalError<&'a str, ParseIntError>
{
  map_res(digit1, usize::from_str)(input)
}

pub fn i64_<'a, E>(input: &'a str) -> IResult<&'a str, i64, E>
  where
    E: ParseError<&'a str> + error::FromExternalError<&'a str, ParseIntError>
{
  map_res(
    recognize(
      pair(
        opt(char('-')),
        digit1
      )
    ), i64::from_str)(input)
}
