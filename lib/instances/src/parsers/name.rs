use crate::Result;
use crate::raw::pcvrp::Fleet;
use super::nom_prelude::*;
use super::common::*;

/// Parse an instance name of the form `n{N}-k{K}-Q{Q}` (eg. `n15-k4-Q20`):
/// N clients, served by K vehicles of capacity Q.
pub fn parse_name(name: &str) -> Result<(usize, Fleet)> {
  match instance_name(name).finish() {
    Ok((_, parsed)) => Ok(parsed),
    Err(e) => Err(
      anyhow::Error::msg(format!("bad instance name {:?}: {}", name, e))
    ),
  }
}

fn instance_name(input: &str) -> IResult<&str, (usize, Fleet), error::VerboseError<&str>> {
  let (input, (_, num_clients, _, vehicles, _, capacity)) = tuple((
    tag("n"), usize_,
    tag("-k"), usize_,
    tag("-Q"), i64_,
  ))(input)?;
  let (input, _) = eof(input)?;
  Ok((input, (num_clients, Fleet { vehicles, capacity })))
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn standard_names() {
    assert_eq!(
      parse_name("n15-k4-Q20").unwrap(),
      (15, Fleet { vehicles: 4, capacity: 20 })
    );
    assert_eq!(
      parse_name("n39-k6-Q40").unwrap(),
      (39, Fleet { vehicles: 6, capacity: 40 })
    );
    assert_eq!(
      parse_name("n2-k0-Q1").unwrap(),
      (2, Fleet { vehicles: 0, capacity: 1 })
    );
  }

  #[test]
  fn malformed_names() {
    assert!(parse_name("n15-k4").is_err());
    assert!(parse_name("15-k4-Q20").is_err());
    assert!(parse_name("n15-k4-Q20.csv").is_err());
    assert!(parse_name("n15-k4-Q20 ").is_err());
    assert!(parse_name("nx-k4-Q20").is_err());
    assert!(parse_name("").is_err());
  }

  #[test]
  fn negative_capacity_is_grammatical() {
    // rejected later by instance validation, not by the name grammar
    assert_eq!(
      parse_name("n1-k1-Q-3").unwrap(),
      (1, Fleet { vehicles: 1, capacity: -3 })
    );
  }
}
