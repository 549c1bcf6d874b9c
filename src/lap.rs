// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Jonas Reitemeyer <alumni@bmc-labs.com>
//   Florian Eich <florian@bmc-labs.com>

use getset::CopyGetters;
use serde::Serialize;


/// Stores the number of a lap, its start within the session and its
/// duration, both in seconds.
#[derive(Clone, Copy, Debug, PartialEq, CopyGetters, Serialize)]
#[getset(get_copy = "pub")]
pub struct LapInfo {
  number:   usize,
  start:    f64,
  duration: f64,
}

impl LapInfo {
  pub fn new(number: usize, start: f64, duration: f64) -> Self {
    Self { number,
           start,
           duration }
  }

  /// Point in time (seconds since session start) at which the lap ends.
  pub fn end(&self) -> f64 {
    self.start + self.duration
  }

  /// Whether `time` (seconds since session start) lies within this lap. The
  /// start is inclusive, the end exclusive, so that consecutive laps don't
  /// overlap.
  pub fn contains(&self, time: f64) -> bool {
    self.start <= time && time < self.end()
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;


  #[test]
  fn lap_info_test() {
    let lap_info = LapInfo::new(2, 145.156, 133.135);
    assert_eq!(2, lap_info.number());
    assert_eq!(145.156, lap_info.start());
    assert_eq!(133.135, lap_info.duration());
    assert_eq!(145.156 + 133.135, lap_info.end());

    assert_eq!(true, lap_info.contains(145.156));
    assert_eq!(true, lap_info.contains(200.0));
    assert_eq!(false, lap_info.contains(lap_info.end()));
    assert_eq!(false, lap_info.contains(100.0));
  }

  #[test]
  fn lap_info_serialize_test() {
    let json = serde_json::to_string(&LapInfo::new(1, 10.5, 90.25)).unwrap();
    assert_eq!(r#"{"number":1,"start":10.5,"duration":90.25}"#, json);
  }
}
