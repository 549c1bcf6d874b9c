// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Florian Eich <florian@bmc-labs.com>
//   Jonas Reitemeyer <alumni@bmc-labs.com>

use super::{Error, Result};
use getset::Getters;
use tracing::{debug, warn};


/// Maps elapsed time (seconds since session start) to distance traveled
/// (meters), integrated from a speed channel.
///
/// Both columns are non-decreasing as long as the speed is non-negative.
#[derive(Clone, Debug, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct TimeDistance {
  times:     Vec<f64>,
  distances: Vec<f64>,
}

impl TimeDistance {
  /// Integrates `speeds` (m/s) over `times` (s).
  ///
  /// Each step uses the speed at its end, i.e.
  ///
  ///   d_0 = 0
  ///   d_i = d_(i - 1) + (t_i - t_(i - 1)) * v_i
  ///
  /// which is a plain rectangle rule, not a trapezoid. The input has to be
  /// in absolute time coordinates.
  pub fn from_speed(times: &[f64], speeds: &[f64]) -> Result<Self> {
    if times.len() != speeds.len() {
      return Err(Error::MalformedSeries(format!("{} timestamps but {} \
                                                 speed samples",
                                                times.len(),
                                                speeds.len())));
    }
    if times.is_empty() {
      return Err(Error::MalformedSeries("no speed samples".to_string()));
    }

    let mut distances = Vec::with_capacity(times.len());
    distances.push(0.0);
    for i in 1..times.len() {
      let traveled = (times[i] - times[i - 1]) * speeds[i];
      distances.push(distances[i - 1] + traveled);
    }

    debug!(samples = times.len(),
           distance = distances[distances.len() - 1],
           "built time-distance table");

    Ok(Self { times: times.to_vec(),
              distances })
  }

  pub fn len(&self) -> usize {
    self.times.len()
  }

  pub fn is_empty(&self) -> bool {
    self.times.is_empty()
  }

  /// Total distance covered in the session.
  pub fn total_distance(&self) -> f64 {
    self.distances.last().copied().unwrap_or(0.0)
  }

  /// Distance traveled at `time`.
  ///
  /// Looks up the first table entry at or after `time`. Timestamps from the
  /// same session line up with table entries; if they don't, the distance of
  /// the entry found is used anyway and a warning is logged. Times past the
  /// end of the table map to the last entry.
  pub fn time_to_distance(&self, time: f64) -> f64 {
    let idx = nearest_idx(&self.times, time);
    if self.times[idx] != time {
      warn!(time,
            closest = self.times[idx],
            "no exact match in time-distance table");
    }
    self.distances[idx]
  }

  /// Converts a whole series of timestamps, see `time_to_distance`.
  pub fn times_to_distances(&self, times: &[f64]) -> Vec<f64> {
    times.iter()
         .map(|&time| self.time_to_distance(time))
         .collect()
  }

  /// Point in time at which `distance` was reached, same lookup rules as
  /// `time_to_distance`. Where the vehicle stood still, the first time at
  /// that distance is returned.
  pub fn distance_to_time(&self, distance: f64) -> f64 {
    let idx = nearest_idx(&self.distances, distance);
    if self.distances[idx] != distance {
      warn!(distance,
            closest = self.distances[idx],
            "no exact match in time-distance table");
    }
    self.times[idx]
  }

  /// Distance traveled between `start` and `end` (both in seconds).
  pub fn distance_between(&self, start: f64, end: f64) -> f64 {
    self.time_to_distance(end) - self.time_to_distance(start)
  }
}

/// Leftmost index with `column[idx] >= value`, clamped to the last index.
/// `column` must be sorted and not empty.
fn nearest_idx(column: &[f64], value: f64) -> usize {
  let idx = column.partition_point(|&entry| entry < value);
  idx.min(column.len() - 1)
}


#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;


  fn table() -> TimeDistance {
    TimeDistance::from_speed(&[0.0, 1.0, 2.0], &[0.0, 10.0, 20.0]).unwrap()
  }

  #[test]
  fn from_speed_test() {
    let table = table();
    assert_eq!(&vec![0.0, 1.0, 2.0], table.times());
    assert_eq!(&vec![0.0, 10.0, 30.0], table.distances());
    assert_eq!(3, table.len());
    assert_eq!(false, table.is_empty());
    assert_eq!(30.0, table.total_distance());

    // single sample, nothing traveled
    let table = TimeDistance::from_speed(&[3.5], &[42.0]).unwrap();
    assert_eq!(&vec![0.0], table.distances());
  }

  #[test]
  fn from_speed_malformed_test() {
    assert!(matches!(TimeDistance::from_speed(&[0.0, 1.0], &[1.0]),
                     Err(Error::MalformedSeries(_))));
    assert!(matches!(TimeDistance::from_speed(&[], &[]),
                     Err(Error::MalformedSeries(_))));
  }

  #[test]
  fn distances_non_decreasing_test() {
    let times: Vec<f64> = (0..500).map(|i| i as f64 * 0.1).collect();
    let speeds: Vec<f64> =
      (0..500).map(|i| ((i as f64) * 0.05).sin().abs() * 60.0)
              .collect();
    let table = TimeDistance::from_speed(&times, &speeds).unwrap();

    assert!(table.distances().windows(2).all(|w| w[0] <= w[1]));
  }

  #[test]
  fn time_to_distance_exact_test() {
    let table = table();
    for (time, distance) in table.times().iter().zip(table.distances()) {
      assert_eq!(*distance, table.time_to_distance(*time));
    }
  }

  #[test]
  fn time_to_distance_inexact_test() {
    let table = table();
    // first entry at or after the requested time
    assert_eq!(10.0, table.time_to_distance(0.5));
    assert_eq!(30.0, table.time_to_distance(1.0001));
    assert_eq!(0.0, table.time_to_distance(-1.0));
  }

  #[test]
  fn time_to_distance_past_end_test() {
    let table = table();
    assert_eq!(30.0, table.time_to_distance(2.0001));
    assert_eq!(30.0, table.time_to_distance(1_000_000.0));
  }

  #[test]
  fn times_to_distances_test() {
    assert_eq!(vec![30.0, 0.0, 10.0],
               table().times_to_distances(&[2.0, 0.0, 1.0]));
  }

  #[test]
  fn distance_to_time_test() {
    let table = table();
    assert_eq!(1.0, table.distance_to_time(10.0));
    assert_eq!(2.0, table.distance_to_time(30.0));
    assert_eq!(2.0, table.distance_to_time(31.0));

    // standing still at the start, first time at distance 0 wins
    let table =
      TimeDistance::from_speed(&[0.0, 1.0, 2.0], &[0.0, 0.0, 5.0]).unwrap();
    assert_eq!(0.0, table.distance_to_time(0.0));
  }

  #[test]
  fn distance_between_test() {
    let table = table();
    assert_eq!(20.0, table.distance_between(1.0, 2.0));
    assert_eq!(30.0, table.distance_between(0.0, 2.0));
  }
}
