// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Florian Eich <florian@bmc-labs.com>
//   Jonas Reitemeyer <alumni@bmc-labs.com>

use super::Result;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;


/// The three channel families the AiM library knows about. Each of them comes
/// with its own set of library functions but they all behave the same.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ChannelKind {
  /// Channels recorded by the logger itself.
  Standard,
  /// Channels derived from GPS data, e.g. "GPS Speed".
  Gps,
  /// Raw GPS receiver data, e.g. "ECEF position_X".
  GpsRaw,
}

impl ChannelKind {
  /// All kinds, in the order channels are enumerated.
  pub const ALL: [ChannelKind; 3] =
    [ChannelKind::Standard, ChannelKind::Gps, ChannelKind::GpsRaw];

  pub fn as_str(&self) -> &'static str {
    match self {
      ChannelKind::Standard => "standard",
      ChannelKind::Gps => "GPS",
      ChannelKind::GpsRaw => "GPS raw",
    }
  }
}

impl fmt::Display for ChannelKind {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(self.as_str())
  }
}


/// Everything a `Session` needs from an opened file.
///
/// This is the boundary to the AiM library: `aim::AimFile` implements it on
/// top of the raw bindings. Counts and fetch results are passed through as
/// the library reports them, i.e. possibly zero or negative, and it is up to
/// the caller to decide what is an error.
///
/// Indices are 0-based; channel indices count within the given `kind`.
pub trait SessionSource {
  fn vehicle_name(&self) -> Result<String>;
  fn track_name(&self) -> Result<String>;
  fn racer_name(&self) -> Result<String>;
  fn championship_name(&self) -> Result<String>;
  fn venue_type_name(&self) -> Result<String>;

  /// Local date and time at which the session was recorded.
  fn date_time(&self) -> Result<NaiveDateTime>;

  fn laps_count(&self) -> i32;

  /// Start (seconds since session start) and duration of lap `lap`.
  fn lap_info(&self, lap: usize) -> Result<(f64, f64)>;

  fn channels_count(&self, kind: ChannelKind) -> i32;
  fn channel_name(&self, kind: ChannelKind, idx: usize) -> Result<String>;
  fn channel_units(&self, kind: ChannelKind, idx: usize) -> Result<String>;

  /// Number of samples of a channel, for the whole session or for one lap.
  fn samples_count(&self,
                   kind: ChannelKind,
                   idx: usize,
                   lap: Option<usize>)
                   -> i32;

  /// Fills `timestamps` and `values` (both of the requested count) and
  /// returns the number of samples read.
  ///
  /// Whole session timestamps are in milliseconds, lap timestamps in
  /// seconds. This is how the library does it and it is left that way here.
  fn samples(&self,
             kind: ChannelKind,
             idx: usize,
             lap: Option<usize>,
             timestamps: &mut [f64],
             values: &mut [f64])
             -> i32;

  /// Releases the underlying handle. Called at most once by `Session`.
  fn close(&mut self) -> Result<()>;
}


#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;


  #[test]
  fn channel_kind_test() {
    assert_eq!("standard", ChannelKind::Standard.to_string());
    assert_eq!("GPS", ChannelKind::Gps.to_string());
    assert_eq!("GPS raw", ChannelKind::GpsRaw.to_string());
    assert_eq!(vec![ChannelKind::Standard,
                    ChannelKind::Gps,
                    ChannelKind::GpsRaw],
               ChannelKind::ALL.to_vec());
  }
}
