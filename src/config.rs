// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Florian Eich <florian@bmc-labs.com>
//   Jonas Reitemeyer <alumni@bmc-labs.com>

use getset::{CopyGetters, Getters};
use serde::Deserialize;


/// Name of the channel the time-distance table is integrated from.
pub const DEFAULT_SPEED_CHANNEL: &str = "GPS Speed";

/// Timestamps coming out of the library carry float noise in the fractional
/// seconds, four decimals is the resolution of the loggers.
pub const DEFAULT_TIMESTAMP_DECIMALS: usize = 4;


/// Options for deriving data from a session. All fields can be omitted when
/// deserializing, in which case the defaults apply.
#[derive(Clone, Debug, PartialEq, Deserialize, CopyGetters, Getters)]
#[serde(default, deny_unknown_fields)]
pub struct SessionOptions {
  /// Channel holding the vehicle speed in m/s.
  #[getset(get = "pub")]
  speed_channel:      String,
  /// Decimal places timestamps are rounded to.
  #[getset(get_copy = "pub")]
  timestamp_decimals: usize,
}

impl SessionOptions {
  pub fn new(speed_channel: &str, timestamp_decimals: usize) -> Self {
    Self { speed_channel: speed_channel.to_string(),
           timestamp_decimals }
  }
}

impl Default for SessionOptions {
  fn default() -> Self {
    Self::new(DEFAULT_SPEED_CHANNEL, DEFAULT_TIMESTAMP_DECIMALS)
  }
}
