// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Florian Eich <florian@bmc-labs.com>
//   Jonas Reitemeyer <alumni@bmc-labs.com>

//! Access to XRK and DRK files recorded by AiM data loggers.
//!
//! Files are read through the closed-source AiM library (enable the `aim`
//! feature to link it). On top of that, a `Session` provides lap info, all
//! channels of the three channel families and a time-distance table
//! integrated from GPS speed, which allows fetching any channel over distance
//! instead of time, absolute or relative to the start of a lap.
//!
//! ```ignore
//! use std::path::Path;
//! use xrk::{SampleRequest, XrkSession};
//!
//! let mut session = XrkSession::open(Path::new("session.xrk"))?;
//! let rpm = session.samples("fEngRpm",
//!                           SampleRequest::for_lap(1).over_distance()
//!                                                    .relative())?;
//! ```

#[cfg_attr(not(feature = "aim"), allow(dead_code))]
mod bindings;
mod channel;
mod config;
mod distance;
mod error;
mod lap;
mod session;
mod source;
mod test_utils;
#[cfg_attr(not(feature = "aim"), allow(dead_code))]
mod util;

#[cfg(feature = "aim")]
mod aim;

#[cfg(feature = "aim")]
pub use aim::{AimFile, XrkSession};
pub use channel::{Channel, ChannelData, SampleRequest};
pub use config::{SessionOptions,
                 DEFAULT_SPEED_CHANNEL,
                 DEFAULT_TIMESTAMP_DECIMALS};
pub use distance::TimeDistance;
pub use error::{Error, Result};
pub use lap::LapInfo;
pub use session::{Session, SessionInfo};
pub use source::{ChannelKind, SessionSource};
