// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Florian Eich <florian@bmc-labs.com>
//   Jonas Reitemeyer <alumni@bmc-labs.com>

use std::{ffi, io, path::PathBuf, result, str};
use thiserror::Error;


/// The crate wide result type, defaulting to `Error`.
pub type Result<T, E = Error> = result::Result<T, E>;


/// Everything that can go wrong when talking to the AiM library or deriving
/// data from it.
///
/// Invariant violations (`ChannelNameCollision`, `MalformedSeries`) and
/// contract violations of the library (`SampleCountError`,
/// `SampleFetchError`) abort the operation at hand. Nothing is retried, the
/// library has no notion of transient failures.
#[derive(Debug, Error)]
pub enum Error {
  #[error("could not open file ({}): {reason}", .path.display())]
  OpenFailure { path: PathBuf, reason: String },

  #[error("no channel '{0}' found")]
  ChannelMissing(String),

  #[error("channel name collision: '{name}' exists as {first} and {second} \
           channel")]
  ChannelNameCollision {
    name:   String,
    first:  &'static str,
    second: &'static str,
  },

  #[error("channel '{channel}' reported sample count {count}")]
  SampleCountError { channel: String, count: i32 },

  #[error("error reading samples of channel '{channel}' (status {status}, \
           expected {expected})")]
  SampleFetchError {
    channel:  String,
    status:   i32,
    expected: usize,
  },

  #[error("malformed series: {0}")]
  MalformedSeries(String),

  #[error("lap index {lap} out of range, session has {count} laps")]
  LapOutOfRange { lap: usize, count: usize },

  #[error("could not fetch info of lap {lap} (status {status})")]
  LapInfoError { lap: usize, status: i32 },

  #[error("session is closed")]
  SessionClosed,

  #[error("invalid path ({}): {reason}", .path.display())]
  InvalidPath { path: PathBuf, reason: String },

  #[error("library error: {0}")]
  Library(String),

  #[error(transparent)]
  Io(#[from] io::Error),
}


/// This macro - internal use only - generates the implementation of the
/// `From` trait for `Error` for conversion failures which all boil down to
/// the library handing us something we can't make sense of.
macro_rules! implement_from {
  ($($ErrType:ty),*) => {$(
    impl From<$ErrType> for Error {
      fn from(error: $ErrType) -> Self {
        Self::Library(error.to_string())
      }
    }
  )*}
}

implement_from!(chrono::ParseError, str::Utf8Error, ffi::NulError);


#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use std::ffi::CString;


  #[test]
  fn display_test() {
    let err = Error::ChannelNameCollision { name:   "Speed".to_string(),
                                            first:  "standard",
                                            second: "GPS", };
    assert_eq!("channel name collision: 'Speed' exists as standard and GPS \
                channel",
               err.to_string());

    let err = Error::SampleCountError { channel: "fEngRpm".to_string(),
                                        count:   0, };
    assert_eq!("channel 'fEngRpm' reported sample count 0", err.to_string());

    assert_eq!("no channel 'warblgarbl' found",
               Error::ChannelMissing("warblgarbl".to_string()).to_string());
  }

  #[test]
  fn from_test() {
    let err: Error = CString::new("warbl\0garbl").unwrap_err().into();
    assert!(matches!(err, Error::Library(_)));

    let err: Error = io::Error::new(io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(err, Error::Io(_)));
  }
}
