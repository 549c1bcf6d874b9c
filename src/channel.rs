// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Florian Eich <florian@bmc-labs.com>
//   Jonas Reitemeyer <alumni@bmc-labs.com>

use super::{util, ChannelKind, Error, Result, SessionSource, TimeDistance};
use getset::{CopyGetters, Getters, MutGetters};
use serde::Serialize;
use std::{iter, vec};


const FREQUENCIES: [usize; 10] = [1, 2, 5, 10, 20, 50, 100, 200, 500, 1000];


/// A channel of a session, i.e. its name plus where to find it in the
/// library: the channel family and the index within that family.
#[derive(Clone, Debug, PartialEq, CopyGetters, Getters)]
pub struct Channel {
  #[getset(get = "pub")]
  name: String,
  #[getset(get_copy = "pub")]
  kind: ChannelKind,
  #[getset(get_copy = "pub")]
  idx:  usize,
}

impl Channel {
  pub fn new(name: String, kind: ChannelKind, idx: usize) -> Self {
    Self { name, kind, idx }
  }

  pub fn units<S>(&self, source: &S) -> Result<String>
    where S: SessionSource + ?Sized
  {
    source.channel_units(self.kind, self.idx)
  }

  /// Number of samples in the whole session (`lap` is `None`) or in one lap.
  /// The library reporting zero or less is an error.
  pub fn sample_count<S>(&self, source: &S, lap: Option<usize>) -> Result<usize>
    where S: SessionSource + ?Sized
  {
    let count = source.samples_count(self.kind, self.idx, lap);
    if count <= 0 {
      return Err(Error::SampleCountError { channel: self.name.clone(),
                                           count });
    }
    Ok(count as usize)
  }

  /// Fetches the samples of the whole session (`lap` is `None`) or of one lap,
  /// with timestamps in seconds since session start, rounded to `decimals`.
  ///
  /// The library hands out milliseconds for the whole session but seconds
  /// for laps, so only the former are scaled.
  pub fn samples<S>(&self,
                    source: &S,
                    lap: Option<usize>,
                    decimals: usize)
                    -> Result<ChannelData>
    where S: SessionSource + ?Sized
  {
    let count = self.sample_count(source, lap)?;
    let (mut timestamps, mut samples) = ChannelData::allocate(count);

    let status =
      source.samples(self.kind, self.idx, lap, &mut timestamps, &mut samples);
    if status != count as i32 {
      return Err(Error::SampleFetchError { channel:  self.name.clone(),
                                           status,
                                           expected: count, });
    }

    match lap {
      Some(_) => timestamps.iter_mut()
                           .for_each(|t| *t = util::round_to(*t, decimals)),
      None => {
        timestamps.iter_mut()
                  .for_each(|t| *t = util::round_to(*t / 1000.0, decimals))
      }
    }

    ChannelData::from_ts(timestamps, samples)
  }
}


/// Which samples to fetch and in which coordinates to express them.
///
/// `x_is_time` selects seconds (`true`) or meters (`false`) for the x axis.
/// `x_is_absolute` selects whether x counts from the session start (`true`)
/// or from the start of `lap` (`false`); without a lap there is nothing to be
/// relative to, so it is ignored.
#[derive(Clone, Copy, Debug, PartialEq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct SampleRequest {
  lap:           Option<usize>,
  x_is_time:     bool,
  x_is_absolute: bool,
}

impl SampleRequest {
  pub fn new(lap: Option<usize>, x_is_time: bool, x_is_absolute: bool) -> Self {
    Self { lap,
           x_is_time,
           x_is_absolute }
  }

  /// All samples of the session over absolute time.
  pub fn session() -> Self {
    Self::new(None, true, true)
  }

  /// Samples of lap `lap` over absolute time.
  pub fn for_lap(lap: usize) -> Self {
    Self::new(Some(lap), true, true)
  }

  /// Use distance instead of time for x.
  pub fn over_distance(self) -> Self {
    Self { x_is_time: false,
           ..self }
  }

  /// Count x from the start of the lap instead of the session start.
  pub fn relative(self) -> Self {
    Self { x_is_absolute: false,
           ..self }
  }

  /// Whether x values need to be shifted to the lap start.
  pub fn is_lap_relative(&self) -> bool {
    self.lap.is_some() && !self.x_is_absolute
  }
}

impl Default for SampleRequest {
  fn default() -> Self {
    Self::session()
  }
}


/// Holds data of a channel retrieved from a file: timestamps (or distances,
/// depending on the request) and the corresponding samples.
#[derive(Clone, Debug, Default, PartialEq, Getters, MutGetters, Serialize)]
#[getset(get = "pub", get_mut = "pub")]
pub struct ChannelData {
  timestamps: Vec<f64>,
  samples:    Vec<f64>,
}

impl ChannelData {
  /// Helper function which allocates zeroed buffers for `count` samples, to
  /// be filled by the library.
  pub fn allocate(count: usize) -> (Vec<f64>, Vec<f64>) {
    (vec![0.0; count], vec![0.0; count])
  }

  /// Creates a new `ChannelData` object from `timestamps` and `samples`,
  /// which must be of equal length.
  pub fn from_ts(timestamps: Vec<f64>, samples: Vec<f64>) -> Result<Self> {
    if timestamps.len() != samples.len() {
      return Err(Error::MalformedSeries(format!("{} timestamps but {} \
                                                 samples",
                                                timestamps.len(),
                                                samples.len())));
    }
    Ok(Self { timestamps,
              samples })
  }

  pub fn len(&self) -> usize {
    assert!(self.timestamps.len() == self.samples.len(),
            "number of timestamps not equivalent to number of samples");
    self.timestamps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0usize
  }

  /// Replaces every timestamp by its distance according to `table`.
  pub fn into_distance(mut self, table: &TimeDistance) -> Self {
    self.timestamps = table.times_to_distances(&self.timestamps);
    self
  }

  /// Subtracts `offset` from every x value.
  pub fn shift(mut self, offset: f64) -> Self {
    self.timestamps.iter_mut().for_each(|x| *x -= offset);
    self
  }

  /// Calculates and returns the recording frequency in Hz, snapped to the
  /// frequencies the loggers support. Only meaningful for time coordinates.
  pub fn frequency(&self) -> f64 {
    if self.len() < 3 || self.timestamps.iter().sum::<f64>() < 0.1 {
      return 0.0;
    }

    // two time steps, in seconds
    let (first, third) = (self.timestamps[0], self.timestamps[2]);
    if third <= first {
      return 0.0;
    }
    let raw_frequency = (2.0 / (third - first)).round() as i64;

    FREQUENCIES.iter()
               .min_by_key(|&&frequency| (raw_frequency - frequency as i64).abs())
               .map_or(0.0, |&frequency| frequency as f64)
  }
}

impl IntoIterator for ChannelData {
  type IntoIter = iter::Zip<vec::IntoIter<f64>, vec::IntoIter<f64>>;
  type Item = (f64, f64);

  fn into_iter(self) -> Self::IntoIter {
    self.timestamps.into_iter().zip(self.samples.into_iter())
  }
}
