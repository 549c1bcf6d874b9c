// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Florian Eich <florian@bmc-labs.com>
//   Jonas Reitemeyer <alumni@bmc-labs.com>

//! In-memory `SessionSource` standing in for the AiM library in tests.

#![cfg(test)]

use super::{ChannelKind, Error, Result, SessionSource};
use chrono::{NaiveDate, NaiveDateTime};
use std::{cell::Cell, collections::HashMap, rc::Rc};


/// One channel of a `MockSource`. Whole session timestamps are given in
/// milliseconds and lap timestamps in seconds, like the library does it.
#[derive(Clone, Debug, Default)]
pub struct MockChannel {
  name:         String,
  units:        String,
  samples:      (Vec<f64>, Vec<f64>),
  lap_samples:  HashMap<usize, (Vec<f64>, Vec<f64>)>,
  count:        Option<i32>,
  fetch_status: Option<i32>,
}

impl MockChannel {
  pub fn new(name: &str, units: &str) -> Self {
    Self { name: name.to_string(),
           units: units.to_string(),
           ..Default::default() }
  }

  pub fn with_samples(mut self, timestamps: &[f64], values: &[f64]) -> Self {
    self.samples = (timestamps.to_vec(), values.to_vec());
    self
  }

  pub fn with_lap_samples(mut self,
                          lap: usize,
                          timestamps: &[f64],
                          values: &[f64])
                          -> Self {
    self.lap_samples
        .insert(lap, (timestamps.to_vec(), values.to_vec()));
    self
  }

  /// Reports `count` as sample count, whatever the data says.
  pub fn with_count(mut self, count: i32) -> Self {
    self.count = Some(count);
    self
  }

  /// Reports `status` from the sample fetch, whatever the data says.
  pub fn with_fetch_status(mut self, status: i32) -> Self {
    self.fetch_status = Some(status);
    self
  }

  fn series(&self, lap: Option<usize>) -> Option<&(Vec<f64>, Vec<f64>)> {
    match lap {
      Some(lap) => self.lap_samples.get(&lap),
      None => Some(&self.samples),
    }
  }
}


#[derive(Debug)]
pub struct MockSource {
  vehicle:    String,
  track:      String,
  laps:       Vec<(f64, f64)>,
  laps_count: Option<i32>,
  lap_status: HashMap<usize, i32>,
  channels:   HashMap<ChannelKind, Vec<MockChannel>>,
  closed:     Rc<Cell<usize>>,
}

impl MockSource {
  pub fn new() -> Self {
    Self { vehicle:    "AU-RS3-R5-S-S".to_string(),
           track:      "ARA_1-0-0".to_string(),
           laps:       Vec::new(),
           laps_count: None,
           lap_status: HashMap::new(),
           channels:   HashMap::new(),
           closed:     Rc::new(Cell::new(0)), }
  }

  pub fn with_lap(mut self, start: f64, duration: f64) -> Self {
    self.laps.push((start, duration));
    self
  }

  /// Reports `count` as lap count, whatever laps were added.
  pub fn with_laps_count(mut self, count: i32) -> Self {
    self.laps_count = Some(count);
    self
  }

  /// Makes fetching the info of lap `lap` fail with library status `status`.
  pub fn with_lap_status(mut self, lap: usize, status: i32) -> Self {
    self.lap_status.insert(lap, status);
    self
  }

  pub fn with_channel(mut self, kind: ChannelKind, channel: MockChannel) -> Self {
    self.channels.entry(kind).or_default().push(channel);
    self
  }

  /// Counts how often `close` was called, shared so it can be inspected after
  /// the source has been moved into (and dropped by) a `Session`.
  pub fn close_counter(&self) -> Rc<Cell<usize>> {
    Rc::clone(&self.closed)
  }

  fn channel(&self, kind: ChannelKind, idx: usize) -> Option<&MockChannel> {
    self.channels.get(&kind).and_then(|channels| channels.get(idx))
  }
}

impl SessionSource for MockSource {
  fn vehicle_name(&self) -> Result<String> {
    Ok(self.vehicle.clone())
  }

  fn track_name(&self) -> Result<String> {
    Ok(self.track.clone())
  }

  fn racer_name(&self) -> Result<String> {
    Ok("017".to_string())
  }

  fn championship_name(&self) -> Result<String> {
    Ok("WT-20".to_string())
  }

  fn venue_type_name(&self) -> Result<String> {
    Ok("Q3".to_string())
  }

  fn date_time(&self) -> Result<NaiveDateTime> {
    NaiveDate::from_ymd_opt(2020, 11, 14)
      .and_then(|date| date.and_hms_opt(16, 49, 39))
      .ok_or_else(|| Error::Library("invalid date".to_string()))
  }

  fn laps_count(&self) -> i32 {
    self.laps_count.unwrap_or(self.laps.len() as i32)
  }

  fn lap_info(&self, lap: usize) -> Result<(f64, f64)> {
    if let Some(&status) = self.lap_status.get(&lap) {
      return Err(Error::LapInfoError { lap, status });
    }
    self.laps
        .get(lap)
        .copied()
        .ok_or(Error::LapInfoError { lap, status: -1 })
  }

  fn channels_count(&self, kind: ChannelKind) -> i32 {
    self.channels.get(&kind).map_or(0, |channels| channels.len() as i32)
  }

  fn channel_name(&self, kind: ChannelKind, idx: usize) -> Result<String> {
    self.channel(kind, idx)
        .map(|channel| channel.name.clone())
        .ok_or_else(|| Error::Library("fetched null pointer".into()))
  }

  fn channel_units(&self, kind: ChannelKind, idx: usize) -> Result<String> {
    self.channel(kind, idx)
        .map(|channel| channel.units.clone())
        .ok_or_else(|| Error::Library("fetched null pointer".into()))
  }

  fn samples_count(&self,
                   kind: ChannelKind,
                   idx: usize,
                   lap: Option<usize>)
                   -> i32 {
    match self.channel(kind, idx) {
      Some(channel) => {
        channel.count.unwrap_or_else(|| {
                       channel.series(lap)
                              .map_or(0, |(timestamps, _)| {
                                timestamps.len() as i32
                              })
                     })
      }
      None => -1,
    }
  }

  fn samples(&self,
             kind: ChannelKind,
             idx: usize,
             lap: Option<usize>,
             timestamps: &mut [f64],
             values: &mut [f64])
             -> i32 {
    let channel = match self.channel(kind, idx) {
      Some(channel) => channel,
      None => return -1,
    };
    let (src_timestamps, src_values) = match channel.series(lap) {
      Some(series) => series,
      None => return 0,
    };
    if src_timestamps.len() != timestamps.len() {
      return 0;
    }

    timestamps.copy_from_slice(src_timestamps);
    values.copy_from_slice(src_values);
    channel.fetch_status
           .unwrap_or(timestamps.len() as i32)
  }

  fn close(&mut self) -> Result<()> {
    self.closed.set(self.closed.get() + 1);
    Ok(())
  }
}
