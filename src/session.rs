// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Florian Eich <florian@bmc-labs.com>
//   Jonas Reitemeyer <alumni@bmc-labs.com>

use super::{Channel,
            ChannelData,
            ChannelKind,
            Error,
            LapInfo,
            Result,
            SampleRequest,
            SessionOptions,
            SessionSource,
            TimeDistance};
use chrono::NaiveDateTime;
use getset::{CopyGetters, Getters};
use serde::Serialize;
use std::{collections::HashMap, fmt};
use tracing::{debug, warn};


/// Descriptive information about a session.
#[derive(Clone, Debug, PartialEq, CopyGetters, Getters, Serialize)]
pub struct SessionInfo {
  #[getset(get = "pub")]
  vehicle:      String,
  #[getset(get = "pub")]
  track:        String,
  #[getset(get = "pub")]
  racer:        String,
  #[getset(get = "pub")]
  championship: String,
  #[getset(get = "pub")]
  venue_type:   String,
  #[getset(get_copy = "pub")]
  datetime:     NaiveDateTime,
}

impl fmt::Display for SessionInfo {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f,
           "{} {} {} {} {} ({})",
           self.championship,
           self.track,
           self.venue_type,
           self.vehicle,
           self.racer,
           self.datetime.format("%Y-%m-%d %H:%M:%S"))
  }
}


/// One opened file and everything derived from it.
///
/// Derived data (info, laps, channels, the time-distance table) is fetched
/// on first access and kept until the session is closed, which is why most
/// accessors take `&mut self`. Once closed, every accessor fails with
/// `Error::SessionClosed`.
pub struct Session<S: SessionSource> {
  source:        Option<S>,
  options:       SessionOptions,
  info:          Option<SessionInfo>,
  laps:          Option<Vec<LapInfo>>,
  channels:      Option<Vec<Channel>>,
  time_distance: Option<TimeDistance>,
}

impl<S: SessionSource> Session<S> {
  pub fn from_source(source: S) -> Self {
    Self::with_options(source, SessionOptions::default())
  }

  pub fn with_options(source: S, options: SessionOptions) -> Self {
    Self { source: Some(source),
           options,
           info: None,
           laps: None,
           channels: None,
           time_distance: None }
  }

  pub fn options(&self) -> &SessionOptions {
    &self.options
  }

  pub fn is_open(&self) -> bool {
    self.source.is_some()
  }

  /// Releases the file. Closing twice is an error, as is any use afterwards.
  pub fn close(&mut self) -> Result<()> {
    let mut source = self.source.take().ok_or(Error::SessionClosed)?;
    self.info = None;
    self.laps = None;
    self.channels = None;
    self.time_distance = None;

    debug!("closing session");
    source.close()
  }

  fn source(&self) -> Result<&S> {
    self.source.as_ref().ok_or(Error::SessionClosed)
  }

  // RUN LEVEL FUNCTIONS --------------------------------------------------- //
  pub fn info(&mut self) -> Result<&SessionInfo> {
    let info = match self.info.take() {
      Some(info) => info,
      None => {
        let source = self.source()?;
        SessionInfo { vehicle:      source.vehicle_name()?,
                      track:        source.track_name()?,
                      racer:        source.racer_name()?,
                      championship: source.championship_name()?,
                      venue_type:   source.venue_type_name()?,
                      datetime:     source.date_time()?, }
      }
    };
    Ok(&*self.info.insert(info))
  }

  /// Start and duration of every lap, in seconds.
  pub fn laps(&mut self) -> Result<&[LapInfo]> {
    let laps = match self.laps.take() {
      Some(laps) => laps,
      None => {
        let source = self.source()?;
        let count = source.laps_count();
        if count < 0 {
          return Err(Error::Library(format!("error getting lap count \
                                             (status {})",
                                            count)));
        }

        let mut laps = Vec::with_capacity(count as usize);
        for lap in 0..count as usize {
          let (start, duration) = source.lap_info(lap)?;
          laps.push(LapInfo::new(lap, start, duration));
        }
        laps
      }
    };
    Ok(self.laps.insert(laps).as_slice())
  }

  pub fn lap_count(&mut self) -> Result<usize> {
    Ok(self.laps()?.len())
  }

  /// For lap with index `lap`, request `LapInfo`. Fails if the session does
  /// not contain a lap with that index.
  pub fn lap_info(&mut self, lap: usize) -> Result<LapInfo> {
    let laps = self.laps()?;
    laps.get(lap)
        .copied()
        .ok_or(Error::LapOutOfRange { lap,
                                      count: laps.len() })
  }

  // CHANNEL FUNCTIONS ----------------------------------------------------- //
  /// All channels of the session: standard channels first, then GPS, then
  /// GPS raw channels, each in library order.
  ///
  /// Channel names must be unique across all kinds, a name showing up twice
  /// makes this fail with `Error::ChannelNameCollision`.
  pub fn channels(&mut self) -> Result<&[Channel]> {
    let channels = match self.channels.take() {
      Some(channels) => channels,
      None => enumerate_channels(self.source()?)?,
    };
    Ok(self.channels.insert(channels).as_slice())
  }

  pub fn channel_names(&mut self) -> Result<Vec<String>> {
    Ok(self.channels()?
           .iter()
           .map(|channel| channel.name().clone())
           .collect())
  }

  /// Request a channel by name.
  pub fn channel(&mut self, name: &str) -> Result<Channel> {
    self.channels()?
        .iter()
        .find(|channel| channel.name() == name)
        .cloned()
        .ok_or_else(|| Error::ChannelMissing(name.to_string()))
  }

  pub fn channel_units(&mut self, name: &str) -> Result<String> {
    let channel = self.channel(name)?;
    channel.units(self.source()?)
  }

  /// Number of samples of channel `name` in the whole session (`lap` is
  /// `None`) or in one lap.
  pub fn sample_count(&mut self,
                      name: &str,
                      lap: Option<usize>)
                      -> Result<usize> {
    let channel = self.channel(name)?;
    if let Some(lap) = lap {
      self.lap_info(lap)?;
    }
    channel.sample_count(self.source()?, lap)
  }

  /// Samples of channel `name`, with x values in the coordinates asked for by
  /// `request`.
  ///
  /// Distances come from the time-distance table. For lap relative requests
  /// the start of the lap is subtracted: its time when x is time, its
  /// distance when x is distance.
  pub fn samples(&mut self,
                 name: &str,
                 request: SampleRequest)
                 -> Result<ChannelData> {
    let channel = self.channel(name)?;
    let lap = match request.lap() {
      Some(lap) => Some(self.lap_info(lap)?),
      None => None,
    };
    let relative_to = lap.filter(|_| request.is_lap_relative());

    let decimals = self.options.timestamp_decimals();
    let data = channel.samples(self.source()?, request.lap(), decimals)?;

    if request.x_is_time() {
      return Ok(match relative_to {
        Some(lap) => data.shift(lap.start()),
        None => data,
      });
    }

    let table = self.time_distance()?;
    let data = data.into_distance(table);
    Ok(match relative_to {
      Some(lap) => data.shift(table.time_to_distance(lap.start())),
      None => data,
    })
  }

  // DISTANCE FUNCTIONS ---------------------------------------------------- //
  /// The time-distance table of this session, integrated from the speed
  /// channel (see `SessionOptions`). Fails with `Error::ChannelMissing` if
  /// the session has no such channel.
  pub fn time_distance(&mut self) -> Result<&TimeDistance> {
    let table = match self.time_distance.take() {
      Some(table) => table,
      None => {
        let speed_channel = self.options.speed_channel().clone();
        let channel = self.channel(&speed_channel)?;

        // absolute time, straight from the channel. going through `samples`
        // here would need the very table being built.
        let decimals = self.options.timestamp_decimals();
        let speed = channel.samples(self.source()?, None, decimals)?;

        debug!(channel = %speed_channel, "building time-distance table");
        TimeDistance::from_speed(speed.timestamps(), speed.samples())?
      }
    };
    Ok(&*self.time_distance.insert(table))
  }

  /// Distance traveled at `time` seconds after session start.
  pub fn time_to_distance(&mut self, time: f64) -> Result<f64> {
    Ok(self.time_distance()?.time_to_distance(time))
  }

  /// Distance traveled in lap `lap`.
  pub fn lap_distance(&mut self, lap: usize) -> Result<f64> {
    let lap = self.lap_info(lap)?;
    Ok(self.time_distance()?.distance_between(lap.start(), lap.end()))
  }
}

impl<S: SessionSource> Drop for Session<S> {
  fn drop(&mut self) {
    if let Some(mut source) = self.source.take() {
      if let Err(err) = source.close() {
        warn!(%err, "failed to close session on drop");
      }
    }
  }
}


fn enumerate_channels<S>(source: &S) -> Result<Vec<Channel>>
  where S: SessionSource + ?Sized
{
  let mut channels = Vec::new();
  let mut seen: HashMap<String, ChannelKind> = HashMap::new();

  for &kind in ChannelKind::ALL.iter() {
    let count = source.channels_count(kind);
    if count < 0 {
      return Err(Error::Library(format!("error getting {} channel count \
                                         (status {})",
                                        kind, count)));
    }

    for idx in 0..count as usize {
      let name = source.channel_name(kind, idx)?;
      if let Some(first) = seen.insert(name.clone(), kind) {
        return Err(Error::ChannelNameCollision { name,
                                                 first: first.as_str(),
                                                 second: kind.as_str() });
      }
      channels.push(Channel::new(name, kind, idx));
    }
  }

  debug!(channels = channels.len(), "enumerated channels");
  Ok(channels)
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{MockChannel, MockSource};
  use pretty_assertions::assert_eq;


  /// Two laps over a 4 second session, GPS speed at 1 Hz and an engine speed
  /// channel at 2 Hz.
  fn source() -> MockSource {
    MockSource::new()
      .with_lap(0.0, 2.0)
      .with_lap(2.0, 2.0)
      .with_channel(ChannelKind::Standard,
                    MockChannel::new("fEngRpm", "rpm")
                      .with_samples(&[0.0, 500.0, 1000.0, 1500.0, 2000.0,
                                      2500.0, 3000.0, 3500.0, 4000.0],
                                    &[800.0, 900.0, 1000.0, 1100.0, 1200.0,
                                      1300.0, 1400.0, 1500.0, 1600.0])
                      .with_lap_samples(1,
                                        &[2.00001, 2.5, 3.0, 3.5, 4.0],
                                        &[1200.0, 1300.0, 1400.0, 1500.0,
                                          1600.0]))
      .with_channel(ChannelKind::Gps,
                    MockChannel::new("GPS Speed", "m/s")
                      .with_samples(&[0.0, 1000.0, 2000.0, 3000.0, 4000.0],
                                    &[0.0, 10.0, 20.0, 30.0, 40.0])
                      .with_lap_samples(1,
                                        &[2.0, 3.0, 4.0],
                                        &[20.0, 30.0, 40.0]))
      .with_channel(ChannelKind::GpsRaw,
                    MockChannel::new("ECEF position_X", "m")
                      .with_samples(&[0.0, 2000.0, 4000.0],
                                    &[4.1e6, 4.1e6, 4.1e6]))
  }

  #[test]
  fn info_test() {
    let mut session = Session::from_source(source());
    let info = session.info().unwrap();

    assert_eq!("AU-RS3-R5-S-S", info.vehicle());
    assert_eq!("ARA_1-0-0", info.track());
    assert_eq!("017", info.racer());
    assert_eq!("WT-20", info.championship());
    assert_eq!("Q3", info.venue_type());
    assert_eq!("2020-11-14 16:49:39", info.datetime().to_string());
    assert_eq!("WT-20 ARA_1-0-0 Q3 AU-RS3-R5-S-S 017 (2020-11-14 16:49:39)",
               info.to_string());
  }

  #[test]
  fn laps_test() {
    let mut session = Session::from_source(source());
    assert_eq!(2, session.lap_count().unwrap());
    assert_eq!(&[LapInfo::new(0, 0.0, 2.0), LapInfo::new(1, 2.0, 2.0)],
               session.laps().unwrap());
    assert_eq!(LapInfo::new(1, 2.0, 2.0), session.lap_info(1).unwrap());
    assert!(matches!(session.lap_info(2),
                     Err(Error::LapOutOfRange { lap: 2, count: 2 })));

    let mut session = Session::from_source(MockSource::new());
    assert_eq!(0, session.lap_count().unwrap());
  }

  #[test]
  fn laps_error_test() {
    let mut session =
      Session::from_source(MockSource::new().with_lap(0.0, 2.0)
                                            .with_laps_count(-1));
    assert!(matches!(session.laps(), Err(Error::Library(_))));
    assert!(matches!(session.lap_count(), Err(Error::Library(_))));

    let mut session =
      Session::from_source(MockSource::new().with_lap(0.0, 2.0)
                                            .with_lap(2.0, 2.0)
                                            .with_lap_status(1, 0));
    assert!(matches!(session.laps(),
                     Err(Error::LapInfoError { lap: 1, status: 0 })));
    assert!(matches!(session.lap_info(0),
                     Err(Error::LapInfoError { lap: 1, status: 0 })));
  }

  #[test]
  fn channels_test() {
    let mut session = Session::from_source(source());
    assert_eq!(vec!["fEngRpm".to_string(),
                    "GPS Speed".to_string(),
                    "ECEF position_X".to_string()],
               session.channel_names().unwrap());

    let channel = session.channel("ECEF position_X").unwrap();
    assert_eq!(ChannelKind::GpsRaw, channel.kind());
    assert_eq!(0, channel.idx());

    assert_eq!("m/s", &session.channel_units("GPS Speed").unwrap());
    assert_eq!(9, session.sample_count("fEngRpm", None).unwrap());
    assert_eq!(5, session.sample_count("fEngRpm", Some(1)).unwrap());
    assert!(matches!(session.sample_count("fEngRpm", Some(0)),
                     Err(Error::SampleCountError { count: 0, .. })));
    assert!(matches!(session.sample_count("fEngRpm", Some(7)),
                     Err(Error::LapOutOfRange { .. })));

    match session.channel("warblgarbl") {
      Err(Error::ChannelMissing(name)) => assert_eq!("warblgarbl", name),
      other => panic!("unexpected result {:?}", other),
    }
  }

  #[test]
  fn channel_name_collision_test() {
    let source =
      MockSource::new().with_channel(ChannelKind::Standard,
                                     MockChannel::new("Speed", "km/h"))
                       .with_channel(ChannelKind::Gps,
                                     MockChannel::new("Speed", "m/s"));
    let mut session = Session::from_source(source);

    match session.channels() {
      Err(Error::ChannelNameCollision { name, first, second }) => {
        assert_eq!("Speed", name);
        assert_eq!("standard", first);
        assert_eq!("GPS", second);
      }
      other => panic!("unexpected result {:?}", other),
    }

    // same kind is just as bad
    let source =
      MockSource::new().with_channel(ChannelKind::GpsRaw,
                                     MockChannel::new("Week N", "#"))
                       .with_channel(ChannelKind::GpsRaw,
                                     MockChannel::new("Week N", "#"));
    let mut session = Session::from_source(source);
    assert!(matches!(session.channel("Week N"),
                     Err(Error::ChannelNameCollision { .. })));
  }

  #[test]
  fn time_distance_test() {
    let mut session = Session::from_source(source());
    let table = session.time_distance().unwrap();

    assert_eq!(&vec![0.0, 1.0, 2.0, 3.0, 4.0], table.times());
    assert_eq!(&vec![0.0, 10.0, 30.0, 60.0, 100.0], table.distances());

    assert_eq!(30.0, session.time_to_distance(2.0).unwrap());
    assert_eq!(100.0, session.time_to_distance(99.0).unwrap());
    assert_eq!(30.0, session.lap_distance(0).unwrap());
    assert_eq!(70.0, session.lap_distance(1).unwrap());
  }

  #[test]
  fn time_distance_missing_speed_test() {
    let source = MockSource::new().with_channel(
      ChannelKind::Standard,
      MockChannel::new("fEngRpm", "rpm").with_samples(&[0.0], &[800.0]),
    );
    let mut session = Session::from_source(source);

    match session.time_distance() {
      Err(Error::ChannelMissing(name)) => assert_eq!("GPS Speed", name),
      other => panic!("unexpected result {:?}", other),
    }
    assert!(matches!(session.samples("fEngRpm",
                                     SampleRequest::session().over_distance()),
                     Err(Error::ChannelMissing(_))));
  }

  #[test]
  fn time_distance_options_test() {
    let source = MockSource::new().with_channel(
      ChannelKind::Gps,
      MockChannel::new("GPS_Speed", "m/s").with_samples(&[0.0, 1000.0],
                                                        &[0.0, 5.0]),
    );
    let options = SessionOptions::new("GPS_Speed", 4);
    let mut session = Session::with_options(source, options);

    assert_eq!("GPS_Speed", session.options().speed_channel());
    assert_eq!(5.0, session.time_distance().unwrap().total_distance());
  }

  #[test]
  fn samples_session_test() {
    let mut session = Session::from_source(source());

    let data = session.samples("fEngRpm", SampleRequest::session()).unwrap();
    assert_eq!(&vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0],
               data.timestamps());

    // no lap, relative makes no difference
    let relative = session.samples("fEngRpm",
                                   SampleRequest::session().relative())
                          .unwrap();
    assert_eq!(data, relative);

    // 0.5 s steps don't line up with the 1 Hz table, closest entry after
    let data = session.samples("fEngRpm",
                               SampleRequest::session().over_distance())
                      .unwrap();
    assert_eq!(&vec![0.0, 10.0, 10.0, 30.0, 30.0, 60.0, 60.0, 100.0, 100.0],
               data.timestamps());
    assert_eq!(9, data.samples().len());
  }

  #[test]
  fn samples_lap_test() {
    let mut session = Session::from_source(source());

    let absolute =
      session.samples("fEngRpm", SampleRequest::for_lap(1)).unwrap();
    assert_eq!(&vec![2.0, 2.5, 3.0, 3.5, 4.0], absolute.timestamps());

    let relative = session.samples("fEngRpm",
                                   SampleRequest::for_lap(1).relative())
                          .unwrap();
    assert_eq!(&vec![0.0, 0.5, 1.0, 1.5, 2.0], relative.timestamps());
    assert_eq!(absolute.samples(), relative.samples());
    assert_eq!(absolute.timestamps()[0] - 2.0, relative.timestamps()[0]);

    let absolute = session.samples("GPS Speed",
                                   SampleRequest::for_lap(1).over_distance())
                          .unwrap();
    assert_eq!(&vec![30.0, 60.0, 100.0], absolute.timestamps());

    let relative = session.samples("GPS Speed",
                                   SampleRequest::for_lap(1).over_distance()
                                                        .relative())
                          .unwrap();
    assert_eq!(&vec![0.0, 30.0, 70.0], relative.timestamps());
    assert_eq!(absolute.timestamps()[0] - session.time_to_distance(2.0)
                                                 .unwrap(),
               relative.timestamps()[0]);

    assert!(matches!(session.samples("fEngRpm", SampleRequest::for_lap(5)),
                     Err(Error::LapOutOfRange { lap: 5, count: 2 })));
  }

  #[test]
  fn distance_round_trip_test() {
    let mut session = Session::from_source(source());
    let data = session.samples("GPS Speed", SampleRequest::session()).unwrap();
    let table = session.time_distance().unwrap();

    // strictly positive speed after the first sample, so distances are
    // unique and map back onto their times
    for &time in data.timestamps().iter() {
      let back = table.distance_to_time(table.time_to_distance(time));
      assert!((back - time).abs() < 1e-4, "{} came back as {}", time, back);
    }
  }

  #[test]
  fn close_test() {
    let source = source();
    let closed = source.close_counter();
    let mut session = Session::from_source(source);
    session.time_distance().unwrap();

    assert_eq!(true, session.is_open());
    session.close().unwrap();
    assert_eq!(false, session.is_open());
    assert_eq!(1, closed.get());

    assert!(matches!(session.close(), Err(Error::SessionClosed)));
    assert!(matches!(session.info(), Err(Error::SessionClosed)));
    assert!(matches!(session.time_distance(), Err(Error::SessionClosed)));
    assert!(matches!(session.channels(), Err(Error::SessionClosed)));

    // already closed, dropping must not close again
    drop(session);
    assert_eq!(1, closed.get());
  }

  #[test]
  fn drop_test() {
    let source = source();
    let closed = source.close_counter();
    {
      let mut session = Session::from_source(source);
      session.channels().unwrap();
    }
    assert_eq!(1, closed.get());
  }
}
