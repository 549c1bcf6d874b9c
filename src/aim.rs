// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Florian Eich <florian@bmc-labs.com>
//   Jonas Reitemeyer <alumni@bmc-labs.com>

use super::{bindings::{self as aim,
                       CountFn,
                       LapSamplesCountFn,
                       LapSamplesFn,
                       SamplesCountFn,
                       SamplesFn,
                       StrFn},
            util,
            ChannelKind,
            Error,
            Result,
            Session,
            SessionSource};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use getset::{CopyGetters, Getters};
use lazy_static::lazy_static;
use std::{cmp::Ordering,
          collections::HashSet,
          ffi::CStr,
          os::raw::{c_char, c_int},
          path::{Path, PathBuf},
          sync::{Mutex, MutexGuard, PoisonError}};
use tracing::{debug, warn};


lazy_static! {
  /// The AiM library isn't threadsafe, neither in calling it concurrently nor
  /// in calling `open_file()` on a file again before it has been closed. Every
  /// library call therefore holds this lock, which also keeps track of the
  /// files currently open.
  static ref LIBCALL_MTX: Mutex<HashSet<PathBuf>> = Mutex::new(HashSet::new());
}

fn libcall() -> MutexGuard<'static, HashSet<PathBuf>> {
  LIBCALL_MTX.lock().unwrap_or_else(PoisonError::into_inner)
}


/// The library functions of one channel family.
struct Accessors {
  count:             CountFn,
  name:              StrFn,
  units:             StrFn,
  samples_count:     SamplesCountFn,
  lap_samples_count: LapSamplesCountFn,
  samples:           SamplesFn,
  lap_samples:       LapSamplesFn,
}

static STANDARD: Accessors =
  Accessors { count:             aim::get_channels_count,
              name:              aim::get_channel_name,
              units:             aim::get_channel_units,
              samples_count:     aim::get_channel_samples_count,
              lap_samples_count: aim::get_lap_channel_samples_count,
              samples:           aim::get_channel_samples,
              lap_samples:       aim::get_lap_channel_samples, };

static GPS: Accessors =
  Accessors { count:             aim::get_GPS_channels_count,
              name:              aim::get_GPS_channel_name,
              units:             aim::get_GPS_channel_units,
              samples_count:     aim::get_GPS_channel_samples_count,
              lap_samples_count: aim::get_lap_GPS_channel_samples_count,
              samples:           aim::get_GPS_channel_samples,
              lap_samples:       aim::get_lap_GPS_channel_samples, };

static GPS_RAW: Accessors =
  Accessors { count:             aim::get_GPS_raw_channels_count,
              name:              aim::get_GPS_raw_channel_name,
              units:             aim::get_GPS_raw_channel_units,
              samples_count:     aim::get_GPS_raw_channel_samples_count,
              lap_samples_count: aim::get_lap_GPS_raw_channel_samples_count,
              samples:           aim::get_GPS_raw_channel_samples,
              lap_samples:       aim::get_lap_GPS_raw_channel_samples, };

fn accessors(kind: ChannelKind) -> &'static Accessors {
  match kind {
    ChannelKind::Standard => &STANDARD,
    ChannelKind::Gps => &GPS,
    ChannelKind::GpsRaw => &GPS_RAW,
  }
}


/// A drk/xrk file opened through the AiM library.
#[derive(Debug, CopyGetters, Getters)]
pub struct AimFile {
  #[getset(get = "pub")]
  path:   PathBuf,
  #[getset(get_copy = "pub")]
  idx:    i32,
  closed: bool,
}

/// A `Session` on top of the AiM library.
pub type XrkSession = Session<AimFile>;

impl Session<AimFile> {
  /// Opens the drk/xrk file at `path`.
  pub fn open(path: &Path) -> Result<Self> {
    Ok(Self::from_source(AimFile::open(path)?))
  }
}

impl AimFile {
  // META FUNCTIONS -------------------------------------------------------- //
  /// Library compilation date.
  pub fn library_date() -> Result<NaiveDate> {
    let _guard = libcall();
    util::parse_library_date(unsafe { CStr::from_ptr(aim::get_library_date()) }
                               .to_str()?)
  }

  /// Library compilation time.
  pub fn library_time() -> Result<NaiveTime> {
    let _guard = libcall();
    util::parse_library_time(unsafe { CStr::from_ptr(aim::get_library_time()) }
                               .to_str()?)
  }

  /// Library compilation date and time.
  pub fn library_datetime() -> Result<NaiveDateTime> {
    Ok(Self::library_date()?.and_time(Self::library_time()?))
  }

  // FILE OPENING / CLOSING FUNCTIONS -------------------------------------- //
  /// Opens a drk/xrk file. Fails if the path is not an existing file with
  /// extension `xrk` or `drk`, if the file is already open or if the library
  /// can't open it.
  pub fn open(path: &Path) -> Result<Self> {
    let invalid = |reason: &str| Error::InvalidPath { path:   path.to_owned(),
                                                      reason: reason.to_string(), };

    let extension = path.extension()
                        .unwrap_or_default()
                        .to_str()
                        .ok_or_else(|| invalid("extension is not valid unicode"))?;
    if !(path.exists() && path.is_file()) {
      return Err(invalid("does not exist or is not a file"));
    }
    if !["drk", "xrk"].contains(&extension) {
      return Err(invalid("only files with extensions .xrk and .drk accepted"));
    }

    let path = path.canonicalize()?;
    let mut open_paths = libcall();
    if open_paths.contains(&path) {
      return Err(Error::OpenFailure { path,
                                      reason: "file is already open"
                                                .to_string(), });
    }

    let idx = unsafe { aim::open_file(util::path_to_cstring(&path)?.as_ptr()) };
    match idx.cmp(&0) {
      Ordering::Greater => {}
      Ordering::Equal => {
        return Err(Error::OpenFailure { path,
                                        reason: "file is open but can't be \
                                                 parsed"
                                                       .to_string(), })
      }
      Ordering::Less => {
        return Err(Error::OpenFailure { path,
                                        reason: format!("library returned \
                                                         {}",
                                                        idx), })
      }
    }

    debug!(path = %path.display(), idx, "opened file");
    open_paths.insert(path.clone());
    Ok(Self { path,
              idx,
              closed: false })
  }

  fn string(&self,
            f: unsafe extern "C" fn(c_int) -> *const c_char)
            -> Result<String> {
    let _guard = libcall();
    util::strptr_to_string(unsafe { f(self.idx) })
  }
}

impl SessionSource for AimFile {
  fn vehicle_name(&self) -> Result<String> {
    self.string(aim::get_vehicle_name)
  }

  fn track_name(&self) -> Result<String> {
    self.string(aim::get_track_name)
  }

  fn racer_name(&self) -> Result<String> {
    self.string(aim::get_racer_name)
  }

  fn championship_name(&self) -> Result<String> {
    self.string(aim::get_championship_name)
  }

  fn venue_type_name(&self) -> Result<String> {
    self.string(aim::get_venue_type_name)
  }

  fn date_time(&self) -> Result<NaiveDateTime> {
    let _guard = libcall();
    let tm = unsafe { aim::get_date_and_time(self.idx) };
    if tm.is_null() {
      return Err(Error::Library("could not fetch datetime object".to_string()));
    }
    util::tm_to_datetime(unsafe { &*tm })
  }

  fn laps_count(&self) -> i32 {
    let _guard = libcall();
    unsafe { aim::get_laps_count(self.idx) }
  }

  fn lap_info(&self, lap: usize) -> Result<(f64, f64)> {
    let _guard = libcall();
    let (mut start, mut duration) = (0.0f64, 0.0f64);
    let status = unsafe {
      aim::get_lap_info(self.idx, lap as c_int, &mut start, &mut duration)
    };
    if status != 1 {
      return Err(Error::LapInfoError { lap, status });
    }
    Ok((start, duration))
  }

  fn channels_count(&self, kind: ChannelKind) -> i32 {
    let _guard = libcall();
    unsafe { (accessors(kind).count)(self.idx) }
  }

  fn channel_name(&self, kind: ChannelKind, idx: usize) -> Result<String> {
    let _guard = libcall();
    util::strptr_to_string(unsafe {
      (accessors(kind).name)(self.idx, idx as c_int)
    })
  }

  fn channel_units(&self, kind: ChannelKind, idx: usize) -> Result<String> {
    let _guard = libcall();
    util::strptr_to_string(unsafe {
      (accessors(kind).units)(self.idx, idx as c_int)
    })
  }

  fn samples_count(&self,
                   kind: ChannelKind,
                   idx: usize,
                   lap: Option<usize>)
                   -> i32 {
    let _guard = libcall();
    let accessors = accessors(kind);
    unsafe {
      match lap {
        Some(lap) => {
          (accessors.lap_samples_count)(self.idx, lap as c_int, idx as c_int)
        }
        None => (accessors.samples_count)(self.idx, idx as c_int),
      }
    }
  }

  fn samples(&self,
             kind: ChannelKind,
             idx: usize,
             lap: Option<usize>,
             timestamps: &mut [f64],
             values: &mut [f64])
             -> i32 {
    // the library writes `count` values into both buffers
    if timestamps.len() != values.len() {
      return -1;
    }
    let count = timestamps.len() as c_int;

    let _guard = libcall();
    let accessors = accessors(kind);
    unsafe {
      match lap {
        Some(lap) => (accessors.lap_samples)(self.idx,
                                             lap as c_int,
                                             idx as c_int,
                                             timestamps.as_mut_ptr(),
                                             values.as_mut_ptr(),
                                             count),
        None => (accessors.samples)(self.idx,
                                    idx as c_int,
                                    timestamps.as_mut_ptr(),
                                    values.as_mut_ptr(),
                                    count),
      }
    }
  }

  fn close(&mut self) -> Result<()> {
    if self.closed {
      return Err(Error::SessionClosed);
    }

    let mut open_paths = libcall();
    let ret = unsafe { aim::close_file_i(self.idx) };
    self.closed = true;
    open_paths.remove(&self.path);

    if ret != self.idx {
      return Err(Error::Library(format!("file '{}' could not be closed \
                                         (status {})",
                                        self.path.display(),
                                        ret)));
    }
    debug!(path = %self.path.display(), "closed file");
    Ok(())
  }
}

// DESTRUCTOR - CLOSES FILE ------------------------------------------------ //
impl Drop for AimFile {
  fn drop(&mut self) {
    if self.closed {
      return;
    }
    if let Err(err) = self.close() {
      warn!(%err, "failed to close file on drop");
    }
  }
}
