// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Florian Eich <florian@bmc-labs.com>
//   Jonas Reitemeyer <alumni@bmc-labs.com>

//! Raw declarations of the AiM library interface.
//!
//! Conventions shared by all functions below:
//! - `idxf` is the (positive) file index returned by `open_file`
//! - `idxl` is a 0-based lap index, `idxc` a 0-based channel index within
//!   the channel family the function belongs to
//! - functions returning strings return `NULL` on error
//! - functions returning `c_int` return a negative value on error
//!
//! The channel families (standard, GPS, GPS raw) each come with an identical
//! set of seven functions. The signatures of those are captured in the type
//! aliases below so that a family can be bound as a whole, see
//! `aim::Accessors`.

use std::os::raw::{c_char, c_int};


/// Binding to C tm struct storing datetime info (defined in `time.h`)
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq)]
#[doc(hidden)]
pub struct tm {
  pub tm_sec:   c_int, // seconds, range 0 to 59
  pub tm_min:   c_int, // minutes, range 0 to 59
  pub tm_hour:  c_int, // hours, range 0 to 23
  pub tm_mday:  c_int, // day of the month, range 1 to 31
  pub tm_mon:   c_int, // month, range 0 to 11
  pub tm_year:  c_int, // number of years since 1900
  pub tm_wday:  c_int, // day of the week, range 0 to 6
  pub tm_yday:  c_int, // day in the year, range 0 to 365
  pub tm_isdst: c_int, // daylight saving time
}


/// `get_*channels_count(idxf)`
pub type CountFn = unsafe extern "C" fn(c_int) -> c_int;
/// `get_*channel_name(idxf, idxc)` and `get_*channel_units(idxf, idxc)`
pub type StrFn = unsafe extern "C" fn(c_int, c_int) -> *const c_char;
/// `get_*channel_samples_count(idxf, idxc)`
pub type SamplesCountFn = unsafe extern "C" fn(c_int, c_int) -> c_int;
/// `get_lap_*channel_samples_count(idxf, idxl, idxc)`
pub type LapSamplesCountFn = unsafe extern "C" fn(c_int, c_int, c_int) -> c_int;
/// `get_*channel_samples(idxf, idxc, ptimes, pvalues, cnt)`
pub type SamplesFn =
  unsafe extern "C" fn(c_int, c_int, *mut f64, *mut f64, c_int) -> c_int;
/// `get_lap_*channel_samples(idxf, idxl, idxc, ptimes, pvalues, cnt)`
pub type LapSamplesFn = unsafe extern "C" fn(c_int,
                                             c_int,
                                             c_int,
                                             *mut f64,
                                             *mut f64,
                                             c_int)
                                             -> c_int;


#[cfg(feature = "aim")]
#[allow(dead_code, non_snake_case)]
#[doc(hidden)]
extern "C" {
  // FILE OPENING / CLOSING FUNCTIONS -------------------------------------- //
  //
  /// Takes the full path as C string. Returns the file index on success, `0`
  /// if the file was opened but can't be parsed.
  pub fn open_file(full_path_name: *const c_char) -> c_int;

  /// Returns the file index on success.
  pub fn close_file_n(full_path_name: *const c_char) -> c_int;

  /// Returns the file index on success.
  pub fn close_file_i(idxf: c_int) -> c_int;
  // ----------------------------------------------------------------------- //

  // SESSION INFORMATION FUNCTIONS ----------------------------------------- //
  pub fn get_vehicle_name(idxf: c_int) -> *const c_char;
  pub fn get_track_name(idxf: c_int) -> *const c_char;
  pub fn get_racer_name(idxf: c_int) -> *const c_char;
  pub fn get_championship_name(idxf: c_int) -> *const c_char;
  pub fn get_venue_type_name(idxf: c_int) -> *const c_char;

  /// Returns a pointer to a `tm` owned by the library, `NULL` on error.
  pub fn get_date_and_time(idxf: c_int) -> *const tm;

  pub fn get_laps_count(idxf: c_int) -> c_int;

  /// Writes lap start (seconds since session start) and lap duration into
  /// `pstart` and `pduration`. Returns `1` on success.
  pub fn get_lap_info(idxf: c_int,
                      idxl: c_int,
                      pstart: *mut f64,
                      pduration: *mut f64)
                      -> c_int;
  // ----------------------------------------------------------------------- //

  // CHANNEL FUNCTIONS ----------------------------------------------------- //
  //
  // the sample functions write `cnt` timestamps and values into the caller
  // owned buffers `ptimes` and `pvalues` and return the number of samples
  // read, `0` if `cnt` does not match. timestamps are in milliseconds for
  // the whole session variants and in seconds for the lap variants.
  //
  pub fn get_channels_count(idxf: c_int) -> c_int;
  pub fn get_channel_name(idxf: c_int, idxc: c_int) -> *const c_char;
  pub fn get_channel_units(idxf: c_int, idxc: c_int) -> *const c_char;
  pub fn get_channel_samples_count(idxf: c_int, idxc: c_int) -> c_int;
  pub fn get_channel_samples(idxf: c_int,
                             idxc: c_int,
                             ptimes: *mut f64,
                             pvalues: *mut f64,
                             cnt: c_int)
                             -> c_int;
  pub fn get_lap_channel_samples_count(idxf: c_int,
                                       idxl: c_int,
                                       idxc: c_int)
                                       -> c_int;
  pub fn get_lap_channel_samples(idxf: c_int,
                                 idxl: c_int,
                                 idxc: c_int,
                                 ptimes: *mut f64,
                                 pvalues: *mut f64,
                                 cnt: c_int)
                                 -> c_int;
  // ----------------------------------------------------------------------- //

  // GPS CHANNEL FUNCTIONS ------------------------------------------------- //
  //
  // GPS channels are the channels RS2Analysis adds to drk files, computed
  // assuming the vehicle is constantly aligned to its trajectory.
  //
  pub fn get_GPS_channels_count(idxf: c_int) -> c_int;
  pub fn get_GPS_channel_name(idxf: c_int, idxc: c_int) -> *const c_char;
  pub fn get_GPS_channel_units(idxf: c_int, idxc: c_int) -> *const c_char;
  pub fn get_GPS_channel_samples_count(idxf: c_int, idxc: c_int) -> c_int;
  pub fn get_GPS_channel_samples(idxf: c_int,
                                 idxc: c_int,
                                 ptimes: *mut f64,
                                 pvalues: *mut f64,
                                 cnt: c_int)
                                 -> c_int;
  pub fn get_lap_GPS_channel_samples_count(idxf: c_int,
                                           idxl: c_int,
                                           idxc: c_int)
                                           -> c_int;
  pub fn get_lap_GPS_channel_samples(idxf: c_int,
                                     idxl: c_int,
                                     idxc: c_int,
                                     ptimes: *mut f64,
                                     pvalues: *mut f64,
                                     cnt: c_int)
                                     -> c_int;
  // ----------------------------------------------------------------------- //

  // GPS RAW CHANNEL FUNCTIONS --------------------------------------------- //
  pub fn get_GPS_raw_channels_count(idxf: c_int) -> c_int;
  pub fn get_GPS_raw_channel_name(idxf: c_int, idxc: c_int) -> *const c_char;
  pub fn get_GPS_raw_channel_units(idxf: c_int, idxc: c_int) -> *const c_char;
  pub fn get_GPS_raw_channel_samples_count(idxf: c_int, idxc: c_int) -> c_int;
  pub fn get_GPS_raw_channel_samples(idxf: c_int,
                                     idxc: c_int,
                                     ptimes: *mut f64,
                                     pvalues: *mut f64,
                                     cnt: c_int)
                                     -> c_int;
  pub fn get_lap_GPS_raw_channel_samples_count(idxf: c_int,
                                               idxl: c_int,
                                               idxc: c_int)
                                               -> c_int;
  pub fn get_lap_GPS_raw_channel_samples(idxf: c_int,
                                         idxl: c_int,
                                         idxc: c_int,
                                         ptimes: *mut f64,
                                         pvalues: *mut f64,
                                         cnt: c_int)
                                         -> c_int;
  // ----------------------------------------------------------------------- //

  // META FUNCTIONS -------------------------------------------------------- //
  /// Compile date of the library, e.g. `"Jan 24 2020"`.
  pub fn get_library_date() -> *const c_char;

  /// Compile time of the library, e.g. `"16:36:19"`.
  pub fn get_library_time() -> *const c_char;
}
