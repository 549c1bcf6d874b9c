// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Florian Eich <florian@bmc-labs.com>
//   Jonas Reitemeyer <alumni@bmc-labs.com>

use super::{bindings as aim, Error, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::{ffi::{CStr, CString},
          os::raw::c_char,
          path::Path};


/// Converts a `*const c_char`, i.e. a raw C string (`const char *` in C), to a
/// Rust `String`. The library signals errors by handing out `NULL`, which is
/// caught here.
pub fn strptr_to_string(strptr: *const c_char) -> Result<String> {
  if strptr.is_null() {
    return Err(Error::Library("fetched null pointer".to_string()));
  }
  Ok(unsafe { CStr::from_ptr(strptr) }.to_str()?.to_owned())
}

/// Converts a Rust `std::path::Path` to a `std::ffi::CString` object. The
/// library takes absolute paths only, so the path is canonicalized first.
pub fn path_to_cstring(path: &Path) -> Result<CString> {
  let path = path.canonicalize()?;
  let path = path.to_str().ok_or_else(|| {
                            Error::InvalidPath { path:   path.clone(),
                                                 reason: "not valid unicode"
                                                           .to_string(), }
                          })?;
  Ok(CString::new(path)?)
}

/// Rounds `value` to `decimals` decimal places, ties to even.
///
/// Rounding works on the shortest decimal representation of the `f64` (the
/// digits it prints as), not on its binary expansion: `1.50005` is stored as
/// `1.5000500000000001...` but prints as `1.50005`, which is a tie and comes
/// out as `1.5`.
pub fn round_to(value: f64, decimals: usize) -> f64 {
  if !value.is_finite() {
    return value;
  }

  let repr = value.abs().to_string();
  let (int_part, frac_part) = match repr.find('.') {
    Some(dot) => (&repr[..dot], &repr[dot + 1..]),
    None => return value,
  };
  if frac_part.len() <= decimals {
    return value;
  }

  let (kept, dropped) = frac_part.split_at(decimals);
  let mut digits: Vec<u8> = int_part.bytes().chain(kept.bytes()).collect();

  let round_up = match dropped.as_bytes()[0] {
    b'6'..=b'9' => true,
    b'5' if dropped[1..].bytes().any(|d| d != b'0') => true,
    // tie, round to even
    b'5' => digits.last().map_or(false, |d| (d - b'0') % 2 == 1),
    _ => false,
  };

  if round_up {
    let mut carry = true;
    for digit in digits.iter_mut().rev() {
      if *digit == b'9' {
        *digit = b'0';
      } else {
        *digit += 1;
        carry = false;
        break;
      }
    }
    if carry {
      digits.insert(0, b'1');
    }
  }

  let (int_digits, frac_digits) = digits.split_at(digits.len() - decimals);
  let rounded = format!("{}.{}0",
                        String::from_utf8_lossy(int_digits),
                        String::from_utf8_lossy(frac_digits));
  rounded.parse::<f64>()
         .map_or(value, |rounded| rounded.copysign(value))
}

/// Converts the broken-down time handed out by the library into a datetime.
/// Year is stored as offset from 1900 and month is 0-based. A leap second
/// (`tm_sec == 60`) maps to chrono's leap second representation.
pub fn tm_to_datetime(tm: &aim::tm) -> Result<NaiveDateTime> {
  let date = NaiveDate::from_ymd_opt(tm.tm_year + 1900,
                                     (tm.tm_mon + 1) as u32,
                                     tm.tm_mday as u32);
  let (hour, min) = (tm.tm_hour as u32, tm.tm_min as u32);
  let time = match tm.tm_sec {
    60 => NaiveTime::from_hms_milli_opt(hour, min, 59, 1_000),
    sec => NaiveTime::from_hms_opt(hour, min, sec as u32),
  };

  match (date, time) {
    (Some(date), Some(time)) => Ok(date.and_time(time)),
    _ => Err(Error::Library(format!("invalid date and time record {:?}", tm))),
  }
}

/// Parses the library compile date, formatted like `"Jan 24 2020"`.
pub fn parse_library_date(date: &str) -> Result<NaiveDate> {
  Ok(NaiveDate::parse_from_str(date, "%b %d %Y")?)
}

/// Parses the library compile time, formatted like `"16:36:19"`.
pub fn parse_library_time(time: &str) -> Result<NaiveTime> {
  Ok(NaiveTime::parse_from_str(time, "%H:%M:%S")?)
}
