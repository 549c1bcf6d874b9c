// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Florian Eich <florian@bmc-labs.com>
//   Jonas Reitemeyer <alumni@bmc-labs.com>

use std::{env, fs, path::Path};


fn main() {
  println!("cargo:rerun-if-env-changed=AIM_LIB_DIR");

  // without the `aim` feature nothing links against the vendor library, so
  // there is nothing to copy and nothing to tell cargo about
  if env::var_os("CARGO_FEATURE_AIM").is_none() {
    return;
  }

  // because of the dynamic linking foo required to make these shared libraries
  // from AiM work on both platforms, we need to do some extra acrobatics in
  // this build script here.
  #[rustfmt::skip]
  let project_dir = env::var(
    "CARGO_MANIFEST_DIR"
  ).expect("unable to read CARGO_MANIFEST_DIR env variable");

  #[rustfmt::skip]
  let out_dir = env::var(
    "OUT_DIR"
  ).expect("unable to read OUT_DIR env variable");

  // cargo only lets us load from a path at run time if that path is within
  // the OUT_DIR, so all the .dll, .so, .lib and whatnot get copied there.
  // the source directory defaults to `aim` next to this file.
  let lib_src_path = env::var("AIM_LIB_DIR")
    .unwrap_or_else(|_| format!("{}/aim", project_dir));
  let lib_dst_path = format!("{}/lib", out_dir);
  println!("cargo:rerun-if-changed={}", lib_src_path);

  if !Path::new(&lib_dst_path).exists() {
    fs::create_dir(&lib_dst_path).expect("unable to create lib dir");
  }

  let files = fs::read_dir(&lib_src_path).expect("unable to read AiM lib dir");
  for file in files {
    let src_path = file.expect("could not read file").path();
    let file_name = src_path.file_name()
                            .and_then(|name| name.to_str())
                            .expect("AiM lib file name is not valid unicode");
    let dst_path = format!("{}/{}", &lib_dst_path, file_name);

    fs::copy(&src_path, dst_path).expect("unable to copy libs to target dir");
  }

  println!(r"cargo:rustc-link-search=all={}/lib", out_dir);

  // the build script runs on the host, so ask cargo about the target instead
  // of using #[cfg]. on Linux the AiM library additionally needs libxml2.
  let target_family = env::var("CARGO_CFG_TARGET_FAMILY").unwrap_or_default();
  if target_family == "windows" {
    println!(r"cargo:rustc-link-lib=dylib=libxdrk-x86_64");
  } else {
    println!(r"cargo:rustc-link-lib=xdrk-x86_64");
    println!(r"cargo:rustc-link-lib=xml2");
  }
}
