//! Client types generated from the `vmomi-gen` fixture schema.
//!
//! The build script runs the generator over
//! `vmomi/gen/tests/fixtures/schema.json`, so this crate always holds the
//! current generator output compiled against the current runtime. The tests
//! in `tests/` drive those types through a scripted transport.

#![allow(non_camel_case_types)]

include!(concat!(env!("OUT_DIR"), "/vmodl.rs"));
