/*!
# sane-sys

Raw bindings for the SANE (Scanner Access Now Easy) C library. This crate is used as the base layer of the `sane` feature in `sane-scan`.
*/

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

include!("../bindings/sane.rs");
