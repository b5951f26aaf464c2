#![allow(missing_docs)]

mod client;

const fn main() {}
