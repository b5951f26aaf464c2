#![allow(missing_docs)]

mod server;

const fn main() {}
