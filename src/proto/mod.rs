//! Wire-level protocol implementations. Currently just HTTP/1.x.

pub mod h1;
