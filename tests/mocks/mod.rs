//! Mock vendor servers for integration tests

#![allow(dead_code)]

pub mod anthropic;
