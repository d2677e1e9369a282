// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod chart;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod pricing;
pub mod report;
pub mod store;
pub mod utils;
pub mod workspace;
