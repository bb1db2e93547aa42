//! Integration tests for ninout-dash
//!
//! These tests drive the refresh controller through scripted run sources and
//! exercise the HTTP client against a local server.

pub mod api_client;
pub mod controller;
pub mod helpers;
