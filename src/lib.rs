//! JSON-over-HTTP arithmetic service.
//!
//! Four POST endpoints (`/soma`, `/subtracao`, `/multiplicacao`,
//! `/divisao`) take `{"operando1": f64, "operando2": f64}` and answer
//! `{"resultado": f64}`. Built directly on hyper and tokio.

pub mod calc;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
