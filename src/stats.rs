//! # Stats
//!
//! $$
//! x \mapsto T(x), \qquad T^{-1}(T(x)) = x
//! $$
//!
//! Invertible feature scalers for model-scaled price series.

pub mod scaler;
