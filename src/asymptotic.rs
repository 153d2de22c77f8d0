//! Asymptotic analysis of growth functions of `n`.
//!
//! A function is parsed, its dominant term is taken as the reference function `g`, and
//! the limit of `f/g` at infinity decides Big-O, Big-Omega and Big-Theta membership.
/// full pipeline from an input string to a classified analysis, plus the session holding the latest result
pub mod analysis;
/// Big-O / Big-Omega / Big-Theta verdict from the limit of f/g
pub mod classifier;
/// analysis settings read from a task document
pub mod config;
/// fastest-growing additive term of a function
pub mod dominant_term;
