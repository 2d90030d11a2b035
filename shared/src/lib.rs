//! Data types shared between the AMS frontend and its REST backend.

pub mod account;
pub mod announcement;
pub mod exam;
