//! Placement core: recruiters submit candidates against jobs, staff move each submission through
//! review, and a hire pays out a commission split between the platform and the recruiter.

pub mod applications;
pub mod commission;
pub mod jobs;
pub mod memory;
pub mod payout;
