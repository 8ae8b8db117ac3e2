//! Process exit codes for `snsv`.
//!
//! Validation faults map through `SnsError::exit_code`:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Bad request (method, JSON, Type) |
//! | 2 | Configuration, usage or I/O error |
//! | 3 | Certificate material unusable |
//! | 4 | Signature, version or certificate URL rejected |
//! | 5 | Certificate could not be fetched |

pub const SUCCESS: i32 = 0;
pub const INTERNAL_ERROR: i32 = 2;
