//!  Storage is organized through [record_store::JsonRecordStore].
//!  The basic idea is:
//!   - There is a single user record file in the application directory.
//!   - Every save writes a complete record into a temporary file and renames it over the old one.
//!   - Archives are full copies of the record kept in a separate directory and never replaced.

pub mod entities;
pub mod record_store;
