//! Records and their repository functions.
//!
//! Every function takes `&impl GenericClient`, so the same code runs on a
//! pooled connection or inside a transaction.

mod application;
mod company;
mod job;
mod user;

pub use application::{Application, ApplicationState, NewApplication};
pub use company::{Company, CompanyPatch, NewCompany};
pub use job::{Job, JobPatch, NewJob};
pub use user::{DEFAULT_PHOTO, NewUser, User, UserPatch, UserSummary};
