mod account;
mod department;
mod job;
pub mod paging;
mod person;

pub use account::{Account, NewAccount, normalize_email};
pub use department::{Department, NewDepartment, UpdateDepartment};
pub use job::{Job, NewJob, UpdateJob};
pub use paging::{
    DepartmentSortField, JobSortField, Page, PageRequest, PersonSortField, SortField, SortOrder,
};
pub use person::{NewPerson, Person, PersonFilter, UpdatePerson};
