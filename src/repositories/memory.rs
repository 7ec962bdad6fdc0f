//! Process-local backend on top of `DashMap`.
//!
//! Mirrors the relational behaviour the Postgres schema enforces: references
//! must point at existing rows, deletes null out dangling references and
//! account emails are unique.
//!
//! `links` guards the person reference columns. Creates hold it shared from
//! the reference check to the insert. Updates and deletes hold it exclusively,
//! so a delete cannot slip between a check and its write and two manager
//! reassignments cannot close a loop between them.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::atomic::{AtomicI32, Ordering as AtomicOrdering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};
use crate::models::{
    Account, Department, DepartmentSortField, Job, JobSortField, NewAccount, NewDepartment,
    NewJob, NewPerson, Page, PageRequest, Person, PersonFilter, PersonSortField, SortOrder,
    UpdateDepartment, UpdateJob, UpdatePerson, paging::cmp_nullable,
};
use crate::repositories::{
    AccountRepository, DepartmentRepository, JobRepository, PersonRepository, management_cycle,
};

#[derive(Debug, Default)]
struct Sequence(AtomicI32);

impl Sequence {
    fn next(&self) -> i32 {
        self.0.fetch_add(1, AtomicOrdering::SeqCst) + 1
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    persons: DashMap<i32, Person>,
    departments: DashMap<i32, Department>,
    jobs: DashMap<i32, Job>,
    accounts: DashMap<i32, Account>,
    account_emails: DashMap<String, i32>,
    links: RwLock<()>,
    person_ids: Sequence,
    department_ids: Sequence,
    job_ids: Sequence,
    account_ids: Sequence,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same failure shape the foreign key converter produces for Postgres.
    fn check_reference(
        field: &str,
        entity: &str,
        id: Option<i32>,
        exists: impl Fn(&i32) -> bool,
    ) -> AppResult<()> {
        match id {
            Some(id) if !exists(&id) => Err(AppError::validation(
                field,
                format!("{entity} {id} does not exist"),
            )),
            _ => Ok(()),
        }
    }

    fn check_person_references(
        &self,
        department_id: Option<i32>,
        job_id: Option<i32>,
        manager_id: Option<i32>,
    ) -> AppResult<()> {
        Self::check_reference("department_id", "department", department_id, |id| {
            self.departments.contains_key(id)
        })?;
        Self::check_reference("job_id", "job", job_id, |id| self.jobs.contains_key(id))?;
        Self::check_reference("manager_id", "person", manager_id, |id| {
            self.persons.contains_key(id)
        })
    }

    /// Walks up from `manager_id`; reaching `id` means the new edge closes a loop.
    fn closes_cycle(&self, id: i32, manager_id: i32) -> bool {
        let mut seen = HashSet::new();
        let mut current = Some(manager_id);
        while let Some(person_id) = current {
            if person_id == id {
                return true;
            }
            if !seen.insert(person_id) {
                return false;
            }
            current = self.persons.get(&person_id).and_then(|p| p.manager_id);
        }
        false
    }

    fn clear_person_references(&self, mut clear: impl FnMut(&mut Person)) {
        for mut person in self.persons.iter_mut() {
            clear(person.value_mut());
        }
    }
}

fn paginate<T: Clone>(
    mut rows: Vec<T>,
    limit: i64,
    offset: i64,
    compare: impl Fn(&T, &T) -> Ordering,
) -> Page<T> {
    rows.sort_by(compare);
    let total = rows.len() as i64;
    let items = rows
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(usize::try_from(limit).unwrap_or(0))
        .collect();
    Page { items, total }
}

fn compare_persons(a: &Person, b: &Person, field: PersonSortField) -> Ordering {
    match field {
        PersonSortField::Id => a.id.cmp(&b.id),
        PersonSortField::Name => a.name.cmp(&b.name),
        PersonSortField::DepartmentId => cmp_nullable(&a.department_id, &b.department_id),
        PersonSortField::JobId => cmp_nullable(&a.job_id, &b.job_id),
        PersonSortField::ManagerId => cmp_nullable(&a.manager_id, &b.manager_id),
        PersonSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        PersonSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

fn compare_departments(a: &Department, b: &Department, field: DepartmentSortField) -> Ordering {
    match field {
        DepartmentSortField::Id => a.id.cmp(&b.id),
        DepartmentSortField::Name => a.name.cmp(&b.name),
        DepartmentSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        DepartmentSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

fn compare_jobs(a: &Job, b: &Job, field: JobSortField) -> Ordering {
    match field {
        JobSortField::Id => a.id.cmp(&b.id),
        JobSortField::Title => a.title.cmp(&b.title),
        JobSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        JobSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

/// Requested order first, ascending id to break ties.
fn ordered<T>(
    order: SortOrder,
    id: impl Fn(&T) -> i32,
    compare: impl Fn(&T, &T) -> Ordering,
) -> impl Fn(&T, &T) -> Ordering {
    move |a, b| order.apply(compare(a, b)).then_with(|| id(a).cmp(&id(b)))
}

#[async_trait]
impl PersonRepository for MemoryStore {
    async fn create(&self, new_person: NewPerson) -> AppResult<Person> {
        let _links = self.links.read().await;
        self.check_person_references(
            new_person.department_id,
            new_person.job_id,
            new_person.manager_id,
        )?;

        let now = Utc::now();
        let person = Person {
            id: self.person_ids.next(),
            name: new_person.name,
            department_id: new_person.department_id,
            job_id: new_person.job_id,
            manager_id: new_person.manager_id,
            created_at: now,
            updated_at: now,
        };
        self.persons.insert(person.id, person.clone());
        Ok(person)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Person>> {
        Ok(self.persons.get(&id).map(|p| p.value().clone()))
    }

    async fn list(
        &self,
        filter: PersonFilter,
        page: PageRequest<PersonSortField>,
    ) -> AppResult<Page<Person>> {
        let rows: Vec<Person> = self
            .persons
            .iter()
            .filter(|p| filter.matches(p.value()))
            .map(|p| p.value().clone())
            .collect();
        let field = page.sort_field;
        Ok(paginate(
            rows,
            page.limit,
            page.offset,
            ordered(page.sort_order, |p: &Person| p.id, move |a, b| {
                compare_persons(a, b, field)
            }),
        ))
    }

    async fn update(&self, id: i32, changes: UpdatePerson) -> AppResult<Option<Person>> {
        if changes.manager_id == Some(Some(id)) {
            return Err(AppError::validation(
                "manager_id",
                "a person cannot manage themselves",
            ));
        }

        let _links = self.links.write().await;
        self.check_person_references(
            changes.department_id.flatten(),
            changes.job_id.flatten(),
            changes.manager_id.flatten(),
        )?;
        if let Some(Some(manager_id)) = changes.manager_id
            && self.closes_cycle(id, manager_id)
        {
            return Err(management_cycle(manager_id));
        }

        Ok(self.persons.get_mut(&id).map(|mut person| {
            changes.apply_to(person.value_mut());
            person.value().clone()
        }))
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let _links = self.links.write().await;
        if self.persons.remove(&id).is_none() {
            return Ok(false);
        }
        self.clear_person_references(|p| {
            if p.manager_id == Some(id) {
                p.manager_id = None;
            }
        });
        Ok(true)
    }
}

#[async_trait]
impl DepartmentRepository for MemoryStore {
    async fn create(&self, new_department: NewDepartment) -> AppResult<Department> {
        let now = Utc::now();
        let department = Department {
            id: self.department_ids.next(),
            name: new_department.name,
            created_at: now,
            updated_at: now,
        };
        self.departments.insert(department.id, department.clone());
        Ok(department)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Department>> {
        Ok(self.departments.get(&id).map(|d| d.value().clone()))
    }

    async fn list(&self, page: PageRequest<DepartmentSortField>) -> AppResult<Page<Department>> {
        let rows: Vec<Department> = self.departments.iter().map(|d| d.value().clone()).collect();
        let field = page.sort_field;
        Ok(paginate(
            rows,
            page.limit,
            page.offset,
            ordered(page.sort_order, |d: &Department| d.id, move |a, b| {
                compare_departments(a, b, field)
            }),
        ))
    }

    async fn update(&self, id: i32, changes: UpdateDepartment) -> AppResult<Option<Department>> {
        Ok(self.departments.get_mut(&id).map(|mut department| {
            changes.apply_to(department.value_mut());
            department.value().clone()
        }))
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let _links = self.links.write().await;
        if self.departments.remove(&id).is_none() {
            return Ok(false);
        }
        self.clear_person_references(|p| {
            if p.department_id == Some(id) {
                p.department_id = None;
            }
        });
        Ok(true)
    }
}

#[async_trait]
impl JobRepository for MemoryStore {
    async fn create(&self, new_job: NewJob) -> AppResult<Job> {
        let now = Utc::now();
        let job = Job {
            id: self.job_ids.next(),
            title: new_job.title,
            created_at: now,
            updated_at: now,
        };
        self.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Job>> {
        Ok(self.jobs.get(&id).map(|j| j.value().clone()))
    }

    async fn list(&self, page: PageRequest<JobSortField>) -> AppResult<Page<Job>> {
        let rows: Vec<Job> = self.jobs.iter().map(|j| j.value().clone()).collect();
        let field = page.sort_field;
        Ok(paginate(
            rows,
            page.limit,
            page.offset,
            ordered(page.sort_order, |j: &Job| j.id, move |a, b| {
                compare_jobs(a, b, field)
            }),
        ))
    }

    async fn update(&self, id: i32, changes: UpdateJob) -> AppResult<Option<Job>> {
        Ok(self.jobs.get_mut(&id).map(|mut job| {
            changes.apply_to(job.value_mut());
            job.value().clone()
        }))
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let _links = self.links.write().await;
        if self.jobs.remove(&id).is_none() {
            return Ok(false);
        }
        self.clear_person_references(|p| {
            if p.job_id == Some(id) {
                p.job_id = None;
            }
        });
        Ok(true)
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn create(&self, new_account: NewAccount) -> AppResult<Account> {
        match self.account_emails.entry(new_account.email.clone()) {
            Entry::Occupied(_) => Err(AppError::Duplicate {
                entity: "account".to_string(),
                field: "email".to_string(),
                value: new_account.email,
            }),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let account = Account {
                    id: self.account_ids.next(),
                    email: new_account.email,
                    password_hash: new_account.password_hash,
                    created_at: now,
                    updated_at: now,
                };
                slot.insert(account.id);
                self.accounts.insert(account.id, account.clone());
                Ok(account)
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let Some(id) = self.account_emails.get(email).map(|id| *id.value()) else {
            return Ok(None);
        };
        Ok(self.accounts.get(&id).map(|a| a.value().clone()))
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Account>> {
        Ok(self.accounts.get(&id).map(|a| a.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_person(name: &str) -> NewPerson {
        NewPerson {
            name: name.to_string(),
            department_id: None,
            job_id: None,
            manager_id: None,
        }
    }

    async fn department(store: &MemoryStore, name: &str) -> Department {
        DepartmentRepository::create(
            store,
            NewDepartment {
                name: name.to_string(),
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_ids_are_sequential_per_table() {
        let store = MemoryStore::new();
        let a = PersonRepository::create(&store, new_person("Ada")).await.unwrap();
        let b = PersonRepository::create(&store, new_person("Bob")).await.unwrap();
        let d = department(&store, "Engineering").await;

        assert_eq!((a.id, b.id, d.id), (1, 2, 1));
        assert_eq!(a.created_at, a.updated_at);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_reference() {
        let store = MemoryStore::new();
        let err = PersonRepository::create(
            &store,
            NewPerson {
                department_id: Some(42),
                ..new_person("Ada")
            },
        )
        .await
        .unwrap_err();

        match err {
            AppError::Validation { field, reason } => {
                assert_eq!(field, "department_id");
                assert_eq!(reason, "department 42 does not exist");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_filters_sorts_and_pages() {
        let store = MemoryStore::new();
        let eng = department(&store, "Engineering").await;
        for name in ["Carol", "Ada", "Bob", "Dan"] {
            PersonRepository::create(
                &store,
                NewPerson {
                    department_id: Some(eng.id),
                    ..new_person(name)
                },
            )
            .await
            .unwrap();
        }
        PersonRepository::create(&store, new_person("Eve")).await.unwrap();

        let page = PageRequest {
            limit: 2,
            offset: 1,
            sort_field: PersonSortField::Name,
            sort_order: SortOrder::Desc,
        };
        let result = PersonRepository::list(&store, PersonFilter::department(eng.id), page)
            .await
            .unwrap();

        assert_eq!(result.total, 4);
        let names: Vec<_> = result.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Carol", "Bob"]);
    }

    #[tokio::test]
    async fn test_ties_keep_ascending_id_in_both_directions() {
        let store = MemoryStore::new();
        let eng = department(&store, "Engineering").await;
        for _ in 0..3 {
            PersonRepository::create(
                &store,
                NewPerson {
                    department_id: Some(eng.id),
                    ..new_person("Same")
                },
            )
            .await
            .unwrap();
        }

        for sort_order in [SortOrder::Asc, SortOrder::Desc] {
            let mut ids = Vec::new();
            for offset in [0, 2] {
                let page = PageRequest {
                    limit: 2,
                    offset,
                    sort_field: PersonSortField::DepartmentId,
                    sort_order,
                };
                let result = PersonRepository::list(&store, PersonFilter::default(), page)
                    .await
                    .unwrap();
                ids.extend(result.items.iter().map(|p| p.id));
            }
            assert_eq!(ids, [1, 2, 3], "{sort_order:?}");
        }
    }

    #[tokio::test]
    async fn test_nullable_sort_puts_nulls_last_ascending() {
        let store = MemoryStore::new();
        let eng = department(&store, "Engineering").await;
        PersonRepository::create(&store, new_person("NoDept")).await.unwrap();
        PersonRepository::create(
            &store,
            NewPerson {
                department_id: Some(eng.id),
                ..new_person("Dept")
            },
        )
        .await
        .unwrap();

        let page = PageRequest {
            sort_field: PersonSortField::DepartmentId,
            ..PageRequest::default()
        };
        let result = PersonRepository::list(&store, PersonFilter::default(), page)
            .await
            .unwrap();
        assert_eq!(result.items[0].name, "Dept");
        assert_eq!(result.items[1].name, "NoDept");
    }

    #[tokio::test]
    async fn test_offset_past_end_returns_empty_page() {
        let store = MemoryStore::new();
        PersonRepository::create(&store, new_person("Ada")).await.unwrap();

        let page = PageRequest {
            offset: 10,
            ..PageRequest::default()
        };
        let result = PersonRepository::list(&store, PersonFilter::default(), page)
            .await
            .unwrap();
        assert!(result.items.is_empty());
        assert_eq!(result.total, 1);
    }

    #[tokio::test]
    async fn test_update_missing_person_returns_none() {
        let store = MemoryStore::new();
        let updated = PersonRepository::update(&store, 7, UpdatePerson::default())
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_update_can_clear_reference() {
        let store = MemoryStore::new();
        let eng = department(&store, "Engineering").await;
        let ada = PersonRepository::create(
            &store,
            NewPerson {
                department_id: Some(eng.id),
                ..new_person("Ada")
            },
        )
        .await
        .unwrap();

        let changes = UpdatePerson {
            department_id: Some(None),
            ..UpdatePerson::default()
        };
        let updated = PersonRepository::update(&store, ada.id, changes)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.department_id, None);
        assert_eq!(updated.name, "Ada");
        assert!(updated.updated_at >= ada.updated_at);
    }

    #[tokio::test]
    async fn test_deleting_department_clears_members() {
        let store = MemoryStore::new();
        let eng = department(&store, "Engineering").await;
        let ada = PersonRepository::create(
            &store,
            NewPerson {
                department_id: Some(eng.id),
                ..new_person("Ada")
            },
        )
        .await
        .unwrap();

        assert!(DepartmentRepository::delete(&store, eng.id).await.unwrap());
        assert!(!DepartmentRepository::delete(&store, eng.id).await.unwrap());

        let ada = PersonRepository::find_by_id(&store, ada.id).await.unwrap().unwrap();
        assert_eq!(ada.department_id, None);
    }

    #[tokio::test]
    async fn test_deleting_manager_clears_reports() {
        let store = MemoryStore::new();
        let boss = PersonRepository::create(&store, new_person("Boss")).await.unwrap();
        let report = PersonRepository::create(
            &store,
            NewPerson {
                manager_id: Some(boss.id),
                ..new_person("Report")
            },
        )
        .await
        .unwrap();

        assert!(PersonRepository::delete(&store, boss.id).await.unwrap());
        let report = PersonRepository::find_by_id(&store, report.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report.manager_id, None);
    }

    fn set_manager(manager_id: i32) -> UpdatePerson {
        UpdatePerson {
            manager_id: Some(Some(manager_id)),
            ..UpdatePerson::default()
        }
    }

    #[tokio::test]
    async fn test_update_rejects_manager_cycle() {
        let store = MemoryStore::new();
        let ceo = PersonRepository::create(&store, new_person("Ceo")).await.unwrap();
        let vp = PersonRepository::create(
            &store,
            NewPerson {
                manager_id: Some(ceo.id),
                ..new_person("Vp")
            },
        )
        .await
        .unwrap();

        let err = PersonRepository::update(&store, ceo.id, set_manager(vp.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "manager_id"));

        let ceo = PersonRepository::find_by_id(&store, ceo.id).await.unwrap().unwrap();
        assert_eq!(ceo.manager_id, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reassignments_never_form_cycle() {
        let store = Arc::new(MemoryStore::new());
        for _ in 0..200 {
            let a = PersonRepository::create(&*store, new_person("A")).await.unwrap();
            let b = PersonRepository::create(&*store, new_person("B")).await.unwrap();

            let first = tokio::spawn({
                let store = store.clone();
                async move { PersonRepository::update(&*store, a.id, set_manager(b.id)).await }
            });
            let second = tokio::spawn({
                let store = store.clone();
                async move { PersonRepository::update(&*store, b.id, set_manager(a.id)).await }
            });
            let results = [first.await.unwrap(), second.await.unwrap()];

            assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
            let a = PersonRepository::find_by_id(&*store, a.id).await.unwrap().unwrap();
            let b = PersonRepository::find_by_id(&*store, b.id).await.unwrap().unwrap();
            assert!(!(a.manager_id == Some(b.id) && b.manager_id == Some(a.id)));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_create_racing_department_delete_leaves_no_dangling_reference() {
        let store = Arc::new(MemoryStore::new());
        for _ in 0..200 {
            let dept = department(&store, "Doomed").await;

            let create = tokio::spawn({
                let store = store.clone();
                async move {
                    PersonRepository::create(
                        &*store,
                        NewPerson {
                            department_id: Some(dept.id),
                            ..new_person("Ada")
                        },
                    )
                    .await
                }
            });
            let delete = tokio::spawn({
                let store = store.clone();
                async move { DepartmentRepository::delete(&*store, dept.id).await }
            });
            let created = create.await.unwrap();
            assert!(delete.await.unwrap().unwrap());

            if let Ok(person) = created {
                let person = PersonRepository::find_by_id(&*store, person.id)
                    .await
                    .unwrap()
                    .unwrap();
                assert_eq!(person.department_id, None);
            }
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        let account = NewAccount {
            email: "ada@example.com".to_string(),
            password_hash: "hash".to_string(),
        };
        AccountRepository::create(&store, account.clone()).await.unwrap();

        let err = AccountRepository::create(&store, account).await.unwrap_err();
        assert!(matches!(err, AppError::Duplicate { ref field, .. } if field == "email"));

        let found = store.find_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, 1);
        assert!(store.find_by_email("bob@example.com").await.unwrap().is_none());
    }
}
