use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bool, Integer};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    NewPerson, Page, PageRequest, Person, PersonFilter, PersonSortField, UpdatePerson,
};
use crate::repositories::{PersonRepository, management_cycle};
use crate::schema::persons;

/// Advisory lock key held for the rest of a transaction that reassigns a
/// manager. Serialises chain checks across connections.
const MANAGER_CHAIN_LOCK: i64 = 0x6f72_6763_6861_7274;

/// True when walking up from `$1` through `manager_id` reaches `$2`.
/// `UNION` drops repeated rows, so the walk ends even on a corrupt chain.
const CLOSES_CYCLE_SQL: &str = "\
    WITH RECURSIVE chain(id, manager_id) AS ( \
        SELECT id, manager_id FROM persons WHERE id = $1 \
        UNION \
        SELECT p.id, p.manager_id FROM persons p JOIN chain c ON p.id = c.manager_id \
    ) \
    SELECT EXISTS (SELECT 1 FROM chain WHERE id = $2) AS closes_cycle";

#[derive(QueryableByName)]
struct CycleCheck {
    #[diesel(sql_type = Bool)]
    closes_cycle: bool,
}

#[derive(Clone)]
pub struct PgPersonRepository {
    pool: AsyncDbPool,
}

impl PgPersonRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

fn filtered(filter: PersonFilter) -> persons::BoxedQuery<'static, Pg> {
    let mut query = persons::table.into_boxed();
    if let Some(department_id) = filter.department_id {
        query = query.filter(persons::department_id.eq(department_id));
    }
    if let Some(job_id) = filter.job_id {
        query = query.filter(persons::job_id.eq(job_id));
    }
    if let Some(manager_id) = filter.manager_id {
        query = query.filter(persons::manager_id.eq(manager_id));
    }
    query
}

async fn update_row(
    conn: &mut AsyncPgConnection,
    id: i32,
    changes: &UpdatePerson,
) -> AppResult<Option<Person>> {
    diesel::update(persons::table.find(id))
        .set(changes)
        .returning(Person::as_returning())
        .get_result(conn)
        .await
        .optional()
        .map_err(AppError::from)
}

#[async_trait]
impl PersonRepository for PgPersonRepository {
    async fn create(&self, new_person: NewPerson) -> AppResult<Person> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(persons::table)
            .values(&new_person)
            .returning(Person::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Person>> {
        let mut conn = self.pool.get().await?;

        persons::table
            .find(id)
            .select(Person::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn list(
        &self,
        filter: PersonFilter,
        page: PageRequest<PersonSortField>,
    ) -> AppResult<Page<Person>> {
        let mut conn = self.pool.get().await?;

        let total: i64 = filtered(filter).count().get_result(&mut conn).await?;

        let query = filtered(filter);
        let query = match page.sort_field {
            PersonSortField::Id => order_by!(query, persons::id, page.sort_order),
            PersonSortField::Name => order_by!(query, persons::name, page.sort_order),
            PersonSortField::DepartmentId => {
                order_by!(query, persons::department_id, page.sort_order)
            }
            PersonSortField::JobId => order_by!(query, persons::job_id, page.sort_order),
            PersonSortField::ManagerId => order_by!(query, persons::manager_id, page.sort_order),
            PersonSortField::CreatedAt => order_by!(query, persons::created_at, page.sort_order),
            PersonSortField::UpdatedAt => order_by!(query, persons::updated_at, page.sort_order),
        };

        let items = query
            .then_order_by(persons::id.asc())
            .limit(page.limit)
            .offset(page.offset)
            .select(Person::as_select())
            .load(&mut conn)
            .await?;

        Ok(Page { items, total })
    }

    async fn update(&self, id: i32, changes: UpdatePerson) -> AppResult<Option<Person>> {
        let mut conn = self.pool.get().await?;

        let Some(Some(manager_id)) = changes.manager_id else {
            return update_row(&mut conn, id, &changes).await;
        };

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                diesel::sql_query("SELECT pg_advisory_xact_lock($1)")
                    .bind::<BigInt, _>(MANAGER_CHAIN_LOCK)
                    .execute(conn)
                    .await?;

                let check: CycleCheck = diesel::sql_query(CLOSES_CYCLE_SQL)
                    .bind::<Integer, _>(manager_id)
                    .bind::<Integer, _>(id)
                    .get_result(conn)
                    .await?;
                if check.closes_cycle {
                    return Err(management_cycle(manager_id));
                }

                update_row(conn, id, &changes).await
            }
            .scope_boxed()
        })
        .await
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let mut conn = self.pool.get().await?;

        let deleted = diesel::delete(persons::table.find(id))
            .execute(&mut conn)
            .await?;
        Ok(deleted > 0)
    }
}
