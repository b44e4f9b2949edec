//! `PostgreSQL` store implementation for the task board.

use super::{
    models::{NewTaskRow, TaskChangeset, TaskRow},
    schema::tasks,
};
use crate::task::{
    domain::{
        PersistedTaskData, Position, Priority, Task, TaskDraft, TaskId, TaskPage, TaskPatch,
        TaskQuery, TaskStatus, TaskTitle,
    },
    ports::{TaskStore, TaskStoreError, TaskStoreResult, TaskTransaction},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::time::Duration;
use tracing::debug;

/// `PostgreSQL` connection pool type used by the task store.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// Idempotent DDL for the `tasks` table.
const SCHEMA_SQL: &str =
    include_str!("../../../../migrations/2026-03-01-000000_create_tasks/up.sql");

/// Default bound on lock waits and statements inside one transaction.
const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Creates the `tasks` table and its indexes when they are missing.
///
/// # Errors
///
/// Returns [`TaskStoreError::Persistence`] when a connection cannot be
/// obtained or the DDL fails.
pub async fn ensure_schema(pool: &TaskPgPool) -> TaskStoreResult<()> {
    let shared = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = shared.get().map_err(TaskStoreError::persistence)?;
        connection
            .batch_execute(SCHEMA_SQL)
            .map_err(TaskStoreError::persistence)
    })
    .await
    .map_err(TaskStoreError::persistence)?
}

/// `PostgreSQL`-backed task store.
///
/// Every transaction runs at `SERIALIZABLE` isolation with bounded lock and
/// statement timeouts. Column reads lock their rows, so concurrent moves
/// touching the same column queue behind each other.
#[derive(Debug, Clone)]
pub struct PostgresTaskStore {
    pool: TaskPgPool,
    transaction_timeout: Duration,
}

impl PostgresTaskStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self {
            pool,
            transaction_timeout: DEFAULT_TRANSACTION_TIMEOUT,
        }
    }

    /// Sets the lock and statement timeout applied to each transaction.
    #[must_use]
    pub const fn with_transaction_timeout(mut self, timeout: Duration) -> Self {
        self.transaction_timeout = timeout;
        self
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &TaskPgPool {
        &self.pool
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskStoreError::persistence)?
    }
}

#[async_trait]
impl TaskStore for PostgresTaskStore {
    async fn transact<T, F>(&self, work: F) -> TaskStoreResult<T>
    where
        F: FnOnce(&mut dyn TaskTransaction) -> TaskStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let timeout = self.transaction_timeout;
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);

        self.run_blocking(move |connection| {
            connection
                .build_transaction()
                .serializable()
                .run(|tx_connection| {
                    tx_connection.batch_execute(&format!(
                        "SET LOCAL lock_timeout = {timeout_ms}; \
                         SET LOCAL statement_timeout = {timeout_ms}"
                    ))?;
                    let mut transaction = PgTaskTransaction {
                        connection: tx_connection,
                    };
                    work(&mut transaction)
                })
        })
        .await
        .map_err(|err| classify_timeout(err, timeout))
    }
}

/// Server message for SQLSTATE `40P01`, which Diesel reports as
/// [`DatabaseErrorKind::Unknown`].
const DEADLOCK_MESSAGE: &str = "deadlock detected";

/// Server messages for SQLSTATE `55P03` and `57014` raised by `lock_timeout`
/// and `statement_timeout`.
const TIMEOUT_MESSAGES: [&str; 2] = [
    "canceling statement due to lock timeout",
    "canceling statement due to statement timeout",
];

impl From<DieselError> for TaskStoreError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(
                DatabaseErrorKind::SerializationFailure | DatabaseErrorKind::UniqueViolation,
                ref info,
            ) => Self::Conflict(info.message().to_owned()),
            DieselError::DatabaseError(DatabaseErrorKind::Unknown, ref info)
                if info.message().starts_with(DEADLOCK_MESSAGE) =>
            {
                Self::Conflict(info.message().to_owned())
            }
            other => Self::persistence(other),
        }
    }
}

/// Reports cancelled statements and pool checkout timeouts as
/// [`TaskStoreError::Timeout`].
fn classify_timeout(err: TaskStoreError, timeout: Duration) -> TaskStoreError {
    let TaskStoreError::Persistence(ref source) = err else {
        return err;
    };
    let timed_out = source
        .downcast_ref::<DieselError>()
        .is_some_and(is_timeout_cancellation)
        || source.downcast_ref::<PoolError>().is_some();
    if !timed_out {
        return err;
    }
    debug!(error = %source, "transaction cancelled by timeout");
    TaskStoreError::Timeout(timeout)
}

fn is_timeout_cancellation(err: &DieselError) -> bool {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::Unknown, info) => TIMEOUT_MESSAGES
            .iter()
            .any(|message| info.message().starts_with(message)),
        _ => false,
    }
}

struct PgTaskTransaction<'a> {
    connection: &'a mut PgConnection,
}

impl TaskTransaction for PgTaskTransaction<'_> {
    fn get(&mut self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        let row = tasks::table
            .find(id.value())
            .select(TaskRow::as_select())
            .first::<TaskRow>(self.connection)
            .optional()?;
        row.map(row_to_task).transpose()
    }

    fn list_by_status(&mut self, status: TaskStatus) -> TaskStoreResult<Vec<Task>> {
        let rows = tasks::table
            .filter(tasks::status.eq(status.code()))
            .order((tasks::order_index.asc(), tasks::task_id.asc()))
            .select(TaskRow::as_select())
            .for_update()
            .load::<TaskRow>(self.connection)?;
        rows.into_iter().map(row_to_task).collect()
    }

    fn set_position(&mut self, id: TaskId, position: Position) -> TaskStoreResult<()> {
        let updated = diesel::update(tasks::table.find(id.value()))
            .set(tasks::order_index.eq(to_order_index(position)?))
            .execute(self.connection)?;
        expect_single_row(updated, id)
    }

    fn set_status_and_position(
        &mut self,
        id: TaskId,
        status: TaskStatus,
        position: Position,
    ) -> TaskStoreResult<()> {
        let updated = diesel::update(tasks::table.find(id.value()))
            .set((
                tasks::status.eq(status.code()),
                tasks::order_index.eq(to_order_index(position)?),
            ))
            .execute(self.connection)?;
        expect_single_row(updated, id)
    }

    fn insert(
        &mut self,
        draft: &TaskDraft,
        position: Position,
        created_at: DateTime<Utc>,
    ) -> TaskStoreResult<Task> {
        let new_row = NewTaskRow {
            title: draft.title().as_str().to_owned(),
            description: draft.description().map(str::to_owned),
            priority: draft.priority().code(),
            status: draft.status().code(),
            order_index: to_order_index(position)?,
            deadline: draft.deadline(),
            created_at,
        };

        let row = diesel::insert_into(tasks::table)
            .values(&new_row)
            .returning(TaskRow::as_returning())
            .get_result::<TaskRow>(self.connection)?;
        row_to_task(row)
    }

    fn update_fields(&mut self, id: TaskId, patch: &TaskPatch) -> TaskStoreResult<()> {
        if patch.is_empty() {
            return self.get(id)?.map(|_| ()).ok_or(TaskStoreError::NotFound(id));
        }

        let changeset = TaskChangeset {
            title: patch.title.as_present().map(|title| title.as_str().to_owned()),
            description: patch.description.clone().into_option(),
            priority: patch.priority.as_present().map(|priority| priority.code()),
            deadline: patch.deadline.into_option(),
        };
        let updated = diesel::update(tasks::table.find(id.value()))
            .set(&changeset)
            .execute(self.connection)?;
        expect_single_row(updated, id)
    }

    fn delete(&mut self, id: TaskId) -> TaskStoreResult<()> {
        let deleted = diesel::delete(tasks::table.find(id.value())).execute(self.connection)?;
        expect_single_row(deleted, id)
    }

    fn search(&mut self, query: &TaskQuery) -> TaskStoreResult<TaskPage> {
        let total = filtered(query)
            .count()
            .get_result::<i64>(self.connection)?;
        let limit = i64::try_from(query.limit).map_err(TaskStoreError::persistence)?;
        let offset = i64::try_from(query.offset()).map_err(TaskStoreError::persistence)?;

        let rows = filtered(query)
            .order((
                tasks::order_index.asc(),
                tasks::created_at.desc(),
                tasks::task_id.asc(),
            ))
            .limit(limit)
            .offset(offset)
            .select(TaskRow::as_select())
            .load::<TaskRow>(self.connection)?;

        Ok(TaskPage {
            tasks: rows
                .into_iter()
                .map(row_to_task)
                .collect::<TaskStoreResult<_>>()?,
            total: u64::try_from(total).map_err(TaskStoreError::persistence)?,
            page: query.page,
            limit: query.limit,
        })
    }
}

/// Builds the filtered base query shared by the page and count reads.
fn filtered(query: &TaskQuery) -> tasks::BoxedQuery<'static, Pg> {
    let mut statement = tasks::table.into_boxed();
    if let Some(status) = query.status {
        statement = statement.filter(tasks::status.eq(status.code()));
    }
    if let Some(needle) = query.search.as_deref() {
        let pattern = format!("%{}%", escape_like(needle));
        statement = statement.filter(
            tasks::title
                .ilike(pattern.clone())
                .or(tasks::description.assume_not_null().ilike(pattern)),
        );
    }
    statement
}

/// Escapes `ILIKE` wildcards so the needle matches literally.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for character in needle.chars() {
        if matches!(character, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(character);
    }
    escaped
}

fn expect_single_row(affected: usize, id: TaskId) -> TaskStoreResult<()> {
    if affected == 0 {
        return Err(TaskStoreError::NotFound(id));
    }
    Ok(())
}

fn to_order_index(position: Position) -> TaskStoreResult<i32> {
    i32::try_from(position.index()).map_err(TaskStoreError::persistence)
}

fn row_to_task(row: TaskRow) -> TaskStoreResult<Task> {
    let TaskRow {
        task_id,
        title,
        description,
        priority,
        status,
        order_index,
        deadline,
        created_at,
    } = row;

    let data = PersistedTaskData {
        id: TaskId::new(task_id).map_err(TaskStoreError::persistence)?,
        title: TaskTitle::new(title).map_err(TaskStoreError::persistence)?,
        description,
        priority: Priority::try_from(i64::from(priority)).map_err(TaskStoreError::persistence)?,
        status: TaskStatus::try_from(i64::from(status)).map_err(TaskStoreError::persistence)?,
        position: Position::new(
            usize::try_from(order_index).map_err(TaskStoreError::persistence)?,
        ),
        deadline,
        created_at,
    };
    Ok(Task::from_persisted(data))
}
