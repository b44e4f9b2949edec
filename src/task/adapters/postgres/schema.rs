//! Diesel schema for task persistence.

diesel::table! {
    /// Board tasks with their column and rank.
    tasks (task_id) {
        /// Internal task identifier.
        task_id -> Int8,
        /// Task title.
        #[max_length = 100]
        title -> Varchar,
        /// Optional free-form description.
        description -> Nullable<Text>,
        /// Priority code (1 low, 2 medium, 3 high).
        priority -> Int2,
        /// Column code (0 todo, 1 in progress, 2 done).
        status -> Int2,
        /// Dense zero-based rank within the column.
        order_index -> Int4,
        /// Optional deadline.
        deadline -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}
