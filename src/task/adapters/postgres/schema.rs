//! Diesel schema for task lifecycle persistence.

diesel::table! {
    /// Task records, one row per task.
    tasks (id) {
        /// Insertion sequence used to list tasks in creation order.
        seq -> Int8,
        /// Internal task identifier.
        id -> Uuid,
        /// Task lifecycle state.
        #[max_length = 50]
        state -> Varchar,
        /// Instruction payload.
        instructions -> Jsonb,
        /// Flat string metadata.
        metadata -> Jsonb,
        /// Execution result, set while succeeded or committed.
        result -> Nullable<Jsonb>,
        /// Recorded failure, set while failed or commit-failed.
        error -> Nullable<Jsonb>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
