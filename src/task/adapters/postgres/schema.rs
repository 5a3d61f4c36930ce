//! Diesel schema for task board persistence.

diesel::table! {
    /// Task records placed on a project board.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Task name.
        #[max_length = 255]
        name -> Varchar,
        /// Optional free-text description.
        description -> Nullable<Text>,
        /// Board column.
        #[max_length = 50]
        status -> Varchar,
        /// Ordering key inside the column; negative only mid-reorder.
        position -> Int8,
        /// Optional assignee.
        assignee_id -> Nullable<Uuid>,
        /// Optional due date.
        due_date -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
