//! Diesel schema for the task event store and project catalogue.

diesel::table! {
    /// Projects whose tasks are coordinated through the event store.
    projects (id) {
        /// Project identifier.
        id -> Uuid,
        /// Human-readable project name.
        #[max_length = 255]
        name -> Varchar,
        /// Actor who authored the project.
        #[max_length = 255]
        author_id -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tasks registered inside a project.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Stable position of the task inside the project.
        project_task_index -> Int4,
    }
}

diesel::table! {
    /// Task state-change events. The latest row per task is its state.
    task_events (event_id) {
        /// Store-generated event identifier.
        event_id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Task the event applies to.
        task_id -> Uuid,
        /// Actor who caused the transition.
        #[max_length = 255]
        user_id -> Varchar,
        /// Task lifecycle state.
        #[max_length = 50]
        state -> Varchar,
        /// Optional free-text comment.
        comment -> Nullable<Text>,
        /// Authoritative ordering timestamp.
        created_at -> Timestamptz,
        /// Insertion sequence used to break timestamp ties.
        sequence -> Int8,
    }
}

diesel::joinable!(tasks -> projects (project_id));
diesel::joinable!(task_events -> tasks (task_id));

diesel::allow_tables_to_appear_in_same_query!(projects, tasks, task_events);
