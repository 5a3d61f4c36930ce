//! Diesel schema for project persistence.

diesel::table! {
    /// Project records scoped to an organization.
    projects (id) {
        /// Project identifier.
        id -> Uuid,
        /// Owning organization slug.
        #[max_length = 64]
        organization_slug -> Varchar,
        /// Project name.
        #[max_length = 255]
        name -> Varchar,
        /// Optional free-text description.
        description -> Nullable<Text>,
        /// Derived project status.
        #[max_length = 50]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last metadata update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Membership join rows between projects and organization members.
    project_members (project_id, member_id) {
        /// Owning project.
        project_id -> Uuid,
        /// Member identifier.
        member_id -> Uuid,
        /// Insertion order of the member within the project.
        ordinal -> Int4,
    }
}

diesel::joinable!(project_members -> projects (project_id));
diesel::allow_tables_to_appear_in_same_query!(projects, project_members);
