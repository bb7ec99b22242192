//! Diesel schema for accounts and profiles.

diesel::table! {
    /// User accounts.
    users (id) {
        /// OAuth subject identifier.
        #[max_length = 255]
        id -> Varchar,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Unique, lower-cased e-mail address.
        #[max_length = 320]
        email_address -> Varchar,
        /// Avatar URL.
        profile_img -> Nullable<Text>,
        /// Hashed credential.
        password -> Nullable<Text>,
        /// Whether the account may sign in.
        is_active -> Bool,
        /// Whether the account has administrative rights.
        is_superuser -> Bool,
        /// Registration timestamp.
        date_registered -> Timestamptz,
    }
}

diesel::table! {
    /// One profile per account.
    user_profile (user_id) {
        /// Owning account.
        #[max_length = 255]
        user_id -> Varchar,
        /// Contact phone number.
        #[max_length = 64]
        phone_number -> Nullable<Varchar>,
        /// Country of residence.
        #[max_length = 255]
        country -> Nullable<Varchar>,
        /// City of residence.
        #[max_length = 255]
        city -> Nullable<Varchar>,
        /// Organisation name.
        #[max_length = 255]
        organization_name -> Nullable<Varchar>,
        /// Organisation address.
        organization_address -> Nullable<Text>,
        /// Job title.
        #[max_length = 255]
        job_title -> Nullable<Varchar>,
        /// Notification radius in kilometres.
        notify_for_projects_within_km -> Nullable<Int4>,
        /// Drone model.
        #[max_length = 255]
        drone_you_own -> Nullable<Varchar>,
        /// Years of experience.
        experience_years -> Nullable<Int4>,
        /// Operator certification flag.
        certified_drone_operator -> Nullable<Bool>,
        /// Platform role.
        #[max_length = 50]
        role -> Nullable<Varchar>,
    }
}

diesel::joinable!(user_profile -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, user_profile);
