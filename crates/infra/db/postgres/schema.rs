// Column names follow the sign-up form's Vietnamese field names; `sql_name`
// maps them onto the Rust-side identifiers.
//
// `applicants.approved_at`, `members.approved_at` and `members.start_date`
// are absent from older deployments and are deliberately left out of these
// definitions. Queries reach them through `SchemaCapabilities`.

diesel::table! {
    admin_settings (key) {
        key -> Text,
        value -> Text,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    applicants (id) {
        id -> Uuid,
        #[sql_name = "ho_ten"]
        full_name -> Text,
        email -> Text,
        #[sql_name = "so_dien_thoai"]
        phone -> Nullable<Text>,
        telegram -> Nullable<Text>,
        #[sql_name = "nam_sinh"]
        birth_year -> Nullable<Int4>,
        #[sql_name = "gioi_tinh"]
        gender -> Nullable<Text>,
        #[sql_name = "dia_chi"]
        address -> Nullable<Text>,
        #[sql_name = "da_tham_gia_truoc"]
        joined_before -> Nullable<Text>,
        #[sql_name = "link_bai_chia_se"]
        share_link -> Nullable<Text>,
        #[sql_name = "muc_tieu"]
        goal -> Nullable<Text>,
        #[sql_name = "ky_luat_rating"]
        discipline_rating -> Nullable<Int4>,
        #[sql_name = "ly_do"]
        reason -> Nullable<Text>,
        #[sql_name = "thoi_gian_thuc_day"]
        wake_up_time -> Nullable<Text>,
        #[sql_name = "tan_suat_tap_the_duc"]
        exercise_frequency -> Nullable<Text>,
        #[sql_name = "muc_do_van_dong"]
        activity_level -> Nullable<Int4>,
        #[sql_name = "tinh_trang_suc_khoe"]
        health_condition -> Nullable<Text>,
        #[sql_name = "dong_y"]
        consent -> Bool,
        status -> Text,
        created_at -> Timestamptz,
        updated_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    daily_zoom_links (id) {
        id -> Uuid,
        zoom_link_id -> Nullable<Uuid>,
        scheduled_for -> Date,
        telegram_sent_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    gratitude_entries (id) {
        id -> Uuid,
        member_id -> Uuid,
        entry_date -> Date,
        gratitude -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    homework_submissions (id) {
        id -> Uuid,
        member_id -> Uuid,
        submission_date -> Date,
        lesson -> Text,
        submission -> Text,
        mentor_notes -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    members (id) {
        id -> Uuid,
        #[sql_name = "ho_ten"]
        full_name -> Nullable<Text>,
        email -> Text,
        #[sql_name = "so_dien_thoai"]
        phone -> Nullable<Text>,
        telegram -> Nullable<Text>,
        #[sql_name = "nam_sinh"]
        birth_year -> Nullable<Int4>,
        status -> Text,
        drop_reason -> Nullable<Text>,
        applicant_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    progress_updates (id) {
        id -> Uuid,
        member_id -> Uuid,
        recorded_at -> Timestamptz,
        recorded_for -> Date,
        weight -> Float8,
        height -> Float8,
        waist -> Nullable<Float8>,
        bust -> Nullable<Float8>,
        hips -> Nullable<Float8>,
        note -> Nullable<Text>,
        photo_url -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    zoom_links (id) {
        id -> Uuid,
        url -> Text,
        label -> Nullable<Text>,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(daily_zoom_links -> zoom_links (zoom_link_id));
diesel::joinable!(gratitude_entries -> members (member_id));
diesel::joinable!(homework_submissions -> members (member_id));
diesel::joinable!(progress_updates -> members (member_id));

diesel::allow_tables_to_appear_in_same_query!(
    admin_settings,
    applicants,
    daily_zoom_links,
    gratitude_entries,
    homework_submissions,
    members,
    progress_updates,
    zoom_links,
);
