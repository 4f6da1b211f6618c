pub mod applicant_statuses;
pub mod member_statuses;
