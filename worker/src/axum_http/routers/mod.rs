pub mod internal_jobs;
