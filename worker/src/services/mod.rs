pub mod daily_link_loop;
pub mod inactivity_sweep_loop;
