mod attempt_limit_case4;
mod immediate_shutdown_case1;
mod delayed_shutdown_case2;
mod reset_between_cases_case3;
mod redo_pending_case5;
