pub mod forward_pass;
pub mod pass;
pub mod shadow_pass;
