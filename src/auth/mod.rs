pub mod gate;
pub mod identity;
pub mod password;
pub mod roles;
pub mod tokens;
