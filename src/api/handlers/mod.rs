pub mod customer_profiles;
pub mod health;
