pub mod customer_profiles;
