pub mod health;
pub mod spark;
